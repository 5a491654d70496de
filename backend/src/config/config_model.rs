#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub jwt: Jwt,
    pub subscriptions: Subscriptions,
    pub media: Media,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Request body limit in MiB.
    pub body_limit: u64,
    /// Per-request timeout in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
    pub disable_prepared_statements: bool,
}

#[derive(Clone)]
pub struct Jwt {
    pub secret: String,
    pub ttl_days: i64,
}

impl std::fmt::Debug for Jwt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jwt")
            .field("secret", &"<redacted>")
            .field("ttl_days", &self.ttl_days)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Subscriptions {
    /// Seconds between lapsed-subscription sweeps; 0 disables the sweeper.
    pub sweep_interval_secs: u64,
}

#[derive(Clone)]
pub struct Media {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_base_url: String,
    pub prefix: String,
}

impl std::fmt::Debug for Media {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Media")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("public_base_url", &self.public_base_url)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
