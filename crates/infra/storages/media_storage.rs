use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, timeout::TimeoutConfig};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::Region,
    error::{ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::domain::{
    repositories::storage::MediaStorageClient, value_objects::storage::UploadedMedia,
};

const FALLBACK_EXTENSION: &str = "jpg";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct MediaStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub prefix: String,
    /// Public (CDN) base under which uploaded keys are served.
    pub public_base_url: String,
}

/// Uploads post images to any S3-compatible bucket and hands back their public URL.
pub struct S3MediaStorage {
    client: Client,
    bucket: String,
    prefix: String,
    public_base_url: Url,
}

impl S3MediaStorage {
    pub async fn new(config: MediaStorageConfig) -> Result<Self> {
        let public_base_url = parse_public_base_url(&config.public_base_url)?;
        let client = build_client(&config).await?;

        Ok(Self {
            client,
            bucket: config.bucket,
            prefix: normalize_prefix(&config.prefix),
            public_base_url,
        })
    }
}

/// Path-style addressing so non-AWS providers (R2, Wasabi, MinIO) resolve the bucket.
async fn build_client(config: &MediaStorageConfig) -> Result<Client> {
    let endpoint = Url::parse(config.endpoint.trim())
        .with_context(|| format!("invalid media endpoint URL: {}", config.endpoint))?;
    let credentials = Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "media-storage",
    );

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(endpoint.as_str().trim_end_matches('/'))
        .timeout_config(
            TimeoutConfig::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .read_timeout(READ_TIMEOUT)
                .build(),
        )
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    Ok(Client::from_conf(s3_config))
}

#[async_trait]
impl MediaStorageClient for S3MediaStorage {
    async fn upload_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: Option<String>,
    ) -> Result<UploadedMedia> {
        let object_key = object_key_for(&self.prefix, Uuid::new_v4(), file_name);
        let content_type = content_type.unwrap_or_else(|| {
            mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
        let size_bytes = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes))
            .content_type(&content_type)
            .send()
            .await
            .map_err(|err| map_put_object_error(err, &self.bucket, &object_key))?;

        let url = public_url_for(&self.public_base_url, &object_key)?;
        info!(
            bucket = %self.bucket,
            object_key = %object_key,
            size_bytes,
            content_type = %content_type,
            "media_storage: image uploaded"
        );

        Ok(UploadedMedia { object_key, url })
    }

    async fn delete_object(&self, object_key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object_key)
            .send()
            .await
            .with_context(|| {
                format!(
                    "failed to delete media object [bucket={}, key={}]",
                    self.bucket, object_key
                )
            })?;

        info!(bucket = %self.bucket, object_key = %object_key, "media_storage: object deleted");
        Ok(())
    }
}

fn parse_public_base_url(raw: &str) -> Result<Url> {
    // A trailing slash makes `Url::join` append rather than replace the last segment.
    let with_slash = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&with_slash).with_context(|| format!("invalid media public base URL: {}", raw))
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn object_key_for(prefix: &str, id: Uuid, file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());

    format!("{}{}.{}", prefix, id, extension)
}

fn public_url_for(base: &Url, object_key: &str) -> Result<String> {
    let url = base
        .join(object_key)
        .with_context(|| format!("failed to build public URL for {}", object_key))?;
    Ok(url.to_string())
}

fn map_put_object_error(
    err: SdkError<PutObjectError>,
    bucket: &str,
    object_key: &str,
) -> anyhow::Error {
    if let SdkError::ServiceError(service_err) = &err {
        let status = service_err.raw().status().as_u16();
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();

        let mut detail = format!(
            "failed to upload media object (status {}, code {})",
            status, code
        );
        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }
        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context("failed to upload media object")
}
