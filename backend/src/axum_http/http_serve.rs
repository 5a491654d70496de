use crate::{
    auth::{SessionAuthenticator, SessionResolver, tokens::TokenKeys},
    axum_http::{default_routers, routers},
    background::expiry_sweeper,
    config::config_model::{DotEnvyConfig, Media},
    usecases::{
        identity::IdentityUseCase, plans::PlanUseCase, posts::PostUseCase,
        subscriptions::SubscriptionUseCase,
    },
};
use anyhow::Result;
use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use subdesk_core::infra::{
    db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            plans::PlanPostgres, posts::PostPostgres, subscriptions::SubscriptionPostgres,
            users::UserPostgres,
        },
    },
    security::argon2_hasher::Argon2PasswordHasher,
    storages::media_storage::{MediaStorageConfig, S3MediaStorage},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

fn media_storage_config(media: &Media) -> MediaStorageConfig {
    MediaStorageConfig {
        endpoint: media.endpoint.clone(),
        region: media.region.clone(),
        bucket: media.bucket.clone(),
        access_key: media.access_key.clone(),
        secret_key: media.secret_key.clone(),
        prefix: media.prefix.clone(),
        public_base_url: media.public_base_url.clone(),
    }
}

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let plan_repository = Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let post_repository = Arc::new(PostPostgres::new(Arc::clone(&db_pool)));
    let media_storage = Arc::new(S3MediaStorage::new(media_storage_config(&config.media)).await?);
    info!("Media storage client has been built");

    let token_keys = Arc::new(TokenKeys::new(&config.jwt.secret, config.jwt.ttl_days));
    let sessions: Arc<dyn SessionResolver> = Arc::new(SessionAuthenticator::new(
        Arc::clone(&token_keys),
        Arc::clone(&user_repository),
    ));

    let identity_usecase = Arc::new(IdentityUseCase::new(
        Arc::clone(&user_repository),
        Arc::new(Argon2PasswordHasher::new()),
        token_keys,
    ));
    let plan_usecase = Arc::new(PlanUseCase::new(Arc::clone(&plan_repository)));
    let subscription_usecase = Arc::new(SubscriptionUseCase::new(
        subscription_repository,
        plan_repository,
        user_repository,
    ));
    let post_usecase = Arc::new(PostUseCase::new(post_repository, media_storage));

    let sweeper = expiry_sweeper::spawn(
        Arc::clone(&subscription_usecase),
        config.subscriptions.sweep_interval_secs,
    );

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest("/api/auth", routers::auth::routes(identity_usecase))
        .nest("/api/plan", routers::plans::routes(plan_usecase))
        .nest(
            "/api/subscription",
            routers::subscriptions::routes(subscription_usecase),
        )
        .nest("/api/post", routers::posts::routes(post_usecase))
        .route("/api/health-check", get(default_routers::health_check))
        .layer(Extension(sessions))
        .layer(DefaultBodyLimit::disable())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
        info!("expiry_sweeper: stopped");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
