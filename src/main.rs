use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engagement_service::auth;
use engagement_service::cache::ProfileCache;
use engagement_service::config::Config;
use engagement_service::db::{PgInteractionStore, PgPreferenceStore};
use engagement_service::handlers::{self, TrackingHandlerState};
use engagement_service::middleware::JwtAuthMiddleware;
use engagement_service::services::{InteractionService, PreferenceUpdater};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    info!(
        "Starting engagement-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Environment: {}", config.app.env);

    // Initialize JWT validation keys
    let public_key = std::env::var("JWT_PUBLIC_KEY_PEM")
        .context("JWT_PUBLIC_KEY_PEM environment variable not set")?;
    auth::initialize_jwt_keys(&public_key).context("Failed to initialize JWT keys")?;

    // Initialize database pool and run migrations
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database pool created, migrations applied");

    // Preference updater with optional Redis write-through cache
    let mut updater = PreferenceUpdater::new(Arc::new(PgPreferenceStore::new(db_pool.clone())));
    if let Some(redis_url) = &config.cache.url {
        let client =
            redis::Client::open(redis_url.as_str()).context("Failed to create Redis client")?;
        match redis::aio::ConnectionManager::new(client).await {
            Ok(conn) => {
                updater = updater.with_cache(ProfileCache::new(conn, config.cache.ttl_secs));
                info!("Redis profile cache enabled");
            }
            Err(e) => {
                tracing::warn!("Redis unavailable, profile cache disabled: {}", e);
            }
        }
    } else {
        info!("Redis profile cache disabled: REDIS_URL not set");
    }

    let service = Arc::new(InteractionService::new(
        Arc::new(PgInteractionStore::new(db_pool.clone())),
        updater,
    ));
    let state = web::Data::new(TrackingHandlerState { service });

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    info!("Listening on http://{}", bind_addr);

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        // The tracking endpoint is called directly from the web client.
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/ready", web::get().to(|| async { "READY" }))
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware)
                    .route(
                        "/interactions",
                        web::post().to(handlers::track_interaction),
                    )
                    .route("/preferences", web::get().to(handlers::get_preferences)),
            )
    })
    .bind(&bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await?;

    Ok(())
}
