use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use blog_service::config::StoreBackend;
use blog_service::db::{create_pool, postgres::run_migrations, MemoryRecordStore, PgRecordStore};
use blog_service::openapi::{openapi_json, ApiDoc};
use blog_service::{handlers, metrics, SharedStore};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Probe the local health endpoint; used as the container health check.
async fn run_healthcheck() -> io::Result<()> {
    let port = std::env::var("BLOG_SERVICE_PORT").unwrap_or_else(|_| "8000".to_string());
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);

    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// Blog Service
///
/// # Routes
///
/// - `/users/*` - Create and read users
/// - `/posts/*` - Create, read, update, delete posts; list a post's comment trees
/// - `/comments/*` - Create comments and read comment trees
/// - `/api/v1/health*`, `/metrics`, `/api/v1/openapi.json` - Operations
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Some(cmd) = std::env::args().nth(1) {
        if cmd == "healthcheck" || cmd == "healthcheck-http" {
            return run_healthcheck().await;
        }
    }

    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match blog_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store: SharedStore = match config.store {
        StoreBackend::Postgres => {
            config.database.log_config();
            let pool = create_pool(&config.database).await.map_err(|e| {
                tracing::error!("Database pool creation failed: {:#}", e);
                io::Error::new(
                    io::ErrorKind::Other,
                    format!("Failed to create database pool: {e}"),
                )
            })?;
            run_migrations(&pool)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            Arc::new(PgRecordStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; data is lost on restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let bind_address = config.bind_address();
    tracing::info!("Starting HTTP server at {}", bind_address);

    let store_data = web::Data::new(store);
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route(ApiDoc::openapi_json_path(), web::get().to(openapi_json))
            .route("/api/v1/health", web::get().to(handlers::health_summary))
            .route(
                "/api/v1/health/ready",
                web::get().to(handlers::readiness_summary),
            )
            .route("/api/v1/health/live", web::get().to(handlers::liveness_check))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let joined = tokio::select! {
        joined = &mut server_task => joined,
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            server_task.await
        }
    };

    let result = joined
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
        .and_then(|result| result);
    if let Err(e) = &result {
        tracing::error!("HTTP server exited with error: {}", e);
    }

    tracing::info!("blog-service shutting down");
    result
}
