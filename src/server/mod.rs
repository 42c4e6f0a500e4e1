use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use handlers::{
    create_frame_handler, drop_frame_handler, frame_names_handler, get_frame_by_name_handler,
    get_frame_handler, health_check, json_error_response, list_frames_handler,
    rename_frame_handler, take_rows_handler,
};

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
};

use crate::config::ServerConfig;
use crate::frame_catalog::FrameRegistry;

pub mod handlers;
pub mod models;

/// Shared state of one server instance. Each instance owns its own registry.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FrameRegistry>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            registry: Arc::new(FrameRegistry::new(config.datasets_dir.clone())),
            config,
        }
    }
}

/// Build the HTTP router with all frame endpoints and middleware
pub fn build_router(app_state: AppState) -> Router {
    let timeout = Duration::from_secs(app_state.config.request_timeout_secs);
    let max_body_bytes = app_state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/frames", get(list_frames_handler).post(create_frame_handler))
        .route("/frames/names", get(frame_names_handler))
        .route("/frames/by-name/{name}", get(get_frame_by_name_handler))
        .route("/frames/{id}", get(get_frame_handler).delete(drop_frame_handler))
        .route("/frames/{id}/name", put(rename_frame_handler))
        .route("/frames/{id}/rows", get(take_rows_handler))
        .with_state(Arc::new(app_state))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::new())
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(middleware::map_response(json_error_response))
}

/// Serve the API on an already bound listener until the server stops
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(listener, build_router(app_state)).await
}

pub async fn run_with_config(config: ServerConfig) -> std::io::Result<()> {
    log::info!(
        "Server configuration: http={}:{}, datasets_dir={}, max_take_rows={}",
        config.http_host,
        config.http_port,
        config
            .datasets_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "<none>".to_string()),
        config.max_take_rows
    );

    let http_bind_address = format!("{}:{}", config.http_host, config.http_port);
    log::info!("Starting HTTP server on {}", http_bind_address);

    let http_listener = match TcpListener::bind(&http_bind_address).await {
        Ok(listener) => {
            log::info!("Successfully bound HTTP listener to {}", http_bind_address);
            listener
        }
        Err(e) => {
            log::error!(
                "Failed to bind HTTP listener to {}: {}",
                http_bind_address,
                e
            );
            log::error!("  Is another process using port {}?", config.http_port);
            return Err(e);
        }
    };

    let daemon = config.daemon;
    let http_server = serve(http_listener, AppState::new(config));

    println!("Frame server is running");
    println!("  HTTP API: http://{}", http_bind_address);

    if !daemon {
        // Run HTTP server (this will block until shutdown)
        return http_server.await;
    }

    println!("Running in daemon mode - press Ctrl+C to stop");

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                (Err(e), _) | (_, Err(e)) => {
                    log::error!(
                        "Failed to register signal handlers: {}. Server will run without graceful shutdown.",
                        e
                    );
                    return http_server.await;
                }
            };

        tokio::select! {
            result = http_server => result?,
            _ = sigterm.recv() => log::info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => log::info!("Received SIGINT, shutting down..."),
        }
    }

    #[cfg(windows)]
    {
        tokio::select! {
            result = http_server => result?,
            _ = tokio::signal::ctrl_c() => {
                log::info!("Received shutdown signal, shutting down...");
            }
        }
    }

    println!("Server stopped");
    Ok(())
}
