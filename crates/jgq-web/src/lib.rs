//! JGQ Web Server
//!
//! Axum-based web UI and JSON API for asking questions about the code graph.

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::{AppState, ClientFactory};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/ask", post(routes::api::ask))
        .route("/schema", get(routes::api::schema))
        .route("/models", get(routes::api::models))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::pages::index))
        .route("/ask", post(routes::pages::ask))
        .route("/health", get(routes::api::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
