use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/", get(handlers::index))
        .route("/articles/:id", get(handlers::article_detail))
        .route("/fragments/stats", get(handlers::stats_fragment))
        .route("/fragments/articles", get(handlers::articles_fragment))
        .route("/fragments/progress", get(handlers::progress_fragment))
        .route("/actions/filter", post(handlers::apply_filters))
        .route("/actions/reset", post(handlers::reset_filters))
        .route("/actions/page/:page", post(handlers::go_to_page))
        .route("/actions/process", post(handlers::process_unprocessed))
        .route("/actions/fetch", post(handlers::fetch_latest))
        .route("/actions/cancel", post(handlers::cancel_task))
        .route("/actions/theme", post(handlers::toggle_theme))
        .route("/actions/dismiss", get(handlers::dismiss_alert))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(addr: SocketAddr, state: AppState) -> nd_core::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nd_core::{Error, Result};
}
