//! MarketDesk Web: server-rendered pages over the core and store crates.
//!
//! - `GET /` lead form, `POST /submit` persists a lead
//! - `GET|POST /signup` bcrypt-hashed registration with unique usernames
//! - `GET /dashboard` NSE and BSE top gainers and losers
//! - `GET|POST /login` placeholder without authentication

pub mod error;
pub mod handlers;
pub mod pages;
pub mod state;

pub use error::WebError;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use marketdesk_core::AppConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/signup", get(handlers::signup_form).post(handlers::signup))
        .route("/submit", post(handlers::submit_lead))
        .route("/thankyou", get(handlers::thankyou))
        .route("/dashboard", get(handlers::dashboard))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the web server until it fails.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Serving MarketDesk at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
