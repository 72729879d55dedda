//! # HTTP Transport
//!
//! Translates HTTP requests into [`UserClient`] calls and store outcomes into
//! status codes. Unmatched routes answer 404, and panics inside handlers are
//! caught and answered with a generic 500.

pub mod response;
pub mod routes;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::clients::UserClient;

pub use response::{ApiError, ApiResponse, ApiResult};
pub use routes::{health_routes, is_valid_user_id, user_routes, UsersState};

/// Build the combined router with all endpoints
pub fn router(users: UserClient) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(user_routes(UsersState { users }))
        .fallback(routes::endpoint_not_found)
        .layer(CatchPanicLayer::custom(response::panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    users: UserClient,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "User directory listening");
        info!("Health check: http://{}/health", addr);
    }

    axum::serve(listener, router(users))
        .with_graceful_shutdown(shutdown)
        .await
}
