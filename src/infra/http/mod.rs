//! The relay's HTTP surface: a single publish route.

mod middleware;
mod publish;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::post,
};
use fieldnotes_relay_types::PUBLISH_PATH;

use crate::application::relay::RelayService;

pub use middleware::RequestContext;

/// Build the relay router. `max_request_bytes` bounds the publish body.
pub fn build_router(relay: RelayService, max_request_bytes: usize) -> Router {
    Router::new()
        .route(
            PUBLISH_PATH,
            post(publish::publish).fallback(publish::method_not_allowed),
        )
        .with_state(relay)
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}
