pub mod dto;
pub mod routes;

pub use routes::{router, AppState};

use axum::Router;
use tower_http::trace::TraceLayer;

pub fn with_tracing(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}
