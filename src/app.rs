use std::{any, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::{
    endpoints,
    utils::{response::AppError, state::AppState},
};

fn panic_handler(err: Box<dyn any::Any + Send + 'static>) -> Response {
    let msg = if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    };
    error!("PANIC: {}", msg);

    AppError::Internal("Internal server error".to_string()).into_response()
}

/// Full application: routes, body cap, CORS for any origin, panic guard
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.body_limit;
    let shared_state = Arc::new(state);

    endpoints::create_router()
        .with_state(shared_state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any)
                        .max_age(Duration::from_secs(3600)),
                )
                .layer(CatchPanicLayer::custom(panic_handler)),
        )
}
