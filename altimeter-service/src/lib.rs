//! Altimeter Service Library
//!
//! Router, handlers and error mapping of the altitude HTTP API.
//! This library is used by both the altimeter-service binary and integration tests.

pub mod error;
pub mod handlers;
pub mod params;

use std::sync::Arc;

use altimeter::{ElevationBackend, ResolvedConfig};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    pub backend: Arc<dyn ElevationBackend>,
}

pub type SharedState = Arc<AppState>;

/// Router options independent of the backend.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// CORS origin to allow, `*` for any. No CORS headers when unset.
    pub cors: Option<String>,
}

/// Build the application from a resolved configuration.
pub fn app(config: &ResolvedConfig) -> Router {
    router(
        config.backend.clone(),
        RouterOptions {
            cors: config.server.cors.clone(),
        },
    )
}

/// Build the application around `backend`.
pub fn router(backend: Arc<dyn ElevationBackend>, options: RouterOptions) -> Router {
    let state = Arc::new(AppState { backend });

    let mut app = Router::new()
        .route(
            "/altitude",
            get(handlers::get_altitude)
                .post(handlers::get_altitude)
                .options(handlers::options_altitude)
                .fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .with_state(state);

    if let Some(layer) = options.cors.as_deref().and_then(cors_layer) {
        app = app.layer(layer);
    }

    app.layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
                return None;
            }
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any),
    )
}

// Re-export commonly used types for convenience
pub use error::{ApiError, ErrorResponse};
pub use handlers::AltitudeResponse;
pub use params::Coordinates;
