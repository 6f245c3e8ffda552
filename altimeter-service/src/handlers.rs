//! HTTP request handlers for the altitude service.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::params::Coordinates;
use crate::SharedState;

/// Successful altitude response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AltitudeResponse {
    /// Elevation in meters, `null` where no data covers the position.
    pub alt: Option<f64>,
}

/// `GET|POST /altitude?lat=X&lng=Y`
///
/// # Returns
///
/// - `200 OK` with `{"alt": ...}`
/// - `400 Bad Request` with per-field messages if `lat` or `lng` is invalid
/// - `500` (or the backend's own status) if the lookup fails
pub async fn get_altitude(
    State(state): State<SharedState>,
    coords: Coordinates,
) -> Result<Json<AltitudeResponse>, ApiError> {
    tracing::debug!(lat = coords.lat, lng = coords.lng, "Altitude query");

    let backend = state.backend.clone();
    let alt = tokio::task::spawn_blocking(move || backend.lookup(coords.lat, coords.lng))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::info!(lat = coords.lat, lng = coords.lng, alt = ?alt, "Altitude found");

    Ok(Json(AltitudeResponse { alt }))
}

/// `OPTIONS /altitude`: empty 200 for CORS preflights.
pub async fn options_altitude() -> StatusCode {
    StatusCode::OK
}

/// Any unmatched method or path.
pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_altitude_response_serialize() {
        let json = serde_json::to_string(&AltitudeResponse { alt: Some(57.0) }).unwrap();
        assert_eq!(json, r#"{"alt":57.0}"#);

        let json = serde_json::to_string(&AltitudeResponse { alt: None }).unwrap();
        assert_eq!(json, r#"{"alt":null}"#);
    }
}
