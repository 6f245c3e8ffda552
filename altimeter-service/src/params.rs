//! `lat` / `lng` extraction and validation.

use axum::{
    async_trait,
    extract::{FromRequest, Query, Request},
    http::{header, HeaderMap, Method, Uri},
    Form,
};

use crate::error::{ApiError, FieldErrors};

pub const MISSING_MESSAGE: &str = "Missing data for required field.";
pub const INVALID_NUMBER_MESSAGE: &str = "Not a valid number.";

/// Validated coordinates of an altitude request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Validate both fields from raw `(name, value)` pairs. The first
    /// occurrence of a name wins.
    ///
    /// # Errors
    ///
    /// Returns one message list per failing field; a failure on one field
    /// does not hide the other's.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let lat = parse_field(pairs, "lat", &mut errors);
        let lng = parse_field(pairs, "lng", &mut errors);

        match (lat, lng) {
            (Some(lat), Some(lng)) => Ok(Self { lat, lng }),
            _ => Err(errors),
        }
    }
}

fn parse_field(pairs: &[(String, String)], name: &str, errors: &mut FieldErrors) -> Option<f64> {
    let Some((_, raw)) = pairs.iter().find(|(key, _)| key == name) else {
        errors.insert(name.to_string(), vec![MISSING_MESSAGE.to_string()]);
        return None;
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.insert(name.to_string(), vec![INVALID_NUMBER_MESSAGE.to_string()]);
            None
        }
    }
}

fn query_pairs(uri: &Uri) -> Result<Vec<(String, String)>, ApiError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).map_err(|e| {
        ApiError::Http {
            status: e.status(),
            message: e.body_text(),
        }
    })?;
    Ok(pairs)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Reads the query string and, for a form-encoded POST, the body.
/// Query values take precedence over body values.
#[async_trait]
impl<S> FromRequest<S> for Coordinates
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut pairs = query_pairs(req.uri())?;

        if req.method() == Method::POST && is_form(req.headers()) {
            let Form(body) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Http {
                    status: e.status(),
                    message: e.body_text(),
                })?;
            pairs.extend(body);
        }

        Coordinates::from_pairs(&pairs).map_err(ApiError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_valid() {
        let coords =
            Coordinates::from_pairs(&pairs(&[("lat", "1.001"), ("lng", "10.001")])).unwrap();
        assert_eq!(coords, Coordinates { lat: 1.001, lng: 10.001 });
    }

    #[test]
    fn test_integers_and_whitespace() {
        let coords =
            Coordinates::from_pairs(&pairs(&[("lat", " 10 "), ("lng", "-48")])).unwrap();
        assert_eq!(coords, Coordinates { lat: 10.0, lng: -48.0 });
    }

    #[test]
    fn test_missing_both() {
        let errors = Coordinates::from_pairs(&[]).unwrap_err();
        assert_eq!(errors["lat"], vec![MISSING_MESSAGE]);
        assert_eq!(errors["lng"], vec![MISSING_MESSAGE]);
    }

    #[test]
    fn test_fields_fail_independently() {
        let errors = Coordinates::from_pairs(&pairs(&[("lat", "abc")])).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["lat"], vec![INVALID_NUMBER_MESSAGE]);
        assert_eq!(errors["lng"], vec![MISSING_MESSAGE]);

        let errors = Coordinates::from_pairs(&pairs(&[("lat", "1"), ("lng", "x")])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["lng"], vec![INVALID_NUMBER_MESSAGE]);
    }

    #[test]
    fn test_empty_and_non_finite_values() {
        let errors = Coordinates::from_pairs(&pairs(&[("lat", ""), ("lng", "NaN")])).unwrap_err();
        assert_eq!(errors["lat"], vec![INVALID_NUMBER_MESSAGE]);
        assert_eq!(errors["lng"], vec![INVALID_NUMBER_MESSAGE]);

        let errors = Coordinates::from_pairs(&pairs(&[("lat", "inf"), ("lng", "1")])).unwrap_err();
        assert_eq!(errors["lat"], vec![INVALID_NUMBER_MESSAGE]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let coords = Coordinates::from_pairs(&pairs(&[
            ("lat", "1"),
            ("lng", "2"),
            ("lat", "3"),
        ]))
        .unwrap();
        assert_eq!(coords.lat, 1.0);
    }

    #[test]
    fn test_is_form() {
        let mut headers = HeaderMap::new();
        assert!(!is_form(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=utf-8".parse().unwrap(),
        );
        assert!(is_form(&headers));
    }
}
