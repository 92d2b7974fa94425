use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{Error, Result};

/// Any origin when `*` is listed or the list is empty; otherwise exactly the
/// listed origins. An origin that is not a valid header value is a
/// configuration error.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        return Ok(base.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| Error::Config(format!("Invalid CORS origin: {:?}", origin)))
        })
        .collect::<Result<Vec<HeaderValue>>>()?;
    Ok(base.allow_origin(origins))
}
