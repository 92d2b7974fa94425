use axum::extract::FromRequest;

use crate::error::Error;

/// `axum::Json` with rejections rendered through [`Error`], so malformed
/// bodies get the same `{"error": ...}` shape as every other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
