//! Extractors whose rejections surface as `{"message": ...}` 400 responses.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON request body; malformed or mistyped input becomes `AppError::BadRequest`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path parameters; unparsable segments become `AppError::BadRequest`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);
