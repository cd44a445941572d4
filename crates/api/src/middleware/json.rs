use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON request body whose rejections render as [`AppError`].
///
/// Syntax errors, type mismatches and a wrong content type all come back as
/// 400 with the usual `{error, code}` body instead of axum's plain-text 422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
