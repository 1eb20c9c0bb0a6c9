use axum::Json;

use crate::api::dto::ApiResponse;
use crate::errors::{AppError, AppResult};

/// Read endpoints: the value, or the error as its own HTTP status.
pub fn to_json<T: serde::Serialize>(result: AppResult<T>) -> Result<Json<ApiResponse<T>>, AppError> {
    result.map(|value| Json(ApiResponse::ok(value)))
}

/// Mutation endpoints: always 200, outcome carried by `success`/`message`.
pub fn to_outcome<T: serde::Serialize>(result: AppResult<T>) -> Json<ApiResponse<T>> {
    match result {
        Ok(value) => Json(ApiResponse::ok(value)),
        Err(err) => Json(ApiResponse::err(err.to_string())),
    }
}
