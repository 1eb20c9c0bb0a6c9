use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::errors::{internal_error, AppError};

/// Registry record without its password.
#[derive(Debug, Serialize)]
pub struct RegistrySummaryDto {
    pub name: String,
    pub url: String,
    pub username: String,
}

pub struct RegistryController;

impl RegistryController {
    pub async fn list_registries(
        State(state): State<AppState>,
    ) -> Result<Json<ApiResponse<Vec<RegistrySummaryDto>>>, AppError> {
        let result = state.registries.list().map_err(internal_error).map(|records| {
            records
                .into_iter()
                .map(|r| RegistrySummaryDto {
                    name: r.name,
                    url: r.url,
                    username: r.username,
                })
                .collect()
        });
        to_json(result)
    }
}
