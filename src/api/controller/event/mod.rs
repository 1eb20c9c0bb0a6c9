use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::service::model::AuditEvent;
use crate::errors::AppError;

const DEFAULT_LIMIT: usize = 50;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct EventQuery {
    pub limit: Option<usize>,
    /// Only events for this service name
    pub subject: Option<String>,
}

pub struct EventController;

impl EventController {
    pub async fn list_events(
        State(state): State<AppState>,
        Query(q): Query<EventQuery>,
    ) -> Result<Json<ApiResponse<Vec<AuditEvent>>>, AppError> {
        let limit = q.limit.unwrap_or(DEFAULT_LIMIT);
        let events = match q.subject.as_deref().filter(|s| !s.is_empty()) {
            Some(subject) => state.audit_log.for_subject(subject, limit),
            None => state.audit_log.recent(limit),
        };
        to_json(Ok(events))
    }
}
