use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;

use crate::api::auth::permission_middleware::check;
use crate::api::auth::Verb;
use crate::api::dto::paginated_response::PaginatedResponse;
use crate::api::dto::service_dto::{
    DeleteRequest, LogsQuery, MetricsQuery, ScaleRequest, ServiceListQuery, StatsQuery,
};
use crate::api::dto::ApiResponse;
use crate::api::util::json::{to_json, to_outcome};
use crate::app_state::AppState;
use crate::domain::common::model::RequestContext;
use crate::domain::metric::common::dto::ServiceMetricsDto;
use crate::domain::metric::common::util::metric_sampling_step::parse_period;
use crate::domain::service::dto::{
    ServiceDetailDto, ServiceLogsDto, ServiceStatsDto, ServiceSummaryDto,
};
use crate::domain::service::model::ServiceSpec;
use crate::domain::service::service::service_control_coordinator::DeleteReport;
use crate::errors::AppError;

pub const SERVICE_KIND: &str = "service";

pub struct ServiceController;

impl ServiceController {
    pub async fn list_services(
        State(state): State<AppState>,
        Query(q): Query<ServiceListQuery>,
    ) -> Result<Json<ApiResponse<PaginatedResponse<ServiceSummaryDto>>>, AppError> {
        to_json(state.query_service.list(q.name, q.page).await)
    }

    pub async fn get_service(
        State(state): State<AppState>,
        Path(name): Path<String>,
    ) -> Result<Json<ApiResponse<ServiceDetailDto>>, AppError> {
        to_json(state.query_service.detail(&name).await)
    }

    pub async fn get_service_raw(
        State(state): State<AppState>,
        Path(name): Path<String>,
    ) -> Result<impl IntoResponse, AppError> {
        let raw = state.query_service.raw(&name).await?;
        Ok(([(CONTENT_TYPE, "application/json")], raw))
    }

    pub async fn get_service_stats(
        State(state): State<AppState>,
        Path(name): Path<String>,
        Query(q): Query<StatsQuery>,
    ) -> Result<Json<ApiResponse<ServiceStatsDto>>, AppError> {
        to_json(
            state
                .query_service
                .stats(&name, q.time.as_deref(), q.refresh)
                .await,
        )
    }

    pub async fn get_service_logs(
        State(state): State<AppState>,
        Path(name): Path<String>,
        Query(q): Query<LogsQuery>,
    ) -> Result<Json<ApiResponse<ServiceLogsDto>>, AppError> {
        to_json(state.query_service.logs(&name, q.line, q.timestamps).await)
    }

    pub async fn get_service_metrics(
        State(state): State<AppState>,
        Path(name): Path<String>,
        Query(q): Query<MetricsQuery>,
    ) -> Result<Json<ApiResponse<ServiceMetricsDto>>, AppError> {
        let period = parse_period(q.time.as_deref())?;
        to_json(state.metrics_service.fetch_service_metrics(&name, period).await)
    }

    pub async fn create_service(
        State(state): State<AppState>,
        ctx: RequestContext,
        Json(spec): Json<ServiceSpec>,
    ) -> Json<ApiResponse<()>> {
        to_outcome(state.coordinator.create(&ctx, spec).await)
    }

    pub async fn update_service(
        State(state): State<AppState>,
        ctx: RequestContext,
        Path(name): Path<String>,
        Json(spec): Json<ServiceSpec>,
    ) -> Json<ApiResponse<ServiceSpec>> {
        to_outcome(state.coordinator.update(&ctx, &name, spec).await)
    }

    pub async fn scale_service(
        State(state): State<AppState>,
        ctx: RequestContext,
        Path(name): Path<String>,
        Json(req): Json<ScaleRequest>,
    ) -> Json<ApiResponse<u64>> {
        to_outcome(state.coordinator.scale(&ctx, &name, &req.count).await)
    }

    pub async fn rollback_service(
        State(state): State<AppState>,
        ctx: RequestContext,
        Path(name): Path<String>,
    ) -> Json<ApiResponse<()>> {
        to_outcome(state.coordinator.rollback(&ctx, &name).await)
    }

    /// Every name is authorized before the first removal is attempted.
    pub async fn delete_services(
        State(state): State<AppState>,
        ctx: RequestContext,
        Json(req): Json<DeleteRequest>,
    ) -> Result<Json<ApiResponse<DeleteReport>>, AppError> {
        let names = req.name_list();
        debug!("Batch delete requested for {:?}", names);

        for name in &names {
            check(state.authorizer.as_ref(), &ctx.actor, Verb::Write, SERVICE_KIND, Some(name)).await?;
        }

        Ok(to_outcome(state.coordinator.delete(&ctx, &names).await))
    }
}
