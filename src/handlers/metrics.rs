// src/handlers/metrics.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    models::metrics::{DailyMetricEntry, MetricsQuery, UpdateMetricPayload},
};

// GET /api/metrics
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "Metrics",
    params(MetricsQuery),
    responses(
        (status = 200, description = "Una fila por día del rango, manual + automático", body = [DailyMetricEntry])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_daily_metrics(
    State(app_state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.metrics_service.daily_metrics(&query).await?;
    Ok(Json(json!({ "success": true, "data": rows })))
}

// POST /api/metrics/update
#[utoipa::path(
    post,
    path = "/api/metrics/update",
    tag = "Metrics",
    request_body = UpdateMetricPayload,
    responses(
        (status = 200, description = "Métrica del día guardada"),
        (status = 400, description = "Falta la fecha")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_daily_metric(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateMetricPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.metrics_service.update_daily_metric(&payload).await?;
    Ok(Json(json!({ "success": true, "message": "Métrica actualizada exitosamente" })))
}
