// src/handlers/carriers.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::{common::error::AppError, config::AppState, models::carrier::Carrier};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CarriersQuery {
    /// true para listar solo transportadoras activas
    pub active: Option<bool>,
}

// GET /api/carriers
#[utoipa::path(
    get,
    path = "/api/carriers",
    tag = "Carriers",
    params(CarriersQuery),
    responses((status = 200, description = "Listado de transportadoras", body = [Carrier])),
    security(("api_jwt" = []))
)]
pub async fn list_carriers(
    State(app_state): State<AppState>,
    Query(query): Query<CarriersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.carrier_repo.list(query.active.unwrap_or(false)).await?;
    Ok(Json(json!({ "success": true, "data": rows })))
}
