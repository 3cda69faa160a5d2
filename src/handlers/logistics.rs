// src/handlers/logistics.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::UserRole,
    services::messenger_service::ReconcileReport,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignMessengerPayload {
    #[schema(example = 7)]
    pub messenger_id: i64,
}

// POST /api/logistics/orders/{order_id}/assign-messenger
#[utoipa::path(
    post,
    path = "/api/logistics/orders/{order_id}/assign-messenger",
    tag = "Logistics",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    request_body = AssignMessengerPayload,
    responses(
        (status = 200, description = "Mensajero asignado (las tres columnas quedan de acuerdo)"),
        (status = 400, description = "El usuario no es un mensajero activo o el pedido ya está en curso"),
        (status = 404, description = "Pedido no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_messenger(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i64>,
    Json(payload): Json<AssignMessengerPayload>,
) -> Result<impl IntoResponse, AppError> {
    user.require_role(&[UserRole::Admin, UserRole::Logistica])?;

    app_state.messenger_service.assign(order_id, payload.messenger_id).await?;

    Ok(Json(json!({ "success": true, "message": "Mensajero asignado exitosamente" })))
}

// POST /api/admin/reconcile-messenger-assignments
#[utoipa::path(
    post,
    path = "/api/admin/reconcile-messenger-assignments",
    tag = "Admin",
    responses(
        (status = 200, description = "Deriva entre columnas de asignación reparada", body = ReconcileReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_messenger_assignments(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.messenger_service.reconcile_assignments().await?;

    tracing::info!(
        "🔧 Reconciliación de asignaciones: {} examinadas, {} sincronizadas, {} limpiadas",
        report.examined,
        report.synchronized,
        report.cleared
    );

    Ok(Json(json!({ "success": true, "data": report })))
}
