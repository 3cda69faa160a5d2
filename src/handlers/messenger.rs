// src/handlers/messenger.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::order::AssignedOrder,
};

// Todas estas rutas van detrás del mensajero_guard: el usuario autenticado
// es siempre el mensajero y solo opera sobre sus propios pedidos.

// GET /api/messenger/orders
#[utoipa::path(
    get,
    path = "/api/messenger/orders",
    tag = "Messenger",
    responses(
        (status = 200, description = "Pedidos asignados al mensajero, aún en curso", body = [AssignedOrder])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_assigned_orders(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.messenger_service.assigned_orders(user.0.id).await?;
    Ok(Json(json!({ "success": true, "data": rows })))
}

// POST /api/messenger/orders/{order_id}/accept
#[utoipa::path(
    post,
    path = "/api/messenger/orders/{order_id}/accept",
    tag = "Messenger",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Pedido aceptado (repetir no es error)"),
        (status = 400, description = "El pedido no está en estado 'asignado'"),
        (status = 404, description = "Pedido no encontrado o no asignado a este mensajero")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let message = app_state.messenger_service.accept(order_id, user.0.id).await?;
    Ok(Json(json!({ "success": true, "message": message })))
}

// POST /api/messenger/orders/{order_id}/reject
#[utoipa::path(
    post,
    path = "/api/messenger/orders/{order_id}/reject",
    tag = "Messenger",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Pedido devuelto a la cola de asignación"),
        (status = 400, description = "El pedido ya no se puede rechazar")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_order(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.messenger_service.reject(order_id, user.0.id).await?;
    Ok(Json(json!({ "success": true, "message": "Pedido rechazado, vuelve a asignación" })))
}

// POST /api/messenger/orders/{order_id}/start-delivery
#[utoipa::path(
    post,
    path = "/api/messenger/orders/{order_id}/start-delivery",
    tag = "Messenger",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Entrega iniciada"),
        (status = 400, description = "El pedido debe estar aceptado para iniciar entrega")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_delivery(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.messenger_service.start_delivery(order_id, user.0.id).await?;
    Ok(Json(json!({ "success": true, "message": "Entrega iniciada exitosamente" })))
}

// POST /api/messenger/orders/{order_id}/complete
#[utoipa::path(
    post,
    path = "/api/messenger/orders/{order_id}/complete",
    tag = "Messenger",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Entrega completada: pedido entregado con sus sellos"),
        (status = 400, description = "El pedido no está en reparto")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_delivery(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let message = app_state.messenger_service.complete_delivery(order_id, user.0.id).await?;
    Ok(Json(json!({ "success": true, "message": message })))
}
