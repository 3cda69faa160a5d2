// src/handlers/pos.rs

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::order_repo::EvidencePaths,
    middleware::auth::AuthenticatedUser,
    models::order::{OrderStatus, PendingTransfer},
};

// Solo para el esquema del Swagger: el handler real consume el multipart a mano.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct EvidenceUploadForm {
    #[schema(example = 42)]
    order_id: i64,
    #[schema(value_type = String, format = Binary)]
    product_photo: String,
    #[schema(value_type = Option<String>, format = Binary)]
    payment_evidence: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    cash_photo: Option<String>,
}

/// Guarda un archivo de evidencia con nombre único y devuelve la ruta
/// relativa que queda en la base. El archivo se escribe ANTES de validar el
/// pedido; si la validación falla el huérfano queda en disco (comportamiento
/// histórico de este flujo).
async fn save_evidence_file(
    uploads_dir: &str,
    field_name: &str,
    original_name: Option<&str>,
    data: &[u8],
) -> Result<String, AppError> {
    let ext = original_name
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    let filename = format!("{field_name}-{}.{ext}", Uuid::new_v4());

    let dir = std::path::Path::new(uploads_dir).join("evidence");
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&filename), data).await?;

    Ok(format!("{uploads_dir}/evidence/{filename}"))
}

// POST /api/pos/upload-evidence-and-deliver
#[utoipa::path(
    post,
    path = "/api/pos/upload-evidence-and-deliver",
    tag = "POS",
    request_body(content = EvidenceUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Evidencias guardadas; el pedido quedó entregado o en revisión de cartera"),
        (status = 400, description = "Falta la foto del producto o el comprobante de transferencia"),
        (status = 404, description = "Pedido no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_evidence_and_deliver(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut order_id: Option<i64> = None;
    let mut paths = EvidencePaths::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "order_id" => {
                let text = field.text().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                order_id = text.trim().parse().ok();
            }
            "product_photo" | "payment_evidence" | "cash_photo" => {
                let original = field.file_name().map(str::to_string);
                let data =
                    field.bytes().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                let saved = save_evidence_file(
                    &app_state.uploads_dir,
                    &name,
                    original.as_deref(),
                    &data,
                )
                .await?;

                match name.as_str() {
                    "product_photo" => paths.product_photo = Some(saved),
                    "payment_evidence" => paths.payment_evidence = Some(saved),
                    _ => paths.cash_photo = Some(saved),
                }
            }
            // campos extra del formulario se ignoran
            _ => {}
        }
    }

    let order_id =
        order_id.ok_or_else(|| AppError::BadRequest("Order ID requerido".to_string()))?;

    let status = app_state
        .pos_service
        .upload_evidence_and_deliver(order_id, &paths, user.0.id)
        .await?;

    let message = if status == OrderStatus::Entregado {
        "Pedido entregado exitosamente"
    } else {
        "Enviado para aprobación de Cartera"
    };

    Ok(Json(json!({ "success": true, "status": status, "message": message })))
}

// GET /api/pos/pending-transfers
#[utoipa::path(
    get,
    path = "/api/pos/pending-transfers",
    tag = "POS",
    responses(
        (status = 200, description = "Pedidos en revisión de cartera", body = [PendingTransfer])
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pending_transfers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.pos_service.pending_transfers().await?;
    Ok(Json(json!({ "success": true, "data": rows })))
}

// POST /api/pos/approve-transfer/{order_id}
#[utoipa::path(
    post,
    path = "/api/pos/approve-transfer/{order_id}",
    tag = "POS",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Transferencia aprobada"),
        (status = 404, description = "Pedido no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_transfer(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let new_status = app_state.pos_service.approve_transfer(order_id, user.0.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Transferencia aprobada",
        "new_status": new_status
    })))
}

// POST /api/pos/reject-transfer/{order_id}
#[utoipa::path(
    post,
    path = "/api/pos/reject-transfer/{order_id}",
    tag = "POS",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Transferencia rechazada"),
        (status = 404, description = "Pedido no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_transfer(
    State(app_state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.pos_service.reject_transfer(order_id).await?;
    Ok(Json(json!({ "success": true, "message": "Transferencia rechazada" })))
}
