// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{common::error::AppError, config::AppState};

// GET /api/pos/orders/{order_id}/receipt
#[utoipa::path(
    get,
    path = "/api/pos/orders/{order_id}/receipt",
    tag = "POS",
    params(("order_id" = i64, Path, description = "ID del pedido")),
    responses(
        (status = 200, description = "Comprobante de entrega en PDF"),
        (status = 404, description = "Pedido no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delivery_receipt(
    State(app_state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.document_service.delivery_receipt_pdf(order_id).await?;

    // Headers para que el navegador descargue el PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"comprobante_{order_id}.pdf\""),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
