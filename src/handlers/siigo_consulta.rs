// src/handlers/siigo_consulta.rs
//
// Consultas avanzadas sobre la API de SIIGO - solo para administradores.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::siigo::{ConnectionStatus, CustomerDossier, CustomerSummary},
    services::siigo_service::{map_customer, map_invoice},
};

// GET /api/siigo-consulta/estado
#[utoipa::path(
    get,
    path = "/api/siigo-consulta/estado",
    tag = "SIIGO",
    responses(
        (status = 200, description = "Estado de conexión (caché de 30s)", body = ConnectionStatus),
        (status = 429, description = "Rate limit de SIIGO")
    ),
    security(("api_jwt" = []))
)]
pub async fn estado_conexion(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let status = app_state.siigo_service.connection_status_cached().await?;
    Ok(Json(json!({ "success": true, "data": status })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BuscarClientesQuery {
    /// Término de búsqueda, mínimo 3 caracteres
    pub termino: Option<String>,
}

// GET /api/siigo-consulta/clientes
#[utoipa::path(
    get,
    path = "/api/siigo-consulta/clientes",
    tag = "SIIGO",
    params(BuscarClientesQuery),
    responses(
        (status = 200, description = "Clientes que coinciden con el término", body = [CustomerSummary]),
        (status = 400, description = "Término demasiado corto")
    ),
    security(("api_jwt" = []))
)]
pub async fn buscar_clientes(
    State(app_state): State<AppState>,
    Query(query): Query<BuscarClientesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let termino = query.termino.unwrap_or_default();
    if termino.chars().count() < 3 {
        return Err(AppError::BadRequest(
            "El término de búsqueda debe tener al menos 3 caracteres".to_string(),
        ));
    }

    tracing::info!("🔍 [ADMIN] Buscando clientes con término: {termino}");
    let clientes = app_state.siigo_service.search_customers(&termino).await?;
    let total = clientes.len();

    Ok(Json(json!({ "success": true, "data": clientes, "total": total })))
}

// GET /api/siigo-consulta/clientes/{nit}
#[utoipa::path(
    get,
    path = "/api/siigo-consulta/clientes/{nit}",
    tag = "SIIGO",
    params(("nit" = String, Path, description = "NIT del cliente")),
    responses(
        (status = 200, description = "Dossier completo del cliente", body = CustomerDossier),
        (status = 404, description = "No existe cliente con ese NIT"),
        (status = 429, description = "Rate limit de SIIGO")
    ),
    security(("api_jwt" = []))
)]
pub async fn consultar_cliente_por_nit(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(nit): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        "🔍 [ADMIN] Consultando información completa para NIT {nit} (pidió {})",
        user.0.username
    );

    let siigo = &app_state.siigo_service;

    let cliente = siigo
        .find_customer_by_nit(&nit)
        .await?
        .ok_or_else(|| AppError::SiigoNotFound(format!("No se encontró cliente con NIT: {nit}")))?;

    let cliente_resumen = map_customer(&cliente);

    // Detalle completo; si falla se sigue con lo básico, como hacía la
    // consulta original con las facturas
    let cliente_detallado = match siigo.get_customer(&cliente_resumen.id).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!("⚠️  [ADMIN] No se pudo ampliar el cliente: {e}");
            Value::Null
        }
    };

    let facturas = match siigo.customer_invoices(&cliente_resumen.id).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("⚠️  [ADMIN] Error obteniendo facturas: {e}");
            Vec::new()
        }
    };

    let dossier = CustomerDossier {
        cliente: cliente_resumen,
        cliente_detallado,
        facturas_recientes: facturas.iter().take(10).map(map_invoice).collect(),
        total_facturas_consultadas: facturas.len(),
    };

    Ok(Json(json!({
        "success": true,
        "message": "Información completa del cliente obtenida exitosamente",
        "data": dossier
    })))
}
