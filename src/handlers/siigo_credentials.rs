// src/handlers/siigo_credentials.rs
//
// Las credenciales de SIIGO se almacenan CIFRADAS de forma reversible
// (AES-256-GCM) en la tabla system_config. No se usa hashing irreversible
// porque estos secretos deben enviarse a la API.

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::siigo::{
        CredentialsStatus, SiigoCredentialsView, TestConnectionPayload, TogglePayload,
        UpdateSiigoCredentialsPayload,
    },
    services::siigo_service::DEFAULT_BASE_URL,
};

const SIIGO_CONFIG_KEYS: [&str; 5] = [
    "siigo_username",
    "siigo_access_key",
    "siigo_base_url",
    "siigo_webhook_secret",
    "siigo_enabled",
];

// GET /api/siigo-credentials
#[utoipa::path(
    get,
    path = "/api/siigo-credentials",
    tag = "SIIGO",
    responses((status = 200, description = "Configuración visible (sin el access key)", body = SiigoCredentialsView)),
    security(("api_jwt" = []))
)]
pub async fn get_credentials(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let username = app_state.config_service.get_secure_config("siigo_username").await?;
    let base_url = app_state
        .config_service
        .get_config_or("siigo_base_url", DEFAULT_BASE_URL)
        .await?;
    let enabled = app_state.config_service.get_config_or("siigo_enabled", "false").await? == "true";

    let view = SiigoCredentialsView {
        configured: username.is_some(),
        siigo_username: username.unwrap_or_default(),
        siigo_base_url: base_url,
        is_enabled: enabled,
    };

    Ok(Json(json!({ "success": true, "data": view })))
}

// PUT /api/siigo-credentials
#[utoipa::path(
    put,
    path = "/api/siigo-credentials",
    tag = "SIIGO",
    request_body = UpdateSiigoCredentialsPayload,
    responses(
        (status = 200, description = "Credenciales guardadas cifradas"),
        (status = 400, description = "Falta el usuario o el access key")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_credentials(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSiigoCredentialsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let config = &app_state.config_service;

    // Secretos cifrados; lo no sensible en texto controlado
    config
        .set_secure_config("siigo_username", &payload.siigo_username, Some("Usuario API SIIGO"))
        .await?;
    config
        .set_secure_config(
            "siigo_access_key",
            &payload.siigo_access_key,
            Some("Access Key API SIIGO"),
        )
        .await?;
    if let Some(webhook_secret) = &payload.webhook_secret {
        config
            .set_secure_config(
                "siigo_webhook_secret",
                webhook_secret,
                Some("Secreto para validar webhooks de SIIGO"),
            )
            .await?;
    }
    config
        .set_config(
            "siigo_base_url",
            payload.siigo_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            "string",
            Some("URL base de la API de SIIGO"),
        )
        .await?;
    config
        .set_config(
            "siigo_enabled",
            if payload.is_enabled.unwrap_or(true) { "true" } else { "false" },
            "boolean",
            Some("Habilitar integración SIIGO"),
        )
        .await?;

    tracing::info!("🔐 Credenciales de SIIGO actualizadas");
    Ok(Json(json!({ "success": true, "message": "Credenciales de SIIGO actualizadas exitosamente" })))
}

// POST /api/siigo-credentials/test
#[utoipa::path(
    post,
    path = "/api/siigo-credentials/test",
    tag = "SIIGO",
    request_body = TestConnectionPayload,
    responses(
        (status = 200, description = "Conexión exitosa con SIIGO"),
        (status = 400, description = "No hay credenciales configuradas para probar"),
        (status = 429, description = "Rate limit de SIIGO")
    ),
    security(("api_jwt" = []))
)]
pub async fn test_connection(
    State(app_state): State<AppState>,
    payload: Option<Json<TestConnectionPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let config = &app_state.config_service;

    // Las credenciales del body mandan; si faltan se usan las almacenadas
    let username = match payload.siigo_username {
        Some(u) => Some(u),
        None => config.get_secure_config("siigo_username").await?,
    };
    let access_key = match payload.siigo_access_key {
        Some(k) => Some(k),
        None => config.get_secure_config("siigo_access_key").await?,
    };
    let base_url = match payload.siigo_base_url {
        Some(b) => b,
        None => config.get_config_or("siigo_base_url", DEFAULT_BASE_URL).await?,
    };

    let (Some(username), Some(access_key)) = (username, access_key) else {
        return Err(AppError::BadRequest(
            "No hay credenciales configuradas para probar".to_string(),
        ));
    };

    let (_token, expires_in) = app_state
        .siigo_service
        .authenticate_with(&username, &access_key, &base_url)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Conexión exitosa con SIIGO",
        "data": { "status": "connected", "expires_in": expires_in }
    })))
}

// POST /api/siigo-credentials/toggle
#[utoipa::path(
    post,
    path = "/api/siigo-credentials/toggle",
    tag = "SIIGO",
    request_body = TogglePayload,
    responses((status = 200, description = "Integración habilitada/deshabilitada")),
    security(("api_jwt" = []))
)]
pub async fn toggle_credentials(
    State(app_state): State<AppState>,
    Json(payload): Json<TogglePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .config_service
        .set_config(
            "siigo_enabled",
            if payload.is_enabled { "true" } else { "false" },
            "boolean",
            Some("Habilitar integración SIIGO"),
        )
        .await?;

    let verb = if payload.is_enabled { "habilitadas" } else { "deshabilitadas" };
    Ok(Json(json!({
        "success": true,
        "message": format!("Credenciales de SIIGO {verb} exitosamente")
    })))
}

// DELETE /api/siigo-credentials
#[utoipa::path(
    delete,
    path = "/api/siigo-credentials",
    tag = "SIIGO",
    responses((status = 200, description = "Claves siigo_* eliminadas de system_config")),
    security(("api_jwt" = []))
)]
pub async fn delete_credentials(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.config_service.delete_keys(&SIIGO_CONFIG_KEYS).await?;
    Ok(Json(json!({ "success": true, "message": "Credenciales de SIIGO eliminadas exitosamente" })))
}

// GET /api/siigo-credentials/status
#[utoipa::path(
    get,
    path = "/api/siigo-credentials/status",
    tag = "SIIGO",
    responses((status = 200, description = "Estado de configuración", body = CredentialsStatus)),
    security(("api_jwt" = []))
)]
pub async fn credentials_status(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let username = app_state.config_service.get_secure_config("siigo_username").await?;
    let enabled = app_state.config_service.get_config_or("siigo_enabled", "false").await? == "true";
    let configured = username.is_some();

    let status = CredentialsStatus {
        configured,
        enabled,
        status: match (configured, enabled) {
            (false, _) => "not_configured",
            (true, true) => "enabled",
            (true, false) => "disabled",
        },
    };

    Ok(Json(json!({ "success": true, "data": status })))
}
