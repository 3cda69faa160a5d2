// src/models/siigo.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Credenciales listas para usar contra la API, ya descifradas.
/// Nunca se serializa hacia el cliente.
#[derive(Debug, Clone)]
pub struct SiigoCredentials {
    pub username: String,
    pub access_key: String,
    pub base_url: String,
}

/// Lo que ve el administrador al consultar la configuración: el access key
/// jamás se devuelve.
#[derive(Debug, Serialize, ToSchema)]
pub struct SiigoCredentialsView {
    pub configured: bool,
    pub siigo_username: String,
    pub siigo_base_url: String,
    pub is_enabled: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSiigoCredentialsPayload {
    #[validate(length(min = 1, message = "El usuario de SIIGO es requerido"))]
    pub siigo_username: String,
    #[validate(length(min = 1, message = "El Access Key de SIIGO es requerido"))]
    pub siigo_access_key: String,
    pub siigo_base_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub is_enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TestConnectionPayload {
    pub siigo_username: Option<String>,
    pub siigo_access_key: Option<String>,
    pub siigo_base_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TogglePayload {
    pub is_enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CredentialsStatus {
    pub configured: bool,
    pub enabled: bool,
    /// "enabled" | "disabled" | "not_configured"
    pub status: &'static str,
}

/// Estado de conexión con SIIGO, lo que se cachea 30 segundos.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
}

/// Resumen compacto de un cliente SIIGO para el buscador del administrador.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerSummary {
    pub id: String,
    pub nombre: String,
    pub identificacion: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub ciudad: Option<String>,
}

/// Resumen de una factura reciente dentro del dossier por NIT.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceSummary {
    pub id: String,
    pub numero: String,
    pub fecha: Option<String>,
    pub total: f64,
    pub estado: Option<String>,
}

/// Dossier completo de un cliente consultado por NIT.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDossier {
    pub cliente: CustomerSummary,
    #[schema(value_type = Object)]
    pub cliente_detallado: serde_json::Value,
    pub facturas_recientes: Vec<InvoiceSummary>,
    pub total_facturas_consultadas: usize,
}
