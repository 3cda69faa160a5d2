// src/services/siigo_service.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    models::siigo::{ConnectionStatus, CustomerSummary, InvoiceSummary, SiigoCredentials},
    services::config_service::ConfigService,
};

pub const DEFAULT_BASE_URL: &str = "https://api.siigo.com/v1";

/// Timeout de las llamadas a SIIGO.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TTL del caché de consultas de estado. Evita que el panel de administración
/// nos gaste el rate limit refrescando.
const CONSULTA_CACHE_TTL: Duration = Duration::from_secs(30);

/// Margen antes de la expiración real del token para no usarlo al filo.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    token: String,
    expires_at: Instant,
}

struct CachedValue {
    data: Value,
    stored_at: Instant,
}

/// La ruta /auth vive fuera del prefijo /v1 del resto de recursos.
fn auth_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    let root = trimmed.strip_suffix("/v1").unwrap_or(trimmed);
    format!("{root}/auth")
}

fn resource_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Cliente de la API de SIIGO. Token y caché de consultas viven en el
/// proceso: suficiente para el despliegue actual de una sola instancia.
#[derive(Clone)]
pub struct SiigoService {
    http: reqwest::Client,
    config: ConfigService,
    partner_id: String,
    token_cache: Arc<Mutex<Option<CachedToken>>>,
    consulta_cache: Arc<Mutex<HashMap<String, CachedValue>>>,
}

impl SiigoService {
    pub fn new(config: ConfigService) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("No se pudo construir el cliente HTTP de SIIGO");

        let partner_id =
            std::env::var("SIIGO_PARTNER_ID").unwrap_or_else(|_| "siigo".to_string());

        Self {
            http,
            config,
            partner_id,
            token_cache: Arc::new(Mutex::new(None)),
            consulta_cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Credenciales descifradas de system_config, o None si la integración
    /// está incompleta o deshabilitada.
    pub async fn credentials(&self) -> Result<Option<SiigoCredentials>, AppError> {
        let username = self.config.get_secure_config("siigo_username").await?;
        let access_key = self.config.get_secure_config("siigo_access_key").await?;
        let base_url = self.config.get_config_or("siigo_base_url", DEFAULT_BASE_URL).await?;
        let enabled = self.config.get_config_or("siigo_enabled", "false").await? == "true";

        match (username, access_key) {
            (Some(username), Some(access_key)) if enabled => {
                Ok(Some(SiigoCredentials { username, access_key, base_url }))
            }
            _ => Ok(None),
        }
    }

    /// Autentica contra SIIGO, con credenciales explícitas (el botón de
    /// "probar conexión") o las almacenadas.
    pub async fn authenticate_with(
        &self,
        username: &str,
        access_key: &str,
        base_url: &str,
    ) -> Result<(String, Option<u64>), AppError> {
        tracing::info!("🔐 Autenticando con SIIGO API...");

        let response = self
            .http
            .post(auth_url(base_url))
            .json(&serde_json::json!({ "username": username, "access_key": access_key }))
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::SiigoRateLimited);
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SiigoError(format!("auth falló: {body}")));
        }

        let body: Value = response.json().await?;
        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::SiigoError("auth sin access_token".to_string()))?
            .to_string();
        let expires_in = body.get("expires_in").and_then(Value::as_u64);

        tracing::info!("✅ Autenticación SIIGO exitosa");
        Ok((token, expires_in))
    }

    async fn token(&self) -> Result<String, AppError> {
        let mut cache = self.token_cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        let creds = self
            .credentials()
            .await?
            .ok_or_else(|| AppError::SiigoError("Credenciales SIIGO no configuradas".to_string()))?;

        let (token, expires_in) = self
            .authenticate_with(&creds.username, &creds.access_key, &creds.base_url)
            .await?;

        // SIIGO entrega tokens de ~24h; sin expires_in asumimos una hora
        let ttl = Duration::from_secs(expires_in.unwrap_or(3600));
        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });

        Ok(token)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, AppError> {
        let creds = self
            .credentials()
            .await?
            .ok_or_else(|| AppError::SiigoError("Credenciales SIIGO no configuradas".to_string()))?;
        let token = self.token().await?;

        let response = self
            .http
            .get(resource_url(&creds.base_url, path))
            .bearer_auth(token)
            .header("Partner-Id", &self.partner_id)
            .query(query)
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(AppError::SiigoRateLimited),
            status if status.is_success() => Ok(response.json().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::SiigoError(format!("GET {path} devolvió {status}: {body}")))
            }
        }
    }

    // =========================================================================
    //  ESTADO DE CONEXIÓN (con caché de 30s)
    // =========================================================================

    pub async fn connection_status_cached(&self) -> Result<ConnectionStatus, AppError> {
        const CACHE_KEY: &str = "siigo_connection_status";

        {
            let cache = self.consulta_cache.lock().await;
            if let Some(entry) = cache.get(CACHE_KEY) {
                if entry.stored_at.elapsed() < CONSULTA_CACHE_TTL {
                    tracing::debug!("✅ Estado SIIGO servido desde caché");
                    let status: ConnectionStatus =
                        serde_json::from_value(entry.data.clone()).map_err(anyhow::Error::from)?;
                    return Ok(status);
                }
            }
        }

        let status = self.connection_status().await?;

        let mut cache = self.consulta_cache.lock().await;
        cache.insert(
            CACHE_KEY.to_string(),
            CachedValue {
                data: serde_json::to_value(&status).map_err(anyhow::Error::from)?,
                stored_at: Instant::now(),
            },
        );

        Ok(status)
    }

    async fn connection_status(&self) -> Result<ConnectionStatus, AppError> {
        let Some(creds) = self.credentials().await? else {
            return Ok(ConnectionStatus {
                connected: false,
                message: "Credenciales SIIGO no configuradas o deshabilitadas".to_string(),
            });
        };

        match self
            .authenticate_with(&creds.username, &creds.access_key, &creds.base_url)
            .await
        {
            Ok(_) => Ok(ConnectionStatus {
                connected: true,
                message: "Conexión exitosa con SIIGO".to_string(),
            }),
            // el rate limit sube como 429; cualquier otro fallo es un estado,
            // no un error del endpoint
            Err(AppError::SiigoRateLimited) => Err(AppError::SiigoRateLimited),
            Err(e) => Ok(ConnectionStatus { connected: false, message: e.to_string() }),
        }
    }

    // =========================================================================
    //  CLIENTES Y FACTURAS
    // =========================================================================

    pub async fn search_customers(&self, termino: &str) -> Result<Vec<CustomerSummary>, AppError> {
        let body = self
            .get_json(
                "customers",
                &[("name", termino.to_string()), ("page_size", "20".to_string())],
            )
            .await?;

        Ok(results_array(&body).iter().map(map_customer).collect())
    }

    pub async fn find_customer_by_nit(&self, nit: &str) -> Result<Option<Value>, AppError> {
        let body = self
            .get_json(
                "customers",
                &[("identification", nit.to_string()), ("page_size", "1".to_string())],
            )
            .await?;

        Ok(results_array(&body).first().cloned())
    }

    pub async fn get_customer(&self, id: &str) -> Result<Value, AppError> {
        self.get_json(&format!("customers/{id}"), &[]).await
    }

    pub async fn customer_invoices(&self, customer_id: &str) -> Result<Vec<Value>, AppError> {
        let body = self
            .get_json(
                "invoices",
                &[("customer_id", customer_id.to_string()), ("page_size", "50".to_string())],
            )
            .await?;

        Ok(results_array(&body).to_vec())
    }
}

fn results_array(body: &Value) -> &[Value] {
    body.get("results").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// Proyección compacta de un cliente SIIGO para el buscador.
pub fn map_customer(v: &Value) -> CustomerSummary {
    let str_at = |path: &[&str]| -> Option<String> {
        let mut cur = v;
        for key in path {
            cur = cur.get(key)?;
        }
        cur.as_str().map(str::to_string)
    };

    CustomerSummary {
        id: str_at(&["id"]).unwrap_or_default(),
        nombre: str_at(&["commercial_name"])
            .or_else(|| str_at(&["name"]))
            .unwrap_or_else(|| "Sin nombre".to_string()),
        identificacion: str_at(&["identification"]).unwrap_or_default(),
        email: str_at(&["mail"]),
        telefono: v
            .get("phones")
            .and_then(Value::as_array)
            .and_then(|p| p.first())
            .and_then(|p| p.get("number"))
            .and_then(Value::as_str)
            .map(str::to_string),
        ciudad: str_at(&["address", "city", "city_name"]),
    }
}

/// Resumen de una factura para el dossier por NIT.
pub fn map_invoice(v: &Value) -> InvoiceSummary {
    InvoiceSummary {
        id: v.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
        numero: v
            .get("name")
            .or_else(|| v.get("number"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        fecha: v.get("created").and_then(Value::as_str).map(str::to_string),
        total: v.get("total").and_then(Value::as_f64).unwrap_or(0.0),
        estado: v.get("status").and_then(Value::as_str).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_vive_fuera_del_prefijo_v1() {
        assert_eq!(auth_url("https://api.siigo.com/v1"), "https://api.siigo.com/auth");
        assert_eq!(auth_url("https://api.siigo.com/v1/"), "https://api.siigo.com/auth");
        assert_eq!(auth_url("https://api.siigo.com"), "https://api.siigo.com/auth");
    }

    #[test]
    fn las_rutas_de_recursos_conservan_el_prefijo() {
        assert_eq!(
            resource_url("https://api.siigo.com/v1", "customers"),
            "https://api.siigo.com/v1/customers"
        );
        assert_eq!(
            resource_url("https://api.siigo.com/v1/", "/invoices"),
            "https://api.siigo.com/v1/invoices"
        );
    }

    #[test]
    fn mapea_cliente_con_campos_anidados() {
        let cliente = map_customer(&json!({
            "id": "abc-123",
            "commercial_name": "Distribuciones XYZ",
            "identification": "900123456",
            "mail": "ventas@xyz.co",
            "phones": [{"number": "3001234567"}],
            "address": {"city": {"city_name": "Bogotá"}}
        }));

        assert_eq!(cliente.id, "abc-123");
        assert_eq!(cliente.nombre, "Distribuciones XYZ");
        assert_eq!(cliente.ciudad.as_deref(), Some("Bogotá"));
        assert_eq!(cliente.telefono.as_deref(), Some("3001234567"));
    }

    #[test]
    fn mapea_cliente_con_campos_ausentes() {
        let cliente = map_customer(&json!({ "identification": "1033" }));
        assert_eq!(cliente.nombre, "Sin nombre");
        assert!(cliente.email.is_none());
        assert!(cliente.ciudad.is_none());
    }

    #[test]
    fn numero_de_factura_cae_de_name_a_number() {
        let f = map_invoice(&json!({ "id": "f1", "number": "FV-1-123", "total": 250000.5 }));
        assert_eq!(f.numero, "FV-1-123");
        assert_eq!(f.total, 250000.5);
    }
}
