// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
// Todo lo que un handler puede fallar termina acá y se traduce a HTTP en un
// solo lugar; el cuerpo sigue el sobre {success: false, message} del API.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    // Faltantes del request que no pasan por validator (ej. archivos
    // multipart obligatorios)
    #[error("{0}")]
    BadRequest(String),

    #[error("Pedido no encontrado")]
    OrderNotFound,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Token de autenticación inválido o ausente")]
    InvalidToken,

    #[error("No tiene permisos para esta operación")]
    Forbidden,

    #[error("Transición de estado inválida: {0}")]
    InvalidTransition(String),

    // SIIGO devuelve 429 cuando nos pasamos del rate limit; es el único
    // fallo del upstream con mensaje propio.
    #[error("SIIGO API temporalmente limitada (demasiadas peticiones). Intenta en unos minutos.")]
    SiigoRateLimited,

    #[error("No se encontró el recurso en SIIGO: {0}")]
    SiigoNotFound(String),

    #[error("Error consultando SIIGO: {0}")]
    SiigoError(String),

    #[error("Fuente no encontrada: {0}")]
    FontNotFound(String),

    // Variante para errores de base de datos
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Error de E/S")]
    IoError(#[from] std::io::Error),

    #[error("Error llamando a la API externa")]
    HttpError(#[from] reqwest::Error),

    // Variante genérica para cualquier otro error inesperado
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Devolver todos los detalles de la validación.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "message": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::OrderNotFound => {
                (StatusCode::NOT_FOUND, "Pedido no encontrado".to_string())
            }
            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuario no encontrado".to_string())
            }
            AppError::SiigoNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Usuario o contraseña inválidos".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente".to_string(),
            ),
            AppError::Forbidden => {
                (StatusCode::FORBIDDEN, "No tiene permisos para esta operación".to_string())
            }
            AppError::SiigoRateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "SIIGO API temporalmente limitada (demasiadas peticiones). Intenta en unos minutos."
                    .to_string(),
            ),

            // Todo lo demás (DatabaseError, IoError, HttpError, ...) es un 500.
            // `tracing` deja el detalle en el log; al cliente le llega el
            // mensaje del error tal cual, como siempre lo hizo este sistema.
            ref e => {
                tracing::error!("Error interno del servidor: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({ "success": false, "message": message }));
        (status, body).into_response()
    }
}
