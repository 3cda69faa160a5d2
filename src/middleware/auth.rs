// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{User, UserRole},
};

// El middleware en sí: valida el bearer token y deja el usuario en las
// extensions de la request para los handlers.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

// Guardas de rol: corren después de auth_guard sobre el usuario ya resuelto.

pub async fn admin_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request.extensions().get::<User>().ok_or(AppError::InvalidToken)?;
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

pub async fn mensajero_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request.extensions().get::<User>().ok_or(AppError::InvalidToken)?;
    if user.role != UserRole::Mensajero {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

// Extractor para obtener el usuario autenticado directamente en los handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

impl AuthenticatedUser {
    /// Verificación puntual de rol para rutas que comparten router pero no
    /// permisos (ej. asignar mensajero dentro de logística).
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}
