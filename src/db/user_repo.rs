// src/db/user_repo.rs

use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

// El repositorio de usuarios, responsable de las interacciones con 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, full_name, role, active, created_at, updated_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, full_name, role, active, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Busca un usuario activo con un rol específico. Lo usa la asignación y
    /// la reconciliación para verificar que el destino sea un mensajero real.
    pub async fn find_active_with_role(
        &self,
        id: i64,
        role: UserRole,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, full_name, role, active, created_at, updated_at
             FROM users WHERE id = ? AND role = ? AND active = TRUE",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
