// src/db/config_repo.rs

use sqlx::MySqlPool;

use crate::common::error::AppError;

/// Acceso crudo a la tabla system_config. El cifrado/descifrado de los
/// valores sensibles es responsabilidad del ConfigService; acá solo se
/// mueven strings.
#[derive(Clone)]
pub struct ConfigRepository {
    pool: MySqlPool,
}

impl ConfigRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT config_value FROM system_config WHERE config_key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        config_type: &str,
        description: Option<&str>,
        is_sensitive: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO system_config (config_key, config_value, config_type, description, is_sensitive)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                config_value = VALUES(config_value),
                config_type = VALUES(config_type),
                description = COALESCE(VALUES(description), description),
                is_sensitive = VALUES(is_sensitive),
                updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(config_type)
        .bind(description)
        .bind(is_sensitive)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_keys(&self, keys: &[&str]) -> Result<u64, AppError> {
        // MySQL no acepta arrays como parámetro; se arma el IN a mano con un
        // placeholder por clave.
        if keys.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        let sql = format!("DELETE FROM system_config WHERE config_key IN ({placeholders})");

        let mut query = sqlx::query(&sql);
        for key in keys {
            query = query.bind(*key);
        }
        let result = query.execute(&self.pool).await?;

        Ok(result.rows_affected())
    }
}
