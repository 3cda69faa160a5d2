// src/db/carrier_repo.rs

use sqlx::MySqlPool;

use crate::{common::error::AppError, models::carrier::Carrier};

#[derive(Clone)]
pub struct CarrierRepository {
    pool: MySqlPool,
}

impl CarrierRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, only_active: bool) -> Result<Vec<Carrier>, AppError> {
        let rows = if only_active {
            sqlx::query_as::<_, Carrier>(
                "SELECT id, name, code, active FROM carriers WHERE active = TRUE ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Carrier>(
                "SELECT id, name, code, active FROM carriers ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows)
    }
}
