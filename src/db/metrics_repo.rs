// src/db/metrics_repo.rs

use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::metrics::{ManualMetricRow, OrderCountRow},
};

#[derive(Clone)]
pub struct MetricsRepository {
    pool: MySqlPool,
}

impl MetricsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Métricas ingresadas a mano dentro del rango (por columna `date`).
    pub async fn manual_metrics_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ManualMetricRow>, AppError> {
        let rows = sqlx::query_as::<_, ManualMetricRow>(
            "SELECT date, chats_count, chats_start, chats_end, orders_manual_count
             FROM daily_metrics
             WHERE date BETWEEN ? AND ?",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Conteo automático: pedidos creados por día calendario.
    pub async fn order_counts_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OrderCountRow>, AppError> {
        let rows = sqlx::query_as::<_, OrderCountRow>(
            "SELECT DATE(created_at) AS date, COUNT(*) AS count
             FROM orders
             WHERE DATE(created_at) BETWEEN ? AND ?
             GROUP BY DATE(created_at)",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Upsert de la fila manual de un día. `chats_count` llega ya calculado
    /// por el servicio (fin - inicio, negativo incluido).
    pub async fn upsert_daily_metric(
        &self,
        date: NaiveDate,
        chats_start: i32,
        chats_end: i32,
        chats_count: i32,
        orders_manual_count: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO daily_metrics (date, chats_start, chats_end, chats_count, orders_manual_count)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                chats_start = VALUES(chats_start),
                chats_end = VALUES(chats_end),
                chats_count = VALUES(chats_count),
                orders_manual_count = VALUES(orders_manual_count),
                updated_at = NOW()
            "#,
        )
        .bind(date)
        .bind(chats_start)
        .bind(chats_end)
        .bind(chats_count)
        .bind(orders_manual_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
