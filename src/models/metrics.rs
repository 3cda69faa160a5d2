// src/models/metrics.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Fila manual de daily_metrics tal como está en la base.
#[derive(Debug, Clone, FromRow)]
pub struct ManualMetricRow {
    pub date: NaiveDate,
    pub chats_count: i32,
    pub chats_start: i32,
    pub chats_end: i32,
    pub orders_manual_count: i32,
}

/// Conteo automático de pedidos creados en un día (DATE(created_at)).
#[derive(Debug, Clone, FromRow)]
pub struct OrderCountRow {
    pub date: NaiveDate,
    pub count: i64,
}

/// Una fila por día del rango pedido, manual + automático ya mezclados.
/// Los días sin datos salen en cero, nunca se omiten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyMetricEntry {
    #[schema(value_type = String, example = "2024-01-15")]
    pub date: NaiveDate,
    pub chats_count: i32,
    pub chats_start: i32,
    pub chats_end: i32,
    pub orders_manual_count: i32,
    pub orders_system_count: i64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    #[param(value_type = Option<String>, example = "2024-01-01")]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>, example = "2024-01-31")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMetricPayload {
    /// Obligatoria; se reporta 400 si falta, no un error de deserialización.
    #[schema(value_type = Option<String>, example = "2024-01-15")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub chats_start: i32,
    #[serde(default)]
    pub chats_end: i32,
    #[serde(default)]
    pub orders_manual_count: i32,
}
