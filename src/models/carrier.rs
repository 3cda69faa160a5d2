// src/models/carrier.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Carrier {
    pub id: i64,
    #[schema(example = "Servientrega")]
    pub name: String,
    #[schema(example = "servientrega")]
    pub code: String,
    pub active: bool,
}
