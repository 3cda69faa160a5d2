// src/services/metrics_service.rs

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};

use crate::{
    common::error::AppError,
    db::MetricsRepository,
    models::metrics::{
        DailyMetricEntry, ManualMetricRow, MetricsQuery, OrderCountRow, UpdateMetricPayload,
    },
};

/// Resuelve el rango pedido: fechas explícitas mandan, luego mes/año, y sin
/// nada se responde el mes en curso completo.
pub fn resolve_range(
    query: &MetricsQuery,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        return Ok((start, end));
    }

    if let (Some(month), Some(year)) = (query.month, query.year) {
        return month_range(year, month);
    }

    month_range(today.year(), today.month())
}

fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("Mes inválido: {month}/{year}")))?;

    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::BadRequest(format!("Mes inválido: {month}/{year}")))?;

    Ok((first, last))
}

/// Mezcla las dos fuentes caminando el rango día por día: los días sin fila
/// manual y sin pedidos salen en cero, nunca se omiten.
pub fn merge_daily(
    start: NaiveDate,
    end: NaiveDate,
    manual: Vec<ManualMetricRow>,
    counts: Vec<OrderCountRow>,
) -> Vec<DailyMetricEntry> {
    let manual_map: HashMap<NaiveDate, ManualMetricRow> =
        manual.into_iter().map(|m| (m.date, m)).collect();
    let counts_map: HashMap<NaiveDate, i64> =
        counts.into_iter().map(|c| (c.date, c.count)).collect();

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let manual = manual_map.get(&day);
            DailyMetricEntry {
                date: day,
                chats_count: manual.map_or(0, |m| m.chats_count),
                chats_start: manual.map_or(0, |m| m.chats_start),
                chats_end: manual.map_or(0, |m| m.chats_end),
                orders_manual_count: manual.map_or(0, |m| m.orders_manual_count),
                orders_system_count: counts_map.get(&day).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Total de chats procesados del día. Fin - inicio tal cual: si el fin es
/// menor que el inicio el total queda negativo; la semántica correcta sigue
/// en discusión con operaciones, así que no se recorta a cero.
pub fn compute_chats_count(chats_start: i32, chats_end: i32) -> i32 {
    chats_end - chats_start
}

#[derive(Clone)]
pub struct MetricsService {
    repo: MetricsRepository,
}

impl MetricsService {
    pub fn new(repo: MetricsRepository) -> Self {
        Self { repo }
    }

    pub async fn daily_metrics(
        &self,
        query: &MetricsQuery,
    ) -> Result<Vec<DailyMetricEntry>, AppError> {
        let today = Utc::now().date_naive();
        let (start, end) = resolve_range(query, today)?;

        // Dos consultas independientes, cada una reducida a su mapa por día
        let manual = self.repo.manual_metrics_between(start, end).await?;
        let counts = self.repo.order_counts_between(start, end).await?;

        Ok(merge_daily(start, end, manual, counts))
    }

    pub async fn update_daily_metric(
        &self,
        payload: &UpdateMetricPayload,
    ) -> Result<(), AppError> {
        let date = payload
            .date
            .ok_or_else(|| AppError::BadRequest("La fecha es requerida".to_string()))?;

        let chats_count = compute_chats_count(payload.chats_start, payload.chats_end);

        self.repo
            .upsert_daily_metric(
                date,
                payload.chats_start,
                payload.chats_end,
                chats_count,
                payload.orders_manual_count,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn fechas_explicitas_mandan_sobre_mes_y_anio() {
        let query = MetricsQuery {
            month: Some(6),
            year: Some(2023),
            start_date: Some(d("2024-01-01")),
            end_date: Some(d("2024-01-03")),
        };
        let (start, end) = resolve_range(&query, d("2024-05-20")).unwrap();
        assert_eq!((start, end), (d("2024-01-01"), d("2024-01-03")));
    }

    #[test]
    fn mes_y_anio_cubren_el_mes_calendario_completo() {
        let query = MetricsQuery { month: Some(2), year: Some(2024), ..Default::default() };
        let (start, end) = resolve_range(&query, d("2024-05-20")).unwrap();
        // 2024 es bisiesto
        assert_eq!((start, end), (d("2024-02-01"), d("2024-02-29")));

        let query = MetricsQuery { month: Some(12), year: Some(2023), ..Default::default() };
        let (start, end) = resolve_range(&query, d("2024-05-20")).unwrap();
        assert_eq!((start, end), (d("2023-12-01"), d("2023-12-31")));
    }

    #[test]
    fn sin_parametros_cae_al_mes_en_curso() {
        let (start, end) = resolve_range(&MetricsQuery::default(), d("2024-05-20")).unwrap();
        assert_eq!((start, end), (d("2024-05-01"), d("2024-05-31")));
    }

    #[test]
    fn mes_invalido_es_400() {
        let query = MetricsQuery { month: Some(13), year: Some(2024), ..Default::default() };
        assert!(matches!(resolve_range(&query, d("2024-05-20")), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn tres_dias_sin_datos_manuales_salen_en_cero() {
        let counts = vec![
            OrderCountRow { date: d("2024-01-01"), count: 4 },
            OrderCountRow { date: d("2024-01-03"), count: 1 },
        ];
        let rows = merge_daily(d("2024-01-01"), d("2024-01-03"), vec![], counts);

        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.chats_count, 0);
            assert_eq!(row.chats_start, 0);
            assert_eq!(row.chats_end, 0);
            assert_eq!(row.orders_manual_count, 0);
        }
        assert_eq!(rows[0].orders_system_count, 4);
        assert_eq!(rows[1].orders_system_count, 0);
        assert_eq!(rows[2].orders_system_count, 1);
    }

    #[test]
    fn la_fila_manual_se_mezcla_con_el_conteo_automatico() {
        let manual = vec![ManualMetricRow {
            date: d("2024-01-02"),
            chats_count: 35,
            chats_start: 10,
            chats_end: 45,
            orders_manual_count: 12,
        }];
        let counts = vec![OrderCountRow { date: d("2024-01-02"), count: 9 }];
        let rows = merge_daily(d("2024-01-01"), d("2024-01-02"), manual, counts);

        assert_eq!(rows[1].chats_count, 35);
        assert_eq!(rows[1].orders_manual_count, 12);
        assert_eq!(rows[1].orders_system_count, 9);
    }

    #[test]
    fn rango_invertido_no_produce_filas() {
        let rows = merge_daily(d("2024-01-05"), d("2024-01-01"), vec![], vec![]);
        assert!(rows.is_empty());
    }

    #[test]
    fn el_total_de_chats_puede_quedar_negativo() {
        // fin 80 con inicio 100: se almacena -20, sin recorte
        assert_eq!(compute_chats_count(100, 80), -20);
        assert_eq!(compute_chats_count(0, 0), 0);
        assert_eq!(compute_chats_count(10, 45), 35);
    }
}
