// src/services/messenger_service.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::{OrderRepository, UserRepository},
    models::{
        auth::UserRole,
        order::{AssignedOrder, MessengerStatus},
    },
};

/// Resultado de la reconciliación de columnas de asignación.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ReconcileReport {
    pub examined: usize,
    pub synchronized: usize,
    pub cleared: usize,
}

/// Política de resolución entre la columna canónica y el alias heredado:
/// con una sola puesta se copia a la otra; con las dos en desacuerdo gana
/// `assigned_messenger_id`.
pub fn resolve_assignment(canonical: Option<i64>, legacy: Option<i64>) -> Option<i64> {
    canonical.or(legacy)
}

/// El alias heredado es texto; lo que no parsee como id se trata como vacío.
pub fn parse_legacy_alias(alias: Option<&str>) -> Option<i64> {
    alias.and_then(|s| s.trim().parse::<i64>().ok())
}

/// Asignación de mensajeros y su sub-máquina de estados.
#[derive(Clone)]
pub struct MessengerService {
    orders: OrderRepository,
    users: UserRepository,
}

impl MessengerService {
    pub fn new(orders: OrderRepository, users: UserRepository) -> Self {
        Self { orders, users }
    }

    async fn owned_state(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<MessengerStatus, AppError> {
        let (status, assigned) = self
            .orders
            .get_messenger_state(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        // El mensajero solo ve y toca sus propios pedidos; para los demás el
        // pedido "no existe", igual que en la vista.
        if assigned != Some(messenger_id) {
            return Err(AppError::OrderNotFound);
        }

        Ok(status)
    }

    fn require_transition(
        current: MessengerStatus,
        next: MessengerStatus,
    ) -> Result<(), AppError> {
        if current.can_transition(next) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition(format!(
                "el pedido está en '{current}', no puede pasar a '{next}'"
            )))
        }
    }

    // =========================================================================
    //  ASIGNACIÓN (logística)
    // =========================================================================

    pub async fn assign(&self, order_id: i64, messenger_id: i64) -> Result<(), AppError> {
        let messenger = self
            .users
            .find_active_with_role(messenger_id, UserRole::Mensajero)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "El usuario {messenger_id} no es un mensajero activo"
                ))
            })?;

        let (current, _) = self
            .orders
            .get_messenger_state(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        Self::require_transition(current, MessengerStatus::Assigned)?;

        self.orders.assign_messenger(order_id, messenger_id).await?;
        self.orders.tracking_mark_assigned(order_id, messenger_id).await?;

        tracing::info!("🛵 Pedido {} asignado a {}", order_id, messenger.full_name);
        Ok(())
    }

    // =========================================================================
    //  FLUJO DEL MENSAJERO
    // =========================================================================

    pub async fn assigned_orders(
        &self,
        messenger_id: i64,
    ) -> Result<Vec<AssignedOrder>, AppError> {
        self.orders.list_assigned_orders(messenger_id).await
    }

    /// Aceptar un pedido asignado. Repetir la aceptación no es error.
    pub async fn accept(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<&'static str, AppError> {
        let current = self.owned_state(order_id, messenger_id).await?;

        if current == MessengerStatus::Accepted {
            return Ok("Pedido ya aceptado previamente");
        }
        Self::require_transition(current, MessengerStatus::Accepted)?;

        self.orders.set_messenger_status(order_id, MessengerStatus::Accepted).await?;
        self.orders.tracking_mark_accepted(order_id, messenger_id).await?;

        Ok("Pedido aceptado exitosamente")
    }

    /// Rechazar devuelve el pedido a la cola y limpia la asignación.
    pub async fn reject(&self, order_id: i64, messenger_id: i64) -> Result<(), AppError> {
        let current = self.owned_state(order_id, messenger_id).await?;
        Self::require_transition(current, MessengerStatus::PendingAssignment)?;

        self.orders.clear_assignment(order_id).await?;

        tracing::info!("↩️  Pedido {} rechazado por el mensajero {}", order_id, messenger_id);
        Ok(())
    }

    pub async fn start_delivery(&self, order_id: i64, messenger_id: i64) -> Result<(), AppError> {
        let current = self.owned_state(order_id, messenger_id).await?;
        Self::require_transition(current, MessengerStatus::InDelivery)?;

        self.orders.set_messenger_status(order_id, MessengerStatus::InDelivery).await?;
        self.orders.tracking_mark_started(order_id, messenger_id).await?;

        Ok(())
    }

    /// Cierra la entrega: sub-estado delivered, pedido entregado, sellos.
    pub async fn complete_delivery(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<&'static str, AppError> {
        let current = self.owned_state(order_id, messenger_id).await?;

        if current == MessengerStatus::Delivered {
            return Ok("Pedido ya entregado previamente");
        }
        Self::require_transition(current, MessengerStatus::Delivered)?;

        self.orders.complete_delivery(order_id, messenger_id).await?;
        self.orders.tracking_mark_delivered(order_id, messenger_id).await?;

        tracing::info!("📦 Pedido {} entregado por el mensajero {}", order_id, messenger_id);
        Ok("Entrega completada exitosamente")
    }

    // =========================================================================
    //  RECONCILIACIÓN (mantenimiento)
    // =========================================================================

    /// Repara la deriva histórica entre las tres columnas de asignación.
    /// Antes esto era un script que alguien corría a mano contra producción.
    pub async fn reconcile_assignments(&self) -> Result<ReconcileReport, AppError> {
        let drifted = self.orders.list_assignment_drift().await?;
        let mut report = ReconcileReport { examined: drifted.len(), ..Default::default() };

        for row in drifted {
            let resolved = resolve_assignment(
                row.assigned_messenger_id,
                parse_legacy_alias(row.assigned_messenger.as_deref()),
            );

            let Some(candidate) = resolved else {
                self.orders.clear_assignment(row.id).await?;
                report.cleared += 1;
                continue;
            };

            match self
                .users
                .find_active_with_role(candidate, UserRole::Mensajero)
                .await?
            {
                Some(messenger) => {
                    self.orders.write_reconciled_assignment(row.id, candidate).await?;
                    report.synchronized += 1;
                    tracing::info!(
                        "🔄 {}: asignación sincronizada a {} ({})",
                        row.order_number,
                        candidate,
                        messenger.full_name
                    );
                }
                None => {
                    self.orders.clear_assignment(row.id).await?;
                    report.cleared += 1;
                    tracing::warn!(
                        "🧹 {}: el mensajero {} no existe o no está activo, asignación limpiada",
                        row.order_number,
                        candidate
                    );
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn con_una_sola_columna_se_copia() {
        assert_eq!(resolve_assignment(Some(7), None), Some(7));
        assert_eq!(resolve_assignment(None, Some(9)), Some(9));
    }

    #[test]
    fn en_conflicto_gana_la_columna_canonica() {
        assert_eq!(resolve_assignment(Some(7), Some(9)), Some(7));
    }

    #[test]
    fn sin_ninguna_columna_no_hay_candidato() {
        assert_eq!(resolve_assignment(None, None), None);
    }

    #[test]
    fn el_alias_heredado_se_parsea_con_tolerancia() {
        assert_eq!(parse_legacy_alias(Some("12")), Some(12));
        assert_eq!(parse_legacy_alias(Some(" 12 ")), Some(12));
        assert_eq!(parse_legacy_alias(Some("mensajero1")), None);
        assert_eq!(parse_legacy_alias(Some("")), None);
        assert_eq!(parse_legacy_alias(None), None);
    }
}
