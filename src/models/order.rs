// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Enums ---

/// Estado principal del pedido. Antes esto eran strings sueltos comparados
/// con igualdad por todo el código; ahora el conjunto es cerrado y las
/// transiciones válidas viven en un solo lugar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendientePorFacturacion,
    EnEmpaque,
    ListoParaEntrega,
    EnLogistica,
    RevisionCartera,
    GestionEspecial,
    EnReparto,
    Entregado,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendientePorFacturacion => "pendiente_por_facturacion",
            Self::EnEmpaque => "en_empaque",
            Self::ListoParaEntrega => "listo_para_entrega",
            Self::EnLogistica => "en_logistica",
            Self::RevisionCartera => "revision_cartera",
            Self::GestionEspecial => "gestion_especial",
            Self::EnReparto => "en_reparto",
            Self::Entregado => "entregado",
        }
    }

    /// Estado destino del paso POS según el medio de pago: efectivo cierra
    /// el pedido de una vez, transferencia/mixto pasa por cartera.
    pub fn pos_target(payment: PaymentMethod) -> OrderStatus {
        if payment.requires_transfer_approval() {
            OrderStatus::RevisionCartera
        } else {
            OrderStatus::Entregado
        }
    }

    /// Resultado de aprobar una transferencia: entregado solo si la foto del
    /// producto quedó capturada en el paso inicial.
    pub fn approval_outcome(has_product_evidence: bool) -> OrderStatus {
        if has_product_evidence {
            OrderStatus::Entregado
        } else {
            OrderStatus::GestionEspecial
        }
    }

    /// Guarda de la aprobación: un pedido que ya avanzó a listo_para_entrega
    /// nunca retrocede. Espejo de la expresión
    /// `IF(status = 'listo_para_entrega', status, ?)` que aplica el UPDATE.
    pub fn approved_status(current: OrderStatus, target: OrderStatus) -> OrderStatus {
        if current == OrderStatus::ListoParaEntrega {
            current
        } else {
            target
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Efectivo,
    Transferencia,
    Mixto,
    Credito,
}

impl PaymentMethod {
    /// Transferencia y mixto exigen comprobante de pago y revisión de cartera.
    pub fn requires_transfer_approval(&self) -> bool {
        matches!(self, Self::Transferencia | Self::Mixto)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    RecogeBodega,
    MensajeriaLocal,
    Transportadora,
}

/// Sub-máquina de estados del mensajero, independiente del status del pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessengerStatus {
    PendingAssignment,
    Assigned,
    Accepted,
    InDelivery,
    Delivered,
}

impl MessengerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingAssignment => "pending_assignment",
            Self::Assigned => "assigned",
            Self::Accepted => "accepted",
            Self::InDelivery => "in_delivery",
            Self::Delivered => "delivered",
        }
    }

    /// Tabla de transiciones. Cualquier salto fuera de esta tabla se rechaza
    /// en el borde con 400 en vez de depender de IFs regados por los
    /// controladores.
    pub fn can_transition(self, next: MessengerStatus) -> bool {
        use MessengerStatus::*;
        matches!(
            (self, next),
            // asignar y re-asignar mientras el mensajero no haya aceptado
            (PendingAssignment, Assigned)
                | (Assigned, Assigned)
                | (Assigned, Accepted)
                // rechazo: vuelve a la cola de asignación
                | (Assigned, PendingAssignment)
                | (Accepted, InDelivery)
                | (InDelivery, Delivered)
        )
    }
}

impl std::fmt::Display for MessengerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Filas ---

/// Proyección mínima que necesita el paso POS para decidir la transición.
#[derive(Debug, Clone, FromRow)]
pub struct OrderPaymentInfo {
    pub id: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
}

/// Pedido en revisión de cartera, como lo lista la vista de aprobación.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PendingTransfer {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[schema(value_type = String, example = "150000.00")]
    pub total_amount: Decimal,
    pub payment_evidence_photo: Option<String>,
    pub product_evidence_photo: Option<String>,
    pub submitted_for_approval_at: Option<DateTime<Utc>>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pedido asignado, como lo ve el mensajero en su bandeja.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssignedOrder {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    #[schema(value_type = String, example = "150000.00")]
    pub total_amount: Decimal,
    pub messenger_status: MessengerStatus,
    pub created_at: DateTime<Utc>,
}

/// Columnas de asignación crudas de un pedido, tal como están en la base.
/// `assigned_messenger` y `assigned_to` son los alias heredados (texto).
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub id: i64,
    pub order_number: String,
    pub assigned_messenger_id: Option<i64>,
    pub assigned_messenger: Option<String>,
    pub assigned_to: Option<String>,
    pub messenger_status: MessengerStatus,
}

/// Encabezado del comprobante de entrega.
#[derive(Debug, Clone, FromRow)]
pub struct ReceiptOrder {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: Decimal,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivered_by_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efectivo_y_credito_entregan_directo() {
        assert_eq!(OrderStatus::pos_target(PaymentMethod::Efectivo), OrderStatus::Entregado);
        assert_eq!(OrderStatus::pos_target(PaymentMethod::Credito), OrderStatus::Entregado);
    }

    #[test]
    fn transferencia_y_mixto_pasan_por_cartera() {
        assert_eq!(
            OrderStatus::pos_target(PaymentMethod::Transferencia),
            OrderStatus::RevisionCartera
        );
        assert_eq!(OrderStatus::pos_target(PaymentMethod::Mixto), OrderStatus::RevisionCartera);
    }

    #[test]
    fn aprobacion_depende_de_la_evidencia_del_producto() {
        assert_eq!(OrderStatus::approval_outcome(true), OrderStatus::Entregado);
        assert_eq!(OrderStatus::approval_outcome(false), OrderStatus::GestionEspecial);
    }

    #[test]
    fn la_guarda_nunca_retrocede_listo_para_entrega() {
        for target in [OrderStatus::Entregado, OrderStatus::GestionEspecial] {
            assert_eq!(
                OrderStatus::approved_status(OrderStatus::ListoParaEntrega, target),
                OrderStatus::ListoParaEntrega
            );
        }
        assert_eq!(
            OrderStatus::approved_status(OrderStatus::RevisionCartera, OrderStatus::Entregado),
            OrderStatus::Entregado
        );
    }

    #[test]
    fn transiciones_de_mensajero_validas() {
        use MessengerStatus::*;
        assert!(PendingAssignment.can_transition(Assigned));
        assert!(Assigned.can_transition(Assigned));
        assert!(Assigned.can_transition(Accepted));
        assert!(Assigned.can_transition(PendingAssignment));
        assert!(Accepted.can_transition(InDelivery));
        assert!(InDelivery.can_transition(Delivered));
    }

    #[test]
    fn transiciones_de_mensajero_invalidas() {
        use MessengerStatus::*;
        assert!(!PendingAssignment.can_transition(InDelivery));
        assert!(!PendingAssignment.can_transition(Delivered));
        assert!(!Accepted.can_transition(Assigned));
        assert!(!Delivered.can_transition(InDelivery));
        assert!(!InDelivery.can_transition(Accepted));
    }

    #[test]
    fn representacion_en_texto_coincide_con_la_base() {
        assert_eq!(OrderStatus::PendientePorFacturacion.as_str(), "pendiente_por_facturacion");
        assert_eq!(OrderStatus::RevisionCartera.as_str(), "revision_cartera");
        assert_eq!(MessengerStatus::InDelivery.as_str(), "in_delivery");
    }
}
