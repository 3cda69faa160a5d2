// src/services/pos_service.rs

use crate::{
    common::error::AppError,
    db::{order_repo::EvidencePaths, OrderRepository},
    models::order::{OrderStatus, PaymentMethod, PendingTransfer},
};

/// Paso POS: evidencias de entrega y la revisión de cartera.
#[derive(Clone)]
pub struct PosService {
    orders: OrderRepository,
}

/// Decide la transición del paso POS a partir del medio de pago y las
/// evidencias recibidas. Separada del I/O para poder probarla en seco.
pub fn plan_evidence_transition(
    payment: PaymentMethod,
    paths: &EvidencePaths,
) -> Result<OrderStatus, AppError> {
    if paths.product_photo.is_none() {
        return Err(AppError::BadRequest("La foto del producto es obligatoria".to_string()));
    }

    if payment.requires_transfer_approval() && paths.payment_evidence.is_none() {
        return Err(AppError::BadRequest(
            "El comprobante de pago es obligatorio para transferencias".to_string(),
        ));
    }

    Ok(OrderStatus::pos_target(payment))
}

impl PosService {
    pub fn new(orders: OrderRepository) -> Self {
        Self { orders }
    }

    /// Sube las evidencias y decide el destino del pedido: efectivo queda
    /// entregado de una vez, transferencia/mixto pasa a revisión de cartera.
    /// La validación corre DESPUÉS de que los archivos ya están en disco,
    /// igual que siempre lo hizo este flujo: un 400 puede dejar huérfanos.
    pub async fn upload_evidence_and_deliver(
        &self,
        order_id: i64,
        paths: &EvidencePaths,
        acting_user: i64,
    ) -> Result<OrderStatus, AppError> {
        let info = self
            .orders
            .get_payment_info(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        let new_status = plan_evidence_transition(info.payment_method, paths)?;

        tracing::info!(
            "📸 POS: pedido {} con pago {:?} pasa de {} a {}",
            info.id,
            info.payment_method,
            info.status,
            new_status
        );

        self.orders
            .apply_evidence_transition(info.id, paths, new_status, acting_user)
            .await?;

        Ok(new_status)
    }

    pub async fn pending_transfers(&self) -> Result<Vec<PendingTransfer>, AppError> {
        self.orders.list_pending_transfers().await
    }

    /// Aprueba una transferencia en revisión. Si la foto del producto quedó
    /// capturada en el paso inicial el pedido se entrega directo; si no,
    /// necesita gestión especial. La guarda de listo_para_entrega la aplica
    /// el UPDATE, no esta función.
    pub async fn approve_transfer(
        &self,
        order_id: i64,
        approver: i64,
    ) -> Result<OrderStatus, AppError> {
        let evidence = self
            .orders
            .get_product_evidence(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        let has_evidence = evidence.as_deref().is_some_and(|p| !p.is_empty());
        let target = OrderStatus::approval_outcome(has_evidence);

        self.orders.apply_approval(order_id, target, approver).await?;

        tracing::info!("✅ Transferencia del pedido {} aprobada → {}", order_id, target);
        Ok(target)
    }

    pub async fn reject_transfer(&self, order_id: i64) -> Result<(), AppError> {
        self.orders
            .get_payment_info(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        self.orders.reject_transfer(order_id).await?;

        tracing::info!("⛔ Transferencia del pedido {} rechazada → gestion_especial", order_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn con_fotos(product: bool, payment: bool, cash: bool) -> EvidencePaths {
        EvidencePaths {
            product_photo: product.then(|| "uploads/evidence/p.jpg".to_string()),
            payment_evidence: payment.then(|| "uploads/evidence/t.jpg".to_string()),
            cash_photo: cash.then(|| "uploads/evidence/c.jpg".to_string()),
        }
    }

    #[test]
    fn efectivo_con_foto_de_producto_entrega() {
        let status =
            plan_evidence_transition(PaymentMethod::Efectivo, &con_fotos(true, false, true));
        assert_eq!(status.unwrap(), OrderStatus::Entregado);
    }

    #[test]
    fn la_foto_del_producto_es_obligatoria_para_todos() {
        for pago in [
            PaymentMethod::Efectivo,
            PaymentMethod::Transferencia,
            PaymentMethod::Mixto,
            PaymentMethod::Credito,
        ] {
            let result = plan_evidence_transition(pago, &con_fotos(false, true, true));
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn transferencia_sin_comprobante_es_400() {
        let result =
            plan_evidence_transition(PaymentMethod::Transferencia, &con_fotos(true, false, false));
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = plan_evidence_transition(PaymentMethod::Mixto, &con_fotos(true, false, false));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn transferencia_con_comprobante_va_a_cartera() {
        let status =
            plan_evidence_transition(PaymentMethod::Transferencia, &con_fotos(true, true, false));
        assert_eq!(status.unwrap(), OrderStatus::RevisionCartera);
    }
}
