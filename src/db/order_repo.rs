// src/db/order_repo.rs

use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::order::{
        AssignedOrder, AssignmentRow, MessengerStatus, OrderPaymentInfo, OrderStatus,
        PendingTransfer, ReceiptOrder,
    },
};

/// Rutas de las evidencias que deja el paso POS. Las tres columnas se
/// escriben siempre; las que no llegaron quedan en NULL.
#[derive(Debug, Clone, Default)]
pub struct EvidencePaths {
    pub product_photo: Option<String>,
    pub payment_evidence: Option<String>,
    pub cash_photo: Option<String>,
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: MySqlPool,
}

impl OrderRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PASO POS / CARTERA
    // =========================================================================

    pub async fn get_payment_info(&self, id: i64) -> Result<Option<OrderPaymentInfo>, AppError> {
        let info = sqlx::query_as::<_, OrderPaymentInfo>(
            "SELECT id, payment_method, status FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(info)
    }

    /// Aplica la transición POS en un solo UPDATE condicional: los tres
    /// sellos son mutuamente excluyentes y los resuelve el IF() de MySQL,
    /// no el código.
    pub async fn apply_evidence_transition(
        &self,
        id: i64,
        paths: &EvidencePaths,
        new_status: OrderStatus,
        acting_user: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET
              product_evidence_photo = ?,
              payment_evidence_photo = ?,
              cash_evidence_photo = ?,
              status = ?,
              delivered_at = IF(? = 'entregado', NOW(), delivered_at),
              delivered_by = IF(? = 'entregado', ?, delivered_by),
              submitted_for_approval_at = IF(? = 'revision_cartera', NOW(), NULL)
            WHERE id = ?
            "#,
        )
        .bind(&paths.product_photo)
        .bind(&paths.payment_evidence)
        .bind(&paths.cash_photo)
        .bind(new_status)
        .bind(new_status)
        .bind(new_status)
        .bind(acting_user)
        .bind(new_status)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_product_evidence(&self, id: i64) -> Result<Option<Option<String>>, AppError> {
        let row = sqlx::query_scalar::<_, Option<String>>(
            "SELECT product_evidence_photo FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Aprueba la transferencia. La guarda de listo_para_entrega vive en el
    /// propio UPDATE para que un pedido avanzado concurrentemente no
    /// retroceda entre nuestra lectura y nuestra escritura.
    pub async fn apply_approval(
        &self,
        id: i64,
        target: OrderStatus,
        approver: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = IF(status = 'listo_para_entrega', status, ?),
                approved_by = ?,
                approved_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(target)
        .bind(approver)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn reject_transfer(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE orders SET status = 'gestion_especial' WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_pending_transfers(&self) -> Result<Vec<PendingTransfer>, AppError> {
        let rows = sqlx::query_as::<_, PendingTransfer>(
            r#"
            SELECT o.id, o.order_number, o.customer_name, o.status, o.payment_method,
                   o.total_amount, o.payment_evidence_photo, o.product_evidence_photo,
                   o.submitted_for_approval_at,
                   u.username AS created_by_name,
                   o.created_at
            FROM orders o
            LEFT JOIN users u ON o.created_by = u.id
            WHERE o.status = 'revision_cartera'
              AND o.payment_method IN ('transferencia', 'mixto')
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    //  MENSAJERÍA
    // =========================================================================

    pub async fn get_messenger_state(
        &self,
        order_id: i64,
    ) -> Result<Option<(MessengerStatus, Option<i64>)>, AppError> {
        let row = sqlx::query_as::<_, (MessengerStatus, Option<i64>)>(
            "SELECT messenger_status, assigned_messenger_id FROM orders WHERE id = ?",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_assigned_orders(
        &self,
        messenger_id: i64,
    ) -> Result<Vec<AssignedOrder>, AppError> {
        let rows = sqlx::query_as::<_, AssignedOrder>(
            r#"
            SELECT id, order_number, customer_name, status, payment_method,
                   delivery_method, total_amount, messenger_status, created_at
            FROM orders
            WHERE assigned_messenger_id = ?
              AND messenger_status IN ('assigned', 'accepted', 'in_delivery')
            ORDER BY created_at ASC
            "#,
        )
        .bind(messenger_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Escribe la asignación en la columna canónica Y en los dos alias
    /// heredados, siempre juntos. Mantenerlos de acuerdo en la escritura
    /// es lo que deja a la reconciliación sin trabajo nuevo.
    pub async fn assign_messenger(&self, order_id: i64, messenger_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET assigned_messenger_id = ?,
                assigned_messenger = ?,
                assigned_to = ?,
                messenger_status = 'assigned',
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(messenger_id)
        .bind(messenger_id.to_string())
        .bind(messenger_id.to_string())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn set_messenger_status(
        &self,
        order_id: i64,
        status: MessengerStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE orders SET messenger_status = ? WHERE id = ?")
            .bind(status)
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn clear_assignment(&self, order_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET assigned_messenger_id = NULL,
                assigned_messenger = NULL,
                assigned_to = NULL,
                messenger_status = 'pending_assignment',
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cierre de la entrega: la sub-máquina y el estado principal del pedido
    /// avanzan juntos, con los sellos de entrega.
    pub async fn complete_delivery(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET messenger_status = 'delivered',
                status = 'entregado',
                delivered_at = NOW(),
                delivered_by = ?
            WHERE id = ?
            "#,
        )
        .bind(messenger_id)
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  RECONCILIACIÓN DE ALIAS DE ASIGNACIÓN
    // =========================================================================

    /// Pedidos donde la columna canónica y el alias heredado no cuentan la
    /// misma historia. Mismo WHERE que usaban los scripts de reparación.
    pub async fn list_assignment_drift(&self) -> Result<Vec<AssignmentRow>, AppError> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, order_number, assigned_messenger_id, assigned_messenger,
                   assigned_to, messenger_status
            FROM orders
            WHERE (assigned_messenger IS NOT NULL AND assigned_messenger_id IS NULL)
               OR (assigned_messenger IS NULL AND assigned_messenger_id IS NOT NULL)
               OR (assigned_messenger IS NOT NULL AND assigned_messenger_id IS NOT NULL
                   AND assigned_messenger <> CAST(assigned_messenger_id AS CHAR))
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Escribe el valor resuelto en las tres columnas y saca el pedido de la
    /// cola de asignación si seguía ahí.
    pub async fn write_reconciled_assignment(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET assigned_messenger_id = ?,
                assigned_messenger = ?,
                assigned_to = ?,
                messenger_status = CASE
                    WHEN messenger_status = 'pending_assignment' THEN 'assigned'
                    ELSE messenger_status
                END,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(messenger_id)
        .bind(messenger_id.to_string())
        .bind(messenger_id.to_string())
        .bind(order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    //  COMPROBANTES
    // =========================================================================

    pub async fn get_receipt_order(&self, id: i64) -> Result<Option<ReceiptOrder>, AppError> {
        let row = sqlx::query_as::<_, ReceiptOrder>(
            r#"
            SELECT o.id, o.order_number, o.customer_name, o.status, o.payment_method,
                   o.total_amount, o.delivered_at,
                   u.full_name AS delivered_by_name
            FROM orders o
            LEFT JOIN users u ON o.delivered_by = u.id
            WHERE o.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // =========================================================================
    //  TRACKING DE ENTREGAS
    // =========================================================================

    pub async fn tracking_mark_assigned(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_tracking (order_id, messenger_id, assigned_at)
            VALUES (?, ?, NOW())
            ON DUPLICATE KEY UPDATE assigned_at = NOW()
            "#,
        )
        .bind(order_id)
        .bind(messenger_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn tracking_mark_accepted(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_tracking (order_id, messenger_id, assigned_at, accepted_at)
            VALUES (?, ?, NOW(), NOW())
            ON DUPLICATE KEY UPDATE accepted_at = NOW()
            "#,
        )
        .bind(order_id)
        .bind(messenger_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn tracking_mark_started(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE delivery_tracking SET started_delivery_at = NOW()
             WHERE order_id = ? AND messenger_id = ?",
        )
        .bind(order_id)
        .bind(messenger_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn tracking_mark_delivered(
        &self,
        order_id: i64,
        messenger_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE delivery_tracking SET delivered_at = NOW()
             WHERE order_id = ? AND messenger_id = ?",
        )
        .bind(order_id)
        .bind(messenger_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
