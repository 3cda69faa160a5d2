// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{common::error::AppError, db::OrderRepository, models::order::OrderStatus};

/// Genera el comprobante de entrega en PDF. El QR lleva el número de pedido
/// para cotejarlo rápido contra la factura en SIIGO.
#[derive(Clone)]
pub struct DocumentService {
    orders: OrderRepository,
}

impl DocumentService {
    pub fn new(orders: OrderRepository) -> Self {
        Self { orders }
    }

    pub async fn delivery_receipt_pdf(&self, order_id: i64) -> Result<Vec<u8>, AppError> {
        let order = self
            .orders
            .get_receipt_order(order_id)
            .await?
            .ok_or(AppError::OrderNotFound)?;

        // Carga la fuente de la carpeta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fuente no encontrada en ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Comprobante {}", order.order_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new("COMPROBANTE DE ENTREGA")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(format!("Pedido {}", order.order_number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!("Cliente: {}", order.customer_name)));
        doc.push(elements::Paragraph::new(format!(
            "Medio de pago: {:?}",
            order.payment_method
        )));
        doc.push(elements::Paragraph::new(format!("Total: $ {:.2}", order.total_amount)));

        if order.status == OrderStatus::Entregado {
            if let Some(delivered_at) = order.delivered_at {
                doc.push(elements::Paragraph::new(format!(
                    "Entregado: {}",
                    delivered_at.format("%d/%m/%Y %H:%M")
                )));
            }
            if let Some(name) = &order.delivered_by_name {
                doc.push(elements::Paragraph::new(format!("Entregó: {name}")));
            }
        } else {
            doc.push(elements::Paragraph::new("Entrega pendiente"));
        }

        doc.push(elements::Break::new(2));

        // QR con el número de pedido
        let code = QrCode::new(order.order_number.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
