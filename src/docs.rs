// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- POS / Cartera ---
        handlers::pos::upload_evidence_and_deliver,
        handlers::pos::get_pending_transfers,
        handlers::pos::approve_transfer,
        handlers::pos::reject_transfer,
        handlers::documents::delivery_receipt,

        // --- Mensajería ---
        handlers::messenger::get_assigned_orders,
        handlers::messenger::accept_order,
        handlers::messenger::reject_order,
        handlers::messenger::start_delivery,
        handlers::messenger::complete_delivery,

        // --- Logística / Admin ---
        handlers::logistics::assign_messenger,
        handlers::logistics::reconcile_messenger_assignments,

        // --- Métricas ---
        handlers::metrics::get_daily_metrics,
        handlers::metrics::update_daily_metric,

        // --- Transportadoras ---
        handlers::carriers::list_carriers,

        // --- SIIGO ---
        handlers::siigo_credentials::get_credentials,
        handlers::siigo_credentials::update_credentials,
        handlers::siigo_credentials::test_connection,
        handlers::siigo_credentials::toggle_credentials,
        handlers::siigo_credentials::delete_credentials,
        handlers::siigo_credentials::credentials_status,
        handlers::siigo_consulta::estado_conexion,
        handlers::siigo_consulta::buscar_clientes,
        handlers::siigo_consulta::consultar_cliente_por_nit,
    ),
    components(
        schemas(
            // --- Pedidos ---
            models::order::OrderStatus,
            models::order::PaymentMethod,
            models::order::DeliveryMethod,
            models::order::MessengerStatus,
            models::order::PendingTransfer,
            models::order::AssignedOrder,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Métricas ---
            models::metrics::DailyMetricEntry,
            models::metrics::UpdateMetricPayload,

            // --- Transportadoras ---
            models::carrier::Carrier,

            // --- SIIGO ---
            models::siigo::SiigoCredentialsView,
            models::siigo::UpdateSiigoCredentialsPayload,
            models::siigo::TestConnectionPayload,
            models::siigo::TogglePayload,
            models::siigo::CredentialsStatus,
            models::siigo::ConnectionStatus,
            models::siigo::CustomerSummary,
            models::siigo::InvoiceSummary,
            models::siigo::CustomerDossier,

            // --- Payloads ---
            handlers::pos::EvidenceUploadForm,
            handlers::logistics::AssignMessengerPayload,
            services::messenger_service::ReconcileReport,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación"),
        (name = "POS", description = "Evidencias de entrega y revisión de cartera"),
        (name = "Messenger", description = "Bandeja y flujo del mensajero"),
        (name = "Logistics", description = "Asignación de mensajeros"),
        (name = "Admin", description = "Operaciones de mantenimiento"),
        (name = "Metrics", description = "Métricas diarias de operación"),
        (name = "Carriers", description = "Transportadoras"),
        (name = "SIIGO", description = "Integración con la API de SIIGO")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
