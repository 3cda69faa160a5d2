// src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{admin_guard, auth_guard, mensajero_guard};

/// Límite del multipart de evidencias: tres fotos de celular caben de sobra.
const EVIDENCE_BODY_LIMIT: usize = 25 * 1024 * 1024;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien acá: si la configuración falla, la aplicación no
    // debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falló la inicialización del estado de la aplicación.");

    // Corre las migraciones de SQLx al arrancar
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Fallaron las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas con éxito");

    // Rutas de autenticación (login público, /me protegido)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route(
            "/me",
            get(handlers::auth::get_me).layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth_guard,
            )),
        );

    // POS: evidencias de entrega y revisión de cartera
    let pos_routes = Router::new()
        .route(
            "/upload-evidence-and-deliver",
            post(handlers::pos::upload_evidence_and_deliver),
        )
        .route("/pending-transfers", get(handlers::pos::get_pending_transfers))
        .route("/approve-transfer/{order_id}", post(handlers::pos::approve_transfer))
        .route("/reject-transfer/{order_id}", post(handlers::pos::reject_transfer))
        .route("/orders/{order_id}/receipt", get(handlers::documents::delivery_receipt))
        .layer(DefaultBodyLimit::max(EVIDENCE_BODY_LIMIT))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Bandeja del mensajero (solo rol mensajero)
    let messenger_routes = Router::new()
        .route("/orders", get(handlers::messenger::get_assigned_orders))
        .route("/orders/{order_id}/accept", post(handlers::messenger::accept_order))
        .route("/orders/{order_id}/reject", post(handlers::messenger::reject_order))
        .route(
            "/orders/{order_id}/start-delivery",
            post(handlers::messenger::start_delivery),
        )
        .route("/orders/{order_id}/complete", post(handlers::messenger::complete_delivery))
        .layer(axum_middleware::from_fn(mensajero_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Logística: asignación de mensajeros (el rol se verifica en el handler)
    let logistics_routes = Router::new()
        .route(
            "/orders/{order_id}/assign-messenger",
            post(handlers::logistics::assign_messenger),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Mantenimiento: antes scripts sueltos contra producción
    let admin_routes = Router::new()
        .route(
            "/reconcile-messenger-assignments",
            post(handlers::logistics::reconcile_messenger_assignments),
        )
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let metrics_routes = Router::new()
        .route("/", get(handlers::metrics::get_daily_metrics))
        .route("/update", post(handlers::metrics::update_daily_metric))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let carriers_routes = Router::new()
        .route("/", get(handlers::carriers::list_carriers))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // SIIGO: credenciales y consultas, solo administradores
    let siigo_credentials_routes = Router::new()
        .route(
            "/",
            get(handlers::siigo_credentials::get_credentials)
                .put(handlers::siigo_credentials::update_credentials)
                .delete(handlers::siigo_credentials::delete_credentials),
        )
        .route("/test", post(handlers::siigo_credentials::test_connection))
        .route("/toggle", post(handlers::siigo_credentials::toggle_credentials))
        .route("/status", get(handlers::siigo_credentials::credentials_status))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let siigo_consulta_routes = Router::new()
        .route("/estado", get(handlers::siigo_consulta::estado_conexion))
        .route("/clientes", get(handlers::siigo_consulta::buscar_clientes))
        .route("/clientes/{nit}", get(handlers::siigo_consulta::consultar_cliente_por_nit))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina todo en el router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/pos", pos_routes)
        .nest("/api/messenger", messenger_routes)
        .nest("/api/logistics", logistics_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/metrics", metrics_routes)
        .nest("/api/carriers", carriers_routes)
        .nest("/api/siigo-credentials", siigo_credentials_routes)
        .nest("/api/siigo-consulta", siigo_consulta_routes)
        .with_state(app_state);

    // Arranca el servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falló el listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Error en el servidor Axum");
}
