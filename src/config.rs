// src/config.rs

use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::{env, time::Duration};

use crate::{
    db::{CarrierRepository, ConfigRepository, MetricsRepository, OrderRepository, UserRepository},
    services::{
        auth::AuthService,
        config_service::{ConfigService, SecretBox},
        document_service::DocumentService,
        messenger_service::MessengerService,
        metrics_service::MetricsService,
        pos_service::PosService,
        siigo_service::SiigoService,
    },
};

// El estado compartido, accesible en toda la aplicación
#[derive(Clone)]
pub struct AppState {
    pub db_pool: MySqlPool,
    pub uploads_dir: String,
    pub auth_service: AuthService,
    pub pos_service: PosService,
    pub messenger_service: MessengerService,
    pub metrics_service: MetricsService,
    pub config_service: ConfigService,
    pub siigo_service: SiigoService,
    pub document_service: DocumentService,
    pub carrier_repo: CarrierRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar definido");
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());

        // Conecta a la base de datos, usando '?' para propagar errores
        let db_pool = MySqlPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida con éxito");

        // --- Arma el grafo de dependencias ---
        let user_repo = UserRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let metrics_repo = MetricsRepository::new(db_pool.clone());
        let carrier_repo = CarrierRepository::new(db_pool.clone());
        let config_repo = ConfigRepository::new(db_pool.clone());

        let secrets = SecretBox::from_env()?;
        let config_service = ConfigService::new(config_repo, secrets);

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let pos_service = PosService::new(order_repo.clone());
        let messenger_service = MessengerService::new(order_repo.clone(), user_repo);
        let metrics_service = MetricsService::new(metrics_repo);
        let siigo_service = SiigoService::new(config_service.clone());
        let document_service = DocumentService::new(order_repo);

        Ok(Self {
            db_pool,
            uploads_dir,
            auth_service,
            pos_service,
            messenger_service,
            metrics_service,
            config_service,
            siigo_service,
            document_service,
            carrier_repo,
        })
    }
}
