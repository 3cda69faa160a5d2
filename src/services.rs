pub mod auth;
pub mod config_service;
pub mod document_service;
pub mod messenger_service;
pub mod metrics_service;
pub mod pos_service;
pub mod siigo_service;
