pub mod auth;
pub mod carriers;
pub mod documents;
pub mod logistics;
pub mod messenger;
pub mod metrics;
pub mod pos;
pub mod siigo_consulta;
pub mod siigo_credentials;
