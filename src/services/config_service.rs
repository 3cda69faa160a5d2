// src/services/config_service.rs

use aes_gcm::{
    aead::{Aead, OsRng},
    AeadCore, Aes256Gcm, Key, KeyInit, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{common::error::AppError, db::ConfigRepository};

/// Las credenciales de SIIGO se almacenan CIFRADAS de forma reversible
/// (AES-256-GCM) en la tabla system_config. No se usa hashing irreversible
/// para estos secretos porque deben enviarse a la API.
///
/// Lo que queda en config_value es este JSON, con nonce y ciphertext (el tag
/// de autenticación va pegado al final del ciphertext) en base64.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSecret {
    nonce: String,
    ciphertext: String,
}

/// Cifrador aislado del repositorio para poder probarlo sin base de datos.
#[derive(Clone)]
pub struct SecretBox {
    cipher: Aes256Gcm,
}

impl SecretBox {
    pub fn new(key: &[u8; 32]) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        Self { cipher }
    }

    /// Carga la clave desde CONFIG_ENCRYPTION_KEY (hex de 64 caracteres =
    /// 256 bits). En producción es obligatoria; en desarrollo se tolera una
    /// clave fija con una advertencia bien visible.
    pub fn from_env() -> anyhow::Result<Self> {
        let is_prod = std::env::var("APP_ENV").is_ok_and(|v| v == "production");

        match std::env::var("CONFIG_ENCRYPTION_KEY") {
            Ok(hex_key) => {
                let bytes = hex::decode(hex_key.trim())
                    .map_err(|_| anyhow::anyhow!("CONFIG_ENCRYPTION_KEY no es hex válido"))?;
                let key: [u8; 32] = bytes.try_into().map_err(|_| {
                    anyhow::anyhow!("CONFIG_ENCRYPTION_KEY debe ser hex de 64 caracteres (256 bits)")
                })?;
                Ok(Self::new(&key))
            }
            Err(_) if is_prod => {
                anyhow::bail!("CONFIG_ENCRYPTION_KEY es obligatoria en producción (64 hex chars)")
            }
            Err(_) => {
                tracing::warn!(
                    "⚠️  CONFIG_ENCRYPTION_KEY no configurada. Usando clave temporal SOLO para desarrollo."
                );
                Ok(Self::new(b"clave-temporal-solo-desarrollo!!"))
            }
        }
    }

    fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| anyhow::anyhow!("Falló el cifrado del valor sensible"))?;

        let stored = StoredSecret {
            nonce: BASE64_STANDARD.encode(nonce),
            ciphertext: BASE64_STANDARD.encode(ciphertext),
        };
        Ok(serde_json::to_string(&stored).map_err(anyhow::Error::from)?)
    }

    fn decrypt(&self, stored_json: &str) -> Result<String, AppError> {
        let stored: StoredSecret = serde_json::from_str(stored_json)
            .map_err(|_| anyhow::anyhow!("Valor cifrado corrupto en system_config"))?;

        let nonce_bytes = BASE64_STANDARD
            .decode(&stored.nonce)
            .map_err(|_| anyhow::anyhow!("Nonce inválido en system_config"))?;
        let ciphertext = BASE64_STANDARD
            .decode(&stored.ciphertext)
            .map_err(|_| anyhow::anyhow!("Ciphertext inválido en system_config"))?;

        // GenericArray::from_slice hace panic con longitudes distintas de 96 bits
        if nonce_bytes.len() != 12 {
            return Err(anyhow::anyhow!("Nonce de longitud inválida en system_config").into());
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| anyhow::anyhow!("No se pudo descifrar el valor (¿cambió la clave?)"))?;

        Ok(String::from_utf8(plaintext).map_err(anyhow::Error::from)?)
    }
}

/// Configuración clave/valor del sistema con soporte para secretos cifrados.
#[derive(Clone)]
pub struct ConfigService {
    repo: ConfigRepository,
    secrets: SecretBox,
}

impl ConfigService {
    pub fn new(repo: ConfigRepository, secrets: SecretBox) -> Self {
        Self { repo, secrets }
    }

    pub async fn get_config(&self, key: &str) -> Result<Option<String>, AppError> {
        self.repo.get_value(key).await
    }

    pub async fn get_config_or(&self, key: &str, default: &str) -> Result<String, AppError> {
        Ok(self.repo.get_value(key).await?.unwrap_or_else(|| default.to_string()))
    }

    pub async fn set_config(
        &self,
        key: &str,
        value: &str,
        config_type: &str,
        description: Option<&str>,
    ) -> Result<(), AppError> {
        self.repo.upsert(key, value, config_type, description, false).await
    }

    pub async fn get_secure_config(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.repo.get_value(key).await? {
            Some(stored) => Ok(Some(self.secrets.decrypt(&stored)?)),
            None => Ok(None),
        }
    }

    pub async fn set_secure_config(
        &self,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<(), AppError> {
        let encrypted = self.secrets.encrypt(value)?;
        self.repo.upsert(key, &encrypted, "encrypted", description, true).await
    }

    pub async fn delete_keys(&self, keys: &[&str]) -> Result<u64, AppError> {
        self.repo.delete_keys(keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_box() -> SecretBox {
        SecretBox::new(&[7u8; 32])
    }

    #[test]
    fn cifrar_y_descifrar_devuelve_el_original() {
        let sb = test_box();
        let stored = sb.encrypt("acceso-super-secreto").unwrap();
        assert_eq!(sb.decrypt(&stored).unwrap(), "acceso-super-secreto");
    }

    #[test]
    fn cada_cifrado_usa_un_nonce_distinto() {
        let sb = test_box();
        let a = sb.encrypt("mismo-valor").unwrap();
        let b = sb.encrypt("mismo-valor").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn otra_clave_no_puede_descifrar() {
        let stored = test_box().encrypt("secreto").unwrap();
        let other = SecretBox::new(&[8u8; 32]);
        assert!(other.decrypt(&stored).is_err());
    }

    #[test]
    fn ciphertext_manipulado_falla_la_autenticacion() {
        let sb = test_box();
        let stored = sb.encrypt("secreto").unwrap();
        let mut parsed: serde_json::Value = serde_json::from_str(&stored).unwrap();
        // voltear el primer byte del ciphertext
        let mut raw = BASE64_STANDARD
            .decode(parsed["ciphertext"].as_str().unwrap())
            .unwrap();
        raw[0] ^= 0xFF;
        parsed["ciphertext"] = serde_json::Value::String(BASE64_STANDARD.encode(raw));
        assert!(sb.decrypt(&parsed.to_string()).is_err());
    }

    #[test]
    fn json_corrupto_es_error_y_no_panico() {
        assert!(test_box().decrypt("no-es-json").is_err());
    }
}
