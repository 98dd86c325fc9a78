use thiserror::Error;

use crate::document_store::FirestoreConfig;
use crate::seed::BootstrapAdmin;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub identity: IdentityConfig,
    /// Create the company profile and sample media on startup when missing
    pub seed_defaults: bool,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory served under `/assets`
    pub assets_dir: String,
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Firestore,
    Local,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the embedded database (local backend)
    pub data_dir: String,
    /// Required when backend is firestore
    pub firestore: Option<FirestoreConfig>,
}

#[derive(Debug, Clone)]
pub enum IdentityBackend {
    Firebase,
    Static,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub backend: IdentityBackend,
    /// Web API key (required when backend is firebase)
    pub firebase_api_key: Option<String>,
    /// `host:port` of the auth emulator
    pub firebase_emulator_host: Option<String>,
    /// `token=uid:email,...` (static backend)
    pub static_identities: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            assets_dir: "./assets".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Local,
            data_dir: "./data".to_string(),
            firestore: None,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            backend: IdentityBackend::Static,
            firebase_api_key: None,
            firebase_emulator_host: None,
            static_identities: String::new(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let assets_dir = std::env::var("ASSETS_DIR").unwrap_or_else(|_| "./assets".to_string());

        let store_backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "firestore" => StoreBackend::Firestore,
            _ => StoreBackend::Local,
        };

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let firestore = env_nonempty("FIRESTORE_PROJECT_ID").map(|project_id| FirestoreConfig {
            project_id,
            database: env_nonempty("FIRESTORE_DATABASE").unwrap_or_else(|| "(default)".to_string()),
            credentials_file: env_nonempty("GCP_CREDENTIALS_FILE"),
            emulator_host: env_nonempty("FIRESTORE_EMULATOR_HOST"),
        });

        let identity_backend = match std::env::var("IDENTITY_BACKEND")
            .unwrap_or_else(|_| "firebase".to_string())
            .to_lowercase()
            .as_str()
        {
            "static" => IdentityBackend::Static,
            _ => IdentityBackend::Firebase,
        };

        let bootstrap_admin = match (
            env_nonempty("BOOTSTRAP_ADMIN_UID"),
            env_nonempty("BOOTSTRAP_ADMIN_EMAIL"),
        ) {
            (Some(uid), Some(email)) => Some(BootstrapAdmin { uid, email }),
            _ => None,
        };

        let max_body_size = std::env::var("MAX_BODY_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(64 * 1024); // 64KB

        let config = Config {
            server: ServerConfig {
                bind_address,
                assets_dir,
            },
            store: StoreConfig {
                backend: store_backend,
                data_dir,
                firestore,
            },
            identity: IdentityConfig {
                backend: identity_backend,
                firebase_api_key: env_nonempty("FIREBASE_API_KEY"),
                firebase_emulator_host: env_nonempty("FIREBASE_AUTH_EMULATOR_HOST"),
                static_identities: std::env::var("STATIC_IDENTITIES").unwrap_or_default(),
            },
            seed_defaults: env_flag("SEED_DEFAULTS", true),
            bootstrap_admin,
            test_mode: env_flag("TEST_MODE", false),
            max_body_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.store.backend, StoreBackend::Firestore) && self.store.firestore.is_none() {
            return Err(ConfigError::ValidationError(
                "FIRESTORE_PROJECT_ID is required when STORE_BACKEND=firestore".to_string(),
            ));
        }

        if matches!(self.identity.backend, IdentityBackend::Firebase)
            && self.identity.firebase_api_key.is_none()
        {
            return Err(ConfigError::ValidationError(
                "FIREBASE_API_KEY is required when IDENTITY_BACKEND=firebase".to_string(),
            ));
        }

        if self.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if matches!(self.identity.backend, IdentityBackend::Static) && !self.test_mode {
            tracing::warn!(
                "IDENTITY_BACKEND=static accepts fixed tokens. \
                 Use it for local development only."
            );
        }

        Ok(())
    }
}
