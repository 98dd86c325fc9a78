//! Shared test helpers for handler and page tests.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;

use crate::config::{Config, IdentityConfig, ServerConfig, StoreConfig};
use crate::document_store::LocalStore;
use crate::identity::{Identity, StaticIdentity};
use crate::storage::models::AdminGrant;
use crate::storage::Database;
use crate::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADMIN_UID: &str = "admin-uid";
pub const VISITOR_TOKEN: &str = "visitor-token";
pub const VISITOR_UID: &str = "visitor-uid";

/// Create a test AppState with a temporary database and two known tokens.
/// No admin grants exist until [`grant_admin`] is called.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            assets_dir: temp_dir.path().join("assets").to_string_lossy().to_string(),
        },
        store: StoreConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            ..StoreConfig::default()
        },
        identity: IdentityConfig::default(),
        seed_defaults: false,
        bootstrap_admin: None,
        test_mode: true,
        max_body_size: 64 * 1024,
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");

    let tokens = HashMap::from([
        (
            ADMIN_TOKEN.to_string(),
            Identity {
                uid: ADMIN_UID.to_string(),
                email: Some("admin@studio.example".to_string()),
                display_name: Some("Studio Admin".to_string()),
            },
        ),
        (
            VISITOR_TOKEN.to_string(),
            Identity {
                uid: VISITOR_UID.to_string(),
                email: Some("visitor@example.com".to_string()),
                display_name: None,
            },
        ),
    ]);

    Arc::new(AppState {
        config,
        store: Arc::new(LocalStore::new(db)),
        identity: Arc::new(StaticIdentity::new(tokens)),
    })
}

/// Put [`ADMIN_UID`] on the allow-list.
pub async fn grant_admin(state: &AppState) {
    state
        .store
        .put_admin_grant(&AdminGrant::new(ADMIN_UID, "admin@studio.example"))
        .await
        .expect("Failed to grant admin");
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(resp).await).expect("Body is not JSON")
}
