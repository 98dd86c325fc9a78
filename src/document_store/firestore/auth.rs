use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::document_store::StoreError;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
enum Credentials {
    /// Service account JSON key file
    ServiceAccount(String),
    /// GCE/Cloud Run metadata server (application default credentials)
    MetadataServer,
    /// Local emulator; accepts the fixed `owner` token
    Emulator,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// OAuth2 access tokens for the Firestore REST API, cached until near expiry.
pub struct TokenSource {
    client: Client,
    credentials: Credentials,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(client: Client, credentials_file: Option<&str>, emulator: bool) -> Self {
        let credentials = match (emulator, credentials_file) {
            (true, _) => Credentials::Emulator,
            (false, Some(path)) => Credentials::ServiceAccount(path.to_string()),
            (false, None) => Credentials::MetadataServer,
        };

        Self {
            client,
            credentials,
            cached: RwLock::new(None),
        }
    }

    /// A bearer token valid for at least the expiry margin.
    pub async fn bearer(&self) -> Result<String, StoreError> {
        if matches!(self.credentials, Credentials::Emulator) {
            return Ok("owner".to_string());
        }

        {
            let cached = self.cached.read().await;
            if let Some(ref token) = *cached {
                if token.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(ref token) = *cached {
            if token.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) {
                return Ok(token.value.clone());
            }
        }

        let response = match self.credentials {
            Credentials::ServiceAccount(ref path) => self.token_from_service_account(path).await,
            Credentials::MetadataServer => self.token_from_metadata_server().await,
            Credentials::Emulator => unreachable!("emulator handled above"),
        }
        .map_err(|e| StoreError::Backend(format!("Failed to obtain access token: {e}")))?;

        tracing::debug!(expires_in = response.expires_in, "Refreshed Firestore access token");

        let value = response.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        });
        Ok(value)
    }

    async fn token_from_service_account(&self, path: &str) -> Result<TokenResponse, anyhow::Error> {
        let key_json = tokio::fs::read_to_string(path).await?;
        let key: ServiceAccountKey = serde_json::from_str(&key_json)?;

        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "iss": key.client_email,
            "scope": DATASTORE_SCOPE,
            "aud": key.token_uri,
            "iat": now,
            "exp": now + 3600,
        });

        // Build JWT (header.claims.signature)
        let header = base64_url_encode(&serde_json::to_vec(&serde_json::json!({
            "alg": "RS256",
            "typ": "JWT"
        }))?);
        let payload = base64_url_encode(&serde_json::to_vec(&claims)?);
        let unsigned = format!("{header}.{payload}");

        let signature = sign_rs256(unsigned.as_bytes(), &key.private_key)?;
        let jwt = format!("{unsigned}.{}", base64_url_encode(&signature));

        let resp = self
            .client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp)
    }

    async fn token_from_metadata_server(&self) -> Result<TokenResponse, anyhow::Error> {
        let resp = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp)
    }
}

fn base64_url_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

fn sign_rs256(data: &[u8], private_key_pem: &str) -> Result<Vec<u8>, anyhow::Error> {
    // Strip PEM armor; what remains is base64 PKCS#8 DER
    let der_b64: String = private_key_pem
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    let der = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, der_b64.trim())?;

    let key_pair = ring::signature::RsaKeyPair::from_pkcs8(&der)
        .map_err(|e| anyhow::anyhow!("Failed to parse RSA key: {e}"))?;

    let mut signature = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(
            &ring::signature::RSA_PKCS1_SHA256,
            &ring::rand::SystemRandom::new(),
            data,
            &mut signature,
        )
        .map_err(|e| anyhow::anyhow!("Failed to sign: {e}"))?;

    Ok(signature)
}
