use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{Identity, IdentityError, IdentityProvider};

const IDENTITY_TOOLKIT_API: &str = "https://identitytoolkit.googleapis.com/v1";

/// Verifies Firebase Authentication ID tokens through the Identity Toolkit
/// `accounts:lookup` endpoint, keyed by the project's web API key.
pub struct FirebaseIdentity {
    api_key: String,
    client: Client,
    lookup_url: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    disabled: bool,
}

impl FirebaseIdentity {
    pub fn new(api_key: &str, emulator_host: Option<&str>) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;

        let base = match emulator_host {
            Some(host) => format!("http://{host}/identitytoolkit.googleapis.com/v1"),
            None => IDENTITY_TOOLKIT_API.to_string(),
        };

        Ok(Self {
            api_key: api_key.to_string(),
            client,
            lookup_url: format!("{base}/accounts:lookup"),
        })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let resp = self
            .client
            .post(&self.lookup_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        // The API answers 400 INVALID_ID_TOKEN / TOKEN_EXPIRED / USER_NOT_FOUND
        if resp.status() == StatusCode::BAD_REQUEST {
            return Err(IdentityError::InvalidToken);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(IdentityError::Provider(format!(
                "accounts:lookup failed ({status}): {body}"
            )));
        }

        let lookup: LookupResponse = resp
            .json()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        let user = lookup
            .users
            .into_iter()
            .next()
            .filter(|u| !u.disabled)
            .ok_or(IdentityError::InvalidToken)?;

        Ok(Identity {
            uid: user.local_id,
            email: user.email,
            display_name: user.display_name,
        })
    }
}
