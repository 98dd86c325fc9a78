use std::collections::HashMap;

use async_trait::async_trait;

use super::{Identity, IdentityError, IdentityProvider};

/// Fixed token table for local development and tests.
pub struct StaticIdentity {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentity {
    pub fn new(tokens: HashMap<String, Identity>) -> Self {
        Self { tokens }
    }

    /// Parse `token=uid:email,token=uid:email`. The email part is optional.
    pub fn parse(entries: &str) -> Result<Self, String> {
        let mut tokens = HashMap::new();

        for entry in entries.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (token, identity) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected token=uid[:email], got '{entry}'"))?;
            let (uid, email) = match identity.split_once(':') {
                Some((uid, email)) => (uid, Some(email.to_string())),
                None => (identity, None),
            };

            if token.trim().is_empty() || uid.trim().is_empty() {
                return Err(format!("token and uid must not be empty in '{entry}'"));
            }

            tokens.insert(
                token.trim().to_string(),
                Identity {
                    uid: uid.trim().to_string(),
                    email,
                    display_name: None,
                },
            );
        }

        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
