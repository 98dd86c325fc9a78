//! Identity verification for signed-in visitors.
//!
//! The OAuth sign-in flow runs in the browser against the hosted identity
//! provider; this side only turns the resulting ID token into an [`Identity`].

mod firebase;
mod static_tokens;

pub use firebase::FirebaseIdentity;
pub use static_tokens::StaticIdentity;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// A verified signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The identity provider's stable user id
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}
