//! External identity providers
//!
//! The provider token exchange happens upstream; this module only
//! models the verified profile handed to the account-linking flow.

use serde::{Deserialize, Serialize};
use shared::AppError;

/// Supported external identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            other => Err(AppError::validation(format!(
                "Unknown OAuth provider: {other}"
            ))),
        }
    }
}

/// Verified profile returned by a provider
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthProfile {
    pub provider_id: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}
