//! User model

use serde::{Deserialize, Serialize};
use shared::util;
use surrealdb::RecordId;

use super::serde_helpers;

/// User ID type
pub type UserId = RecordId;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

/// Postal address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// User record
///
/// The bootstrapped administrator always lives at the fixed record id
/// `user:admin`; that record id is the single-admin uniqueness
/// constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<UserId>,
    /// Normalized (lowercase) email, unique
    pub email: String,
    /// Argon2 hash; absent for OAuth-only accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub role: Role,
    #[serde(default)]
    pub is_oauth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<i64>,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Verify a password against the stored hash
    ///
    /// Always fails for OAuth-only accounts, whatever the input.
    pub fn verify_password(&self, password: &str) -> bool {
        if self.is_oauth {
            return false;
        }
        match &self.password_hash {
            Some(hash) => util::verify_password(password, hash),
            None => false,
        }
    }

    /// Record id in `user:<key>` form (empty for unsaved records)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

/// Sanitized user view returned by the API (password hash stripped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub role: Role,
    pub is_oauth: bool,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<i64>,
    pub created_at: i64,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            address: user.address,
            role: user.role,
            is_oauth: user.is_oauth,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Profile update payload (self-service)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Admin-only: toggle account active flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_user() -> User {
        User {
            id: None,
            email: "a@b.com".into(),
            password_hash: Some(shared::util::hash_password("secret1").unwrap()),
            first_name: "X".into(),
            last_name: "Y".into(),
            phone: None,
            address: None,
            role: Role::Client,
            is_oauth: false,
            google_id: None,
            facebook_id: None,
            is_active: true,
            last_login: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_verify_password() {
        let user = base_user();
        assert!(user.verify_password("secret1"));
        assert!(!user.verify_password("wrong"));
        assert!(!user.verify_password(""));
    }

    #[test]
    fn test_oauth_account_password_always_fails() {
        let mut user = base_user();
        user.is_oauth = true;

        // Even with a hash present, OAuth accounts cannot authenticate by password
        assert!(!user.verify_password("secret1"));
        assert!(!user.verify_password(""));
        assert!(!user.verify_password("anything"));

        user.password_hash = None;
        assert!(!user.verify_password("secret1"));
    }

    #[test]
    fn test_public_user_strips_hash() {
        let user = base_user();
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.com");
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
