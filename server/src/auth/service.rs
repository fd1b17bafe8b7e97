//! Auth service
//!
//! Registration, login (client and admin entry points), single-admin
//! bootstrap, and OAuth account linking. Handlers stay thin; every
//! check that must happen before a mutation lives here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{AppError, AppResult, ErrorCode, util};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtService, OAuthProfile, OAuthProvider};
use crate::db::models::{Address, PublicUser, Role, User};
use crate::db::repository::{RepoError, UserRepository};
use crate::services::{EventSink, Notifier};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Token + sanitized user returned by register/login/oauth
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtService>,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,
}

impl AuthService {
    pub fn new(
        db: Surreal<Db>,
        jwt: Arc<JwtService>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            users: UserRepository::new(db),
            jwt,
            notifier,
            events,
        }
    }

    /// Register a new client account
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        validate_email(&req.email)?;
        validate_password(&req.password)?;
        validate_required_text(&req.first_name, "first_name", MAX_NAME_LEN)?;
        validate_required_text(&req.last_name, "last_name", MAX_NAME_LEN)?;
        validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

        let email = util::normalize_email(&req.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::new(ErrorCode::EmailExists));
        }

        let hash = util::hash_password(&req.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = User {
            id: None,
            email,
            password_hash: Some(hash),
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            address: req.address,
            role: Role::Client,
            is_oauth: false,
            google_id: None,
            facebook_id: None,
            is_active: true,
            last_login: None,
            created_at: util::now_millis(),
        };

        // The unique email index closes the check-then-insert race
        let created = match self.users.create(user).await {
            Ok(user) => user,
            Err(RepoError::Duplicate(_)) => return Err(AppError::new(ErrorCode::EmailExists)),
            Err(e) => return Err(e.into()),
        };

        let token = self.issue_token(&created)?;
        tracing::info!(user_id = %created.id_string(), email = %created.email, "User registered");

        self.events.stats_changed();

        Ok(AuthResponse {
            token,
            user: created.into(),
        })
    }

    /// Client login - rejects admin accounts (separate entry point)
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let user = self.authenticate(email, password, Role::Client).await?;
        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Admin login - rejects client accounts, regardless of password
    pub async fn admin_login(&self, email: &str, password: &str) -> AppResult<AuthResponse> {
        let user = self.authenticate(email, password, Role::Admin).await?;
        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Shared credential check for both login surfaces
    ///
    /// The role mismatch is reported as 403 *before* the password is
    /// checked; every other failure collapses into a generic
    /// invalid-credentials to avoid email enumeration.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        expected_role: Role,
    ) -> AppResult<User> {
        let email = util::normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(AppError::invalid_credentials)?;

        if user.role != expected_role {
            tracing::warn!(email = %email, "Login rejected: wrong entry point for role");
            return Err(match expected_role {
                Role::Admin => AppError::new(ErrorCode::AdminRequired),
                Role::Client => AppError::new(ErrorCode::AdminLoginRequired),
            });
        }

        if !user.is_active {
            tracing::warn!(email = %email, "Login rejected: account disabled");
            return Err(AppError::invalid_credentials());
        }

        if !user.verify_password(password) {
            tracing::warn!(email = %email, "Login rejected: invalid credentials");
            return Err(AppError::invalid_credentials());
        }

        self.users
            .touch_last_login(&user.id_string(), util::now_millis())
            .await?;

        tracing::info!(user_id = %user.id_string(), role = user.role.as_str(), "User logged in");
        Ok(user)
    }

    /// Bootstrap the single administrator account
    ///
    /// There is no application-level pre-check: the fixed `user:admin`
    /// record id is the uniqueness constraint, so concurrent bootstrap
    /// calls succeed exactly once.
    pub async fn admin_bootstrap(&self, req: RegisterRequest) -> AppResult<PublicUser> {
        validate_email(&req.email)?;
        validate_password(&req.password)?;
        validate_required_text(&req.first_name, "first_name", MAX_NAME_LEN)?;
        validate_required_text(&req.last_name, "last_name", MAX_NAME_LEN)?;

        let hash = util::hash_password(&req.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        let user = User {
            id: None,
            email: util::normalize_email(&req.email),
            password_hash: Some(hash),
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            address: req.address,
            role: Role::Admin,
            is_oauth: false,
            google_id: None,
            facebook_id: None,
            is_active: true,
            last_login: None,
            created_at: util::now_millis(),
        };

        let created = match self.users.create_admin(user).await {
            Ok(user) => user,
            Err(RepoError::Duplicate(msg)) if msg.contains("user_email") => {
                return Err(AppError::new(ErrorCode::EmailExists));
            }
            Err(RepoError::Duplicate(_)) => return Err(AppError::new(ErrorCode::AdminExists)),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(email = %created.email, "Administrator account bootstrapped");
        Ok(created.into())
    }

    /// Role lookup by email (public login-page helper)
    pub async fn check_role(&self, email: &str) -> AppResult<Role> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
        Ok(user.role)
    }

    /// Fresh sanitized view of the authenticated user
    pub async fn me(&self, user_id: &str) -> AppResult<PublicUser> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
        Ok(user.into())
    }

    /// Link a verified external identity to an account
    ///
    /// Finds by email or provider id; backfills a missing provider id on
    /// an existing account (never touching its password), or creates an
    /// OAuth-flagged passwordless client and sends a best-effort welcome
    /// message.
    pub async fn oauth_link(
        &self,
        provider: OAuthProvider,
        profile: OAuthProfile,
    ) -> AppResult<AuthResponse> {
        validate_email(&profile.email)?;
        validate_required_text(&profile.provider_id, "provider_id", MAX_SHORT_TEXT_LEN)?;

        let email = util::normalize_email(&profile.email);

        let existing = match self.users.find_by_email(&email).await? {
            Some(user) => Some(user),
            None => {
                self.users
                    .find_by_provider(provider, &profile.provider_id)
                    .await?
            }
        };

        let user = match existing {
            Some(user) => {
                let has_provider_id = match provider {
                    OAuthProvider::Google => user.google_id.is_some(),
                    OAuthProvider::Facebook => user.facebook_id.is_some(),
                };
                if !has_provider_id {
                    self.users
                        .set_provider_id(&user.id_string(), provider, &profile.provider_id)
                        .await?;
                }
                user
            }
            None => {
                let mut user = User {
                    id: None,
                    email,
                    password_hash: None,
                    first_name: profile.given_name.clone(),
                    last_name: profile.family_name.clone(),
                    phone: None,
                    address: None,
                    role: Role::Client,
                    is_oauth: true,
                    google_id: None,
                    facebook_id: None,
                    is_active: true,
                    last_login: None,
                    created_at: util::now_millis(),
                };
                match provider {
                    OAuthProvider::Google => user.google_id = Some(profile.provider_id.clone()),
                    OAuthProvider::Facebook => {
                        user.facebook_id = Some(profile.provider_id.clone())
                    }
                }

                let created = self.users.create(user).await?;
                tracing::info!(
                    user_id = %created.id_string(),
                    provider = provider.as_str(),
                    "OAuth user created"
                );

                // Welcome message is advisory; its failure never aborts the login
                let notifier = self.notifier.clone();
                let public: PublicUser = created.clone().into();
                tokio::spawn(async move {
                    if let Err(e) = notifier.send_welcome(&public).await {
                        tracing::warn!(error = %e, "Welcome message failed");
                    }
                });

                self.events.stats_changed();
                created
            }
        };

        self.users
            .touch_last_login(&user.id_string(), util::now_millis())
            .await?;

        let token = self.issue_token(&user)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Change the caller's password (current-password check first)
    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        // OAuth-only accounts have no password to verify
        if !user.verify_password(current) {
            return Err(AppError::invalid_credentials());
        }

        validate_password(new_password)?;

        let hash = util::hash_password(new_password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        self.users.set_password_hash(user_id, hash).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        self.jwt
            .generate_token(&user.id_string(), &user.email, user.role)
            .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))
    }
}
