//! Authentication
//!
//! JWT issuance/validation, the `x-auth-token` middleware, the auth
//! service (register / login / bootstrap / OAuth linking) and external
//! identity types.

pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod service;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{AUTH_HEADER, require_admin, require_auth};
pub use oauth::{OAuthProfile, OAuthProvider};
pub use service::{AuthResponse, AuthService, RegisterRequest};
