//! Boutique backend server
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── config.rs      # configuration (env overrides)
//! ├── state.rs       # AppState: db, jwt, notifier, live hub
//! ├── auth/          # JWT, x-auth-token middleware, auth service
//! ├── db/            # embedded document store, models, repositories
//! ├── orders/        # order engine (creation, custom flow, status)
//! ├── services/      # notifier (email), live-stats broadcaster
//! ├── api/           # HTTP routes and handlers, admin WebSocket
//! └── utils/         # validation helpers
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod orders;
pub mod services;
pub mod state;
pub mod utils;

// Re-export common types
pub use auth::{AuthService, CurrentUser, JwtService};
pub use config::Config;
pub use orders::OrderEngine;
pub use services::{EventSink, LiveEvent, StatsHub, StatsSnapshot};
pub use state::AppState;
