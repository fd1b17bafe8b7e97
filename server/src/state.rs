//! Application state

use std::sync::Arc;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{AuthService, JwtService};
use crate::config::Config;
use crate::db::DbService;
use crate::orders::OrderEngine;
use crate::services::{EventSink, Notifier, StatsBroadcaster, StatsHub, notifier_from_env};

/// Shared application state
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// JWT service
    pub jwt: Arc<JwtService>,
    /// Transactional email sender
    pub notifier: Arc<dyn Notifier>,
    /// Admin live channel hub
    pub hub: StatsHub,
    /// Broadcast sink injected into mutating components
    pub events: Arc<dyn EventSink>,
    /// Auth service
    pub auth: AuthService,
    /// Order engine
    pub engine: OrderEngine,
}

impl AppState {
    /// Initialize all services
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db_service = DbService::new(&config.db_path).await?;
        let db = db_service.db;

        let jwt = Arc::new(JwtService::new(config.jwt.clone()));
        let notifier = notifier_from_env(config.ses_from_email.clone()).await;

        let hub = StatsHub::new();
        let events: Arc<dyn EventSink> =
            Arc::new(StatsBroadcaster::new(db.clone(), hub.clone()));

        let auth = AuthService::new(db.clone(), jwt.clone(), notifier.clone(), events.clone());
        let engine = OrderEngine::new(db.clone(), notifier.clone(), events.clone());

        Ok(Self {
            config: config.clone(),
            db,
            jwt,
            notifier,
            hub,
            events,
            auth,
            engine,
        })
    }

    /// Request an asynchronous stats recompute + broadcast
    pub fn emit_stats_update(&self) {
        self.events.stats_changed();
    }
}
