//! Settings repository
//!
//! The singleton document lives at the fixed record id `settings:store`.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::StoreSettings;
use shared::util;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const SETTINGS_TABLE: &str = "settings";
const SETTINGS_KEY: &str = "store";

#[derive(Clone)]
pub struct SettingsRepository {
    base: BaseRepository,
}

impl SettingsRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Read the settings document, creating the default one if missing
    pub async fn get_or_create(&self) -> RepoResult<StoreSettings> {
        let existing: Option<StoreSettings> = self
            .base
            .db()
            .select((SETTINGS_TABLE, SETTINGS_KEY))
            .await?;
        if let Some(settings) = existing {
            return Ok(settings);
        }

        let created: Result<Option<StoreSettings>, surrealdb::Error> = self
            .base
            .db()
            .create((SETTINGS_TABLE, SETTINGS_KEY))
            .content(StoreSettings::default_document(util::now_millis()))
            .await;

        match created {
            Ok(Some(settings)) => Ok(settings),
            // Another request created it first; re-read the winner
            Err(e) if RepoError::from(e).is_duplicate() => {
                let settings: Option<StoreSettings> = self
                    .base
                    .db()
                    .select((SETTINGS_TABLE, SETTINGS_KEY))
                    .await?;
                settings.ok_or_else(|| {
                    RepoError::Database("Settings vanished after create race".into())
                })
            }
            Ok(None) => Err(RepoError::Database("Failed to create settings".into())),
            Err(e) => Err(e.into()),
        }
    }
}
