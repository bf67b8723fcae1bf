//! # Settings Repository
//!
//! The settings collection holds at most one record, always under
//! [`SETTINGS_ID`]. No record means the shop has not been set up.

use tracing::info;

use namaa_core::{Collection, StoreSettings, User, SETTINGS_ID};

use crate::error::{DbError, DbResult};
use crate::store::{put_if_version_with, put_with, RecordStore};

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    store: RecordStore,
}

impl SettingsRepository {
    pub fn new(store: RecordStore) -> Self {
        SettingsRepository { store }
    }

    pub async fn get(&self) -> DbResult<Option<StoreSettings>> {
        self.store.get(SETTINGS_ID).await
    }

    /// Writes the singleton, forcing the fixed identifier.
    pub async fn upsert(&self, settings: &StoreSettings) -> DbResult<StoreSettings> {
        let mut settings = settings.clone();
        settings.id = SETTINGS_ID.to_string();
        self.store.put(&settings).await?;
        Ok(settings)
    }

    /// First-run setup: creates the singleton and the first administrator
    /// in one transaction.
    ///
    /// Fails with `VersionConflict` if settings already exist; nothing is
    /// written in that case.
    pub async fn create_with_admin(&self, settings: &StoreSettings, admin: &User) -> DbResult<()> {
        let mut settings = settings.clone();
        settings.id = SETTINGS_ID.to_string();

        let mut tx = self
            .store
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::write(Collection::Settings, e))?;

        put_if_version_with(&mut *tx, &settings, 0).await?;
        put_with(&mut *tx, admin).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::write(Collection::Settings, e))?;

        info!(store_name = %settings.store_name, admin = %admin.id, "Store set up");
        Ok(())
    }
}
