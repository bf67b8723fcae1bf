//! # Settings Commands
//!
//! First-run setup and the store identity singleton.

use tracing::{debug, info};

use namaa_core::validation::{validate_password, validate_settings};
use namaa_core::{now_millis, StoreSettings, User, UserRole, SETUP_ADMIN_ID};

use crate::error::{ApiError, ErrorCode};
use crate::state::{DbState, Session};

/// Display name of the administrator created at setup.
pub const SETUP_ADMIN_NAME: &str = "مسؤول النظام";

/// Writes the store settings and the first administrator, then logs that
/// administrator in.
///
/// Fails with `ALREADY_SET_UP` if settings exist; nothing is written then.
pub async fn complete_setup(
    db: &DbState,
    mut settings: StoreSettings,
    admin_password: &str,
) -> Result<Session, ApiError> {
    debug!(store_name = %settings.store_name, "complete_setup command");

    validate_settings(&settings)?;
    validate_password(admin_password)?;
    settings.is_setup_complete = true;

    let admin = User {
        id: SETUP_ADMIN_ID.to_string(),
        name: SETUP_ADMIN_NAME.to_string(),
        password: admin_password.to_string(),
        role: UserRole::Admin,
        created_at: now_millis(),
    };

    db.open()
        .await?
        .settings()
        .create_with_admin(&settings, &admin)
        .await
        .map_err(|e| {
            if e.is_conflict() {
                ApiError::new(ErrorCode::AlreadySetUp, "The store is already set up")
            } else {
                e.into()
            }
        })?;

    Ok(Session::for_user(&admin))
}

/// `None` until setup has run.
pub async fn get_settings(db: &DbState) -> Result<Option<StoreSettings>, ApiError> {
    Ok(db.open().await?.settings().get().await?)
}

/// Replaces the settings singleton. The identifier is always the fixed one.
pub async fn upsert_settings(db: &DbState, settings: StoreSettings) -> Result<StoreSettings, ApiError> {
    validate_settings(&settings)?;
    let saved = db.open().await?.settings().upsert(&settings).await?;
    info!(store_name = %saved.store_name, "Settings saved");
    Ok(saved)
}
