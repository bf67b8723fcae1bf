//! # User Commands
//!
//! Login and operator management. Managing accounts needs an ADMIN session.

use serde::Deserialize;
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

use namaa_core::validation::validate_user;
use namaa_core::{now_millis, CoreError, User, UserRole};

use crate::error::{ApiError, ErrorCode};
use crate::state::{DbState, Session};

/// Form data for a new operator.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub role: UserRole,
}

/// Checks the 4-digit password of the selected user.
///
/// Unknown user and wrong password give the same error.
pub async fn login(db: &DbState, user_id: &str, password: &str) -> Result<Session, ApiError> {
    debug!(user_id, "login command");
    let user = db.open().await?.users().get_by_id(user_id).await?;

    match user {
        Some(user) if user.password == password => {
            info!(user_id, role = ?user.role, "Operator logged in");
            Ok(Session::for_user(&user))
        }
        _ => {
            warn!(user_id, "Login rejected");
            Err(ApiError::new(
                ErrorCode::InvalidCredentials,
                "Incorrect user or password",
            ))
        }
    }
}

/// Operators for the login screen.
pub async fn get_users(db: &DbState) -> Result<Vec<User>, ApiError> {
    Ok(db.open().await?.users().get_all().await?)
}

pub async fn add_user(db: &DbState, session: &Session, input: NewUser) -> Result<User, ApiError> {
    session.require_admin()?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        password: input.password,
        role: input.role,
        created_at: now_millis(),
    };
    validate_user(&user)?;

    db.open().await?.users().put(&user).await?;
    info!(id = %user.id, role = ?user.role, by = %session.user_id, "User added");
    Ok(user)
}

/// Removes an operator. The logged-in operator cannot remove themselves.
pub async fn delete_user(db: &DbState, session: &Session, user_id: &str) -> Result<(), ApiError> {
    session.require_admin()?;
    if user_id == session.user_id {
        return Err(CoreError::SelfDeletion.into());
    }

    db.open().await?.users().delete(user_id).await?;
    info!(id = user_id, by = %session.user_id, "User deleted");
    Ok(())
}
