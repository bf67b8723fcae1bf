//! # Session
//!
//! The logged-in operator, passed explicitly to commands that check who is
//! calling. Nothing global: the UI keeps the `Session` it got from `login`
//! and hands it back on each call.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use namaa_core::{User, UserRole};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    pub user_id: String,
    pub user_name: String,
    pub role: UserRole,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Session {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails with `FORBIDDEN` unless the operator is an administrator.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "{} is not allowed to do this",
                self.user_name
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;

    #[test]
    fn test_require_admin() {
        let mut user = User {
            id: "u1".into(),
            name: "Salma".into(),
            password: "1234".into(),
            role: UserRole::Cashier,
            created_at: Utc::now(),
        };

        let cashier = Session::for_user(&user);
        let err = cashier.require_admin().unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        user.role = UserRole::Admin;
        assert!(Session::for_user(&user).require_admin().is_ok());
    }
}
