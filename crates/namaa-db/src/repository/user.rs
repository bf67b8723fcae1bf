//! # User Repository

use namaa_core::{Collection, User};

use crate::error::DbResult;
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct UserRepository {
    store: RecordStore,
}

impl UserRepository {
    pub fn new(store: RecordStore) -> Self {
        UserRepository { store }
    }

    pub async fn get_all(&self) -> DbResult<Vec<User>> {
        self.store.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        self.store.get(id).await
    }

    pub async fn put(&self, user: &User) -> DbResult<()> {
        self.store.put(user).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(Collection::Users, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use namaa_core::UserRole;

    #[tokio::test]
    async fn test_put_get_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        let user = User {
            id: "u1".to_string(),
            name: "Salma".to_string(),
            password: "1234".to_string(),
            role: UserRole::Cashier,
            created_at: Utc::now(),
        };

        users.put(&user).await.unwrap();
        assert_eq!(users.get_by_id("u1").await.unwrap(), Some(user));

        users.delete("u1").await.unwrap();
        assert!(users.get_all().await.unwrap().is_empty());
    }
}
