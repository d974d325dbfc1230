use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Number;

use crate::{error::ApiError, user::User};

/// In-memory database backend for local development and testing.
/// Uses `Arc<RwLock<...>>` so it can be `Clone`d across axum handlers.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn scan_users(&self) -> Result<Vec<User>, ApiError> {
        let users = self
            .users
            .read()
            .map_err(|e| ApiError::Internal(format!("Lock error: {e}")))?;
        Ok(users.values().cloned().collect())
    }

    pub async fn put_user_attributes(
        &self,
        user_id: &str,
        user_name: String,
        age: Number,
    ) -> Result<User, ApiError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| ApiError::Internal(format!("Lock error: {e}")))?;

        // Attributes other than UserName and Age survive the update.
        let user = users
            .entry(user_id.to_string())
            .or_insert_with(|| User::new(user_id, user_name.clone(), age.clone()));
        user.user_name = Some(user_name);
        user.age = Some(age);

        Ok(user.clone())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| ApiError::Internal(format!("Lock error: {e}")))?;
        users.remove(user_id);
        Ok(())
    }

    /// Stores `user` exactly as given, the way an item written by another
    /// tool would sit in the table.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.user_id.clone(), user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_creates_missing_user() {
        let db = MemoryDb::new();
        let user = db
            .put_user_attributes("5", "Hanako".to_string(), 28.into())
            .await
            .unwrap();

        assert_eq!(user.user_id, "5");
        assert_eq!(db.scan_users().await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_fields() {
        let db = MemoryDb::new();
        db.put_user_attributes("1", "Before".to_string(), 10.into())
            .await
            .unwrap();
        let user = db
            .put_user_attributes("1", "After".to_string(), 11.into())
            .await
            .unwrap();

        assert_eq!(user.user_name.as_deref(), Some("After"));
        assert_eq!(user.age, Some(11.into()));
        assert_eq!(db.scan_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_ok() {
        let db = MemoryDb::new();
        db.delete_user("404").await.unwrap();

        db.put_user_attributes("1", "A".to_string(), 1.into()).await.unwrap();
        db.delete_user("1").await.unwrap();
        assert!(db.scan_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_keeps_unrelated_attributes() {
        let db = MemoryDb::new();
        let mut stored = User::new("1", "Old".to_string(), 40.into());
        stored
            .extra
            .insert("Email".to_string(), serde_json::json!("old@example.com"));
        db.insert_raw(stored);

        let user = db
            .put_user_attributes("1", "New".to_string(), Number::from_f64(40.5).unwrap())
            .await
            .unwrap();

        assert_eq!(user.user_name.as_deref(), Some("New"));
        assert_eq!(user.age.unwrap().as_f64(), Some(40.5));
        assert_eq!(user.extra["Email"], "old@example.com");
    }
}
