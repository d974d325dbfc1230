use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{db::Database, error::ApiError};

/// A row of the `Users` table. Field names match the stored attribute names.
///
/// Items written outside this API may lack `UserName` or `Age`, or carry
/// attributes of their own; those are kept in `extra` and listed as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(user_id: impl Into<String>, user_name: String, age: Number) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: Some(user_name),
            age: Some(age),
            extra: Map::new(),
        }
    }
}

/// Request body for create and update. `Age` is any JSON number and is
/// stored as given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserPayload {
    pub user_name: String,
    pub age: Number,
}

/// Computes the id for the next user: one more than the largest stored id,
/// or `1` for an empty table.
///
/// The result is only as fresh as the scan it was computed from; two callers
/// working from the same snapshot get the same id.
pub fn next_user_id(users: &[User]) -> Result<u64, ApiError> {
    let mut max = 0;
    for user in users {
        let id = user.user_id.parse::<u64>().map_err(|_| {
            ApiError::Internal(format!("stored UserId is not numeric: {}", user.user_id))
        })?;
        max = max.max(id);
    }

    max.checked_add(1)
        .ok_or_else(|| ApiError::Internal("UserId space exhausted".to_string()))
}

pub async fn create_user(db: &dyn Database, payload: UserPayload) -> Result<User, ApiError> {
    let users = db.scan_users().await?;
    let user_id = next_user_id(&users)?.to_string();

    db.put_user_attributes(&user_id, payload.user_name, payload.age)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> User {
        User::new(id, "someone".to_string(), 20.into())
    }

    #[test]
    fn test_next_user_id_empty_table() {
        assert_eq!(next_user_id(&[]).unwrap(), 1);
    }

    #[test]
    fn test_next_user_id_uses_numeric_max() {
        // "10" sorts before "9" as a string.
        let users = vec![user("9"), user("10"), user("3")];
        assert_eq!(next_user_id(&users).unwrap(), 11);
    }

    #[test]
    fn test_next_user_id_rejects_non_numeric() {
        let users = vec![user("1"), user("abc")];
        let err = next_user_id(&users).unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_user_serializes_with_table_attribute_names() {
        let json = serde_json::to_value(user("7")).unwrap();
        assert_eq!(json["UserId"], "7");
        assert_eq!(json["UserName"], "someone");
        assert_eq!(json["Age"], 20);
    }

    #[test]
    fn test_partial_record_keeps_what_is_stored() {
        let stored = serde_json::json!({"UserId": "3", "Nickname": "sab"});
        let user: User = serde_json::from_value(stored.clone()).unwrap();

        assert_eq!(user.user_name, None);
        assert_eq!(user.age, None);
        assert_eq!(user.extra["Nickname"], "sab");
        assert_eq!(serde_json::to_value(&user).unwrap(), stored);
    }

    #[tokio::test]
    async fn test_create_user_on_empty_table_gets_id_one() {
        let db = crate::db::memory();
        let created = create_user(
            db.as_ref(),
            UserPayload {
                user_name: "Taro".to_string(),
                age: Number::from_f64(30.5).unwrap(),
            },
        )
        .await
        .unwrap();

        assert_eq!(created.user_id, "1");
        assert_eq!(created.user_name.as_deref(), Some("Taro"));
        assert_eq!(created.age.unwrap().as_f64(), Some(30.5));
    }

    #[tokio::test]
    async fn test_create_user_after_max_id() {
        let db = crate::db::memory();
        db.put_user_attributes("41", "A".to_string(), 1.into()).await.unwrap();
        db.put_user_attributes("7", "B".to_string(), 2.into()).await.unwrap();

        let created = create_user(
            db.as_ref(),
            UserPayload {
                user_name: "C".to_string(),
                age: 3.into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(created.user_id, "42");
    }

    #[tokio::test]
    async fn test_creates_from_same_snapshot_collide() {
        let db = crate::db::memory();
        db.put_user_attributes("1", "A".to_string(), 1.into()).await.unwrap();

        // Both creates scan before either writes.
        let first_snapshot = db.scan_users().await.unwrap();
        let second_snapshot = db.scan_users().await.unwrap();
        let first_id = next_user_id(&first_snapshot).unwrap().to_string();
        let second_id = next_user_id(&second_snapshot).unwrap().to_string();
        assert_eq!(first_id, second_id);

        db.put_user_attributes(&first_id, "first".to_string(), 10.into())
            .await
            .unwrap();
        db.put_user_attributes(&second_id, "second".to_string(), 20.into())
            .await
            .unwrap();

        let users = db.scan_users().await.unwrap();
        assert_eq!(users.len(), 2);
        let stored = users.iter().find(|u| u.user_id == "2").unwrap();
        assert_eq!(stored.user_name.as_deref(), Some("second"));
    }
}
