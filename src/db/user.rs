use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use serde_dynamo::aws_sdk_dynamodb_1::from_item;
use serde_json::Number;

use crate::{error::ApiError, user::User};

use super::DynamoDb;

pub const USER_ID_ATTRIBUTE: &str = "UserId";

impl DynamoDb {
    pub async fn scan_users(&self) -> Result<Vec<User>, ApiError> {
        let mut users = Vec::new();
        let mut start_key = None;

        loop {
            let response = self
                .client
                .scan()
                .table_name(&self.users_table)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| ApiError::Internal(format!("DynamoDB scan users failed: {e}")))?;

            for item in response.items.unwrap_or_default() {
                let user = from_item::<User>(item)
                    .map_err(|e| ApiError::Internal(format!("Failed to deserialize user: {e}")))?;
                users.push(user);
            }

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(users)
    }

    pub async fn put_user_attributes(
        &self,
        user_id: &str,
        user_name: String,
        age: Number,
    ) -> Result<User, ApiError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.users_table)
            .key(USER_ID_ATTRIBUTE, AttributeValue::S(user_id.to_string()))
            .update_expression("SET UserName = :UserName, Age = :Age")
            .expression_attribute_values(":UserName", AttributeValue::S(user_name))
            .expression_attribute_values(":Age", AttributeValue::N(age.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to update user: {e}")))?;

        let attributes = result
            .attributes
            .ok_or_else(|| ApiError::Internal("update returned no attributes".to_string()))?;

        from_item::<User>(attributes)
            .map_err(|e| ApiError::Internal(format!("Failed to deserialize user: {e}")))
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.client
            .delete_item()
            .table_name(&self.users_table)
            .key(USER_ID_ATTRIBUTE, AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to delete user: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn item(attributes: &[(&str, AttributeValue)]) -> HashMap<String, AttributeValue> {
        attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_item_with_fractional_age() {
        let user = from_item::<User>(item(&[
            ("UserId", AttributeValue::S("4".to_string())),
            ("UserName", AttributeValue::S("Shiro".to_string())),
            ("Age", AttributeValue::N("30.5".to_string())),
        ]))
        .unwrap();

        assert_eq!(user.age.unwrap().as_f64(), Some(30.5));
    }

    #[test]
    fn test_item_without_age_or_name() {
        let user = from_item::<User>(item(&[("UserId", AttributeValue::S("9".to_string()))]))
            .unwrap();

        assert_eq!(user.user_id, "9");
        assert_eq!(user.user_name, None);
        assert_eq!(user.age, None);
    }

    #[test]
    fn test_item_keeps_extra_attributes() {
        let user = from_item::<User>(item(&[
            ("UserId", AttributeValue::S("2".to_string())),
            ("UserName", AttributeValue::S("Jiro".to_string())),
            ("Age", AttributeValue::N("22".to_string())),
            ("Team", AttributeValue::S("ops".to_string())),
        ]))
        .unwrap();

        assert_eq!(user.age, Some(22.into()));
        assert_eq!(user.extra["Team"], "ops");
    }

    #[test]
    fn test_fractional_age_is_written_as_given() {
        let age = Number::from_f64(30.5).unwrap();
        assert_eq!(AttributeValue::N(age.to_string()).as_n().unwrap(), "30.5");
    }
}
