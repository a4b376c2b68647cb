use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserRole;

/// Login form body. Field names match the templates' input names.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_pass: String,
}

/// Registration form body.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_pass: String,
}

/// Password-change form body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Profile fields shown on the account-data page.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub role: UserRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_form_fields_default_to_empty() {
        let form: LoginForm = serde_json::from_str("{}").unwrap();
        assert!(form.user_name.is_empty());
        assert!(form.user_pass.is_empty());
    }

    #[test]
    fn profile_serializes_expected_fields() {
        let profile = ProfileResponse {
            user_id: Uuid::new_v4(),
            user_name: "alice".into(),
            role: UserRole::User,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["user_name"], "alice");
        assert_eq!(json["role"], "user");
        assert!(json.get("created_at").is_some());
        assert!(json.get("password_hash").is_none());
    }
}
