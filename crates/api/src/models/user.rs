//! User and address models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use velocart_core::{AddressId, Email, Role, UserId};

/// A platform account: customer, admin, or rider.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    /// Stable account identifier from the identity collaborator.
    pub google_uid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may use privileged routes.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A saved shipping address.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_deserializing)]
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Identity fields joined into order and rider listings (`user`/`rider`
/// sub-objects).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role) -> User {
        User {
            id: UserId::new(1),
            name: "Test User".to_owned(),
            email: Email::parse("test@example.com").expect("valid email"),
            role,
            phone: None,
            avatar_url: None,
            google_uid: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(sample_user(Role::Admin).is_admin());
        assert!(!sample_user(Role::Customer).is_admin());
        assert!(!sample_user(Role::Rider).is_admin());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let json = serde_json::to_value(sample_user(Role::Customer)).expect("serialize");
        assert!(json.get("avatarUrl").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["role"], "customer");
    }
}
