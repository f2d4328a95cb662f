//! Authentication Models
//! Mission: Define user and session data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default admin credentials seeded on first start.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// User account. There is exactly one role in practice ("admin"); protected
/// routes gate on "is authenticated", not on a role hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: String,
    pub active: bool,
    pub created_at: String,
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub username: String,
    pub role: String,
    pub exp: usize, // expiration timestamp
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }
}

/// Password rotation request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: "admin".to_string(),
            active: true,
            created_at: Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$12$secret"));
    }

    #[test]
    fn test_change_password_request_uses_camel_case() {
        let req: ChangePasswordRequest = serde_json::from_str(
            r#"{"currentPassword":"old-pass","newPassword":"new-pass"}"#,
        )
        .unwrap();
        assert_eq!(req.current_password, "old-pass");
        assert_eq!(req.new_password, "new-pass");
    }

    #[test]
    fn test_user_response_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
            role: "admin".to_string(),
            active: true,
            created_at: Utc::now().to_rfc3339(),
        };

        let response = UserResponse::from_user(&user);
        assert_eq!(response.id, user.id.to_string());
        assert_eq!(response.username, "admin");
        assert_eq!(response.role, "admin");
    }
}
