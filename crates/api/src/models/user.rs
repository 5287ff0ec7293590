//! User domain types.
//!
//! The password hash is deliberately absent from [`User`]; it is only ever
//! read by `UserRepository::get_password_hash` during login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blended_core::{Email, Phone, UserId, UserRole};

use super::{optional_text, required_text};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A shop account (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub lastname: String,
    pub email: Email,
    pub phone: Phone,
    pub city: String,
    pub avatar: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub phone: Phone,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Trim text fields and check required ones.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when `name` is blank.
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            name: required_text("name", &self.name, 1)?,
            lastname: optional_text(self.lastname),
            city: optional_text(self.city),
            ..self
        })
    }
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub city: Option<String>,
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    /// Trim fields and require at least one.
    ///
    /// `lastname`, `city` and `avatar` may be cleared with an empty string;
    /// `name` may not.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for an empty update or a blank name.
    pub fn validated(self) -> Result<Self, String> {
        if self.name.is_none() && self.lastname.is_none() && self.city.is_none() && self.avatar.is_none()
        {
            return Err("at least one field must be provided".to_owned());
        }
        let name = self
            .name
            .map(|name| required_text("name", &name, 1))
            .transpose()?;
        let trim = |v: Option<String>| v.map(|s| s.trim().to_owned());
        Ok(Self {
            name,
            lastname: trim(self.lastname),
            city: trim(self.city),
            avatar: trim(self.avatar),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_deserialize_and_validate() {
        let user: NewUser = serde_json::from_str(
            r#"{"name":" Olena ","email":"Olena@Example.com","password":"correct-horse","phone":"+380501234567","city":"  "}"#,
        )
        .unwrap();
        let user = user.validated().unwrap();
        assert_eq!(user.name, "Olena");
        assert_eq!(user.email.as_str(), "olena@example.com");
        assert_eq!(user.city, None);
        assert!(!format!("{user:?}").contains("correct-horse"));
    }

    #[test]
    fn test_new_user_rejects_bad_phone() {
        let result = serde_json::from_str::<NewUser>(
            r#"{"name":"O","email":"o@example.com","password":"12345678","phone":"12345"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_update_requires_a_field() {
        assert!(ProfileUpdate::default().validated().is_err());

        let update = ProfileUpdate {
            name: Some("   ".to_owned()),
            ..ProfileUpdate::default()
        };
        assert!(update.validated().is_err());

        let update = ProfileUpdate {
            city: Some(" Lviv ".to_owned()),
            ..ProfileUpdate::default()
        };
        assert_eq!(update.validated().unwrap().city.as_deref(), Some("Lviv"));
    }

    #[test]
    fn test_user_serialization_has_no_password() {
        let user = User {
            id: UserId::new(1),
            name: "Taras".to_owned(),
            lastname: String::new(),
            email: Email::parse("taras@example.com").unwrap(),
            phone: Phone::parse("+380671234567").unwrap(),
            city: String::new(),
            avatar: String::new(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "user");
        assert!(json.get("createdAt").is_some());
    }
}
