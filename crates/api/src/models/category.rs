//! Catalogue category domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use blended_core::CategoryId;

use super::{optional_text, required_text};

/// A catalogue category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Image URL.
    pub img: Option<String>,
    /// Image identifier at the hosting provider.
    pub img_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub img_id: Option<String>,
}

impl NewCategory {
    /// Trim fields and require a name.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when the name is blank.
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            name: required_text("name", &self.name, 1)?,
            description: optional_text(self.description),
            img: optional_text(self.img),
            img_id: optional_text(self.img_id),
        })
    }
}

/// Partial category update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub img: Option<String>,
    pub img_id: Option<String>,
}

impl CategoryUpdate {
    /// Trim fields and require at least one.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for an empty update or a blank name.
    pub fn validated(self) -> Result<Self, String> {
        if self.name.is_none()
            && self.description.is_none()
            && self.img.is_none()
            && self.img_id.is_none()
        {
            return Err("at least one field must be provided".to_owned());
        }
        Ok(Self {
            name: self
                .name
                .map(|name| required_text("name", &name, 1))
                .transpose()?,
            description: self.description.map(|s| s.trim().to_owned()),
            img: self.img.map(|s| s.trim().to_owned()),
            img_id: self.img_id.map(|s| s.trim().to_owned()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category_requires_name() {
        let input: NewCategory = serde_json::from_str(r#"{"name":"  ","imgId":"x"}"#).unwrap();
        assert_eq!(input.validated().unwrap_err(), "'name' is required");
    }

    #[test]
    fn test_new_category_camel_case_fields() {
        let input: NewCategory =
            serde_json::from_str(r#"{"name":" Tea ","img":"https://cdn/x.png","imgId":"x"}"#)
                .unwrap();
        let input = input.validated().unwrap();
        assert_eq!(input.name, "Tea");
        assert_eq!(input.img_id.as_deref(), Some("x"));
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_category_update_requires_a_field() {
        assert!(CategoryUpdate::default().validated().is_err());
        let update = CategoryUpdate {
            description: Some(" Loose leaf ".to_owned()),
            ..CategoryUpdate::default()
        };
        assert_eq!(
            update.validated().unwrap().description.as_deref(),
            Some("Loose leaf")
        );
    }
}
