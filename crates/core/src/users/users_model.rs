//! User domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Domain model representing a registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Emails are matched case-insensitively, so they are stored lowercased.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Partial update of the caller's public profile. Omitted fields are left as is;
/// a blank `bio` or `avatar` clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.avatar.is_none()
    }

    /// Trims every field and rejects an empty patch or a blank name.
    pub fn normalized(self) -> Result<Self> {
        if self.is_empty() {
            return Err(Error::invalid_input("No fields to update"));
        }
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(Error::invalid_input("Name cannot be empty"));
            }
            other => other.map(|n| n.trim().to_string()),
        };
        Ok(Self {
            name,
            bio: self.bio.map(|b| b.trim().to_string()),
            avatar: self.avatar.map(|a| a.trim().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_update_trims_and_validates() {
        let update = ProfileUpdate {
            name: Some("  Budi Santoso ".to_string()),
            bio: Some(" Suka menabung ".to_string()),
            avatar: None,
        }
        .normalized()
        .unwrap();
        assert_eq!(update.name.as_deref(), Some("Budi Santoso"));
        assert_eq!(update.bio.as_deref(), Some("Suka menabung"));
        assert!(update.avatar.is_none());

        assert!(ProfileUpdate::default().normalized().is_err());
        let blank_name = ProfileUpdate {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(blank_name.normalized(), Err(Error::Validation(_))));
    }
}
