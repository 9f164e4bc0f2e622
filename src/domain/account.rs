use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Width of the username and name columns.
pub const MAX_NAME_LENGTH: usize = 150;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub approved: bool,
    pub is_admin: bool,
    pub date_joined: DateTime<Utc>,
}

impl Account {
    /// "First Last", falling back to the username and then the Telegram ID.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("@{username}"),
            None => self.telegram_id.to_string(),
        }
    }
}

/// Fields the chat platform reports about a user.
#[derive(Debug, Clone, Default)]
pub struct AccountProfile {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AccountProfile {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.telegram_id <= 0 {
            return Err(DomainError::InvalidInput(
                "telegram_id must be a positive integer".to_string(),
            ));
        }
        for (field, value) in [
            ("username", &self.username),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            if value.as_deref().is_some_and(|v| v.chars().count() > MAX_NAME_LENGTH) {
                return Err(DomainError::InvalidInput(format!(
                    "{field} is too long (max {MAX_NAME_LENGTH} characters)"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub account: Account,
    pub created: bool,
}
