use serde::{Deserialize, Serialize};

use crate::{ActivityId, UtcDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Trade,
    Admin,
    System,
    User,
}

impl ActivityCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trade => "trade",
            Self::Admin => "admin",
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: ActivityId,
    pub user_id: String,
    pub action: String,
    pub details: String,
    pub timestamp: UtcDateTime,
    pub category: ActivityCategory,
}
