use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Active,
    Maintenance,
}

impl SystemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
        }
    }
}

/// Singleton simulation bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    pub last_reset: UtcDateTime,
    pub total_users: u64,
    pub total_trades: u64,
    pub status: SystemStatus,
}

impl SystemState {
    pub fn fresh(now: UtcDateTime) -> Self {
        Self {
            last_reset: now,
            total_users: 0,
            total_trades: 0,
            status: SystemStatus::Active,
        }
    }
}
