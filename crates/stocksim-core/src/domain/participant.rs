use serde::{Deserialize, Serialize};

use super::validate::{validate_finite, validate_non_empty};
use crate::{ParticipantId, UtcDateTime, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

impl RiskTolerance {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
    pub username: String,
    pub wallet_balance: f64,
    /// Cached figure; refreshed only on request.
    pub total_portfolio_value: f64,
    pub risk_tolerance: RiskTolerance,
    pub joined_at: UtcDateTime,
    pub last_active: UtcDateTime,
}

impl Participant {
    /// Wallet plus the cached portfolio value.
    pub fn net_worth(&self) -> f64 {
        self.wallet_balance + self.total_portfolio_value
    }
}

/// Admin input for enrolling a participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantDraft {
    pub name: String,
    pub email: String,
    pub username: Option<String>,
    pub risk_tolerance: RiskTolerance,
    pub wallet_balance: f64,
}

impl ParticipantDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            username: None,
            risk_tolerance: RiskTolerance::Medium,
            wallet_balance: 0.0,
        }
    }

    pub fn with_risk_tolerance(mut self, risk_tolerance: RiskTolerance) -> Self {
        self.risk_tolerance = risk_tolerance;
        self
    }

    pub fn with_wallet_balance(mut self, wallet_balance: f64) -> Self {
        self.wallet_balance = wallet_balance;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn into_participant(
        self,
        id: ParticipantId,
        now: UtcDateTime,
    ) -> Result<Participant, ValidationError> {
        validate_non_empty("name", &self.name)?;
        validate_non_empty("email", &self.email)?;
        validate_finite("wallet_balance", self.wallet_balance)?;

        let email = self.email.trim().to_owned();
        let username = match self.username {
            Some(username) if !username.trim().is_empty() => username.trim().to_owned(),
            _ => default_username(&email),
        };

        Ok(Participant {
            id,
            name: self.name.trim().to_owned(),
            email,
            username,
            wallet_balance: self.wallet_balance,
            total_portfolio_value: 0.0,
            risk_tolerance: self.risk_tolerance,
            joined_at: now,
            last_active: now,
        })
    }
}

/// Local part of the email address.
fn default_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_defaults_to_email_local_part() {
        let now = UtcDateTime::parse("2025-01-01T00:00:00Z").expect("timestamp");
        let participant = ParticipantDraft::new("Ada Lovelace", " ada@example.com ")
            .with_wallet_balance(2_500.0)
            .into_participant(ParticipantId::from("p-1"), now)
            .expect("valid draft");

        assert_eq!(participant.username, "ada");
        assert_eq!(participant.email, "ada@example.com");
        assert_eq!(participant.total_portfolio_value, 0.0);
        assert_eq!(participant.net_worth(), 2_500.0);
    }

    #[test]
    fn blank_name_is_rejected() {
        let now = UtcDateTime::parse("2025-01-01T00:00:00Z").expect("timestamp");
        let err = ParticipantDraft::new("  ", "x@example.com")
            .into_participant(ParticipantId::from("p-2"), now)
            .expect_err("must fail");
        assert_eq!(err, ValidationError::EmptyField { field: "name" });
    }
}
