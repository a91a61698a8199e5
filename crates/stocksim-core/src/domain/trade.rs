use serde::{Deserialize, Serialize};

use super::validate::validate_non_negative;
use crate::{ParticipantId, StockId, Symbol, TradeId, UtcDateTime, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Only `Executed` is produced today; the other states exist in stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Executed,
    Cancelled,
}

/// An executed buy or sell. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub participant_id: ParticipantId,
    pub stock_id: StockId,
    /// Copied from the stock at execution time.
    pub symbol: Symbol,
    pub side: TradeSide,
    pub quantity: u32,
    pub price: f64,
    pub timestamp: UtcDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_by: Option<String>,
    pub status: TradeStatus,
}

impl Trade {
    /// `quantity * price`.
    pub fn notional(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

/// Trade entry as submitted by an employee.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub participant_id: ParticipantId,
    pub stock_id: StockId,
    pub side: TradeSide,
    pub quantity: u32,
    pub price: f64,
    pub executed_by: Option<String>,
}

impl TradeRequest {
    pub fn new(
        participant_id: ParticipantId,
        stock_id: StockId,
        side: TradeSide,
        quantity: u32,
        price: f64,
    ) -> Self {
        Self {
            participant_id,
            stock_id,
            side,
            quantity,
            price,
            executed_by: None,
        }
    }

    pub fn executed_by(mut self, executor: impl Into<String>) -> Self {
        self.executed_by = Some(executor.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity == 0 {
            return Err(ValidationError::NonPositiveQuantity);
        }
        validate_non_negative("price", self.price)
    }
}
