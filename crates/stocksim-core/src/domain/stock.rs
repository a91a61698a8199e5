use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::validate::{validate_non_empty, validate_non_negative};
use crate::{StockId, Symbol, UtcDateTime, ValidationError};

/// Maximum number of points kept in a stock's price history.
pub const PRICE_HISTORY_CAP: usize = 100;

/// One observation in a stock's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: UtcDateTime,
    pub price: f64,
    pub volume: u64,
}

/// A tradable instrument and its live pricing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub symbol: Symbol,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub previous_price: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Oldest first, at most [`PRICE_HISTORY_CAP`] points.
    pub price_history: VecDeque<PricePoint>,
    pub volume: u64,
    pub market_cap: f64,
    pub last_updated: UtcDateTime,
}

impl Stock {
    /// Move to `new_price`, shifting the current price into `previous_price`
    /// and recording a history point.
    pub fn reprice(&mut self, new_price: f64, point_volume: u64, at: UtcDateTime) {
        self.previous_price = self.price;
        self.price = new_price;
        self.change = new_price - self.previous_price;
        self.change_percent = change_percent(self.change, self.previous_price);
        self.push_history(PricePoint {
            timestamp: at,
            price: new_price,
            volume: point_volume,
        });
        self.last_updated = at;
    }

    pub fn push_history(&mut self, point: PricePoint) {
        self.price_history.push_back(point);
        while self.price_history.len() > PRICE_HISTORY_CAP {
            self.price_history.pop_front();
        }
    }
}

/// `change / previous * 100`, or 0 when there is no usable previous price.
pub fn change_percent(change: f64, previous_price: f64) -> f64 {
    if previous_price == 0.0 || !previous_price.is_finite() {
        return 0.0;
    }
    change / previous_price * 100.0
}

/// Admin input for listing a new stock.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSpec {
    pub symbol: Symbol,
    pub name: String,
    pub sector: String,
    pub price: f64,
    /// Defaults to `price` (zero change).
    pub previous_price: Option<f64>,
    pub market_cap: Option<f64>,
}

impl StockSpec {
    pub fn new(symbol: Symbol, name: impl Into<String>, price: f64) -> Self {
        Self {
            symbol,
            name: name.into(),
            sector: String::from("Unclassified"),
            price,
            previous_price: None,
            market_cap: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn with_previous_price(mut self, previous_price: f64) -> Self {
        self.previous_price = Some(previous_price);
        self
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("name", &self.name)?;
        validate_non_negative("price", self.price)?;
        if let Some(previous_price) = self.previous_price {
            validate_non_negative("previous_price", previous_price)?;
        }
        if let Some(market_cap) = self.market_cap {
            validate_non_negative("market_cap", market_cap)?;
        }
        Ok(())
    }

    /// Build the stock with a single seeded history point and zero volume.
    pub fn into_stock(self, id: StockId, now: UtcDateTime) -> Result<Stock, ValidationError> {
        self.validate()?;
        let previous_price = self.previous_price.unwrap_or(self.price);
        let change = self.price - previous_price;

        let mut price_history = VecDeque::with_capacity(PRICE_HISTORY_CAP);
        price_history.push_back(PricePoint {
            timestamp: now,
            price: self.price,
            volume: 0,
        });

        Ok(Stock {
            id,
            symbol: self.symbol,
            name: self.name.trim().to_owned(),
            sector: self.sector.trim().to_owned(),
            price: self.price,
            previous_price,
            change,
            change_percent: change_percent(change, previous_price),
            price_history,
            volume: 0,
            market_cap: self.market_cap.unwrap_or(0.0),
            last_updated: now,
        })
    }
}
