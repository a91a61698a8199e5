//! # Stocksim Core
//!
//! Portfolio valuation and live price simulation for the stocksim market.
//!
//! ## Overview
//!
//! Admins list stocks, publish news and manage participants; employees enter
//! trades; participants watch their portfolios move as prices tick. This
//! crate holds the engine behind those actions:
//!
//! - **Stock ledger** with bounded price history and admin overrides
//! - **Trade ledger**, append-only and most recent first
//! - **Valuation** of holdings and gain/loss from trades and current prices
//! - **Live ticker** applying random price moves on a fixed interval
//! - **Reset** back to a freshly randomized baseline
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`activity`] | Bounded activity journal |
//! | [`baseline`] | Randomized starting stocks, participants and news |
//! | [`config`] | Environment-driven configuration |
//! | [`domain`] | Entities (Stock, Trade, Participant, News, ...) |
//! | [`error`] | Core error types |
//! | [`market`] | The single-writer market facade |
//! | [`ports`] | Clock, randomness and id capabilities |
//! | [`stock_ledger`] | Price updates and random ticks |
//! | [`storage`] | Key-value port and typed repositories |
//! | [`ticker`] | Interval-driven live price simulation |
//! | [`trade_ledger`] | Trade entry and validation |
//! | [`valuation`] | Holdings, portfolio totals and leaderboard |
//!
//! ## Quick Start
//!
//! ```rust
//! use stocksim_core::{Market, MarketPorts, ParticipantId, TradeRequest, TradeSide};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut market = Market::in_memory(MarketPorts::system())?;
//!     let stock_id = market.stocks()[0].id.clone();
//!     let participant = ParticipantId::from("participant_1");
//!
//!     market.record_trade(TradeRequest::new(
//!         participant.clone(),
//!         stock_id,
//!         TradeSide::Buy,
//!         10,
//!         100.0,
//!     ))?;
//!
//!     let valuation = market.portfolio(&participant);
//!     println!("value: {:.2}", valuation.total_value);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  CLI / caller   │────▶│   LiveTicker     │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────────────────────────────┐
//! │  Market (stock ledger, trade ledger, ...)│
//! └────────┬─────────────────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Repository<T>   │────▶│ KeyValueStore    │
//! └─────────────────┘     │ (memory/DuckDB)  │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use stocksim_core::{CoreError, ValidationError};
//!
//! fn describe(error: &CoreError) -> &'static str {
//!     match error {
//!         CoreError::Validation(ValidationError::NonPositiveQuantity) => "quantity",
//!         CoreError::Validation(_) => "rejected input",
//!         CoreError::Store(_) => "storage failure",
//!     }
//! }
//! ```

pub mod activity;
pub mod baseline;
pub mod config;
pub mod domain;
pub mod error;
pub mod market;
pub mod ports;
pub mod stock_ledger;
pub mod storage;
pub mod ticker;
pub mod trade_ledger;
pub mod valuation;

// Domain models
pub use domain::{
    change_percent, ActivityCategory, ActivityId, ActivityLog, ImpactLevel, News, NewsDraft,
    NewsId, Participant, ParticipantDraft, ParticipantId, PricePoint, RiskTolerance, Stock,
    StockId, StockSpec, Symbol, SystemState, SystemStatus, Trade, TradeId, TradeRequest,
    TradeSide, TradeStatus, UtcDateTime, PRICE_HISTORY_CAP,
};

// Error types
pub use error::{CoreError, StoreError, ValidationError};

// Market facade and ticker
pub use market::Market;
pub use ticker::{shared, LiveTicker, SharedMarket};

// Ports
pub use ports::{
    Clock, FastRandom, FixedRandom, IdGenerator, ManualClock, MarketPorts, RandomSource,
    SequentialIds, SystemClock, UuidGenerator,
};

// Storage
pub use storage::{KeyValueStore, MemoryStore};

// Valuation
pub use valuation::{Holding, LeaderboardEntry, PortfolioValuation};

// Configuration
pub use config::SimConfig;

// Warehouse (re-exported from stocksim-warehouse)
pub use stocksim_warehouse::{Warehouse, WarehouseConfig, WarehouseError};
