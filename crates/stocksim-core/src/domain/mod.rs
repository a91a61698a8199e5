//! Entities of the simulated market.

mod activity;
mod ids;
mod news;
mod participant;
mod stock;
mod symbol;
mod system;
mod timestamp;
mod trade;
pub(crate) mod validate;

pub use activity::{ActivityCategory, ActivityLog};
pub use ids::{ActivityId, NewsId, ParticipantId, StockId, TradeId};
pub use news::{ImpactLevel, News, NewsDraft};
pub use participant::{Participant, ParticipantDraft, RiskTolerance};
pub use stock::{change_percent, PricePoint, Stock, StockSpec, PRICE_HISTORY_CAP};
pub use symbol::Symbol;
pub use system::{SystemState, SystemStatus};
pub use timestamp::UtcDateTime;
pub use trade::{Trade, TradeRequest, TradeSide, TradeStatus};
