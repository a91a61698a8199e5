//! Holdings and gain/loss derived from the trade ledger and current prices.
//!
//! Everything here is a pure function over borrowed state. Sells reduce cost
//! basis by `quantity * sell_price`, so realized profit lowers the remaining
//! cost of the position rather than being booked separately.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{Participant, ParticipantId, Stock, Symbol, Trade, TradeSide};

/// Open position in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: Symbol,
    pub net_shares: i64,
    pub cost_basis: f64,
    /// 0 when the symbol is no longer listed.
    pub current_price: f64,
    pub current_value: f64,
    pub average_cost: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    pub participant_id: ParticipantId,
    pub holdings: BTreeMap<Symbol, Holding>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
}

#[derive(Debug, Default)]
struct Position {
    net_shares: i64,
    cost_basis: f64,
}

pub fn value_portfolio(
    participant_id: &ParticipantId,
    trades: &[Trade],
    stocks: &[Stock],
) -> PortfolioValuation {
    let prices = price_index(stocks);

    let mut positions: BTreeMap<&Symbol, Position> = BTreeMap::new();
    for trade in trades.iter().filter(|t| &t.participant_id == participant_id) {
        let position = positions.entry(&trade.symbol).or_default();
        let shares = i64::from(trade.quantity);
        match trade.side {
            TradeSide::Buy => {
                position.net_shares += shares;
                position.cost_basis += trade.notional();
            }
            TradeSide::Sell => {
                position.net_shares -= shares;
                position.cost_basis -= trade.notional();
            }
        }
    }

    let holdings: BTreeMap<Symbol, Holding> = positions
        .into_iter()
        .filter(|(_, position)| position.net_shares > 0)
        .map(|(symbol, position)| {
            let current_price = prices.get(symbol).copied().unwrap_or(0.0);
            let holding = build_holding(symbol.clone(), position, current_price);
            (symbol.clone(), holding)
        })
        .collect();

    let total_value: f64 = holdings.values().map(|h| h.current_value).sum();
    let total_cost: f64 = holdings.values().map(|h| h.cost_basis).sum();
    let total_gain_loss = total_value - total_cost;

    PortfolioValuation {
        participant_id: participant_id.clone(),
        holdings,
        total_value,
        total_cost,
        total_gain_loss,
        total_gain_loss_percent: percent_of(total_gain_loss, total_cost),
    }
}

fn build_holding(symbol: Symbol, position: Position, current_price: f64) -> Holding {
    let current_value = position.net_shares as f64 * current_price;
    let gain_loss = current_value - position.cost_basis;
    Holding {
        symbol,
        net_shares: position.net_shares,
        cost_basis: position.cost_basis,
        current_price,
        current_value,
        average_cost: position.cost_basis / position.net_shares as f64,
        gain_loss,
        gain_loss_percent: percent_of(gain_loss, position.cost_basis),
    }
}

fn percent_of(amount: f64, base: f64) -> f64 {
    if base > 0.0 {
        amount / base * 100.0
    } else {
        0.0
    }
}

/// First listing wins if a symbol appears twice.
fn price_index(stocks: &[Stock]) -> HashMap<&Symbol, f64> {
    let mut prices = HashMap::with_capacity(stocks.len());
    for stock in stocks {
        prices.entry(&stock.symbol).or_insert(stock.price);
    }
    prices
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub participant_id: ParticipantId,
    pub name: String,
    pub username: String,
    pub wallet_balance: f64,
    /// Cached `total_portfolio_value`, the ranking key.
    pub portfolio_value: f64,
    pub net_worth: f64,
    /// Valuation computed from the current ledger.
    pub live_portfolio_value: f64,
}

/// Participants ordered by cached portfolio value, highest first, ties by id.
pub fn leaderboard(
    participants: &[Participant],
    trades: &[Trade],
    stocks: &[Stock],
) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&Participant> = participants.iter().collect();
    ranked.sort_by(|a, b| {
        b.total_portfolio_value
            .partial_cmp(&a.total_portfolio_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, participant)| LeaderboardEntry {
            rank: index + 1,
            participant_id: participant.id.clone(),
            name: participant.name.clone(),
            username: participant.username.clone(),
            wallet_balance: participant.wallet_balance,
            portfolio_value: participant.total_portfolio_value,
            net_worth: participant.net_worth(),
            live_portfolio_value: value_portfolio(&participant.id, trades, stocks).total_value,
        })
        .collect()
}
