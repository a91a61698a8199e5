//! Fresh randomized starting data: the listed universe, the seeded
//! participant roster and the opening news items.

use std::collections::VecDeque;
use std::time::Duration;

use crate::ports::RandomSource;
use crate::{
    change_percent, ImpactLevel, News, NewsId, Participant, ParticipantId, PricePoint,
    RiskTolerance, Stock, StockId, Symbol, UtcDateTime, ValidationError,
};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const HISTORY_DAYS: u32 = 30;

/// Publisher recorded on the seeded news items.
pub const SEED_PUBLISHER: &str = "Market Admin";

struct Listing {
    symbol: &'static str,
    name: &'static str,
    sector: &'static str,
    base_price: f64,
}

const LISTINGS: [Listing; 15] = [
    Listing { symbol: "AAPL", name: "Apple Inc.", sector: "Technology", base_price: 175.5 },
    Listing { symbol: "GOOGL", name: "Alphabet Inc.", sector: "Technology", base_price: 2850.75 },
    Listing { symbol: "MSFT", name: "Microsoft Corporation", sector: "Technology", base_price: 415.25 },
    Listing { symbol: "AMZN", name: "Amazon.com Inc.", sector: "Consumer Discretionary", base_price: 3250.8 },
    Listing { symbol: "TSLA", name: "Tesla Inc.", sector: "Automotive", base_price: 245.6 },
    Listing { symbol: "NVDA", name: "NVIDIA Corporation", sector: "Technology", base_price: 875.3 },
    Listing { symbol: "META", name: "Meta Platforms Inc.", sector: "Technology", base_price: 485.9 },
    Listing { symbol: "NFLX", name: "Netflix Inc.", sector: "Entertainment", base_price: 425.15 },
    Listing { symbol: "JPM", name: "JPMorgan Chase & Co.", sector: "Financial", base_price: 185.4 },
    Listing { symbol: "JNJ", name: "Johnson & Johnson", sector: "Healthcare", base_price: 165.75 },
    Listing { symbol: "V", name: "Visa Inc.", sector: "Financial", base_price: 275.2 },
    Listing { symbol: "PG", name: "Procter & Gamble Co.", sector: "Consumer Goods", base_price: 155.85 },
    Listing { symbol: "UNH", name: "UnitedHealth Group Inc.", sector: "Healthcare", base_price: 525.6 },
    Listing { symbol: "HD", name: "Home Depot Inc.", sector: "Retail", base_price: 385.45 },
    Listing { symbol: "MA", name: "Mastercard Inc.", sector: "Financial", base_price: 425.3 },
];

const PARTICIPANT_NAMES: [&str; 20] = [
    "Alex Johnson",
    "Sarah Chen",
    "Michael Rodriguez",
    "Emily Davis",
    "David Kim",
    "Jessica Wilson",
    "Robert Taylor",
    "Amanda Brown",
    "Christopher Lee",
    "Jennifer Garcia",
    "Matthew Anderson",
    "Lisa Martinez",
    "Daniel Thompson",
    "Ashley White",
    "James Harris",
    "Nicole Clark",
    "Ryan Lewis",
    "Stephanie Walker",
    "Kevin Hall",
    "Rachel Young",
];

/// (headline, impact, category, hours before now)
const SEED_NEWS: [(&str, i64, &str, u32); 4] = [
    ("Tech Giants Report Strong Q4 Earnings, Market Rallies", 4, "earnings", 2),
    ("Federal Reserve Signals Potential Interest Rate Changes", 5, "monetary_policy", 4),
    ("Healthcare Sector Shows Resilience Amid Market Volatility", 3, "sector_analysis", 6),
    ("Electric Vehicle Sales Surge, Auto Stocks Gain Momentum", 4, "industry_trends", 8),
];

/// Uniform value in `[low, high)`.
fn uniform(random: &dyn RandomSource, low: f64, high: f64) -> f64 {
    low + random.next_f64() * (high - low)
}

/// Uniform integer in `[low, low + span)`.
fn uniform_u64(random: &dyn RandomSource, low: u64, span: u64) -> u64 {
    low + (random.next_f64() * span as f64).floor() as u64
}

/// The 15 listed instruments with ids `"1"`..`"15"`, each priced within 5%
/// of its base and carrying 31 daily history points ending today.
pub fn generate_stocks(
    now: UtcDateTime,
    random: &dyn RandomSource,
) -> Result<Vec<Stock>, ValidationError> {
    LISTINGS
        .iter()
        .enumerate()
        .map(|(index, listing)| {
            let price = listing.base_price * (1.0 + uniform(random, -0.05, 0.05));
            let previous_price = price * (1.0 + uniform(random, -0.025, 0.025));
            let change = price - previous_price;

            let mut price_history = VecDeque::with_capacity(HISTORY_DAYS as usize + 1);
            let mut walk = previous_price;
            for days_back in (0..=HISTORY_DAYS).rev() {
                walk *= 1.0 + uniform(random, -0.015, 0.015);
                price_history.push_back(PricePoint {
                    timestamp: now.minus(DAY * days_back),
                    price: walk,
                    volume: uniform_u64(random, 1_000_000, 10_000_000),
                });
            }

            Ok(Stock {
                id: StockId::new((index + 1).to_string()),
                symbol: Symbol::parse(listing.symbol)?,
                name: listing.name.to_owned(),
                sector: listing.sector.to_owned(),
                price,
                previous_price,
                change,
                change_percent: change_percent(change, previous_price),
                price_history,
                volume: uniform_u64(random, 5_000_000, 50_000_000),
                market_cap: (price * uniform(random, 1.0e9, 6.0e9)).floor(),
                last_updated: now,
            })
        })
        .collect()
}

/// The 20 seeded participants, `participant_1`..`participant_20`.
pub fn generate_participants(now: UtcDateTime, random: &dyn RandomSource) -> Vec<Participant> {
    PARTICIPANT_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let lower = name.to_lowercase();
            let joined_ago = DAY.mul_f64(uniform(random, 0.0, 365.0));
            let active_ago = DAY.mul_f64(uniform(random, 0.0, 7.0));
            let tolerance = RiskTolerance::ALL[uniform_u64(random, 0, 3).min(2) as usize];

            Participant {
                id: ParticipantId::new(format!("participant_{}", index + 1)),
                name: (*name).to_owned(),
                email: format!("{}@stocksim.com", lower.replacen(' ', ".", 1)),
                username: format!("@{}_trader", lower.replacen(' ', "_", 1)),
                wallet_balance: uniform_u64(random, 10_000, 50_000) as f64,
                total_portfolio_value: uniform_u64(random, 5_000, 75_000) as f64,
                risk_tolerance: tolerance,
                joined_at: now.minus(joined_ago),
                last_active: now.minus(active_ago),
            }
        })
        .collect()
}

/// The four opening headlines, newest first, ids `"1"`..`"4"`.
pub fn seed_news(now: UtcDateTime) -> Result<Vec<News>, ValidationError> {
    SEED_NEWS
        .iter()
        .enumerate()
        .map(|(index, (headline, impact, category, hours_ago))| {
            Ok(News {
                id: NewsId::new((index + 1).to_string()),
                headline: (*headline).to_owned(),
                impact: ImpactLevel::new(*impact)?,
                category: (*category).to_owned(),
                published_by: SEED_PUBLISHER.to_owned(),
                timestamp: now.minus(HOUR * *hours_ago),
            })
        })
        .collect()
}
