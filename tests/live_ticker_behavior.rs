//! Behavior-driven tests for the live price ticker
//!
//! Time is paused so interval boundaries are exact.

use std::sync::Arc;
use std::time::Duration;

use stocksim_core::{
    shared, LiveTicker, Market, MarketPorts, ParticipantId, SharedMarket, TradeRequest, TradeSide,
    UtcDateTime,
};

const INTERVAL: Duration = Duration::from_secs(5);

fn live_market() -> SharedMarket {
    let start = UtcDateTime::parse("2025-06-02T09:30:00Z").expect("valid timestamp");
    shared(Market::in_memory(MarketPorts::deterministic(start, 77)).expect("market opens"))
}

fn ticks(market: &SharedMarket) -> u64 {
    market.lock().expect("lock").ticks_applied()
}

fn prices(market: &SharedMarket) -> Vec<f64> {
    market
        .lock()
        .expect("lock")
        .stocks()
        .iter()
        .map(|stock| stock.price)
        .collect()
}

// =============================================================================
// Tick cadence
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_ticker_starts_first_tick_waits_one_full_interval() {
    // Given: A running ticker
    let market = live_market();
    let mut ticker = LiveTicker::new(Arc::clone(&market), INTERVAL);
    assert!(ticker.start());

    // When: Less than one interval passes
    tokio::time::sleep(Duration::from_millis(4_900)).await;

    // Then: Nothing has moved yet
    assert_eq!(ticks(&market), 0);

    // When: The interval boundary passes
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Then: Exactly one cycle has been applied
    assert_eq!(ticks(&market), 1);
    ticker.stop();
}

#[tokio::test(start_paused = true)]
async fn ticker_keeps_cadence_across_several_intervals() {
    let market = live_market();
    let mut ticker = LiveTicker::new(Arc::clone(&market), INTERVAL);
    ticker.start();

    tokio::time::sleep(Duration::from_millis(15_100)).await;

    assert_eq!(ticks(&market), 3);
    let stock = market.lock().expect("lock").stocks()[0].clone();
    let last = stock.price_history.back().expect("history present");
    assert_eq!(last.price, stock.price);
    ticker.stop();
}

// =============================================================================
// Stopping
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_ticker_stops_no_further_prices_change() {
    // Given: A ticker that has applied one cycle
    let market = live_market();
    let mut ticker = LiveTicker::new(Arc::clone(&market), INTERVAL);
    ticker.start();
    tokio::time::sleep(Duration::from_millis(5_100)).await;
    assert_eq!(ticks(&market), 1);

    // When: It is stopped and plenty of time passes
    assert!(ticker.stop());
    let frozen = prices(&market);
    tokio::time::sleep(Duration::from_secs(20)).await;

    // Then: Prices stay exactly where they were
    assert_eq!(prices(&market), frozen);
    assert_eq!(ticks(&market), 1);
    assert!(!market.lock().expect("lock").is_live());
}

#[tokio::test(start_paused = true)]
async fn stopping_twice_is_harmless() {
    let market = live_market();
    let mut ticker = LiveTicker::new(Arc::clone(&market), INTERVAL);

    assert!(!ticker.stop());
    ticker.start();
    assert!(ticker.stop());
    assert!(!ticker.stop());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_ticker_stops_it() {
    let market = live_market();
    {
        let mut ticker = LiveTicker::new(Arc::clone(&market), INTERVAL);
        ticker.start();
    }

    tokio::time::sleep(Duration::from_secs(12)).await;

    assert_eq!(ticks(&market), 0);
    assert!(!market.lock().expect("lock").is_live());
}

// =============================================================================
// Interleaving with admin and trade operations
// =============================================================================

#[tokio::test(start_paused = true)]
async fn trades_recorded_between_ticks_use_latest_state() {
    // Given: A ticker that has moved prices once
    let market = live_market();
    let mut ticker = LiveTicker::new(Arc::clone(&market), INTERVAL);
    ticker.start();
    tokio::time::sleep(Duration::from_millis(5_100)).await;

    // When: A trade is recorded while the ticker is live
    let trade = {
        let mut guard = market.lock().expect("lock");
        let stock = guard.stocks()[0].clone();
        guard
            .record_trade(TradeRequest::new(
                ParticipantId::from("participant_1"),
                stock.id.clone(),
                TradeSide::Buy,
                5,
                stock.price,
            ))
            .expect("trade recorded")
    };

    // Then: Further ticks leave the recorded trade untouched
    tokio::time::sleep(INTERVAL).await;
    ticker.stop();

    let guard = market.lock().expect("lock");
    assert_eq!(guard.ticks_applied(), 2);
    assert_eq!(guard.trades().len(), 1);
    assert_eq!(guard.trades()[0], trade);
}
