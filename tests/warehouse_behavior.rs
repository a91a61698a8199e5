//! Behavior-driven tests for the DuckDB warehouse
//!
//! These tests verify what survives on disk between runs and how the
//! market reacts to the stored collections.

use std::sync::Arc;

use stocksim_core::{
    KeyValueStore, Market, MarketPorts, ParticipantDraft, ParticipantId, SystemStatus,
    TradeRequest, TradeSide, UtcDateTime,
};
use stocksim_warehouse::{Warehouse, WarehouseConfig, WarehouseError};
use tempfile::tempdir;

fn ports() -> MarketPorts {
    let start = UtcDateTime::parse("2025-09-15T12:00:00Z").expect("valid timestamp");
    MarketPorts::deterministic(start, 99)
}

// =============================================================================
// Warehouse: Documents
// =============================================================================

#[test]
fn when_user_writes_a_collection_it_can_be_read_back_after_reopening() {
    // Given: A warehouse in a fresh home directory
    let temp = tempdir().expect("tempdir");
    let config = WarehouseConfig::for_home(temp.path());

    // When: A document is written and the warehouse is closed
    {
        let warehouse = Warehouse::open(config.clone()).expect("warehouse open");
        warehouse
            .write("stocks", r#"{"schema_version":1,"records":[]}"#)
            .expect("write");
    }

    // Then: A new handle on the same file sees it
    let reopened = Warehouse::open(config.clone()).expect("warehouse reopen");
    assert_eq!(
        reopened.read("stocks").expect("read").as_deref(),
        Some(r#"{"schema_version":1,"records":[]}"#)
    );
    assert!(config.db_path.exists());
    assert_eq!(reopened.db_path(), Some(config.db_path.as_path()));
}

#[test]
fn when_user_overwrites_a_collection_only_the_latest_document_remains() {
    let warehouse = Warehouse::open_in_memory().expect("warehouse open");

    warehouse.write("news", "first").expect("first write");
    warehouse.write("news", "second").expect("second write");

    assert_eq!(warehouse.read("news").expect("read").as_deref(), Some("second"));
    assert_eq!(warehouse.write_count("news").expect("count"), 2);

    let listed = warehouse.list().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "news");
    assert_eq!(listed[0].bytes, 6);
}

#[test]
fn when_user_clears_the_warehouse_every_collection_is_gone() {
    let warehouse = Warehouse::open_in_memory().expect("warehouse open");
    warehouse.write("stocks", "[]").expect("write");
    warehouse.write("trades", "[]").expect("write");

    let removed = warehouse.clear().expect("clear");

    assert_eq!(removed, 2);
    assert!(warehouse.list().expect("list").is_empty());
    assert_eq!(warehouse.read("stocks").expect("read"), None);
}

#[test]
fn collection_names_with_sql_metacharacters_are_rejected() {
    let warehouse = Warehouse::open_in_memory().expect("warehouse open");

    let result = warehouse.write("stocks'; DROP TABLE collections; --", "x");

    assert!(matches!(
        result,
        Err(WarehouseError::InvalidCollectionName(_))
    ));
}

// =============================================================================
// Warehouse: Backing the market
// =============================================================================

#[test]
fn market_state_persists_across_runs_in_the_same_home() {
    // Given: A market backed by a warehouse file
    let temp = tempdir().expect("tempdir");
    let config = WarehouseConfig::for_home(temp.path());
    let participant = {
        let warehouse = Warehouse::open(config.clone()).expect("warehouse open");
        let mut market = Market::open(Arc::new(warehouse), ports()).expect("market open");

        // When: A participant is added, a trade recorded and status changed
        let participant = market
            .add_participant(ParticipantDraft::new("Dana Reyes", "dana.reyes@stocksim.com"))
            .expect("participant added");
        let stock_id = market.stocks()[0].id.clone();
        market
            .record_trade(TradeRequest::new(
                participant.id.clone(),
                stock_id,
                TradeSide::Buy,
                12,
                100.0,
            ))
            .expect("trade recorded");
        market
            .set_status(SystemStatus::Maintenance)
            .expect("status changed");
        participant.id
    };

    // Then: A later run sees the same state
    let warehouse = Warehouse::open(config).expect("warehouse reopen");
    let market = Market::open(Arc::new(warehouse), ports()).expect("market reopen");
    assert_eq!(market.participants().len(), 21);
    assert!(market.participant(&participant).is_some());
    assert_eq!(market.trades().len(), 1);
    assert_eq!(market.trades()[0].participant_id, participant);
    assert_eq!(market.system().status, SystemStatus::Maintenance);
    assert_eq!(market.system().total_trades, 1);
    assert_eq!(market.system().total_users, 1);
}

#[test]
fn long_running_simulation_keeps_the_write_log_bounded() {
    // Given: A warehouse that keeps five audit rows per collection
    let temp = tempdir().expect("tempdir");
    let mut config = WarehouseConfig::for_home(temp.path());
    config.write_log_retention = 5;
    let warehouse = Warehouse::open(config).expect("warehouse open");
    let mut market = Market::open(Arc::new(warehouse.clone()), ports()).expect("market open");

    // When: Many tick cycles persist the stock ledger
    for _ in 0..40 {
        market.apply_tick_cycle().expect("tick");
    }

    // Then: The audit log stops growing while the data stays current
    assert_eq!(warehouse.write_count("stocks").expect("count"), 5);
    let reopened = Market::open(Arc::new(warehouse), ports()).expect("market reopen");
    assert_eq!(reopened.stocks().len(), market.stocks().len());
    assert_eq!(
        reopened.stocks()[0].price_history.len(),
        market.stocks()[0].price_history.len()
    );
}

#[test]
fn first_open_seeds_every_collection() {
    let warehouse = Warehouse::open_in_memory().expect("warehouse open");

    let _market = Market::open(Arc::new(warehouse.clone()), ports()).expect("market open");

    let names: Vec<String> = warehouse
        .list()
        .expect("list")
        .into_iter()
        .map(|info| info.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "activityLogs",
            "news",
            "participants",
            "stocks",
            "systemState",
            "trades"
        ]
    );
}

#[test]
fn each_trade_rewrites_the_trade_collection_once() {
    let warehouse = Warehouse::open_in_memory().expect("warehouse open");
    let mut market = Market::open(Arc::new(warehouse.clone()), ports()).expect("market open");
    let before = warehouse.write_count("trades").expect("count");

    let stock_id = market.stocks()[1].id.clone();
    for quantity in [1, 2, 3] {
        market
            .record_trade(TradeRequest::new(
                ParticipantId::from("participant_5"),
                stock_id.clone(),
                TradeSide::Buy,
                quantity,
                50.0,
            ))
            .expect("trade recorded");
    }

    assert_eq!(warehouse.write_count("trades").expect("count"), before + 3);
    let stored = KeyValueStore::get(&warehouse, "trades")
        .expect("get")
        .expect("present");
    assert!(stored.contains("participant_5"));
}
