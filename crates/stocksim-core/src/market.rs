//! The simulation as a single writer over every collection.
//!
//! [`Market`] owns the in-memory state, persists each collection through its
//! [`Repository`](crate::storage::Repository) after every mutation, and is
//! the only way callers change anything. Wrap it in a mutex
//! ([`SharedMarket`](crate::SharedMarket)) to share it with a
//! [`LiveTicker`](crate::LiveTicker).

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::activity::{ActivityJournal, SYSTEM_ACTOR};
use crate::baseline;
use crate::domain::validate::{validate_finite, validate_non_negative};
use crate::ports::MarketPorts;
use crate::stock_ledger::StockLedger;
use crate::storage::{KeyValueStore, MemoryStore, Repositories, Repository};
use crate::trade_ledger::TradeLedger;
use crate::valuation::{self, LeaderboardEntry, PortfolioValuation};
use crate::{
    ActivityCategory, ActivityLog, CoreError, News, NewsDraft, NewsId, Participant,
    ParticipantDraft, ParticipantId, Stock, StockId, StockSpec, StoreError, Symbol, SystemState,
    SystemStatus, Trade, TradeRequest, UtcDateTime,
};

/// User id recorded on journal entries for admin operations.
pub const ADMIN_ACTOR: &str = "admin";

pub struct Market {
    repos: Repositories,
    ports: MarketPorts,
    stocks: StockLedger,
    trades: TradeLedger,
    participants: Vec<Participant>,
    news: Vec<News>,
    activity: ActivityJournal,
    system: SystemState,
    live_session: Option<u64>,
    sessions_started: u64,
    ticks_applied: u64,
}

impl Market {
    /// Load every collection from `store`. Missing collections are seeded
    /// with baseline data; unreadable ones are logged and replaced.
    pub fn open(store: Arc<dyn KeyValueStore>, ports: MarketPorts) -> Result<Self, CoreError> {
        let repos = Repositories::new(store);
        let now = ports.clock.now();
        let random = Arc::clone(&ports.random);

        let stocks = load_or_seed(&repos.stocks, || {
            baseline::generate_stocks(now, random.as_ref()).map_err(CoreError::from)
        })?;
        let participants = load_or_seed(&repos.participants, || {
            Ok(baseline::generate_participants(now, random.as_ref()))
        })?;
        let news = load_or_seed(&repos.news, || {
            baseline::seed_news(now).map_err(CoreError::from)
        })?;
        let trades = load_or_seed(&repos.trades, || Ok(Vec::new()))?;
        let activity = load_or_seed(&repos.activity, || Ok(Vec::new()))?;
        let system = load_or_seed(&repos.system, || Ok(SystemState::fresh(now)))?;

        tracing::debug!(
            stocks = stocks.len(),
            participants = participants.len(),
            trades = trades.len(),
            "market opened"
        );

        Ok(Self {
            repos,
            ports,
            stocks: StockLedger::new(stocks),
            trades: TradeLedger::new(trades),
            participants,
            news,
            activity: ActivityJournal::new(activity),
            system,
            live_session: None,
            sessions_started: 0,
            ticks_applied: 0,
        })
    }

    /// Market over a fresh [`MemoryStore`].
    pub fn in_memory(ports: MarketPorts) -> Result<Self, CoreError> {
        Self::open(Arc::new(MemoryStore::new()), ports)
    }

    pub fn now(&self) -> UtcDateTime {
        self.ports.clock.now()
    }

    pub fn stocks(&self) -> &[Stock] {
        self.stocks.stocks()
    }

    pub fn stock(&self, stock_id: &StockId) -> Option<&Stock> {
        self.stocks.get(stock_id)
    }

    pub fn stock_by_symbol(&self, symbol: &Symbol) -> Option<&Stock> {
        self.stocks.find_by_symbol(symbol)
    }

    pub fn trades(&self) -> &[Trade] {
        self.trades.trades()
    }

    /// One participant's trades, most recent first.
    pub fn trades_for<'a>(
        &'a self,
        participant_id: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades.for_participant(participant_id)
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == participant_id)
    }

    pub fn news(&self) -> &[News] {
        &self.news
    }

    pub fn activity(&self) -> &[ActivityLog] {
        self.activity.entries()
    }

    /// The newest `limit` journal entries.
    pub fn recent_activity(&self, limit: usize) -> &[ActivityLog] {
        self.activity.recent(limit)
    }

    pub fn system(&self) -> &SystemState {
        &self.system
    }

    /// Tick cycles applied since this value was opened.
    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied
    }

    /// Admin price override. `Ok(false)` means the stock does not exist and
    /// nothing was changed or written.
    pub fn update_stock_price(
        &mut self,
        stock_id: &StockId,
        new_price: f64,
    ) -> Result<bool, CoreError> {
        validate_non_negative("price", new_price)?;
        let now = self.now();
        if !self
            .stocks
            .apply_price_update(stock_id, new_price, now, self.ports.random.as_ref())
        {
            tracing::debug!(%stock_id, "price update for unknown stock ignored");
            return Ok(false);
        }

        self.repos.stocks.save(self.stocks.as_vec())?;
        tracing::info!(%stock_id, new_price, "stock price updated");
        self.journal(
            ADMIN_ACTOR,
            "Stock Price Updated",
            format!("{stock_id} set to {new_price:.2}"),
            ActivityCategory::Admin,
        )?;
        Ok(true)
    }

    pub fn add_stock(&mut self, spec: StockSpec) -> Result<Stock, CoreError> {
        let now = self.now();
        let stock = self
            .stocks
            .add_stock(spec, now, self.ports.ids.as_ref())?
            .clone();
        self.repos.stocks.save(self.stocks.as_vec())?;

        tracing::info!(stock_id = %stock.id, symbol = %stock.symbol, "stock listed");
        self.journal(
            ADMIN_ACTOR,
            "Stock Added",
            format!("{} ({}) listed at {:.2}", stock.symbol, stock.name, stock.price),
            ActivityCategory::Admin,
        )?;
        Ok(stock)
    }

    /// Trades referencing the removed stock are left untouched.
    pub fn remove_stock(&mut self, stock_id: &StockId) -> Result<Option<Stock>, CoreError> {
        let Some(removed) = self.stocks.remove_stock(stock_id) else {
            return Ok(None);
        };
        self.repos.stocks.save(self.stocks.as_vec())?;

        tracing::info!(%stock_id, symbol = %removed.symbol, "stock removed");
        self.journal(
            ADMIN_ACTOR,
            "Stock Removed",
            format!("{} delisted", removed.symbol),
            ActivityCategory::Admin,
        )?;
        Ok(Some(removed))
    }

    /// The trade stays in memory only if the trade ledger is persisted. Once
    /// it is, a failure saving the counter is returned with the trade kept.
    pub fn record_trade(&mut self, request: TradeRequest) -> Result<Trade, CoreError> {
        let now = self.now();
        let trade = self
            .trades
            .record(request, &self.stocks, now, self.ports.ids.as_ref())?
            .clone();
        if let Err(error) = self.repos.trades.save(self.trades.as_vec()) {
            self.trades.discard_latest();
            return Err(error.into());
        }

        self.system.total_trades += 1;
        self.repos.system.save(&self.system)?;

        tracing::info!(
            trade_id = %trade.id,
            participant_id = %trade.participant_id,
            symbol = %trade.symbol,
            side = trade.side.as_str(),
            quantity = trade.quantity,
            price = trade.price,
            "trade recorded"
        );
        let actor = trade
            .executed_by
            .clone()
            .unwrap_or_else(|| trade.participant_id.to_string());
        self.journal(
            actor,
            "Trade Executed",
            format!(
                "{} {} {} @ {:.2} for {}",
                trade.side.as_str().to_uppercase(),
                trade.quantity,
                trade.symbol,
                trade.price,
                trade.participant_id
            ),
            ActivityCategory::Trade,
        )?;
        Ok(trade)
    }

    pub fn publish_news(&mut self, draft: NewsDraft) -> Result<News, CoreError> {
        let now = self.now();
        let item = draft.into_news(NewsId::new(self.ports.ids.next_id()), now)?;
        self.news.insert(0, item.clone());
        self.repos.news.save(&self.news)?;

        tracing::info!(news_id = %item.id, impact = item.impact.get(), "news published");
        self.journal(
            item.published_by.clone(),
            "News Published",
            format!("[impact {}] {}", item.impact.get(), item.headline),
            ActivityCategory::Admin,
        )?;
        Ok(item)
    }

    /// `Ok(false)` for an unknown participant.
    pub fn update_wallet_balance(
        &mut self,
        participant_id: &ParticipantId,
        balance: f64,
    ) -> Result<bool, CoreError> {
        validate_finite("wallet_balance", balance)?;
        let Some(participant) = self
            .participants
            .iter_mut()
            .find(|p| &p.id == participant_id)
        else {
            return Ok(false);
        };
        participant.wallet_balance = balance;
        self.repos.participants.save(&self.participants)?;

        tracing::info!(%participant_id, balance, "wallet balance updated");
        self.journal(
            ADMIN_ACTOR,
            "Wallet Updated",
            format!("{participant_id} balance set to {balance:.2}"),
            ActivityCategory::Admin,
        )?;
        Ok(true)
    }

    pub fn add_participant(&mut self, draft: ParticipantDraft) -> Result<Participant, CoreError> {
        let now = self.now();
        let participant =
            draft.into_participant(ParticipantId::new(self.ports.ids.next_id()), now)?;
        self.participants.push(participant.clone());
        self.system.total_users += 1;

        self.repos.participants.save(&self.participants)?;
        self.repos.system.save(&self.system)?;

        tracing::info!(participant_id = %participant.id, "participant added");
        self.journal(
            ADMIN_ACTOR,
            "Participant Added",
            format!("{} <{}>", participant.name, participant.email),
            ActivityCategory::Admin,
        )?;
        Ok(participant)
    }

    /// Live valuation from the current ledgers.
    pub fn portfolio(&self, participant_id: &ParticipantId) -> PortfolioValuation {
        valuation::value_portfolio(participant_id, self.trades.trades(), self.stocks.stocks())
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        valuation::leaderboard(
            &self.participants,
            self.trades.trades(),
            self.stocks.stocks(),
        )
    }

    /// Copy each participant's live valuation into the cached
    /// `total_portfolio_value`. Returns how many figures changed.
    pub fn refresh_portfolio_values(&mut self) -> Result<usize, CoreError> {
        let mut changed = 0;
        for participant in &mut self.participants {
            let live = valuation::value_portfolio(
                &participant.id,
                self.trades.trades(),
                self.stocks.stocks(),
            )
            .total_value;
            if participant.total_portfolio_value != live {
                participant.total_portfolio_value = live;
                changed += 1;
            }
        }
        self.repos.participants.save(&self.participants)?;
        tracing::info!(changed, "portfolio values refreshed");
        Ok(changed)
    }

    /// One tick across every stock, then persist the ledger.
    pub fn apply_tick_cycle(&mut self) -> Result<(), StoreError> {
        let now = self.now();
        self.stocks.tick_all(now, self.ports.random.as_ref());
        self.ticks_applied += 1;
        self.repos.stocks.save(self.stocks.as_vec())?;
        tracing::debug!(stocks = self.stocks.len(), "tick applied");
        Ok(())
    }

    /// Replace stocks, participants and news with fresh baseline data, clear
    /// the trade ledger and zero the counters.
    pub fn reset_system(&mut self) -> Result<(), CoreError> {
        let now = self.now();
        let random = self.ports.random.as_ref();

        self.stocks = StockLedger::new(baseline::generate_stocks(now, random)?);
        self.participants = baseline::generate_participants(now, random);
        self.news = baseline::seed_news(now)?;
        self.trades.clear();
        self.system = SystemState::fresh(now);

        self.repos.stocks.save(self.stocks.as_vec())?;
        self.repos.participants.save(&self.participants)?;
        self.repos.news.save(&self.news)?;
        self.repos.trades.save(self.trades.as_vec())?;
        self.repos.system.save(&self.system)?;

        tracing::info!(last_reset = %now, "system reset");
        self.journal(
            SYSTEM_ACTOR,
            "System Reset",
            "Market data reinitialized to a fresh baseline",
            ActivityCategory::System,
        )?;
        Ok(())
    }

    pub fn set_status(&mut self, status: SystemStatus) -> Result<(), CoreError> {
        if self.system.status == status {
            return Ok(());
        }
        self.system.status = status;
        self.repos.system.save(&self.system)?;

        tracing::info!(status = status.as_str(), "system status changed");
        self.journal(
            ADMIN_ACTOR,
            "Status Changed",
            format!("system is now {}", status.as_str()),
            ActivityCategory::System,
        )?;
        Ok(())
    }

    /// Append a journal entry on behalf of `user_id` and persist the journal.
    pub fn journal(
        &mut self,
        user_id: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
        category: ActivityCategory,
    ) -> Result<(), CoreError> {
        let now = self.now();
        self.activity.append(
            user_id,
            action,
            details,
            category,
            now,
            self.ports.ids.as_ref(),
        );
        self.repos.activity.save(self.activity.as_vec())?;
        Ok(())
    }

    pub(crate) fn begin_live_session(&mut self) -> u64 {
        self.sessions_started += 1;
        self.live_session = Some(self.sessions_started);
        self.sessions_started
    }

    pub(crate) fn end_live_session(&mut self, session: u64) {
        if self.live_session == Some(session) {
            self.live_session = None;
        }
    }

    pub(crate) fn is_live_session(&self, session: u64) -> bool {
        self.live_session == Some(session)
    }

    pub fn is_live(&self) -> bool {
        self.live_session.is_some()
    }
}

fn load_or_seed<P, F>(repo: &Repository<P>, seed: F) -> Result<P, CoreError>
where
    P: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<P, CoreError>,
{
    match repo.load() {
        Ok(Some(records)) => return Ok(records),
        Ok(None) => {}
        Err(error) if error.is_bad_data() => {
            tracing::warn!(
                collection = %repo.collection(),
                %error,
                "stored collection unreadable, replacing with baseline data"
            );
        }
        Err(error) => return Err(error.into()),
    }

    let records = seed()?;
    repo.save(&records)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::ports::{FixedRandom, SequentialIds};
    use crate::TradeSide;
    use stocksim_warehouse::WarehouseError;

    /// Memory store whose `trades` writes fail once `fail_trades` is set.
    #[derive(Default)]
    struct TradeWriteFailure {
        inner: MemoryStore,
        fail_trades: AtomicBool,
    }

    impl KeyValueStore for TradeWriteFailure {
        fn get(&self, key: &str) -> Result<Option<String>, WarehouseError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), WarehouseError> {
            if key == "trades" && self.fail_trades.load(Ordering::SeqCst) {
                return Err(WarehouseError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn clear(&self) -> Result<(), WarehouseError> {
            self.inner.clear()
        }
    }

    fn market() -> Market {
        let start = UtcDateTime::parse("2025-01-01T00:00:00Z").expect("ts");
        Market::in_memory(MarketPorts::deterministic(start, 11)).expect("market")
    }

    #[test]
    fn empty_store_is_seeded_with_baseline() {
        let market = market();
        assert_eq!(market.stocks().len(), 15);
        assert_eq!(market.participants().len(), 20);
        assert_eq!(market.news().len(), 4);
        assert!(market.trades().is_empty());
        assert_eq!(market.system().status, SystemStatus::Active);
    }

    #[test]
    fn trade_increments_counter_and_journals() {
        let mut market = market();
        let stock_id = market.stocks()[0].id.clone();
        market
            .record_trade(
                TradeRequest::new(
                    ParticipantId::from("participant_1"),
                    stock_id,
                    TradeSide::Buy,
                    3,
                    10.0,
                )
                .executed_by("employee_7"),
            )
            .expect("trade");

        assert_eq!(market.system().total_trades, 1);
        let entry = &market.activity()[0];
        assert_eq!(entry.category, ActivityCategory::Trade);
        assert_eq!(entry.user_id, "employee_7");
        assert_eq!(entry.details, "BUY 3 AAPL @ 10.00 for participant_1");
    }

    #[test]
    fn failed_trade_save_leaves_memory_matching_the_store() {
        let store = Arc::new(TradeWriteFailure::default());
        let start = UtcDateTime::parse("2025-01-01T00:00:00Z").expect("ts");
        let mut market = Market::open(
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            MarketPorts::deterministic(start, 11),
        )
        .expect("market");
        let stock_id = market.stocks()[0].id.clone();
        store.fail_trades.store(true, Ordering::SeqCst);

        let err = market
            .record_trade(TradeRequest::new(
                ParticipantId::from("participant_1"),
                stock_id,
                TradeSide::Buy,
                1,
                10.0,
            ))
            .expect_err("store rejects the write");

        assert!(matches!(err, CoreError::Store(StoreError::Warehouse(_))));
        assert!(market.trades().is_empty());
        assert_eq!(market.system().total_trades, 0);
        assert!(market.activity().is_empty());
    }

    #[test]
    fn rejected_trade_changes_nothing() {
        let mut market = market();
        let stock_id = market.stocks()[0].id.clone();
        let err = market
            .record_trade(TradeRequest::new(
                ParticipantId::from("participant_1"),
                stock_id,
                TradeSide::Sell,
                0,
                10.0,
            ))
            .expect_err("zero quantity");
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(market.trades().is_empty());
        assert_eq!(market.system().total_trades, 0);
        assert!(market.activity().is_empty());
    }

    #[test]
    fn wallet_update_for_unknown_participant_is_a_no_op() {
        let mut market = market();
        assert!(!market
            .update_wallet_balance(&ParticipantId::from("ghost"), 5.0)
            .expect("no-op"));
        assert!(market
            .update_wallet_balance(&ParticipantId::from("participant_2"), 5.0)
            .expect("update"));
        assert_eq!(
            market
                .participant(&ParticipantId::from("participant_2"))
                .expect("participant")
                .wallet_balance,
            5.0
        );
    }

    #[test]
    fn add_participant_counts_users() {
        let mut market = market();
        let added = market
            .add_participant(ParticipantDraft::new("Grace Hopper", "grace@example.com"))
            .expect("add");
        assert_eq!(market.participants().len(), 21);
        assert_eq!(market.system().total_users, 1);
        assert_eq!(added.username, "grace");
    }

    #[test]
    fn tick_cycle_moves_every_stock() {
        let start = UtcDateTime::parse("2025-01-01T00:00:00Z").expect("ts");
        let ports = MarketPorts::deterministic(start, 1)
            .with_random(Arc::new(FixedRandom(1.0 - f64::EPSILON)))
            .with_ids(Arc::new(SequentialIds::new("x")));
        let mut market = Market::in_memory(ports).expect("market");
        let before: Vec<f64> = market.stocks().iter().map(|s| s.price).collect();

        market.apply_tick_cycle().expect("tick");
        for (stock, old) in market.stocks().iter().zip(before) {
            assert!(stock.price > old);
            assert_eq!(stock.previous_price, old);
        }
    }

    #[test]
    fn status_change_is_journaled_once() {
        let mut market = market();
        market.set_status(SystemStatus::Maintenance).expect("status");
        market.set_status(SystemStatus::Maintenance).expect("status");
        assert_eq!(market.system().status, SystemStatus::Maintenance);
        assert_eq!(market.activity().len(), 1);
    }
}
