//! Current prices, bounded price history and volume per instrument.

use crate::ports::{IdGenerator, RandomSource};
use crate::{Stock, StockId, StockSpec, Symbol, UtcDateTime, ValidationError};

/// Largest single-tick move in either direction, as a fraction of price.
pub const MAX_TICK_MOVE: f64 = 0.02;

const TICK_VOLUME_BASE: u64 = 1_000;
const TICK_VOLUME_SPREAD: f64 = 100_000.0;

/// Ordered set of stocks. The only place prices and history change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLedger {
    stocks: Vec<Stock>,
}

impl StockLedger {
    pub fn new(stocks: Vec<Stock>) -> Self {
        Self { stocks }
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub(crate) fn as_vec(&self) -> &Vec<Stock> {
        &self.stocks
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn get(&self, stock_id: &StockId) -> Option<&Stock> {
        self.stocks.iter().find(|stock| &stock.id == stock_id)
    }

    pub fn find_by_symbol(&self, symbol: &Symbol) -> Option<&Stock> {
        self.stocks.iter().find(|stock| &stock.symbol == symbol)
    }

    /// Admin override. Returns `false` (and changes nothing) for an unknown id.
    pub fn apply_price_update(
        &mut self,
        stock_id: &StockId,
        new_price: f64,
        now: UtcDateTime,
        random: &dyn RandomSource,
    ) -> bool {
        let Some(stock) = self.stocks.iter_mut().find(|stock| &stock.id == stock_id) else {
            return false;
        };
        stock.reprice(new_price, tick_volume(random), now);
        true
    }

    /// Move one stock by a uniform random percentage in
    /// `[-MAX_TICK_MOVE, MAX_TICK_MOVE)` and book the simulated volume.
    ///
    /// A move that would overflow to a non-finite price leaves the price
    /// where it is; the tick still records a history point and volume.
    pub fn apply_random_tick(stock: &mut Stock, now: UtcDateTime, random: &dyn RandomSource) {
        let pct = (random.next_f64() - 0.5) * (MAX_TICK_MOVE * 2.0);
        let mut new_price = stock.price * (1.0 + pct);
        if !new_price.is_finite() {
            tracing::warn!(
                stock_id = %stock.id,
                price = stock.price,
                "tick would overflow, price held"
            );
            new_price = stock.price;
        }
        let volume = tick_volume(random);
        stock.reprice(new_price, volume, now);
        stock.volume = stock.volume.saturating_add(volume);
    }

    /// One tick cycle across every stock.
    pub fn tick_all(&mut self, now: UtcDateTime, random: &dyn RandomSource) {
        for stock in &mut self.stocks {
            Self::apply_random_tick(stock, now, random);
        }
    }

    pub fn add_stock(
        &mut self,
        spec: StockSpec,
        now: UtcDateTime,
        ids: &dyn IdGenerator,
    ) -> Result<&Stock, ValidationError> {
        let stock = spec.into_stock(StockId::new(ids.next_id()), now)?;
        self.stocks.push(stock);
        let last = self.stocks.len() - 1;
        Ok(&self.stocks[last])
    }

    /// Deletes without checking trades that still reference the stock.
    pub fn remove_stock(&mut self, stock_id: &StockId) -> Option<Stock> {
        let index = self.stocks.iter().position(|stock| &stock.id == stock_id)?;
        Some(self.stocks.remove(index))
    }
}

fn tick_volume(random: &dyn RandomSource) -> u64 {
    (random.next_f64() * TICK_VOLUME_SPREAD).floor() as u64 + TICK_VOLUME_BASE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FastRandom, FixedRandom, SequentialIds};
    use crate::PRICE_HISTORY_CAP;

    fn ts(raw: &str) -> UtcDateTime {
        UtcDateTime::parse(raw).expect("timestamp")
    }

    fn ledger_with(price: f64) -> (StockLedger, StockId) {
        let mut ledger = StockLedger::default();
        let ids = SequentialIds::new("stock");
        let id = ledger
            .add_stock(
                StockSpec::new(Symbol::parse("AAPL").expect("symbol"), "Apple Inc.", price),
                ts("2025-01-01T00:00:00Z"),
                &ids,
            )
            .expect("add")
            .id
            .clone();
        (ledger, id)
    }

    #[test]
    fn price_update_shifts_previous_and_appends_history() {
        let (mut ledger, id) = ledger_with(100.0);
        let applied =
            ledger.apply_price_update(&id, 110.0, ts("2025-01-01T00:01:00Z"), &FixedRandom(0.5));
        assert!(applied);

        let stock = ledger.get(&id).expect("stock");
        assert_eq!(stock.previous_price, 100.0);
        assert_eq!(stock.price, 110.0);
        assert_eq!(stock.change, 10.0);
        assert!((stock.change_percent - 10.0).abs() < 1e-9);
        assert_eq!(stock.price_history.len(), 2);
        assert_eq!(stock.price_history.back().expect("point").volume, 51_000);
        assert_eq!(stock.last_updated, ts("2025-01-01T00:01:00Z"));
        // Overrides do not touch cumulative volume.
        assert_eq!(stock.volume, 0);
    }

    #[test]
    fn unknown_stock_update_is_a_no_op() {
        let (mut ledger, _) = ledger_with(100.0);
        let before = ledger.clone();
        let applied = ledger.apply_price_update(
            &StockId::from("missing"),
            1.0,
            ts("2025-01-01T00:01:00Z"),
            &FixedRandom(0.5),
        );
        assert!(!applied);
        assert_eq!(ledger, before);
    }

    #[test]
    fn history_is_capped_with_oldest_evicted() {
        let (mut ledger, id) = ledger_with(100.0);
        let random = FastRandom::with_seed(1);
        for step in 0..150 {
            ledger.apply_price_update(
                &id,
                100.0 + f64::from(step),
                ts("2025-01-01T00:00:00Z"),
                &random,
            );
        }
        let history = &ledger.get(&id).expect("stock").price_history;
        assert_eq!(history.len(), PRICE_HISTORY_CAP);
        assert_eq!(history.front().expect("oldest").price, 150.0);
        assert_eq!(history.back().expect("newest").price, 249.0);
    }

    #[test]
    fn random_tick_stays_within_two_percent() {
        let (mut ledger, id) = ledger_with(200.0);
        let random = FastRandom::with_seed(42);
        for _ in 0..50 {
            let before = ledger.get(&id).expect("stock").price;
            ledger.tick_all(ts("2025-01-01T00:00:05Z"), &random);
            let stock = ledger.get(&id).expect("stock");
            let ratio = stock.price / before;
            assert!((0.98..=1.02).contains(&ratio), "ratio {ratio}");
            assert_eq!(stock.previous_price, before);
        }
        assert!(ledger.get(&id).expect("stock").volume >= 50 * TICK_VOLUME_BASE);
    }

    #[test]
    fn extreme_random_values_hit_the_bounds() {
        let (mut ledger, id) = ledger_with(100.0);
        ledger.tick_all(ts("2025-01-01T00:00:05Z"), &FixedRandom(0.0));
        assert!((ledger.get(&id).expect("stock").price - 98.0).abs() < 1e-9);
    }

    #[test]
    fn tick_never_moves_a_price_past_the_largest_finite_value() {
        let (mut ledger, id) = ledger_with(f64::MAX);
        ledger.tick_all(ts("2025-01-01T00:00:05Z"), &FixedRandom(0.999));

        let stock = ledger.get(&id).expect("stock");
        assert_eq!(stock.price, f64::MAX);
        assert_eq!(stock.change, 0.0);
        assert!(stock.change_percent.is_finite());
        assert_eq!(stock.price_history.len(), 2);
    }

    #[test]
    fn remove_does_not_require_matching_trades() {
        let (mut ledger, id) = ledger_with(100.0);
        assert!(ledger.remove_stock(&id).is_some());
        assert!(ledger.remove_stock(&id).is_none());
        assert!(ledger.is_empty());
    }
}
