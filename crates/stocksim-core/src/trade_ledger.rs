//! Append-only record of executions, most recent first.

use crate::ports::IdGenerator;
use crate::stock_ledger::StockLedger;
use crate::{
    ParticipantId, Trade, TradeId, TradeRequest, TradeStatus, UtcDateTime, ValidationError,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new(trades: Vec<Trade>) -> Self {
        Self { trades }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub(crate) fn as_vec(&self) -> &Vec<Trade> {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn for_participant<'a>(
        &'a self,
        participant_id: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades
            .iter()
            .filter(move |trade| &trade.participant_id == participant_id)
    }

    /// Validate and prepend an executed trade. The stock must currently exist;
    /// holdings are not checked, so oversells go through.
    pub fn record(
        &mut self,
        request: TradeRequest,
        stocks: &StockLedger,
        now: UtcDateTime,
        ids: &dyn IdGenerator,
    ) -> Result<&Trade, ValidationError> {
        request.validate()?;
        let stock = stocks
            .get(&request.stock_id)
            .ok_or_else(|| ValidationError::UnknownStock {
                stock_id: request.stock_id.to_string(),
            })?;

        let trade = Trade {
            id: TradeId::new(ids.next_id()),
            participant_id: request.participant_id,
            stock_id: request.stock_id,
            symbol: stock.symbol.clone(),
            side: request.side,
            quantity: request.quantity,
            price: request.price,
            timestamp: now,
            executed_by: request.executed_by,
            status: TradeStatus::Executed,
        };
        self.trades.insert(0, trade);
        Ok(&self.trades[0])
    }

    pub fn clear(&mut self) {
        self.trades.clear();
    }

    /// Drop the most recently recorded trade.
    pub(crate) fn discard_latest(&mut self) -> Option<Trade> {
        if self.trades.is_empty() {
            return None;
        }
        Some(self.trades.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SequentialIds;
    use crate::{StockId, StockSpec, Symbol, TradeSide};

    fn setup() -> (StockLedger, StockId, SequentialIds, UtcDateTime) {
        let now = UtcDateTime::parse("2025-01-01T00:00:00Z").expect("ts");
        let ids = SequentialIds::new("id");
        let mut stocks = StockLedger::default();
        let stock_id = stocks
            .add_stock(
                StockSpec::new(Symbol::parse("msft").expect("symbol"), "Microsoft", 300.0),
                now,
                &ids,
            )
            .expect("add")
            .id
            .clone();
        (stocks, stock_id, ids, now)
    }

    #[test]
    fn trades_are_prepended_with_copied_symbol() {
        let (stocks, stock_id, ids, now) = setup();
        let participant = ParticipantId::from("participant_1");
        let mut ledger = TradeLedger::default();

        ledger
            .record(
                TradeRequest::new(participant.clone(), stock_id.clone(), TradeSide::Buy, 5, 300.0),
                &stocks,
                now,
                &ids,
            )
            .expect("first");
        let second = ledger
            .record(
                TradeRequest::new(participant.clone(), stock_id, TradeSide::Sell, 9, 310.0)
                    .executed_by("employee_1"),
                &stocks,
                now,
                &ids,
            )
            .expect("oversell is accepted")
            .clone();

        assert_eq!(ledger.trades()[0], second);
        assert_eq!(second.symbol.as_str(), "MSFT");
        assert_eq!(second.status, TradeStatus::Executed);
        assert_eq!(second.executed_by.as_deref(), Some("employee_1"));
        assert_eq!(ledger.for_participant(&participant).count(), 2);
    }

    #[test]
    fn unknown_stock_is_rejected() {
        let (stocks, _, ids, now) = setup();
        let mut ledger = TradeLedger::default();
        let err = ledger
            .record(
                TradeRequest::new(
                    ParticipantId::from("p"),
                    StockId::from("nope"),
                    TradeSide::Buy,
                    1,
                    1.0,
                ),
                &stocks,
                now,
                &ids,
            )
            .expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::UnknownStock {
                stock_id: String::from("nope")
            }
        );
        assert!(ledger.is_empty());
    }
}
