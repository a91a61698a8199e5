use serde::Serialize;
use stocksim_core::{ParticipantId, Trade, TradeRequest, TradeSide};

use crate::cli::{SideArg, TradeArgs, TradesArgs};
use crate::error::CliError;
use crate::output::{money, Table};

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct TradesResponseData<'a> {
    total: usize,
    trades: Vec<&'a Trade>,
}

fn trade_table<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Table {
    let mut table = Table::new(vec![
        "id",
        "timestamp",
        "participant",
        "symbol",
        "side",
        "qty",
        "price",
        "executed_by",
    ]);
    for trade in trades {
        table.push(vec![
            trade.id.to_string(),
            trade.timestamp.to_string(),
            trade.participant_id.to_string(),
            trade.symbol.to_string(),
            trade.side.as_str().to_owned(),
            trade.quantity.to_string(),
            money(trade.price),
            trade.executed_by.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn record(args: &TradeArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let stock_id = session.resolve_stock(&args.stock)?;
    let participant_id = ParticipantId::from(args.participant.trim());
    let participant_known = session.market.participant(&participant_id).is_some();

    let price = match args.price {
        Some(price) => price,
        None => session
            .market
            .stock(&stock_id)
            .map(|stock| stock.price)
            .ok_or_else(|| CliError::NotFound(format!("stock '{stock_id}'")))?,
    };
    let side = match args.side {
        SideArg::Buy => TradeSide::Buy,
        SideArg::Sell => TradeSide::Sell,
    };

    let mut request = TradeRequest::new(participant_id.clone(), stock_id, side, args.quantity, price);
    if let Some(executor) = &args.executed_by {
        request = request.executed_by(executor.trim());
    }

    let trade = session.market.record_trade(request)?;
    let mut result =
        CommandResult::ok(serde_json::to_value(&trade)?).with_table(trade_table([&trade]));
    if !participant_known {
        result = result.with_warning(format!("participant '{participant_id}' is not registered"));
    }
    Ok(result)
}

pub fn list(args: &TradesArgs, session: &Session) -> Result<CommandResult, CliError> {
    let participant = args
        .participant
        .as_deref()
        .map(|raw| ParticipantId::from(raw.trim()));

    let matching: Vec<&Trade> = match &participant {
        Some(id) => session.market.trades_for(id).collect(),
        None => session.market.trades().iter().collect(),
    };
    let total = matching.len();
    let trades: Vec<&Trade> = matching.into_iter().take(args.limit).collect();

    let table = trade_table(trades.iter().copied());
    let mut result = CommandResult::ok(serde_json::to_value(TradesResponseData {
        total,
        trades,
    })?)
    .with_table(table);
    if total > args.limit {
        result = result.with_warning(format!(
            "showing {} of {total} trades (use --limit to see more)",
            args.limit
        ));
    }
    Ok(result)
}
