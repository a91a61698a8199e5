use serde::Serialize;
use stocksim_core::{PricePoint, Stock, StockSpec, Symbol};

use crate::cli::{HistoryArgs, SetPriceArgs, StockAddArgs, StockRefArgs};
use crate::error::CliError;
use crate::output::{money, percent, Table};

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct StockListResponseData<'a> {
    stocks: Vec<StockSummary<'a>>,
}

/// A stock without its price history.
#[derive(Debug, Serialize)]
struct StockSummary<'a> {
    id: &'a str,
    symbol: &'a str,
    name: &'a str,
    sector: &'a str,
    price: f64,
    previous_price: f64,
    change: f64,
    change_percent: f64,
    volume: u64,
    market_cap: f64,
    last_updated: String,
}

impl<'a> From<&'a Stock> for StockSummary<'a> {
    fn from(stock: &'a Stock) -> Self {
        Self {
            id: stock.id.as_str(),
            symbol: stock.symbol.as_str(),
            name: &stock.name,
            sector: &stock.sector,
            price: stock.price,
            previous_price: stock.previous_price,
            change: stock.change,
            change_percent: stock.change_percent,
            volume: stock.volume,
            market_cap: stock.market_cap,
            last_updated: stock.last_updated.to_string(),
        }
    }
}

pub(super) fn stock_table<'a>(stocks: impl IntoIterator<Item = &'a Stock>) -> Table {
    let mut table = Table::new(vec!["id", "symbol", "name", "price", "change", "change%", "volume"]);
    for stock in stocks {
        table.push(vec![
            stock.id.to_string(),
            stock.symbol.to_string(),
            stock.name.clone(),
            money(stock.price),
            money(stock.change),
            percent(stock.change_percent),
            stock.volume.to_string(),
        ]);
    }
    table
}

pub fn list(session: &Session) -> Result<CommandResult, CliError> {
    let stocks = session.market.stocks();
    let data = StockListResponseData {
        stocks: stocks.iter().map(StockSummary::from).collect(),
    };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(stock_table(stocks)))
}

pub fn add(args: &StockAddArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let mut warnings = Vec::new();
    if session.market.stock_by_symbol(&symbol).is_some() {
        warnings.push(format!("symbol {symbol} is already listed"));
    }

    let mut spec = StockSpec::new(symbol, args.name.clone(), args.price).with_sector(&args.sector);
    if let Some(previous_price) = args.previous_price {
        spec = spec.with_previous_price(previous_price);
    }
    if let Some(market_cap) = args.market_cap {
        spec = spec.with_market_cap(market_cap);
    }

    let stock = session.market.add_stock(spec)?;
    let mut result = CommandResult::ok(serde_json::to_value(StockSummary::from(&stock))?)
        .with_table(stock_table([&stock]));
    for warning in warnings {
        result = result.with_warning(warning);
    }
    Ok(result)
}

pub fn remove(args: &StockRefArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let stock_id = session.resolve_stock(&args.stock)?;
    let dangling = session
        .market
        .trades()
        .iter()
        .filter(|trade| trade.stock_id == stock_id)
        .count();

    let removed = session
        .market
        .remove_stock(&stock_id)?
        .ok_or_else(|| CliError::NotFound(format!("stock '{stock_id}'")))?;

    let mut result = CommandResult::ok(serde_json::to_value(StockSummary::from(&removed))?)
        .with_table(stock_table([&removed]));
    if dangling > 0 {
        result = result.with_warning(format!(
            "{dangling} trade(s) still reference {}; holdings in it are valued at 0",
            removed.symbol
        ));
    }
    Ok(result)
}

pub fn set_price(args: &SetPriceArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let stock_id = session.resolve_stock(&args.stock)?;
    if !session.market.update_stock_price(&stock_id, args.price)? {
        return Err(CliError::NotFound(format!("stock '{stock_id}'")));
    }

    let stock = session
        .market
        .stock(&stock_id)
        .ok_or_else(|| CliError::NotFound(format!("stock '{stock_id}'")))?;
    Ok(CommandResult::ok(serde_json::to_value(StockSummary::from(stock))?)
        .with_table(stock_table([stock])))
}

#[derive(Debug, Serialize)]
struct HistoryResponseData<'a> {
    symbol: &'a str,
    points: Vec<&'a PricePoint>,
}

pub fn history(args: &HistoryArgs, session: &Session) -> Result<CommandResult, CliError> {
    if args.limit == 0 {
        return Err(CliError::Command(String::from(
            "--limit must be greater than zero",
        )));
    }

    let stock_id = session.resolve_stock(&args.stock)?;
    let stock = session
        .market
        .stock(&stock_id)
        .ok_or_else(|| CliError::NotFound(format!("stock '{stock_id}'")))?;

    let skip = stock.price_history.len().saturating_sub(args.limit);
    let points: Vec<&PricePoint> = stock.price_history.iter().skip(skip).collect();

    let mut table = Table::new(vec!["timestamp", "price", "volume"]);
    for point in &points {
        table.push(vec![
            point.timestamp.to_string(),
            money(point.price),
            point.volume.to_string(),
        ]);
    }

    let data = HistoryResponseData {
        symbol: stock.symbol.as_str(),
        points,
    };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(table))
}
