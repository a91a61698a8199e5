use serde::Serialize;
use stocksim_core::{LeaderboardEntry, ParticipantId, PortfolioValuation};

use crate::cli::{LeaderboardArgs, PortfolioArgs};
use crate::error::CliError;
use crate::output::{money, percent, Table};

use super::{CommandResult, Session};

pub fn portfolio(args: &PortfolioArgs, session: &Session) -> Result<CommandResult, CliError> {
    let participant_id = ParticipantId::from(args.participant.trim());
    let valuation: PortfolioValuation = session.market.portfolio(&participant_id);

    let mut table = Table::new(vec![
        "symbol", "shares", "avg_cost", "price", "value", "cost", "gain", "gain%",
    ]);
    for holding in valuation.holdings.values() {
        table.push(vec![
            holding.symbol.to_string(),
            holding.net_shares.to_string(),
            money(holding.average_cost),
            money(holding.current_price),
            money(holding.current_value),
            money(holding.cost_basis),
            money(holding.gain_loss),
            percent(holding.gain_loss_percent),
        ]);
    }
    table.push(vec![
        String::from("TOTAL"),
        String::new(),
        String::new(),
        String::new(),
        money(valuation.total_value),
        money(valuation.total_cost),
        money(valuation.total_gain_loss),
        percent(valuation.total_gain_loss_percent),
    ]);

    let mut result = CommandResult::ok(serde_json::to_value(&valuation)?).with_table(table);
    if session.market.participant(&participant_id).is_none() {
        result = result.with_warning(format!("participant '{participant_id}' is not registered"));
    }
    Ok(result)
}

#[derive(Debug, Serialize)]
struct LeaderboardResponseData {
    refreshed: Option<usize>,
    entries: Vec<LeaderboardEntry>,
}

pub fn leaderboard(args: &LeaderboardArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let refreshed = if args.refresh {
        Some(session.market.refresh_portfolio_values()?)
    } else {
        None
    };

    let entries: Vec<LeaderboardEntry> = session
        .market
        .leaderboard()
        .into_iter()
        .take(args.limit)
        .collect();

    let mut table = Table::new(vec![
        "rank", "participant", "name", "portfolio", "wallet", "net_worth", "live",
    ]);
    for entry in &entries {
        table.push(vec![
            entry.rank.to_string(),
            entry.participant_id.to_string(),
            entry.name.clone(),
            money(entry.portfolio_value),
            money(entry.wallet_balance),
            money(entry.net_worth),
            money(entry.live_portfolio_value),
        ]);
    }

    let data = LeaderboardResponseData { refreshed, entries };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(table))
}
