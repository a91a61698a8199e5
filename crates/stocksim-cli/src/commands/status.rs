use serde::Serialize;
use stocksim_core::{SystemState, SystemStatus};

use crate::cli::{StatusArg, StatusArgs};
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct StatusResponseData<'a> {
    system: &'a SystemState,
    stocks: usize,
    participants: usize,
    trades: usize,
    news: usize,
    database: Option<String>,
}

pub fn run(args: &StatusArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    if let Some(status) = args.set {
        let status = match status {
            StatusArg::Active => SystemStatus::Active,
            StatusArg::Maintenance => SystemStatus::Maintenance,
        };
        session.market.set_status(status)?;
    }
    describe(session)
}

pub fn reset(session: &mut Session) -> Result<CommandResult, CliError> {
    session.market.reset_system()?;
    describe(session)
}

fn describe(session: &Session) -> Result<CommandResult, CliError> {
    let market = &session.market;
    let system = market.system();
    let data = StatusResponseData {
        system,
        stocks: market.stocks().len(),
        participants: market.participants().len(),
        trades: market.trades().len(),
        news: market.news().len(),
        database: session
            .warehouse
            .db_path()
            .map(|path| path.display().to_string()),
    };

    let mut table = Table::new(vec!["field", "value"]);
    table.push(vec![String::from("status"), system.status.as_str().to_owned()]);
    table.push(vec![String::from("last_reset"), system.last_reset.to_string()]);
    table.push(vec![String::from("total_users"), system.total_users.to_string()]);
    table.push(vec![String::from("total_trades"), system.total_trades.to_string()]);
    table.push(vec![String::from("stocks"), data.stocks.to_string()]);
    table.push(vec![String::from("participants"), data.participants.to_string()]);
    table.push(vec![
        String::from("database"),
        data.database.clone().unwrap_or_else(|| String::from("(memory)")),
    ]);

    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(table))
}
