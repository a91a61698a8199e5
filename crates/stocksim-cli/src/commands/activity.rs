use serde::Serialize;
use stocksim_core::ActivityLog;

use crate::cli::ActivityArgs;
use crate::error::CliError;
use crate::output::Table;

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct ActivityResponseData<'a> {
    total: usize,
    entries: &'a [ActivityLog],
}

pub fn run(args: &ActivityArgs, session: &Session) -> Result<CommandResult, CliError> {
    let total = session.market.activity().len();
    let entries = session.market.recent_activity(args.limit);

    let mut table = Table::new(vec!["timestamp", "category", "user", "action", "details"]);
    for entry in entries {
        table.push(vec![
            entry.timestamp.to_string(),
            entry.category.as_str().to_owned(),
            entry.user_id.clone(),
            entry.action.clone(),
            entry.details.clone(),
        ]);
    }

    let data = ActivityResponseData {
        total,
        entries,
    };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(table))
}
