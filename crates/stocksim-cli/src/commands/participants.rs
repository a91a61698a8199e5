use serde::Serialize;
use stocksim_core::{Participant, ParticipantDraft, RiskTolerance};

use crate::cli::{ParticipantAddArgs, RiskArg, SetBalanceArgs};
use crate::error::CliError;
use crate::output::{money, Table};

use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct ParticipantsResponseData<'a> {
    participants: &'a [Participant],
}

fn participant_table<'a>(participants: impl IntoIterator<Item = &'a Participant>) -> Table {
    let mut table = Table::new(vec![
        "id", "name", "username", "risk", "wallet", "portfolio", "net_worth",
    ]);
    for participant in participants {
        table.push(vec![
            participant.id.to_string(),
            participant.name.clone(),
            participant.username.clone(),
            participant.risk_tolerance.as_str().to_owned(),
            money(participant.wallet_balance),
            money(participant.total_portfolio_value),
            money(participant.net_worth()),
        ]);
    }
    table
}

pub fn list(session: &Session) -> Result<CommandResult, CliError> {
    let participants = session.market.participants();
    let data = ParticipantsResponseData { participants };
    Ok(CommandResult::ok(serde_json::to_value(&data)?)
        .with_table(participant_table(participants)))
}

pub fn add(args: &ParticipantAddArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let risk = match args.risk {
        RiskArg::Low => RiskTolerance::Low,
        RiskArg::Medium => RiskTolerance::Medium,
        RiskArg::High => RiskTolerance::High,
    };
    let mut draft = ParticipantDraft::new(args.name.clone(), args.email.clone())
        .with_risk_tolerance(risk)
        .with_wallet_balance(args.wallet);
    if let Some(username) = &args.username {
        draft = draft.with_username(username.clone());
    }

    let participant = session.market.add_participant(draft)?;
    Ok(CommandResult::ok(serde_json::to_value(&participant)?)
        .with_table(participant_table([&participant])))
}

pub fn set_balance(args: &SetBalanceArgs, session: &mut Session) -> Result<CommandResult, CliError> {
    let participant_id = session.resolve_participant(&args.participant)?;
    session
        .market
        .update_wallet_balance(&participant_id, args.balance)?;

    let participant = session
        .market
        .participant(&participant_id)
        .ok_or_else(|| CliError::NotFound(format!("participant '{participant_id}'")))?;
    Ok(CommandResult::ok(serde_json::to_value(participant)?)
        .with_table(participant_table([participant])))
}
