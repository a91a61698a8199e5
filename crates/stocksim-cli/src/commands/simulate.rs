use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use stocksim_core::config::parse_tick_interval;
use stocksim_core::{shared, LiveTicker};

use crate::cli::SimulateArgs;
use crate::error::CliError;

use super::stocks::stock_table;
use super::{CommandResult, Session};

#[derive(Debug, Serialize)]
struct SimulateResponseData {
    mode: &'static str,
    ticks_applied: u64,
    interval_ms: Option<u64>,
    interrupted: bool,
}

pub async fn run(args: &SimulateArgs, session: Session) -> Result<CommandResult, CliError> {
    if args.live {
        return run_live(args, session).await;
    }

    if args.ticks == 0 {
        return Err(CliError::Command(String::from(
            "--ticks must be greater than zero",
        )));
    }

    let Session { mut market, .. } = session;
    for _ in 0..args.ticks {
        market.apply_tick_cycle()?;
    }

    let data = SimulateResponseData {
        mode: "batch",
        ticks_applied: market.ticks_applied(),
        interval_ms: None,
        interrupted: false,
    };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(stock_table(market.stocks())))
}

async fn run_live(args: &SimulateArgs, session: Session) -> Result<CommandResult, CliError> {
    let interval = match args.interval_ms {
        Some(ms) => parse_tick_interval(&ms.to_string())?,
        None => session.config.tick_interval,
    };
    if args.duration_secs == 0 {
        return Err(CliError::Command(String::from(
            "--duration-secs must be greater than zero",
        )));
    }

    let market = shared(session.market);
    let mut ticker = LiveTicker::new(Arc::clone(&market), interval);
    ticker.start();

    let interrupted = tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.duration_secs)) => false,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            true
        }
    };
    ticker.stop();

    let market = market.lock().expect("market lock is not poisoned");
    let data = SimulateResponseData {
        mode: "live",
        ticks_applied: market.ticks_applied(),
        interval_ms: Some(interval.as_millis() as u64),
        interrupted,
    };
    Ok(CommandResult::ok(serde_json::to_value(&data)?).with_table(stock_table(market.stocks())))
}
