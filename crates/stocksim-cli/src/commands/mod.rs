mod activity;
mod news;
mod participants;
mod portfolio;
mod simulate;
mod status;
mod stocks;
mod store;
mod trades;

use std::sync::Arc;

use serde_json::Value;
use stocksim_core::{
    Market, MarketPorts, ParticipantId, SimConfig, StockId, Symbol, UtcDateTime, Warehouse,
};

use crate::cli::{Cli, Command, NewsCommand, ParticipantsCommand, StocksCommand};
use crate::error::CliError;
use crate::output::{Report, Table};

pub struct CommandResult {
    pub data: Value,
    pub table: Option<Table>,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            table: None,
            warnings: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Everything a command may touch.
pub struct Session {
    pub config: SimConfig,
    pub warehouse: Warehouse,
    pub market: Market,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self, CliError> {
        let mut config = SimConfig::from_env()?;
        if let Some(home) = &cli.home {
            config = config.with_home(home);
        }
        if let Some(db) = &cli.db {
            config = config.with_db_path(db);
        }
        config = config.in_memory(cli.memory);

        let warehouse = if config.in_memory {
            Warehouse::open_in_memory()?
        } else {
            Warehouse::open(config.warehouse_config())?
        };
        let market = Market::open(Arc::new(warehouse.clone()), MarketPorts::system())?;
        tracing::debug!(
            in_memory = config.in_memory,
            home = %config.home.display(),
            "session opened"
        );

        Ok(Self {
            config,
            warehouse,
            market,
        })
    }

    /// Accepts either a stock id or a ticker symbol.
    pub fn resolve_stock(&self, raw: &str) -> Result<StockId, CliError> {
        let by_id = StockId::from(raw.trim());
        if self.market.stock(&by_id).is_some() {
            return Ok(by_id);
        }

        if let Ok(symbol) = Symbol::parse(raw) {
            if let Some(stock) = self.market.stock_by_symbol(&symbol) {
                return Ok(stock.id.clone());
            }
        }

        Err(CliError::NotFound(format!("stock '{}'", raw.trim())))
    }

    pub fn resolve_participant(&self, raw: &str) -> Result<ParticipantId, CliError> {
        let id = ParticipantId::from(raw.trim());
        if self.market.participant(&id).is_none() {
            return Err(CliError::NotFound(format!("participant '{id}'")));
        }
        Ok(id)
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let mut session = Session::open(cli)?;

    let (name, result) = match &cli.command {
        Command::Status(args) => ("status", status::run(args, &mut session)?),
        Command::Reset => ("reset", status::reset(&mut session)?),
        Command::Stocks(args) => match &args.command {
            StocksCommand::List => ("stocks.list", stocks::list(&session)?),
            StocksCommand::Add(args) => ("stocks.add", stocks::add(args, &mut session)?),
            StocksCommand::Remove(args) => ("stocks.remove", stocks::remove(args, &mut session)?),
            StocksCommand::SetPrice(args) => {
                ("stocks.set_price", stocks::set_price(args, &mut session)?)
            }
            StocksCommand::History(args) => ("stocks.history", stocks::history(args, &session)?),
        },
        Command::Trade(args) => ("trade", trades::record(args, &mut session)?),
        Command::Trades(args) => ("trades", trades::list(args, &session)?),
        Command::Portfolio(args) => ("portfolio", portfolio::portfolio(args, &session)?),
        Command::Leaderboard(args) => ("leaderboard", portfolio::leaderboard(args, &mut session)?),
        Command::Participants(args) => match &args.command {
            ParticipantsCommand::List => ("participants.list", participants::list(&session)?),
            ParticipantsCommand::Add(args) => {
                ("participants.add", participants::add(args, &mut session)?)
            }
            ParticipantsCommand::SetBalance(args) => (
                "participants.set_balance",
                participants::set_balance(args, &mut session)?,
            ),
        },
        Command::News(args) => match &args.command {
            NewsCommand::List(args) => ("news.list", news::list(args, &session)?),
            NewsCommand::Publish(args) => ("news.publish", news::publish(args, &mut session)?),
        },
        Command::Activity(args) => ("activity", activity::run(args, &session)?),
        Command::Simulate(args) => ("simulate", simulate::run(args, session).await?),
        Command::Store(_) => ("store.list", store::list(&session)?),
    };

    let CommandResult {
        data,
        table,
        warnings,
    } = result;

    Ok(Report {
        command: name,
        generated_at: UtcDateTime::now(),
        data,
        table,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use super::run;
    use crate::cli::Cli;
    use crate::error::CliError;

    fn parse(home: &std::path::Path, args: &[&str]) -> Cli {
        let home = home.to_string_lossy().into_owned();
        let mut argv = vec!["stocksim", "--home", home.as_str()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments parse")
    }

    #[tokio::test]
    async fn trade_recorded_in_one_run_is_listed_in_the_next() {
        let temp = tempdir().expect("tempdir");

        let report = run(&parse(
            temp.path(),
            &["trade", "participant_1", "AAPL", "buy", "10", "--price", "100"],
        ))
        .await
        .expect("trade command");
        assert_eq!(report.command, "trade");
        assert!(report.warnings.is_empty());

        let report = run(&parse(temp.path(), &["trades"])).await.expect("trades command");
        assert_eq!(report.data["total"], 1);
        assert_eq!(report.data["trades"][0]["symbol"], "AAPL");
        assert_eq!(report.data["trades"][0]["quantity"], 10);
    }

    #[tokio::test]
    async fn trades_and_activity_can_be_narrowed() {
        let temp = tempdir().expect("tempdir");
        for participant in ["participant_1", "participant_2"] {
            run(&parse(temp.path(), &["trade", participant, "MSFT", "buy", "1"]))
                .await
                .expect("trade command");
        }

        let report = run(&parse(temp.path(), &["trades", "--participant", "participant_2"]))
            .await
            .expect("trades command");
        assert_eq!(report.data["total"], 1);
        assert_eq!(report.data["trades"][0]["participant_id"], "participant_2");

        let report = run(&parse(temp.path(), &["activity", "--limit", "1"]))
            .await
            .expect("activity command");
        assert_eq!(report.data["total"], 2);
        assert_eq!(report.data["entries"].as_array().map(Vec::len), Some(1));
        let latest = report.data["entries"][0]["details"].as_str().unwrap_or_default();
        assert!(latest.ends_with("for participant_2"));
    }

    #[tokio::test]
    async fn unknown_stock_is_reported_as_not_found() {
        let temp = tempdir().expect("tempdir");

        let error = run(&parse(temp.path(), &["stocks", "set-price", "NOPE", "10"]))
            .await
            .err()
            .expect("unknown stock fails");

        assert!(matches!(error, CliError::NotFound(_)));
        assert_eq!(error.exit_code(), 3);
    }

    #[tokio::test]
    async fn memory_mode_leaves_no_database_behind() {
        let temp = tempdir().expect("tempdir");

        let report = run(&parse(temp.path(), &["--memory", "status"]))
            .await
            .expect("status command");

        assert!(report.data["database"].is_null());
        assert!(!temp.path().join("data").exists());
    }
}
