//! CLI argument definitions for stocksim.
//!
//! Each command stands in for one dashboard action: admins manage stocks,
//! news and participants, employees enter trades, participants read their
//! portfolios and the leaderboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `status` | Show or change system state |
//! | `reset` | Reinitialize the market to a fresh baseline |
//! | `stocks` | List, add, remove and reprice stocks |
//! | `trade` | Record an executed buy or sell |
//! | `trades` | List the trade ledger |
//! | `portfolio` | Value one participant's holdings |
//! | `leaderboard` | Rank participants |
//! | `participants` | List, add and fund participants |
//! | `news` | List or publish news |
//! | `activity` | Show the activity journal |
//! | `simulate` | Apply price ticks, once or live |
//! | `store` | Inspect persisted collections |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--home` | `$STOCKSIM_HOME` or `~/.stocksim` | Data directory |
//! | `--db` | `<home>/data/stocksim.duckdb` | Database file |
//! | `--memory` | `false` | Use a throwaway in-memory database |
//!
//! # Examples
//!
//! ```bash
//! stocksim stocks list --format table
//! stocksim trade participant_1 AAPL buy 10 --price 100
//! stocksim portfolio participant_1 --pretty
//! stocksim simulate --live --duration-secs 30
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stock market simulation: trades, portfolios and live prices.
#[derive(Debug, Parser)]
#[command(
    name = "stocksim",
    author,
    version,
    about = "Stock market simulation CLI",
    long_about = "stocksim simulates a small stock market. Admins list stocks, publish news \
and manage participants; employees record trades; participants follow their portfolio \
value as prices tick.\n\
\n\
State lives in a local DuckDB file and survives between runs.\n\
\n\
Use 'stocksim <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Data directory (overrides STOCKSIM_HOME).
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Database file (overrides <home>/data/stocksim.duckdb).
    #[arg(long, global = true, conflicts_with = "memory")]
    pub db: Option<PathBuf>,

    /// Keep all state in memory for this invocation only.
    #[arg(long, global = true, default_value_t = false)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Aligned columns for terminal display.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show system state, or change it with --set.
    Status(StatusArgs),

    /// Replace stocks, participants and news with a fresh baseline and
    /// clear all trades.
    Reset,

    /// Stock listing management.
    Stocks(StocksArgs),

    /// Record an executed trade.
    ///
    /// # Examples
    ///
    ///   stocksim trade participant_1 AAPL buy 10
    ///   stocksim trade participant_1 3 sell 4 --price 120 --executed-by employee_2
    Trade(TradeArgs),

    /// List recorded trades, most recent first.
    Trades(TradesArgs),

    /// Value a participant's holdings at current prices.
    Portfolio(PortfolioArgs),

    /// Rank participants by cached portfolio value.
    Leaderboard(LeaderboardArgs),

    /// Participant management.
    Participants(ParticipantsArgs),

    /// Market news.
    News(NewsArgs),

    /// Show the activity journal, most recent first.
    Activity(ActivityArgs),

    /// Apply random price ticks.
    ///
    /// # Examples
    ///
    ///   stocksim simulate --ticks 10
    ///   stocksim simulate --live --duration-secs 60 --interval-ms 1000
    Simulate(SimulateArgs),

    /// Inspect persisted collections.
    Store(StoreArgs),
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Switch the system status.
    #[arg(long, value_enum)]
    pub set: Option<StatusArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Active,
    Maintenance,
}

#[derive(Debug, Args)]
pub struct StocksArgs {
    #[command(subcommand)]
    pub command: StocksCommand,
}

#[derive(Debug, Subcommand)]
pub enum StocksCommand {
    /// List all stocks.
    List,

    /// List a new stock.
    Add(StockAddArgs),

    /// Delist a stock. Trades referencing it are kept.
    Remove(StockRefArgs),

    /// Override a stock's price.
    SetPrice(SetPriceArgs),

    /// Show a stock's recent price history.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct StockAddArgs {
    /// Ticker symbol (letters, digits and '.').
    pub symbol: String,

    /// Company name.
    pub name: String,

    /// Listing price.
    #[arg(long)]
    pub price: f64,

    #[arg(long, default_value = "Unclassified")]
    pub sector: String,

    /// Previous close (defaults to the listing price).
    #[arg(long)]
    pub previous_price: Option<f64>,

    #[arg(long)]
    pub market_cap: Option<f64>,
}

#[derive(Debug, Args)]
pub struct StockRefArgs {
    /// Stock id or symbol.
    pub stock: String,
}

#[derive(Debug, Args)]
pub struct SetPriceArgs {
    /// Stock id or symbol.
    pub stock: String,

    pub price: f64,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Stock id or symbol.
    pub stock: String,

    /// Number of most recent points to show.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct TradeArgs {
    /// Participant id.
    pub participant: String,

    /// Stock id or symbol.
    pub stock: String,

    #[arg(value_enum)]
    pub side: SideArg,

    pub quantity: u32,

    /// Execution price (defaults to the stock's current price).
    #[arg(long)]
    pub price: Option<f64>,

    /// Employee recording the trade.
    #[arg(long)]
    pub executed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    Buy,
    Sell,
}

#[derive(Debug, Args)]
pub struct TradesArgs {
    /// Only trades for this participant.
    #[arg(long)]
    pub participant: Option<String>,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct PortfolioArgs {
    /// Participant id.
    pub participant: String,
}

#[derive(Debug, Args)]
pub struct LeaderboardArgs {
    /// Store each participant's live valuation as their cached value first.
    #[arg(long, default_value_t = false)]
    pub refresh: bool,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ParticipantsArgs {
    #[command(subcommand)]
    pub command: ParticipantsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ParticipantsCommand {
    /// List participants.
    List,

    /// Enroll a participant.
    Add(ParticipantAddArgs),

    /// Set a participant's wallet balance.
    SetBalance(SetBalanceArgs),
}

#[derive(Debug, Args)]
pub struct ParticipantAddArgs {
    pub name: String,

    pub email: String,

    /// Defaults to the email's local part.
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, value_enum, default_value_t = RiskArg::Medium)]
    pub risk: RiskArg,

    #[arg(long, default_value_t = 0.0)]
    pub wallet: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RiskArg {
    Low,
    Medium,
    High,
}

#[derive(Debug, Args)]
pub struct SetBalanceArgs {
    /// Participant id.
    pub participant: String,

    pub balance: f64,
}

#[derive(Debug, Args)]
pub struct NewsArgs {
    #[command(subcommand)]
    pub command: NewsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NewsCommand {
    /// List published news, most recent first.
    List(NewsListArgs),

    /// Publish a headline.
    Publish(NewsPublishArgs),
}

#[derive(Debug, Args)]
pub struct NewsListArgs {
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct NewsPublishArgs {
    pub headline: String,

    /// Market impact from 1 (minor) to 5 (major).
    #[arg(long)]
    pub impact: i64,

    #[arg(long, default_value = "general")]
    pub category: String,

    #[arg(long, default_value = "Market Admin")]
    pub published_by: String,
}

#[derive(Debug, Args)]
pub struct ActivityArgs {
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Number of tick cycles to apply immediately.
    #[arg(long, default_value_t = 1, conflicts_with = "live")]
    pub ticks: u32,

    /// Run the live ticker until the duration elapses or Ctrl-C.
    #[arg(long, default_value_t = false)]
    pub live: bool,

    /// How long to run in live mode.
    #[arg(long, default_value_t = 30, requires = "live")]
    pub duration_secs: u64,

    /// Tick interval in live mode (overrides STOCKSIM_TICK_INTERVAL_MS).
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: StoreCommand,
}

#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// List stored collections with their size and last write time.
    List,
}
