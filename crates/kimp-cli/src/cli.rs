//! CLI argument definitions for kimp.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `premium` | Premium records for every asset listed domestically and on Binance |
//! | `coin` | Unfiltered single-asset view |
//! | `rate` | USD/KRW reference rate |
//! | `prices` | Raw prices from one exchange |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Exit with code 5 when the run produced warnings |
//! | `--timeout-ms` | `KIMP_TIMEOUT_MS` or 5000 | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! kimp premium --sort premium --limit 20 --format table
//! kimp coin btc --pretty
//! kimp prices binance BTC ETH
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Kimchi premium across Upbit, Bithumb and Binance.
#[derive(Debug, Parser)]
#[command(
    name = "kimp",
    author,
    version,
    about = "Kimchi premium across Upbit, Bithumb and Binance",
    long_about = "kimp compares KRW prices on Upbit and Bithumb with Binance USDT prices \
converted at the live USD/KRW rate.\n\
\n\
Upstream endpoints can be overridden with KIMP_UPBIT_BASE_URL, KIMP_BITHUMB_BASE_URL, \
KIMP_BINANCE_BASE_URL and KIMP_FX_URL. Logs go to stderr and honor RUST_LOG."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Per-request timeout in milliseconds. Overrides KIMP_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON envelope.
    Json,
    /// Aligned text table.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Premium for every asset on Binance and at least one Korean exchange.
    Premium(PremiumArgs),

    /// Prices and premiums for one asset, without inclusion filtering.
    ///
    ///   kimp coin BTC
    Coin(CoinArgs),

    /// Current USD/KRW reference rate.
    Rate,

    /// Raw prices from one exchange.
    ///
    /// Without symbols Upbit and Bithumb return their full KRW book. Binance
    /// needs explicit symbols.
    ///
    ///   kimp prices bithumb
    ///   kimp prices binance BTC ETH USDT
    Prices(PricesArgs),
}

/// Ordering of `premium` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Combined 24h KRW traded value, largest first.
    Volume,
    /// Upbit premium (Bithumb when not on Upbit), highest first.
    Premium,
    /// Alphabetical.
    Symbol,
}

#[derive(Debug, Args)]
pub struct PremiumArgs {
    #[arg(long, value_enum, default_value_t = SortKey::Volume)]
    pub sort: SortKey,

    /// Keep only the first N rows after sorting.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct CoinArgs {
    /// Asset ticker, e.g. BTC.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    /// upbit, bithumb or binance.
    pub exchange: String,

    /// Asset tickers to look up.
    pub symbols: Vec<String>,
}
