//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::run_backtest as run_backtest_engine;
use crate::domain::error::TradesimError;
use crate::domain::ohlcv::format_time;
use crate::domain::report::{BacktestOutcome, BacktestReport};
use crate::domain::strategy::StrategyConfig;
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Daily OHLCV strategy backtester")]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and print the JSON result
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        ticker: Option<String>,
        /// Directory of <TICKER>.csv files; overrides [data] and [sqlite]
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Import a CSV bar file into the SQLite store
    Ingest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Validate the [strategy] section of a config file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers available in the configured store
    ListTickers {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Show the stored date range for ticker(s)
    Info {
        #[arg(short, long)]
        ticker: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Start the HTTP server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [web] bind
        #[arg(long)]
        bind: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Backtest {
            config,
            ticker,
            csv_dir,
            output,
            compact,
        } => run_backtest(
            config.as_deref(),
            ticker.as_deref(),
            csv_dir.as_deref(),
            output.as_deref(),
            compact,
        ),
        Command::Ingest {
            config,
            ticker,
            csv,
        } => run_ingest(&config, &ticker, &csv),
        Command::Validate { config } => run_validate(&config),
        Command::ListTickers { config, csv_dir } => {
            run_list_tickers(config.as_deref(), csv_dir.as_deref())
        }
        Command::Info {
            ticker,
            config,
            csv_dir,
        } => run_info(ticker.as_deref(), config.as_deref(), csv_dir.as_deref()),
        Command::Serve { config, bind } => run_serve(&config, bind.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TradesimError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn load_optional_config(path: Option<&Path>) -> Result<Option<FileConfigAdapter>, TradesimError> {
    path.map(load_config).transpose()
}

/// Pick the bar source: `--csv-dir`, then `[data] csv_dir`, then `[sqlite] path`.
pub fn open_data_port(
    config: Option<&dyn ConfigPort>,
    csv_dir: Option<&Path>,
) -> Result<Box<dyn DataPort + Send + Sync>, TradesimError> {
    if let Some(dir) = csv_dir {
        return Ok(Box::new(CsvAdapter::new(dir.to_path_buf())));
    }
    if let Some(dir) = config.and_then(|c| c.get_string("data", "csv_dir")) {
        return Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))));
    }

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        if let Some(config) = config.filter(|c| c.get_string("sqlite", "path").is_some()) {
            return Ok(Box::new(SqliteAdapter::from_config(config)?));
        }
    }

    Err(TradesimError::ConfigMissing {
        section: "data".into(),
        key: "csv_dir".into(),
    })
}

pub fn resolve_ticker(
    ticker_override: Option<&str>,
    config: Option<&dyn ConfigPort>,
) -> Result<String, TradesimError> {
    ticker_override
        .map(str::to_string)
        .or_else(|| config.and_then(|c| c.get_string("backtest", "ticker")))
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "ticker".into(),
        })
}

fn run_backtest(
    config_path: Option<&Path>,
    ticker: Option<&str>,
    csv_dir: Option<&Path>,
    output_path: Option<&Path>,
    compact: bool,
) -> Result<ExitCode, TradesimError> {
    let config = load_optional_config(config_path)?;
    let config_port = config.as_ref().map(|c| c as &dyn ConfigPort);

    let strategy = match config_port {
        Some(c) => StrategyConfig::from_config(c)?,
        None => StrategyConfig::default(),
    };
    let ticker = resolve_ticker(ticker, config_port)?;
    let data_port = open_data_port(config_port, csv_dir)?;

    let bars = data_port.fetch_bars(&ticker)?;
    info!(ticker = %ticker, bars = bars.len(), "loaded bars");

    let outcome = run_backtest_engine(&ticker, &bars, &strategy)?;
    JsonReportAdapter { compact }.write(&outcome, output_path)?;
    if let Some(path) = output_path {
        eprintln!("Result written to: {}", path.display());
    }

    match &outcome {
        BacktestOutcome::Report(report) => {
            print_summary(report, &strategy);
            Ok(ExitCode::SUCCESS)
        }
        BacktestOutcome::NoData { .. } => {
            let err = TradesimError::NoData { ticker };
            eprintln!("error: {err}");
            Ok((&err).into())
        }
    }
}

fn print_summary(report: &BacktestReport, strategy: &StrategyConfig) {
    let voting: Vec<String> = strategy
        .voting_indicators()
        .iter()
        .map(|i| i.to_string())
        .collect();

    eprintln!("\n=== {} ===", report.ticker);
    eprintln!("Indicators:       {}", voting.join(", "));
    eprintln!("Days:             {}", report.results.len());
    eprintln!("Final Return:     {:.2}%", report.final_return);
    eprintln!("Total Trades:     {}", report.total_trades);
    eprintln!("Win Rate:         {:.1}%", report.win_rate);
    eprintln!("Max Drawdown:     -{:.1}%", report.max_drawdown);
}

fn run_ingest(config_path: &Path, ticker: &str, csv_path: &Path) -> Result<ExitCode, TradesimError> {
    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::csv_adapter::read_bars_file;
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::ports::data_port::BarStorePort;

        let config = load_config(config_path)?;
        let ticker = resolve_ticker(Some(ticker), None)?;
        let store = SqliteAdapter::from_config(&config)?;
        store.initialize_schema()?;

        let bars = read_bars_file(csv_path)?;
        let inserted = store.upsert_bars(&ticker, &bars)?;
        eprintln!(
            "{}: {} bars read, {} inserted, {} already present",
            ticker,
            bars.len(),
            inserted,
            bars.len() - inserted
        );
        Ok(ExitCode::SUCCESS)
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, ticker, csv_path);
        eprintln!("error: sqlite feature is required for ingest");
        Ok(ExitCode::from(1))
    }
}

fn run_validate(config_path: &Path) -> Result<ExitCode, TradesimError> {
    let config = load_config(config_path)?;
    let strategy = StrategyConfig::from_config(&config)?;

    eprintln!("Indicators:");
    let voting = strategy.voting_indicators();
    for indicator in strategy.indicators() {
        let role = if voting.contains(&indicator) {
            "votes"
        } else {
            "display only"
        };
        eprintln!("  {:<20} {}", indicator.to_string(), role);
    }
    if voting.is_empty() {
        eprintln!("warning: no indicator enabled, every run stays flat");
    }

    eprintln!("\nStrategy configuration is valid.");
    Ok(ExitCode::SUCCESS)
}

fn run_list_tickers(
    config_path: Option<&Path>,
    csv_dir: Option<&Path>,
) -> Result<ExitCode, TradesimError> {
    let config = load_optional_config(config_path)?;
    let data_port = open_data_port(config.as_ref().map(|c| c as &dyn ConfigPort), csv_dir)?;

    let tickers = data_port.list_tickers()?;
    if tickers.is_empty() {
        eprintln!("No tickers found");
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_info(
    ticker: Option<&str>,
    config_path: Option<&Path>,
    csv_dir: Option<&Path>,
) -> Result<ExitCode, TradesimError> {
    let config = load_optional_config(config_path)?;
    let config_port = config.as_ref().map(|c| c as &dyn ConfigPort);
    let data_port = open_data_port(config_port, csv_dir)?;

    let tickers = match ticker {
        Some(t) => vec![resolve_ticker(Some(t), None)?],
        None => data_port.list_tickers()?,
    };

    for t in &tickers {
        match data_port.get_data_range(t) {
            Ok(Some((first, last, count))) => {
                println!(
                    "{}: {} bars, {} to {}",
                    t,
                    count,
                    format_time(&first),
                    format_time(&last)
                );
            }
            Ok(None) => eprintln!("{}: no data found", t),
            Err(e) => eprintln!("error querying {}: {}", t, e),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_serve(config_path: &Path, bind: Option<&str>) -> Result<ExitCode, TradesimError> {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, DEFAULT_BIND, build_router};
        use std::net::SocketAddr;
        use std::sync::Arc;

        let config = load_config(config_path)?;
        let data_port: Arc<dyn DataPort + Send + Sync> =
            Arc::from(open_data_port(Some(&config), None)?);

        let bind = bind
            .map(str::to_string)
            .or_else(|| config.get_string("web", "bind"))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| TradesimError::invalid("web", "bind", format!("'{bind}': {e}")))?;

        let router = build_router(AppState { data_port });

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "listening");
            axum::serve(listener, router).await?;
            Ok::<(), std::io::Error>(())
        })?;

        Ok(ExitCode::SUCCESS)
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, bind);
        eprintln!("error: web feature is required for serve");
        Ok(ExitCode::from(1))
    }
}
