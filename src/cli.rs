//! CLI definition and dispatch.

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::{
    currency_symbol, render_summary, render_sweep, render_trades,
};
use crate::adapters::csv_adapter::{CsvAdapter, CsvExportAdapter, write_sweep};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report::HtmlReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    check_backtest_numbers, parse_optional_date, parse_sizing, parse_windows,
    validate_backtest_config, validate_data_config,
};
use crate::domain::error::SmacrossError;
use crate::domain::price::PriceSeries;
use crate::domain::sweep::{WindowGrid, WindowRange, rank_by_sharpe, run_sweep};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportContext, ReportPort};

/// Default look-back when `[data] start_date` is absent.
pub const DEFAULT_YEARS_BACK: i64 = 5;

#[derive(Parser, Debug)]
#[command(name = "smacross", about = "SMA crossover strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and print the strategy vs buy-and-hold summary
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        short: Option<usize>,
        #[arg(long)]
        long: Option<usize>,
        #[arg(long)]
        capital: Option<f64>,
        /// HTML report path (overrides [report] output)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory for equity/benchmark/trade CSV exports
        #[arg(long)]
        export_dir: Option<PathBuf>,
        /// Print the trade log
        #[arg(long)]
        trades: bool,
    },
    /// Run every window pair in a grid and rank by Sharpe ratio
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
        /// Short windows as start:end:step
        #[arg(long)]
        short: WindowRange,
        /// Long windows as start:end:step
        #[arg(long)]
        long: WindowRange,
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// CSV file for the full result grid
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available date range for an instrument
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
    /// List instruments in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Parameter overrides taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct BacktestOverrides {
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub initial_capital: Option<f64>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            code,
            short,
            long,
            capital,
            output,
            export_dir,
            trades,
        } => run_backtest(
            &config,
            code.as_deref(),
            &BacktestOverrides {
                short_window: short,
                long_window: long,
                initial_capital: capital,
            },
            output.as_deref(),
            export_dir.as_deref(),
            trades,
        ),
        Command::Sweep {
            config,
            code,
            short,
            long,
            top,
            output,
        } => run_sweep_command(
            &config,
            code.as_deref(),
            WindowGrid { short, long },
            top,
            output.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, code } => run_info(&config, code.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SmacrossError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// `[backtest]` values with command-line overrides applied on top.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    overrides: &BacktestOverrides,
) -> Result<BacktestConfig, SmacrossError> {
    check_backtest_numbers(config)?;
    let defaults = BacktestConfig::default();

    let (config_short, config_long) = parse_windows(config)?;
    let short_window = overrides.short_window.unwrap_or(config_short);
    let long_window = overrides.long_window.unwrap_or(config_long);
    let initial_capital = overrides.initial_capital.unwrap_or_else(|| {
        config.get_double("backtest", "initial_capital", defaults.initial_capital)
    });
    let periods = config.get_int(
        "backtest",
        "periods_per_year",
        i64::from(defaults.periods_per_year),
    );
    let periods_per_year = u32::try_from(periods).map_err(|_| SmacrossError::ConfigInvalid {
        section: "backtest".into(),
        key: "periods_per_year".into(),
        reason: format!("periods_per_year out of range: {}", periods),
    })?;

    let bt = BacktestConfig {
        short_window,
        long_window,
        initial_capital,
        periods_per_year,
        sizing: parse_sizing(config)?,
    };
    bt.validate()?;
    Ok(bt)
}

pub fn resolve_code(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<String, SmacrossError> {
    code_override
        .map(str::to_string)
        .or_else(|| config.get_string("data", "code"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| SmacrossError::ConfigMissing {
            section: "data".into(),
            key: "code".into(),
        })
}

/// `[data] start_date/end_date`; end defaults to `today`, start to five years
/// (5 × 365 days) before end.
pub fn resolve_date_range(
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), SmacrossError> {
    let end = parse_optional_date(config, "data", "end_date")?.unwrap_or(today);
    let start = parse_optional_date(config, "data", "start_date")?
        .unwrap_or_else(|| end - Duration::days(DEFAULT_YEARS_BACK * 365));
    if start >= end {
        return Err(SmacrossError::ConfigInvalid {
            section: "data".into(),
            key: "start_date".into(),
            reason: "start_date must be before end_date".into(),
        });
    }
    Ok((start, end))
}

fn open_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, SmacrossError> {
    let path = config
        .get_string("data", "path")
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| SmacrossError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path.trim())))
}

pub fn load_series(
    port: &dyn DataPort,
    code: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, SmacrossError> {
    let bars = port.fetch_prices(code, start, end)?;
    if bars.is_empty() {
        return Err(SmacrossError::NoData {
            code: code.to_string(),
        });
    }
    info!(code, bars = bars.len(), %start, %end, "loaded prices");
    PriceSeries::new(bars)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_backtest(
    config_path: &Path,
    code_override: Option<&str>,
    overrides: &BacktestOverrides,
    output_path: Option<&Path>,
    export_dir: Option<&Path>,
    show_trades: bool,
) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;
    validate_backtest_config(&adapter)?;

    let bt_config = build_backtest_config(&adapter, overrides)?;
    let code = resolve_code(code_override, &adapter)?;
    let (start, end) = resolve_date_range(&adapter, today())?;
    let port = open_data_port(&adapter)?;
    let series = load_series(&port, &code, start, end)?;

    let result = backtest_engine::run_backtest(&series, &bt_config)?;

    let currency = adapter
        .get_string("report", "currency")
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| currency_symbol(&code).to_string());
    let ctx = ReportContext {
        code: &code,
        currency: &currency,
        config: &bt_config,
        start_date: series.first_date().unwrap_or(start),
        end_date: series.last_date().unwrap_or(end),
    };

    println!("{}", render_summary(&result, &ctx));
    if show_trades || adapter.get_bool("report", "trades", false) {
        println!("{}", render_trades(&result, &currency));
    }

    let html_path = output_path
        .map(Path::to_path_buf)
        .or_else(|| adapter.get_string("report", "output").map(PathBuf::from));
    if let Some(path) = html_path {
        HtmlReportAdapter::new().write(&result, &ctx, &path)?;
        eprintln!("Report written to: {}", path.display());
    }

    if let Some(dir) = export_dir {
        CsvExportAdapter.write(&result, &ctx, dir)?;
        eprintln!("CSV exports written to: {}", dir.display());
    }

    Ok(())
}

fn run_sweep_command(
    config_path: &Path,
    code_override: Option<&str>,
    grid: WindowGrid,
    top: usize,
    output_path: Option<&Path>,
) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;
    validate_backtest_config(&adapter)?;

    let base = build_backtest_config(&adapter, &BacktestOverrides::default())?;
    let code = resolve_code(code_override, &adapter)?;
    let (start, end) = resolve_date_range(&adapter, today())?;
    let port = open_data_port(&adapter)?;
    let series = load_series(&port, &code, start, end)?;

    let outcomes = run_sweep(&series, &grid, &base);
    if outcomes.is_empty() {
        return Err(SmacrossError::configuration(
            "long_window",
            format!("no valid window pairs for {} bars", series.len()),
        ));
    }

    let ranked = rank_by_sharpe(&outcomes);
    let failed = outcomes.len() - ranked.len();
    println!(
        "{}: {} runs, {} failed, top {} by Sharpe",
        code,
        outcomes.len(),
        failed,
        top.min(ranked.len())
    );
    println!("{}", render_sweep(&ranked, top));

    if let Some(path) = output_path {
        write_sweep(fs::File::create(path)?, &outcomes)?;
        eprintln!("Sweep results written to: {}", path.display());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;
    validate_backtest_config(&adapter)?;

    let bt = build_backtest_config(&adapter, &BacktestOverrides::default())?;
    let code = resolve_code(None, &adapter)?;
    let (start, end) = resolve_date_range(&adapter, today())?;

    println!("Configuration is valid");
    println!("  code:             {}", code);
    println!("  date range:       {} to {}", start, end);
    println!("  short_window:     {}", bt.short_window);
    println!("  long_window:      {}", bt.long_window);
    println!("  initial_capital:  {}", bt.initial_capital);
    println!("  periods_per_year: {}", bt.periods_per_year);
    println!("  sizing:           {:?}", bt.sizing);
    Ok(())
}

fn run_info(config_path: &Path, code_override: Option<&str>) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    let code = resolve_code(code_override, &adapter)?;
    let port = open_data_port(&adapter)?;

    match port.get_data_range(&code)? {
        Some((first, last, count)) => {
            println!("{}: {} bars, {} to {}", code, count, first, last);
            Ok(())
        }
        None => Err(SmacrossError::NoData { code }),
    }
}

fn run_list_symbols(config_path: &Path) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    let port = open_data_port(&adapter)?;
    let symbols = port.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
