//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config parsing (build_backtest_config) with defaults and overrides
//! - Code and date range resolution
//! - Argument parsing for every subcommand
//! - Running commands against real INI and CSV files on disk, checking exit codes

mod common;

use clap::Parser;
use common::*;
use smacross::adapters::file_config_adapter::FileConfigAdapter;
use smacross::cli::{self, BacktestOverrides, Cli, Command};
use smacross::domain::error::SmacrossError;
use smacross::domain::portfolio::ShareSizing;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
path = ./data
code = AAPL
start_date = 2020-01-01
end_date = 2024-12-31

[backtest]
short_window = 20
long_window = 100
initial_capital = 50000.0
periods_per_year = 252
sizing = whole

[report]
currency = $
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_backtest_config_valid_full() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let config = cli::build_backtest_config(&adapter, &BacktestOverrides::default()).unwrap();

        assert_eq!(config.short_window, 20);
        assert_eq!(config.long_window, 100);
        assert!((config.initial_capital - 50_000.0).abs() < f64::EPSILON);
        assert_eq!(config.periods_per_year, 252);
        assert_eq!(config.sizing, ShareSizing::Whole);
    }

    #[test]
    fn build_backtest_config_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[data]\ncode = AAPL\n").unwrap();
        let config = cli::build_backtest_config(&adapter, &BacktestOverrides::default()).unwrap();

        assert_eq!(config.short_window, 50);
        assert_eq!(config.long_window, 200);
        assert!((config.initial_capital - 100_000.0).abs() < f64::EPSILON);
        assert_eq!(config.periods_per_year, 252);
        assert_eq!(config.sizing, ShareSizing::Fractional);
    }

    #[test]
    fn overrides_take_precedence() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = BacktestOverrides {
            short_window: Some(5),
            long_window: Some(15),
            initial_capital: Some(1_000.0),
        };
        let config = cli::build_backtest_config(&adapter, &overrides).unwrap();

        assert_eq!(config.short_window, 5);
        assert_eq!(config.long_window, 15);
        assert!((config.initial_capital - 1_000.0).abs() < f64::EPSILON);
        assert_eq!(config.sizing, ShareSizing::Whole);
    }

    #[test]
    fn override_crossing_windows_rejected() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = BacktestOverrides {
            short_window: Some(150),
            ..BacktestOverrides::default()
        };
        let err = cli::build_backtest_config(&adapter, &overrides).unwrap_err();
        assert!(matches!(
            err,
            SmacrossError::Configuration { parameter, .. } if parameter == "long_window"
        ));
    }

    #[test]
    fn negative_window_rejected() {
        let ini = "[backtest]\nshort_window = -3\nlong_window = 10\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter, &BacktestOverrides::default()).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "short_window"));
    }

    #[test]
    fn non_numeric_window_rejected() {
        let ini = "[backtest]\nshort_window = 2O\nlong_window = 10\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter, &BacktestOverrides::default()).unwrap_err();
        assert!(matches!(
            err,
            SmacrossError::ConfigInvalid { key, reason, .. }
                if key == "short_window" && reason.contains("'2O'")
        ));
    }

    #[test]
    fn non_numeric_capital_rejected_despite_override() {
        let ini = "[backtest]\ninitial_capital = 1,000\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let overrides = BacktestOverrides {
            initial_capital: Some(5_000.0),
            ..BacktestOverrides::default()
        };
        let err = cli::build_backtest_config(&adapter, &overrides).unwrap_err();
        assert!(matches!(
            err,
            SmacrossError::ConfigInvalid { key, .. } if key == "initial_capital"
        ));
    }

    #[test]
    fn zero_capital_rejected() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let overrides = BacktestOverrides {
            initial_capital: Some(0.0),
            ..BacktestOverrides::default()
        };
        let err = cli::build_backtest_config(&adapter, &overrides).unwrap_err();
        assert!(matches!(
            err,
            SmacrossError::Configuration { parameter, .. } if parameter == "initial_capital"
        ));
    }

    #[test]
    fn unknown_sizing_rejected() {
        let ini = "[backtest]\nsizing = lots\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::build_backtest_config(&adapter, &BacktestOverrides::default()).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "sizing"));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/smacross.ini")).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigParse { .. }));
    }
}

mod code_resolution {
    use super::*;

    #[test]
    fn resolve_code_from_config() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::resolve_code(None, &adapter).unwrap(), "AAPL");
    }

    #[test]
    fn resolve_code_override_takes_precedence() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(
            cli::resolve_code(Some("RELIANCE.NS"), &adapter).unwrap(),
            "RELIANCE.NS"
        );
    }

    #[test]
    fn resolve_code_whitespace_handling() {
        let adapter = FileConfigAdapter::from_string("[data]\ncode = MSFT\n").unwrap();
        assert_eq!(cli::resolve_code(Some("  TSLA  "), &adapter).unwrap(), "TSLA");
        assert_eq!(cli::resolve_code(None, &adapter).unwrap(), "MSFT");
    }

    #[test]
    fn resolve_code_none_available() {
        let adapter = FileConfigAdapter::from_string("[data]\npath = ./data\n").unwrap();
        let err = cli::resolve_code(None, &adapter).unwrap_err();
        assert!(matches!(
            err,
            SmacrossError::ConfigMissing { section, key } if section == "data" && key == "code"
        ));
    }
}

mod date_resolution {
    use super::*;

    #[test]
    fn explicit_dates_used() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let (start, end) = cli::resolve_date_range(&adapter, date(2026, 1, 1)).unwrap();
        assert_eq!(start, date(2020, 1, 1));
        assert_eq!(end, date(2024, 12, 31));
    }

    #[test]
    fn defaults_to_five_years_before_today() {
        let adapter = FileConfigAdapter::from_string("[data]\ncode = AAPL\n").unwrap();
        let today = date(2025, 6, 30);
        let (start, end) = cli::resolve_date_range(&adapter, today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, today - chrono::Duration::days(cli::DEFAULT_YEARS_BACK * 365));
    }

    #[test]
    fn start_defaults_relative_to_explicit_end() {
        let adapter = FileConfigAdapter::from_string("[data]\nend_date = 2023-01-01\n").unwrap();
        let (start, end) = cli::resolve_date_range(&adapter, date(2026, 1, 1)).unwrap();
        assert_eq!(end, date(2023, 1, 1));
        assert_eq!(start, date(2023, 1, 1) - chrono::Duration::days(1825));
    }

    #[test]
    fn start_after_end_rejected() {
        let ini = "[data]\nstart_date = 2024-06-01\nend_date = 2024-01-01\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::resolve_date_range(&adapter, date(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn malformed_date_rejected() {
        let ini = "[data]\nstart_date = 2020/01/01\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let err = cli::resolve_date_range(&adapter, date(2026, 1, 1)).unwrap_err();
        assert!(matches!(err, SmacrossError::ConfigInvalid { key, .. } if key == "start_date"));
    }
}

mod argument_parsing {
    use super::*;

    #[test]
    fn backtest_arguments() {
        let cli = Cli::try_parse_from([
            "smacross", "backtest", "-c", "run.ini", "--code", "AAPL", "--short", "10", "--long",
            "30", "--capital", "2500", "--trades",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                config,
                code,
                short,
                long,
                capital,
                trades,
                output,
                ..
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(code.as_deref(), Some("AAPL"));
                assert_eq!(short, Some(10));
                assert_eq!(long, Some(30));
                assert_eq!(capital, Some(2500.0));
                assert!(trades);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn sweep_ranges_parse() {
        let cli = Cli::try_parse_from([
            "smacross", "sweep", "-c", "run.ini", "--short", "5:20:5", "--long", "50",
        ])
        .unwrap();
        match cli.command {
            Command::Sweep {
                short, long, top, ..
            } => {
                assert_eq!(short.values(), vec![5, 10, 15, 20]);
                assert_eq!(long.values(), vec![50]);
                assert_eq!(top, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn bad_sweep_range_rejected() {
        let parsed = Cli::try_parse_from([
            "smacross", "sweep", "-c", "run.ini", "--short", "20:5", "--long", "50",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_is_required() {
        assert!(Cli::try_parse_from(["smacross", "validate"]).is_err());
    }
}

mod end_to_end {
    use super::*;

    /// Data directory with `WAVE.csv` plus a config pointing at it.
    struct Workspace {
        dir: tempfile::TempDir,
        config: PathBuf,
    }

    impl Workspace {
        fn new(extra_backtest: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let data = dir.path().join("data");
            fs::create_dir_all(&data).unwrap();
            fs::write(data.join("WAVE.csv"), prices_csv(&make_bars(&WAVE_CLOSES))).unwrap();

            let ini = format!(
                "[data]\npath = {}\ncode = WAVE\nstart_date = 2024-01-01\nend_date = 2024-12-31\n\n\
                 [backtest]\nshort_window = 2\nlong_window = 3\ninitial_capital = 10000\n{}\n",
                data.display(),
                extra_backtest
            );
            let config = dir.path().join("smacross.ini");
            fs::write(&config, ini).unwrap();
            Self { dir, config }
        }

        fn run(&self, args: &[&str]) -> ExitCode {
            let mut argv = vec!["smacross"];
            argv.extend_from_slice(&args[..1]);
            argv.push("-c");
            let config = self.config.to_str().unwrap();
            argv.push(config);
            argv.extend_from_slice(&args[1..]);
            cli::run(Cli::try_parse_from(argv).unwrap())
        }
    }

    #[test]
    fn validate_succeeds() {
        let ws = Workspace::new("");
        assert_eq!(ws.run(&["validate"]), ExitCode::SUCCESS);
    }

    #[test]
    fn validate_invalid_windows_fails() {
        let ini = write_temp_ini(
            "[data]\npath = ./data\ncode = X\n\n[backtest]\nshort_window = 30\nlong_window = 10\n",
        );
        let cli =
            Cli::try_parse_from(["smacross", "validate", "-c", ini.path().to_str().unwrap()])
                .unwrap();
        assert_eq!(cli::run(cli), ExitCode::from(2));
    }

    #[test]
    fn validate_missing_file_fails() {
        let cli =
            Cli::try_parse_from(["smacross", "validate", "-c", "/nonexistent/smacross.ini"])
                .unwrap();
        assert_eq!(cli::run(cli), ExitCode::from(2));
    }

    #[test]
    fn backtest_writes_html_and_exports() {
        let ws = Workspace::new("");
        let html = ws.dir.path().join("out").join("wave.html");
        let exports = ws.dir.path().join("exports");

        let code = ws.run(&[
            "backtest",
            "--trades",
            "-o",
            html.to_str().unwrap(),
            "--export-dir",
            exports.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let report = fs::read_to_string(&html).unwrap();
        assert!(report.contains("Backtest Report: WAVE"));
        assert!(report.contains("Trade Log (3)"));
        assert!(exports.join("WAVE_equity.csv").exists());
        assert!(exports.join("WAVE_benchmark.csv").exists());
        assert!(exports.join("WAVE_trades.csv").exists());
    }

    #[test]
    fn backtest_with_whole_share_sizing() {
        let ws = Workspace::new("sizing = whole");
        assert_eq!(ws.run(&["backtest"]), ExitCode::SUCCESS);
    }

    #[test]
    fn backtest_window_longer_than_data_fails() {
        let ws = Workspace::new("");
        let code = ws.run(&["backtest", "--short", "5", "--long", "40"]);
        assert_eq!(code, ExitCode::from(5));
    }

    #[test]
    fn backtest_unknown_code_fails() {
        let ws = Workspace::new("");
        let code = ws.run(&["backtest", "--code", "MISSING"]);
        assert_eq!(code, ExitCode::from(3));
    }

    #[test]
    fn sweep_writes_results() {
        let ws = Workspace::new("");
        let out = ws.dir.path().join("sweep.csv");
        let code = ws.run(&[
            "sweep",
            "--short",
            "2:3",
            "--long",
            "4:6",
            "-o",
            out.to_str().unwrap(),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 1 + 6);
    }

    #[test]
    fn sweep_without_valid_pairs_fails() {
        let ws = Workspace::new("");
        let code = ws.run(&["sweep", "--short", "10", "--long", "5"]);
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn info_reports_range() {
        let ws = Workspace::new("");
        assert_eq!(ws.run(&["info"]), ExitCode::SUCCESS);
        assert_eq!(ws.run(&["info", "--code", "MISSING"]), ExitCode::from(5));
    }

    #[test]
    fn list_symbols_succeeds() {
        let ws = Workspace::new("");
        assert_eq!(ws.run(&["list-symbols"]), ExitCode::SUCCESS);
    }

    #[test]
    fn missing_data_path_fails() {
        let ini = write_temp_ini("[data]\ncode = WAVE\n");
        let cli = Cli::try_parse_from([
            "smacross",
            "list-symbols",
            "-c",
            ini.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(cli::run(cli), ExitCode::from(2));
    }
}
