//! End-to-end backtests over the data ports.
//!
//! - Hand-checked scenarios through a mock data port
//! - Calendar-day dedup of intraday bars
//! - CSV directory and SQLite store pipelines
//! - JSON output shape

mod common;

use approx::assert_relative_eq;
use common::*;
use serde_json::Value;
use tradesim::domain::backtest::{run_backtest, simulate};
use tradesim::domain::position::Action;
use tradesim::domain::report::BacktestOutcome;
use tradesim::domain::strategy::StrategyConfig;
use tradesim::ports::data_port::DataPort;

mod scenarios {
    use super::*;

    #[test]
    fn step_series_enters_once_and_holds() {
        let closes = [10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 20.0];
        let port = MockDataPort::new().with_bars("STEP", bars_from_closes("2024-01-01", &closes));

        let bars = port.fetch_bars("STEP").unwrap();
        let trace = simulate(&bars, &sma_only(2, 4));
        assert_eq!(trace.positions(), vec![0, 0, 0, 0, 1, 1, 1, 1]);

        let outcome = run_backtest("STEP", &bars, &sma_only(2, 4)).unwrap();
        let report = outcome.report().unwrap();
        let actions: Vec<Option<Action>> = report.results.iter().map(|p| p.action).collect();
        assert_eq!(
            actions,
            vec![None, None, None, None, Some(Action::Buy), None, None, None]
        );
        assert_eq!(report.results[4].sma_s, Some(15.0));
        assert_eq!(report.results[4].sma_l, Some(12.5));
        assert_eq!(report.final_return, 0.0);
    }

    #[test]
    fn final_return_matches_hand_compounding() {
        let closes = [10.0, 10.0, 10.0, 10.0, 12.0, 15.0, 15.0, 9.0, 9.0, 9.0];
        let bars = bars_from_closes("2024-01-01", &closes);
        let trace = simulate(&bars, &sma_only(2, 4));

        let positions = trace.positions();
        let mut equity = 1.0;
        for t in 0..closes.len() - 1 {
            if positions[t] == 1 {
                equity *= 1.0 + (closes[t + 1] - closes[t]) / closes[t];
            }
        }

        let report = run_backtest("X", &bars, &sma_only(2, 4)).unwrap();
        assert_relative_eq!(
            report.report().unwrap().final_return,
            (equity - 1.0) * 100.0,
            epsilon = 0.005
        );
    }

    #[test]
    fn bollinger_sells_once_on_breakout() {
        // Linear ramp, one gap up, then the ramp resumes.
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..10).map(|i| 200.0 + i as f64));
        let bars = bars_from_closes("2024-01-01", &closes);
        let config = StrategyConfig {
            bb_window: 5,
            bb_std: 1.5,
            enable_bb: true,
            ..sma_only(2, 4)
        };

        let trace = simulate(&bars, &config);
        let sells: Vec<usize> = trace
            .signals
            .iter()
            .enumerate()
            .filter(|(_, s)| s.action == Some(Action::Sell))
            .map(|(i, _)| i)
            .collect();
        let first_breakout = trace
            .snapshots
            .iter()
            .zip(&closes)
            .position(|(snap, close)| snap.bb_upper.is_some_and(|u| *close > u))
            .unwrap();

        assert_eq!(first_breakout, 30);
        assert_eq!(sells, vec![first_breakout]);
        assert_eq!(trace.positions()[first_breakout - 1], 1);
        assert_eq!(trace.signals[4].action, Some(Action::Buy));
    }

    #[test]
    fn rsi_veto_blocks_entry_in_steady_uptrend() {
        // Only gains: RSI pins at 100, above any threshold below it.
        let bars = generate_bars("2024-01-01", 40, 50.0);
        let config = StrategyConfig {
            enable_rsi: true,
            ..sma_only(5, 20)
        };
        let trace = simulate(&bars, &config);
        assert!(trace.positions().iter().all(|&p| p == 0));

        let trace = simulate(&bars, &sma_only(5, 20));
        assert_eq!(trace.positions()[19], 1);
    }
}

mod packaging {
    use super::*;

    #[test]
    fn empty_ticker_is_no_data() {
        let port = MockDataPort::new();
        let bars = port.fetch_bars("NONE").unwrap();
        let outcome = run_backtest("NONE", &bars, &StrategyConfig::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"error": "No data"})
        );
    }

    #[test]
    fn intraday_bars_collapse_to_last_of_day() {
        let bars = vec![
            make_bar("2024-03-01 10:00:00", 100.0),
            make_bar("2024-03-01 16:00:00", 101.0),
            make_bar("2024-03-04 10:00:00", 102.0),
            make_bar("2024-03-04 12:00:00", 103.0),
            make_bar("2024-03-04 16:00:00", 104.0),
            make_bar("2024-03-05 16:00:00", 105.0),
        ];
        let outcome = run_backtest("X", &bars, &StrategyConfig::default()).unwrap();
        let report = outcome.report().unwrap();

        let days: Vec<&str> = report.results.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(days, vec!["2024-03-01", "2024-03-04", "2024-03-05"]);
    }

    #[test]
    fn json_fields_and_rounding() {
        let bars = generate_bars("2024-01-01", 30, 100.0);
        let config = StrategyConfig {
            sma_short: 3,
            sma_long: 7,
            enable_rsi: false,
            enable_macd: true,
            enable_bb: true,
            ..StrategyConfig::default()
        };
        let outcome = run_backtest("nvda", &bars, &config).unwrap();
        let json: Value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["ticker"], "nvda");
        let first = &json["results"][0];
        for key in [
            "time", "value", "sma_s", "sma_l", "rsi", "macd", "macd_h", "bb_u", "bb_m", "bb_l",
            "action",
        ] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
        assert_eq!(first["sma_s"], Value::Null);
        assert_eq!(first["value"], 1.0);

        for point in json["results"].as_array().unwrap() {
            let value = point["value"].as_f64().unwrap();
            assert_eq!(value, (value * 10_000.0).round() / 10_000.0);
            if let Some(sma) = point["sma_l"].as_f64() {
                assert_eq!(sma, (sma * 100.0).round() / 100.0);
            }
        }
        assert!(json["final_return"].is_number());
        assert!(json["total_trades"].is_u64());
    }

    #[test]
    fn ticker_error_propagates() {
        let port = MockDataPort::new().with_error("BAD", "connection reset");
        assert!(port.fetch_bars("BAD").is_err());
        assert!(port.get_data_range("BAD").is_err());
    }
}

mod csv_pipeline {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tradesim::adapters::csv_adapter::CsvAdapter;

    #[test]
    fn backtest_from_csv_directory() {
        let dir = TempDir::new().unwrap();
        let mut csv = String::from("time,open,high,low,close,volume\n");
        for (i, close) in [10.0, 10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 20.0]
            .iter()
            .enumerate()
        {
            csv.push_str(&format!("2024-01-{:02},{close},{close},{close},{close},100\n", i + 1));
        }
        fs::write(dir.path().join("STEP.csv"), csv).unwrap();

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(adapter.list_tickers().unwrap(), vec!["STEP"]);

        let bars = adapter.fetch_bars("STEP").unwrap();
        let outcome = run_backtest("STEP", &bars, &sma_only(2, 4)).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.results.len(), 8);
        assert_eq!(report.results[4].action, Some(Action::Buy));
        assert_eq!(report.total_trades, 1);
    }

    #[test]
    fn blank_close_drops_only_that_bar() {
        let dir = TempDir::new().unwrap();
        let csv = "time,open,high,low,close,volume\n\
                   2024-01-01,10,10,10,10,100\n\
                   2024-01-02,10,10,10,,100\n\
                   2024-01-03,11,11,11,11,100\n\
                   2024-01-04,12,12,12,12,100\n";
        fs::write(dir.path().join("GAP.csv"), csv).unwrap();

        let bars = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_bars("GAP")
            .unwrap();
        assert_eq!(bars.len(), 4);

        let outcome = run_backtest("GAP", &bars, &StrategyConfig::default()).unwrap();
        let report = outcome.report().unwrap();
        let days: Vec<&str> = report.results.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(days, vec!["2024-01-01", "2024-01-03", "2024-01-04"]);
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_pipeline {
    use super::*;
    use tradesim::adapters::sqlite_adapter::SqliteAdapter;
    use tradesim::ports::data_port::BarStorePort;

    #[test]
    fn ingest_then_backtest_matches_in_memory_run() {
        let store = SqliteAdapter::in_memory().unwrap();
        store.initialize_schema().unwrap();

        let bars = generate_bars("2024-01-01", 60, 100.0);
        assert_eq!(store.upsert_bars("NVDA", &bars).unwrap(), 60);
        assert_eq!(store.upsert_bars("NVDA", &bars).unwrap(), 0);

        let fetched = store.fetch_bars("NVDA").unwrap();
        assert_eq!(fetched, bars);

        let config = StrategyConfig::default();
        let from_store = run_backtest("NVDA", &fetched, &config).unwrap();
        let direct = run_backtest("NVDA", &bars, &config).unwrap();
        assert_eq!(from_store, direct);
        assert!(!from_store.is_no_data());
    }

    #[test]
    fn unknown_ticker_in_store_is_no_data() {
        let store = SqliteAdapter::in_memory().unwrap();
        store.initialize_schema().unwrap();

        let bars = store.fetch_bars("ZZZ").unwrap();
        let outcome = run_backtest("ZZZ", &bars, &StrategyConfig::default()).unwrap();
        assert_eq!(outcome, BacktestOutcome::no_data());
    }

    #[test]
    fn missing_close_in_store_is_skipped() {
        let store = SqliteAdapter::in_memory().unwrap();
        store.initialize_schema().unwrap();

        let mut bars = generate_bars("2024-01-01", 10, 100.0);
        bars[3].close = f64::NAN;
        store.upsert_bars("NVDA", &bars).unwrap();

        let fetched = store.fetch_bars("NVDA").unwrap();
        assert_eq!(fetched.len(), 10);
        assert!(fetched[3].close.is_nan());

        let outcome = run_backtest("NVDA", &fetched, &StrategyConfig::default()).unwrap();
        assert_eq!(outcome.report().unwrap().results.len(), 9);
    }
}
