use chrono::NaiveDate;
use indexmap::IndexMap;
use pozole::prelude::*;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
}

//full pipeline: raw event values -> threshold policy -> trade engine ->
//metrics, replicating the documented buy/sell worked example
#[test]
fn raw_events_to_metrics_report() {
    let dates = vec![date("2024-01-02"), date("2024-01-03"), date("2024-01-10")];

    let mut raw_columns = IndexMap::new();
    //buy signal, nothing, sell signal
    raw_columns.insert("A".to_string(), vec![Some(80.0), Some(50.0), Some(20.0)]);
    //never crosses the threshold
    raw_columns.insert("B".to_string(), vec![Some(50.0), None, Some(50.0)]);
    let raw = RawMatrix::new(dates.clone(), raw_columns).unwrap();

    let mut price_columns = IndexMap::new();
    price_columns.insert("A".to_string(), vec![Some(100.0), Some(105.0), Some(110.0)]);
    price_columns.insert("B".to_string(), vec![Some(10.0), Some(10.0), Some(10.0)]);
    let prices = PriceMatrix::new(dates, price_columns).unwrap();

    let signals = SignalMatrix::from_raw(&raw, &ThresholdPolicy::default()).unwrap();
    let fees = FeeModel::new(0.000855, 0.003705).unwrap();

    let engine = TradeEngine::new(&signals, &prices, fees, 1.0, PositionPolicy::Skip).unwrap();
    let outcome = engine.execute().unwrap();

    //only instrument A ever trades
    assert_eq!(outcome.trades.len(), 2);
    assert!(outcome.trades.iter().all(|t| t.stock_code == "A"));

    let buy = &outcome.trades[0];
    assert_eq!(buy.action, Action::Buy);
    assert_close(buy.fee, 0.0855);
    assert_close(buy.pnl, 0.0);

    let sell = &outcome.trades[1];
    assert_eq!(sell.action, Action::Sell);
    assert_close(sell.pnl, (110.0 - 100.0855) - 110.0 * 0.003705);

    //the full sell cleared the ledger
    assert!(outcome.ledger.is_empty());

    let calculator = MetricsCalculator::new(&outcome.trades);
    assert_close(calculator.total_pnl(), sell.pnl);

    let report = calculator.calculate_all_metrics(0.0);
    assert_close(report.pnl, sell.pnl);
    //8 elapsed days between the two trades
    assert_close(report.cagr, (1.0 + sell.pnl).powf(365.0 / 8.0) - 1.0);
    //a monotonically rising pnl never draws down
    assert_close(report.max_drawdown, 0.0);
}

#[test]
fn benchmark_comparison_round_trip() {
    let dates = vec![date("2024-01-02"), date("2024-01-03")];

    let mut raw_columns = IndexMap::new();
    raw_columns.insert("A".to_string(), vec![Some(80.0), Some(20.0)]);
    let raw = RawMatrix::new(dates.clone(), raw_columns).unwrap();

    let mut price_columns = IndexMap::new();
    price_columns.insert("A".to_string(), vec![Some(100.0), Some(110.0)]);
    let prices = PriceMatrix::new(dates, price_columns).unwrap();

    let signals = SignalMatrix::from_raw(&raw, &ThresholdPolicy::default()).unwrap();
    let fees = FeeModel::flat(0.0).unwrap();

    let outcome = TradeEngine::new(&signals, &prices, fees, 1.0, PositionPolicy::Skip)
        .unwrap()
        .execute()
        .unwrap();

    let benchmark = vec![(date("2024-01-02"), 0.01), (date("2024-01-03"), 0.01)];
    let comparison = MetricsCalculator::with_benchmark(&outcome.trades, &benchmark)
        .benchmark_cumulative_comparison();

    assert_eq!(comparison.len(), 2);
    assert_close(comparison[0].benchmark, 0.01);
    assert_close(comparison[1].benchmark, 1.01 * 1.01 - 1.0);
    assert_close(
        comparison[1].excess,
        comparison[1].strategy - comparison[1].benchmark,
    );
}

//two fresh engines over the same inputs must produce identical logs
#[test]
fn replay_is_deterministic() {
    let dates = vec![date("2024-01-02"), date("2024-01-03"), date("2024-01-04")];

    let mut raw_columns = IndexMap::new();
    raw_columns.insert("A".to_string(), vec![Some(80.0), Some(20.0), Some(80.0)]);
    raw_columns.insert("B".to_string(), vec![Some(80.0), Some(80.0), Some(20.0)]);
    let raw = RawMatrix::new(dates.clone(), raw_columns).unwrap();

    let mut price_columns = IndexMap::new();
    price_columns.insert("A".to_string(), vec![Some(100.0), Some(101.0), Some(102.0)]);
    price_columns.insert("B".to_string(), vec![Some(50.0), None, Some(52.0)]);
    let prices = PriceMatrix::new(dates, price_columns).unwrap();

    let signals = SignalMatrix::from_raw(&raw, &ThresholdPolicy::default()).unwrap();
    let fees = FeeModel::new(0.000855, 0.003705).unwrap();

    let run = || {
        TradeEngine::new(&signals, &prices, fees, 1.0, PositionPolicy::Skip)
            .unwrap()
            .execute()
            .unwrap()
            .trades
    };

    assert_eq!(run(), run());
}
