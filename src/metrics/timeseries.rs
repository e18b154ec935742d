use crate::engine::TradeRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//a point in the cumulative-pnl series, one per trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub pnl: f64,
}

//strategy vs benchmark cumulative return on one trade date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub strategy: f64,
    pub benchmark: f64,
    pub excess: f64,
}

//running sum of realized pnl over the trade log in stored order
pub fn cumulative_pnl(trades: &[TradeRecord]) -> Vec<CumulativePoint> {
    let mut series = Vec::with_capacity(trades.len());
    let mut running = 0.0;

    for trade in trades {
        running += trade.pnl;
        series.push(CumulativePoint {
            date: trade.date,
            pnl: running,
        });
    }

    series
}

//most negative drawdown of a cumulative series from its running peak
//points where the running peak is exactly zero are skipped rather than
//divided by; NaN when no point can be evaluated
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = f64::NAN;

    for &value in cumulative {
        if value > peak {
            peak = value;
        }
        if peak == 0.0 {
            continue;
        }

        let drawdown = (value - peak) / peak;
        if worst.is_nan() || drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}

//compounds benchmark per-period returns and forward-fills them onto the
//trade dates; benchmark stays at zero when no series is supplied
pub fn benchmark_comparison(
    strategy: &[CumulativePoint],
    benchmark: Option<&[(NaiveDate, f64)]>,
) -> Vec<ComparisonPoint> {
    let mut comparison: Vec<ComparisonPoint> = Vec::new();
    let bench = benchmark.unwrap_or(&[]);
    let mut bench_idx = 0;
    let mut bench_cum = 0.0;

    for point in strategy {
        while bench_idx < bench.len() && bench[bench_idx].0 <= point.date {
            bench_cum = (1.0 + bench_cum) * (1.0 + bench[bench_idx].1) - 1.0;
            bench_idx += 1;
        }

        //one row per date: later trades on the same date overwrite
        let row = ComparisonPoint {
            date: point.date,
            strategy: point.pnl,
            benchmark: bench_cum,
            excess: point.pnl - bench_cum,
        };

        match comparison.last_mut() {
            Some(last) if last.date == point.date => *last = row,
            _ => comparison.push(row),
        }
    }

    comparison
}
