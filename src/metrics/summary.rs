use crate::engine::TradeRecord;
use crate::metrics::timeseries::{
    benchmark_comparison, cumulative_pnl, max_drawdown, ComparisonPoint, CumulativePoint,
};
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//aggregate performance report; undefined metrics carry NaN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub pnl: f64,
    pub sharpe_ratio: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
}

impl MetricsReport {
    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("PnL"),
            Cell::new(&format!("{:.4}", self.pnl)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Sharpe Ratio"),
            Cell::new(&format_metric(self.sharpe_ratio, 3)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("CAGR"),
            Cell::new(&format_metric(self.cagr, 4)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("MDD"),
            Cell::new(&format_metric(self.max_drawdown, 4)),
        ]));

        table.printstd();
    }
}

fn format_metric(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "undefined".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

//derives performance statistics from a finished trade log
//the log is read-only input; every series is recomputed on demand
pub struct MetricsCalculator<'a> {
    trades: &'a [TradeRecord],
    benchmark: Option<&'a [(NaiveDate, f64)]>,
}

impl<'a> MetricsCalculator<'a> {
    pub fn new(trades: &'a [TradeRecord]) -> Self {
        MetricsCalculator {
            trades,
            benchmark: None,
        }
    }

    pub fn with_benchmark(trades: &'a [TradeRecord], benchmark: &'a [(NaiveDate, f64)]) -> Self {
        MetricsCalculator {
            trades,
            benchmark: Some(benchmark),
        }
    }

    //running cumulative pnl, one point per trade
    pub fn cumulative_pnl_series(&self) -> Vec<CumulativePoint> {
        cumulative_pnl(self.trades)
    }

    //sum of realized pnl over the whole log (fees already netted per trade)
    pub fn total_pnl(&self) -> f64 {
        self.trades.iter().map(|trade| trade.pnl).sum()
    }

    //annualized sharpe ratio over per-trade pnl observations
    //NaN with fewer than two trades or zero dispersion
    pub fn sharpe_ratio(&self, risk_free_rate: f64) -> f64 {
        if self.trades.len() < 2 {
            return f64::NAN;
        }

        let excess: Vec<f64> = self
            .trades
            .iter()
            .map(|trade| trade.pnl - risk_free_rate)
            .collect();

        let mean = (&excess[..]).mean();
        let std_dev = (&excess[..]).std_dev();

        if std_dev == 0.0 {
            return f64::NAN;
        }

        (mean / std_dev) * (252.0_f64).sqrt()
    }

    //compound annual growth rate of the final cumulative pnl over the
    //traded date span; NaN for an empty or single-day log, or when the
    //final pnl is at or below -1
    pub fn cagr(&self) -> f64 {
        let (first, last) = match (self.trades.first(), self.trades.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return f64::NAN,
        };

        let elapsed_days = (last - first).num_days();
        if elapsed_days == 0 {
            return f64::NAN;
        }

        let final_pnl = self.total_pnl();
        if final_pnl <= -1.0 {
            return f64::NAN;
        }

        (1.0 + final_pnl).powf(365.0 / elapsed_days as f64) - 1.0
    }

    //most negative drawdown of cumulative pnl from its running peak
    pub fn max_drawdown(&self) -> f64 {
        let cumulative: Vec<f64> = self
            .cumulative_pnl_series()
            .iter()
            .map(|point| point.pnl)
            .collect();
        max_drawdown(&cumulative)
    }

    //per-date strategy vs benchmark cumulative comparison
    pub fn benchmark_cumulative_comparison(&self) -> Vec<ComparisonPoint> {
        benchmark_comparison(&self.cumulative_pnl_series(), self.benchmark)
    }

    //computes the full report in one pass
    pub fn calculate_all_metrics(&self, risk_free_rate: f64) -> MetricsReport {
        MetricsReport {
            pnl: self.total_pnl(),
            sharpe_ratio: self.sharpe_ratio(risk_free_rate),
            cagr: self.cagr(),
            max_drawdown: self.max_drawdown(),
        }
    }
}
