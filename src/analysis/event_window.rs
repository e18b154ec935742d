use crate::data::PriceMatrix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//simple returns on either side of an event date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrePostReturns {
    pub pre_return: f64,
    pub post_return: f64,
}

//inspects price behavior around event dates
pub struct EventAnalyzer<'a> {
    prices: &'a PriceMatrix,
}

impl<'a> EventAnalyzer<'a> {
    pub fn new(prices: &'a PriceMatrix) -> Self {
        EventAnalyzer { prices }
    }

    //simple returns over the `days` rows before and after the event date
    //None when the event date, the window endpoints, or their prices are
    //absent
    pub fn pre_post_returns(
        &self,
        stock_code: &str,
        event_date: NaiveDate,
        days: usize,
    ) -> Option<PrePostReturns> {
        let row = self.prices.row_of(event_date)?;
        let closes = self.prices.closes(stock_code)?;

        let event_close = closes[row]?;
        let pre_close = closes[row.checked_sub(days)?]?;
        let post_close = closes.get(row + days).copied().flatten()?;

        if pre_close == 0.0 || event_close == 0.0 {
            return None;
        }

        Some(PrePostReturns {
            pre_return: event_close / pre_close - 1.0,
            post_return: post_close / event_close - 1.0,
        })
    }

    //sample standard deviation of daily returns inside the +/- days
    //window around the event date, clamped to the available history
    //None when fewer than two returns exist in the window
    pub fn volatility(
        &self,
        stock_code: &str,
        event_date: NaiveDate,
        days: usize,
    ) -> Option<f64> {
        let row = self.prices.row_of(event_date)?;
        let closes = self.prices.closes(stock_code)?;

        let start = row.saturating_sub(days);
        let end = (row + days).min(closes.len().saturating_sub(1));

        let mut returns = Vec::new();
        for i in start..end {
            if let (Some(prev), Some(next)) = (closes[i], closes[i + 1]) {
                if prev != 0.0 {
                    returns.push(next / prev - 1.0);
                }
            }
        }

        if returns.len() < 2 {
            return None;
        }

        Some((&returns[..]).std_dev())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    fn sample_prices() -> PriceMatrix {
        let dates = vec![
            date("2024-01-02"),
            date("2024-01-03"),
            date("2024-01-04"),
            date("2024-01-05"),
            date("2024-01-08"),
        ];
        let mut columns = IndexMap::new();
        columns.insert(
            "2330".to_string(),
            vec![
                Some(100.0),
                Some(102.0),
                Some(105.0),
                Some(103.0),
                Some(108.0),
            ],
        );
        PriceMatrix::new(dates, columns).unwrap()
    }

    #[test]
    fn returns_around_event() {
        let prices = sample_prices();
        let analyzer = EventAnalyzer::new(&prices);

        let window = analyzer
            .pre_post_returns("2330", date("2024-01-04"), 2)
            .unwrap();

        //105/100 - 1 and 108/105 - 1
        assert_close(window.pre_return, 0.05);
        assert_close(window.post_return, 108.0 / 105.0 - 1.0);
    }

    #[test]
    fn window_outside_history_is_none() {
        let prices = sample_prices();
        let analyzer = EventAnalyzer::new(&prices);

        assert!(analyzer
            .pre_post_returns("2330", date("2024-01-02"), 2)
            .is_none());
        assert!(analyzer
            .pre_post_returns("2330", date("2024-01-08"), 2)
            .is_none());
    }

    #[test]
    fn unknown_event_date_is_none() {
        let prices = sample_prices();
        let analyzer = EventAnalyzer::new(&prices);

        assert!(analyzer
            .pre_post_returns("2330", date("2024-01-06"), 1)
            .is_none());
        assert!(analyzer.volatility("2330", date("2024-01-06"), 2).is_none());
    }

    #[test]
    fn volatility_over_window() {
        let prices = sample_prices();
        let analyzer = EventAnalyzer::new(&prices);

        let vol = analyzer.volatility("2330", date("2024-01-04"), 2).unwrap();
        assert!(vol > 0.0);
    }

    #[test]
    fn volatility_needs_two_returns() {
        let dates = vec![date("2024-01-02"), date("2024-01-03")];
        let mut columns = IndexMap::new();
        columns.insert("2330".to_string(), vec![Some(100.0), Some(101.0)]);
        let prices = PriceMatrix::new(dates, columns).unwrap();

        let analyzer = EventAnalyzer::new(&prices);
        assert!(analyzer.volatility("2330", date("2024-01-03"), 1).is_none());
    }
}
