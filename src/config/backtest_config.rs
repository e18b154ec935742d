use serde::{Deserialize, Serialize};
use std::path::PathBuf;

//policy for a sell signal with no (or too little) position behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionPolicy {
    //silently skip the trade (default, simulation-friendly)
    Skip,
    //abort the run with an InsufficientPosition error
    Fail,
}

impl PositionPolicy {
    //parse policy from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Some(PositionPolicy::Skip),
            "fail" => Some(PositionPolicy::Fail),
            _ => None,
        }
    }
}

impl Default for PositionPolicy {
    fn default() -> Self {
        PositionPolicy::Skip
    }
}

//complete backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfiguration {
    //data
    pub events_path: PathBuf,
    pub prices_path: PathBuf,
    pub benchmark_path: Option<PathBuf>,

    //signal generation
    pub threshold: f64,

    //execution
    pub buy_fee_rate: f64,
    pub sell_fee_rate: f64,
    pub trade_quantity: f64,
    pub on_insufficient_position: PositionPolicy,

    //metrics
    pub risk_free_rate: f64,

    //optional output paths
    pub output_trades_csv: Option<PathBuf>,
    pub output_comparison_csv: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            events_path: PathBuf::from("events.csv"),
            prices_path: PathBuf::from("prices.csv"),
            benchmark_path: None,
            threshold: 50.0,
            buy_fee_rate: 0.000855,
            sell_fee_rate: 0.003705,
            trade_quantity: 1.0,
            on_insufficient_position: PositionPolicy::Skip,
            risk_free_rate: 0.0,
            output_trades_csv: None,
            output_comparison_csv: None,
        }
    }
}

impl BacktestConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_position_policy() {
        assert_eq!(PositionPolicy::parse("skip"), Some(PositionPolicy::Skip));
        assert_eq!(PositionPolicy::parse("FAIL"), Some(PositionPolicy::Fail));
        assert_eq!(PositionPolicy::parse("abort"), None);
    }

    #[test]
    fn json_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BacktestConfiguration::default();
        config.threshold = 60.0;
        config.on_insufficient_position = PositionPolicy::Fail;
        config.to_json_file(&path).unwrap();

        let loaded = BacktestConfiguration::from_json_file(&path).unwrap();
        assert_eq!(loaded.threshold, 60.0);
        assert_eq!(loaded.on_insufficient_position, PositionPolicy::Fail);
        assert_eq!(loaded.buy_fee_rate, config.buy_fee_rate);
    }
}
