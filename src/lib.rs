//a Rust-based signal-replay backtesting engine for dated trading events

pub mod analysis;
pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod signal;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{EventAnalyzer, PrePostReturns};
    pub use crate::config::{BacktestConfiguration, PositionPolicy};
    pub use crate::data::{
        load_benchmark_csv, load_price_csv, load_raw_csv, InputError, PriceMatrix, RawMatrix,
        SignalMatrix,
    };
    pub use crate::engine::{BacktestOutcome, EngineError, FeeModel, TradeEngine, TradeRecord};
    pub use crate::metrics::{ComparisonPoint, CumulativePoint, MetricsCalculator, MetricsReport};
    pub use crate::portfolio::{Position, PositionLedger};
    pub use crate::signal::{threshold::ThresholdPolicy, Action, SignalPolicy};
}
