pub mod backtest;
pub mod fees;

pub use backtest::{BacktestOutcome, EngineError, TradeEngine, TradeRecord};
pub use fees::{FeeError, FeeModel};
