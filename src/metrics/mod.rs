pub mod summary;
pub mod timeseries;

pub use summary::{MetricsCalculator, MetricsReport};
pub use timeseries::{benchmark_comparison, cumulative_pnl, ComparisonPoint, CumulativePoint};
