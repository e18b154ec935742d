pub mod loader;
pub mod matrix;

pub use loader::{load_benchmark_csv, load_price_csv, load_raw_csv};
pub use matrix::{InputError, PriceMatrix, RawMatrix, SignalMatrix};
