pub mod event_window;

pub use event_window::{EventAnalyzer, PrePostReturns};
