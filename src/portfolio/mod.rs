pub mod ledger;

pub use ledger::{LedgerError, Position, PositionLedger};
