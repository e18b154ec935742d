pub mod threshold;

use serde::{Deserialize, Serialize};
use std::fmt;

//trade action (buy or sell); an absent signal cell is represented as None
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    //parse the canonical lowercase encoding ("buy" / "sell")
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(Action::Buy),
            "sell" => Some(Action::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
        }
    }
}

//signal-generation policy: maps a row of raw numeric event values
//to a row of trade actions, one cell per instrument column
pub trait SignalPolicy {
    //labels one raw row; output length must equal input length
    fn generate(&self, raw_row: &[Option<f64>]) -> Vec<Option<Action>>;

    //returns the policy name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_encoding() {
        assert_eq!(Action::parse("buy"), Some(Action::Buy));
        assert_eq!(Action::parse("sell"), Some(Action::Sell));
        //encoding is case-sensitive lowercase
        assert_eq!(Action::parse("Buy"), None);
        assert_eq!(Action::parse("hold"), None);
    }

    #[test]
    fn display_matches_encoding() {
        assert_eq!(Action::Buy.to_string(), "buy");
        assert_eq!(Action::Sell.to_string(), "sell");
    }
}
