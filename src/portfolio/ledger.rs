use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("insufficient position in '{stock_code}': held {held}, requested {requested}")]
    InsufficientPosition {
        stock_code: String,
        held: f64,
        requested: f64,
    },
}

//an open position carried at weighted-average cost
//average_cost is fee-inclusive and only meaningful while quantity > 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub quantity: f64,
    pub average_cost: f64,
}

//per-instrument cost-basis ledger
//zero-quantity entries never persist: selling a position down to exactly
//zero removes it
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: IndexMap<String, Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        PositionLedger {
            positions: IndexMap::new(),
        }
    }

    //returns the position for an instrument, or none if not held
    pub fn get(&self, stock_code: &str) -> Option<&Position> {
        self.positions.get(stock_code)
    }

    //records a buy at the given fee-inclusive unit cost
    //an existing position is re-averaged as the quantity-weighted mean of
    //the old and new lots
    pub fn apply_buy(&mut self, stock_code: &str, quantity: f64, unit_cost: f64) {
        match self.positions.get_mut(stock_code) {
            Some(position) => {
                let total_quantity = position.quantity + quantity;
                position.average_cost = (position.average_cost * position.quantity
                    + unit_cost * quantity)
                    / total_quantity;
                position.quantity = total_quantity;
            }
            None => {
                self.positions.insert(
                    stock_code.to_string(),
                    Position {
                        quantity,
                        average_cost: unit_cost,
                    },
                );
            }
        }
    }

    //records a sell and returns the pre-trade average cost for pnl
    //fails without mutating when the instrument is not held or the held
    //quantity is smaller than requested
    pub fn apply_sell(&mut self, stock_code: &str, quantity: f64) -> Result<f64, LedgerError> {
        let position = self.positions.get_mut(stock_code).ok_or_else(|| {
            LedgerError::InsufficientPosition {
                stock_code: stock_code.to_string(),
                held: 0.0,
                requested: quantity,
            }
        })?;

        if position.quantity < quantity {
            return Err(LedgerError::InsufficientPosition {
                stock_code: stock_code.to_string(),
                held: position.quantity,
                requested: quantity,
            });
        }

        let average_cost = position.average_cost;
        position.quantity -= quantity;

        if position.quantity == 0.0 {
            self.positions.shift_remove(stock_code);
        }

        Ok(average_cost)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions
            .iter()
            .map(|(code, position)| (code.as_str(), position))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
