use crate::signal::Action;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeeError {
    #[error("negative fee rate: {0}")]
    NegativeRate(f64),
    #[error("non-finite fee rate")]
    NonFiniteRate,
}

//proportional transaction-cost model
//fee = notional * rate, no minimum floor, no rounding
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeModel {
    buy_rate: f64,
    sell_rate: f64,
}

impl FeeModel {
    pub fn new(buy_rate: f64, sell_rate: f64) -> Result<Self, FeeError> {
        for rate in [buy_rate, sell_rate] {
            if !rate.is_finite() {
                return Err(FeeError::NonFiniteRate);
            }
            if rate < 0.0 {
                return Err(FeeError::NegativeRate(rate));
            }
        }
        Ok(FeeModel {
            buy_rate,
            sell_rate,
        })
    }

    //single shared rate for both sides
    pub fn flat(rate: f64) -> Result<Self, FeeError> {
        FeeModel::new(rate, rate)
    }

    pub fn buy_rate(&self) -> f64 {
        self.buy_rate
    }

    pub fn sell_rate(&self) -> f64 {
        self.sell_rate
    }

    //fee charged on a trade notional
    pub fn fee(&self, action: Action, notional: f64) -> f64 {
        match action {
            Action::Buy => notional * self.buy_rate,
            Action::Sell => notional * self.sell_rate,
        }
    }

    //fee-inclusive cost of one unit bought at the given price
    pub fn buy_unit_cost(&self, price: f64) -> f64 {
        price * (1.0 + self.buy_rate)
    }
}
