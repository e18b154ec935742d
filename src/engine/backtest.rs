use crate::config::PositionPolicy;
use crate::data::{PriceMatrix, SignalMatrix};
use crate::engine::fees::FeeModel;
use crate::portfolio::{LedgerError, PositionLedger};
use crate::signal::Action;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid trade quantity: {0}")]
    InvalidQuantity(f64),
    #[error(transparent)]
    InsufficientPosition(#[from] LedgerError),
}

//an executed trade, immutable once appended to the log
//pnl is zero for buys (the buy fee is capitalized into average cost) and
//(price - average_cost_before) * amount - fee for sells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub stock_code: String,
    pub action: Action,
    pub amount: f64,
    pub price: f64,
    pub fee: f64,
    pub pnl: f64,
}

//what a completed run leaves behind: the ordered trade log and the
//end-of-run ledger
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub trades: Vec<TradeRecord>,
    pub ledger: PositionLedger,
}

//replays a signal matrix against closing prices, one fixed-size trade per
//signalled cell
//
//dates are walked in ascending order; same-date signals execute in the
//signal matrix column order, so a given input always produces the same log
pub struct TradeEngine<'a> {
    signals: &'a SignalMatrix,
    prices: &'a PriceMatrix,
    fees: FeeModel,
    trade_quantity: f64,
    policy: PositionPolicy,
    ledger: PositionLedger,
    trades: Vec<TradeRecord>,
}

impl<'a> TradeEngine<'a> {
    //creates a new engine over pre-validated matrices
    //the per-trade quantity is a fixed unit, not a sizing model
    pub fn new(
        signals: &'a SignalMatrix,
        prices: &'a PriceMatrix,
        fees: FeeModel,
        trade_quantity: f64,
        policy: PositionPolicy,
    ) -> Result<Self, EngineError> {
        if !trade_quantity.is_finite() || trade_quantity <= 0.0 {
            return Err(EngineError::InvalidQuantity(trade_quantity));
        }

        Ok(TradeEngine {
            signals,
            prices,
            fees,
            trade_quantity,
            policy,
            ledger: PositionLedger::new(),
            trades: Vec::new(),
        })
    }

    //runs the full pass over the signal matrix
    //consumes the engine: every run starts from a fresh ledger and log
    pub fn execute(mut self) -> Result<BacktestOutcome, EngineError> {
        let signals = self.signals;
        let prices = self.prices;
        let quantity = self.trade_quantity;

        for (row, &date) in signals.dates().iter().enumerate() {
            for (stock_code, cells) in signals.columns() {
                let Some(action) = cells[row] else {
                    continue;
                };

                //no price, no trade
                let Some(price) = prices.price_on(date, stock_code) else {
                    continue;
                };

                let notional = quantity * price;
                let fee = self.fees.fee(action, notional);

                match action {
                    Action::Buy => {
                        let unit_cost = self.fees.buy_unit_cost(price);
                        self.ledger.apply_buy(stock_code, quantity, unit_cost);
                        self.trades.push(TradeRecord {
                            date,
                            stock_code: stock_code.clone(),
                            action,
                            amount: quantity,
                            price,
                            fee,
                            pnl: 0.0,
                        });
                    }
                    Action::Sell => {
                        let average_cost = match self.ledger.apply_sell(stock_code, quantity) {
                            Ok(average_cost) => average_cost,
                            Err(err) => match self.policy {
                                //cannot sell what is not held
                                PositionPolicy::Skip => continue,
                                PositionPolicy::Fail => return Err(err.into()),
                            },
                        };

                        let pnl = (price - average_cost) * quantity - fee;
                        self.trades.push(TradeRecord {
                            date,
                            stock_code: stock_code.clone(),
                            action,
                            amount: quantity,
                            price,
                            fee,
                            pnl,
                        });
                    }
                }
            }
        }

        Ok(BacktestOutcome {
            trades: self.trades,
            ledger: self.ledger,
        })
    }
}
