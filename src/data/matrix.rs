use crate::signal::{Action, SignalPolicy};
use chrono::NaiveDate;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("dates not strictly increasing: {prev} followed by {next}")]
    NonMonotonicDates { prev: NaiveDate, next: NaiveDate },
    #[error("column '{stock_code}' has {actual} cells, expected {expected}")]
    ColumnLengthMismatch {
        stock_code: String,
        expected: usize,
        actual: usize,
    },
    #[error("negative price {price} for '{stock_code}' on {date}")]
    NegativePrice {
        stock_code: String,
        date: NaiveDate,
        price: f64,
    },
    #[error("non-finite value for '{stock_code}' on {date}")]
    NonFiniteValue { stock_code: String, date: NaiveDate },
    #[error("signal policy returned {actual} cells for a row of {expected}")]
    PolicyRowMismatch { expected: usize, actual: usize },
}

//dates must be strictly increasing and unique
fn validate_dates(dates: &[NaiveDate]) -> Result<(), InputError> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(InputError::NonMonotonicDates {
                prev: pair[0],
                next: pair[1],
            });
        }
    }
    Ok(())
}

fn validate_column_lengths<T>(
    expected: usize,
    columns: &IndexMap<String, Vec<Option<T>>>,
) -> Result<(), InputError> {
    for (stock_code, cells) in columns {
        if cells.len() != expected {
            return Err(InputError::ColumnLengthMismatch {
                stock_code: stock_code.clone(),
                expected,
                actual: cells.len(),
            });
        }
    }
    Ok(())
}

//raw numeric event values, date-indexed, one column per instrument
//column insertion order is the deterministic iteration order downstream
#[derive(Debug, Clone)]
pub struct RawMatrix {
    dates: Vec<NaiveDate>,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl RawMatrix {
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: IndexMap<String, Vec<Option<f64>>>,
    ) -> Result<Self, InputError> {
        validate_dates(&dates)?;
        validate_column_lengths(dates.len(), &columns)?;

        for (stock_code, cells) in &columns {
            for (row, cell) in cells.iter().enumerate() {
                if let Some(value) = cell {
                    if !value.is_finite() {
                        return Err(InputError::NonFiniteValue {
                            stock_code: stock_code.clone(),
                            date: dates[row],
                        });
                    }
                }
            }
        }

        Ok(RawMatrix { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &IndexMap<String, Vec<Option<f64>>> {
        &self.columns
    }

    //returns one row of raw values in column order
    pub fn row(&self, index: usize) -> Vec<Option<f64>> {
        self.columns.values().map(|cells| cells[index]).collect()
    }
}

//labeled trading signals, date-indexed, one column per instrument
#[derive(Debug, Clone)]
pub struct SignalMatrix {
    dates: Vec<NaiveDate>,
    columns: IndexMap<String, Vec<Option<Action>>>,
}

impl SignalMatrix {
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: IndexMap<String, Vec<Option<Action>>>,
    ) -> Result<Self, InputError> {
        validate_dates(&dates)?;
        validate_column_lengths(dates.len(), &columns)?;
        Ok(SignalMatrix { dates, columns })
    }

    //labels a raw event matrix row by row with the given policy
    pub fn from_raw(raw: &RawMatrix, policy: &dyn SignalPolicy) -> Result<Self, InputError> {
        let width = raw.columns().len();
        let mut columns: IndexMap<String, Vec<Option<Action>>> = raw
            .columns()
            .keys()
            .map(|code| (code.clone(), Vec::with_capacity(raw.dates().len())))
            .collect();

        for row in 0..raw.dates().len() {
            let labeled = policy.generate(&raw.row(row));
            if labeled.len() != width {
                return Err(InputError::PolicyRowMismatch {
                    expected: width,
                    actual: labeled.len(),
                });
            }
            for (cells, label) in columns.values_mut().zip(labeled) {
                cells.push(label);
            }
        }

        Ok(SignalMatrix {
            dates: raw.dates().to_vec(),
            columns,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &IndexMap<String, Vec<Option<Action>>> {
        &self.columns
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

//historical closing prices, date-indexed, one column per instrument
//an absent cell means no trading for that instrument on that date
#[derive(Debug, Clone)]
pub struct PriceMatrix {
    dates: Vec<NaiveDate>,
    columns: IndexMap<String, Vec<Option<f64>>>,
}

impl PriceMatrix {
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: IndexMap<String, Vec<Option<f64>>>,
    ) -> Result<Self, InputError> {
        validate_dates(&dates)?;
        validate_column_lengths(dates.len(), &columns)?;

        for (stock_code, cells) in &columns {
            for (row, cell) in cells.iter().enumerate() {
                if let Some(price) = cell {
                    if !price.is_finite() {
                        return Err(InputError::NonFiniteValue {
                            stock_code: stock_code.clone(),
                            date: dates[row],
                        });
                    }
                    if *price < 0.0 {
                        return Err(InputError::NegativePrice {
                            stock_code: stock_code.clone(),
                            date: dates[row],
                            price: *price,
                        });
                    }
                }
            }
        }

        Ok(PriceMatrix { dates, columns })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    //row index of an exact date, if present
    pub fn row_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    //closing price for (date, instrument); None when either is absent
    pub fn price_on(&self, date: NaiveDate, stock_code: &str) -> Option<f64> {
        let row = self.row_of(date)?;
        *self.columns.get(stock_code)?.get(row)?
    }

    //full closing-price column for one instrument
    pub fn closes(&self, stock_code: &str) -> Option<&[Option<f64>]> {
        self.columns.get(stock_code).map(Vec::as_slice)
    }
}
