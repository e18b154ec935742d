use crate::signal::{Action, SignalPolicy};

//reference threshold policy
//values above the threshold label buy, below label sell,
//exactly at the threshold (or null) stay unlabeled
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    threshold: f64,
}

impl ThresholdPolicy {
    pub fn new(threshold: f64) -> Self {
        ThresholdPolicy { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy { threshold: 50.0 }
    }
}

impl SignalPolicy for ThresholdPolicy {
    fn generate(&self, raw_row: &[Option<f64>]) -> Vec<Option<Action>> {
        raw_row
            .iter()
            .map(|cell| match cell {
                Some(value) if *value > self.threshold => Some(Action::Buy),
                Some(value) if *value < self.threshold => Some(Action::Sell),
                _ => None,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "threshold"
    }
}
