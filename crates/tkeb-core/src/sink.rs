//! Output boundary: completed steps are handed to a statistics sink, which
//! owns timestamps, encoding, and persistence. The engine never publishes
//! a partial step; `publish_step` forwards only after `exec_step` returned
//! a complete result.

use crate::domain::BudgetStep;

pub trait StatisticsSink {
    fn publish(&mut self, step: BudgetStep);
}

/// In-memory sink for tests and the demo driver.
#[derive(Debug, Default)]
pub struct MemorySink {
    steps: Vec<BudgetStep>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[BudgetStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<BudgetStep> {
        self.steps
    }
}

impl StatisticsSink for MemorySink {
    fn publish(&mut self, step: BudgetStep) {
        self.steps.push(step);
    }
}
