//! Storage: the measured rate of change of ⟨e'⟩ between diagnostic steps,
//! the left-hand side the remaining terms should sum to when the budget
//! closes.

use crate::domain::{BudgetError, BudgetResult, ConsistencyWarning};
use crate::field::StaggerLocation;
use crate::mean::TkeSample;

pub(super) fn compute(
    energy_mean: &[f64],
    previous: Option<&TkeSample>,
    time: f64,
) -> BudgetResult<(Vec<f64>, Option<ConsistencyWarning>)> {
    match previous {
        Some(sample) => {
            let dt = time - sample.time;
            if !dt.is_finite() || dt <= 0.0 {
                return Err(BudgetError::InvalidTimeStep { dt });
            }
            if sample.profile.len() != energy_mean.len() {
                return Err(BudgetError::VerticalExtentMismatch {
                    field: "previous_tke".to_string(),
                    location: StaggerLocation::Center,
                    field_levels: sample.profile.len(),
                    grid_levels: energy_mean.len(),
                });
            }
            let rate = 1.0 / dt;
            let profile = energy_mean
                .iter()
                .zip(&sample.profile)
                .map(|(now, before)| (now - before) * rate)
                .collect();
            Ok((profile, None))
        }
        None => Ok((
            vec![0.0; energy_mean.len()],
            Some(ConsistencyWarning::StorageUnavailable),
        )),
    }
}
