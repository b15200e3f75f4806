//! Vertical differencing of center-level profiles on the stretched metric.
//!
//! Interior levels use a centered difference across the two neighboring
//! centers; the top and bottom levels fall back to one-sided differences so
//! no access ever leaves the valid vertical extent.

use crate::domain::{BudgetError, BudgetResult};
use crate::grid::VerticalGrid;

/// d(profile)/dz at cell-center level `k`.
pub fn vertical_derivative_at(
    profile: &[f64],
    grid: &VerticalGrid,
    k: usize,
) -> BudgetResult<f64> {
    let ktot = grid.ktot();
    if profile.len() != ktot {
        return Err(BudgetError::VerticalExtentMismatch {
            field: "profile".to_string(),
            location: crate::field::StaggerLocation::Center,
            field_levels: profile.len(),
            grid_levels: ktot,
        });
    }
    if k >= ktot {
        return Err(BudgetError::LevelOutOfBounds { level: k, levels: ktot });
    }

    let z = grid.z();
    let value = if k == 0 {
        (profile[1] - profile[0]) / (z[1] - z[0])
    } else if k == ktot - 1 {
        (profile[ktot - 1] - profile[ktot - 2]) / (z[ktot - 1] - z[ktot - 2])
    } else {
        (profile[k + 1] - profile[k - 1]) / (z[k + 1] - z[k - 1])
    };
    Ok(value)
}

/// d(profile)/dz at every cell-center level.
pub fn vertical_derivative(profile: &[f64], grid: &VerticalGrid) -> BudgetResult<Vec<f64>> {
    (0..grid.ktot())
        .map(|k| vertical_derivative_at(profile, grid, k))
        .collect()
}
