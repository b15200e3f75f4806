//! Mean-profile context owned by the caller's diagnostic step.
//!
//! Holds the horizontal-mean horizontal-velocity profiles used as the base
//! state for fluctuations, plus the previous TKE sample for the storage
//! term. `recompute` overwrites the profiles in place from the current
//! snapshot; the stored means are never running averages, they reflect
//! exactly the snapshot of the most recent call. An inconsistent base
//! state between this tracker and the flux terms would silently break
//! budget closure, so every calculator takes its means from here.

use crate::domain::BudgetResult;
use crate::field::FieldSnapshot;
use crate::grid::VerticalGrid;
use crate::numerics::Sampler;
use crate::reduction::{horizontal_mean, HorizontalReduction};

#[derive(Debug, Clone, PartialEq)]
pub struct TkeSample {
    pub time: f64,
    pub profile: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanState {
    u: Vec<f64>,
    v: Vec<f64>,
    previous_tke: Option<TkeSample>,
}

impl MeanState {
    pub fn new(ktot: usize) -> Self {
        Self {
            u: vec![0.0; ktot],
            v: vec![0.0; ktot],
            previous_tke: None,
        }
    }

    /// Overwrites the stored mean profiles from the current snapshot,
    /// through the same collective path as every budget term.
    pub fn recompute(
        &mut self,
        snapshot: &FieldSnapshot<'_>,
        grid: &VerticalGrid,
        reduction: &dyn HorizontalReduction,
    ) -> BudgetResult<()> {
        let u = Sampler::new(snapshot.u, grid)?;
        let v = Sampler::new(snapshot.v, grid)?;
        let itot = snapshot.itot();
        let jtot = snapshot.jtot();

        self.u = horizontal_mean(reduction, itot, jtot, grid.ktot(), |i, j, k| {
            u.at_center(i, j, k)
        })?;
        self.v = horizontal_mean(reduction, itot, jtot, grid.ktot(), |i, j, k| {
            v.at_center(i, j, k)
        })?;
        Ok(())
    }

    pub fn u(&self) -> &[f64] {
        &self.u
    }

    pub fn v(&self) -> &[f64] {
        &self.v
    }

    pub fn previous_tke(&self) -> Option<&TkeSample> {
        self.previous_tke.as_ref()
    }

    pub fn store_tke_sample(&mut self, time: f64, profile: Vec<f64>) {
        self.previous_tke = Some(TkeSample { time, profile });
    }
}
