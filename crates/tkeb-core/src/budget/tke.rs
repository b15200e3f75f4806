//! Fluctuating kinetic energy at the budget evaluation location.

use crate::domain::BudgetResult;
use crate::field::FieldSnapshot;
use crate::grid::VerticalGrid;
use crate::mean::MeanState;
use crate::numerics::Sampler;
use crate::reduction::{horizontal_mean, HorizontalReduction};

/// Center-interpolated, mean-subtracted velocity samples; the building
/// block for every flux and for the TKE itself. Only the horizontal
/// components carry a base state; the horizontal-mean vertical velocity is
/// zero in the divergence-free decomposed domain.
pub(super) struct Fluctuations<'a> {
    u: Sampler<'a>,
    v: Sampler<'a>,
    w: Sampler<'a>,
    mean: &'a MeanState,
}

impl<'a> Fluctuations<'a> {
    pub(super) fn new(
        snapshot: &FieldSnapshot<'a>,
        grid: &VerticalGrid,
        mean: &'a MeanState,
    ) -> BudgetResult<Self> {
        Ok(Self {
            u: Sampler::new(snapshot.u, grid)?,
            v: Sampler::new(snapshot.v, grid)?,
            w: Sampler::new(snapshot.w, grid)?,
            mean,
        })
    }

    pub(super) fn u_prime(&self, i: isize, j: isize, k: usize) -> f64 {
        self.u.at_center(i, j, k) - self.mean.u()[k]
    }

    pub(super) fn v_prime(&self, i: isize, j: isize, k: usize) -> f64 {
        self.v.at_center(i, j, k) - self.mean.v()[k]
    }

    pub(super) fn w_prime(&self, i: isize, j: isize, k: usize) -> f64 {
        self.w.at_center(i, j, k)
    }

    /// e' = (u'² + v'² + w'²) / 2 at the cell center.
    pub(super) fn energy(&self, i: isize, j: isize, k: usize) -> f64 {
        let u = self.u_prime(i, j, k);
        let v = self.v_prime(i, j, k);
        let w = self.w_prime(i, j, k);
        0.5 * (u * u + v * v + w * w)
    }
}

/// Horizontal-mean TKE profile ⟨e'⟩(k), shared by the viscous-transport,
/// storage, and closure paths of one step.
pub(super) fn mean_energy_profile(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    mean: &MeanState,
) -> BudgetResult<Vec<f64>> {
    let fluctuations = Fluctuations::new(snapshot, grid, mean)?;
    horizontal_mean(
        reduction,
        snapshot.itot(),
        snapshot.jtot(),
        grid.ktot(),
        |i, j, k| fluctuations.energy(i, j, k),
    )
}
