//! Buoyant production/destruction: the turbulent vertical heat flux scaled
//! by the buoyancy parameter,
//!
//!   P_buoy(k) = (g / θ₀) ⟨w'θ'⟩(k)
//!
//! Positive under convective forcing, negative (a sink) under stable
//! stratification. θ fluctuations are taken against the horizontal mean θ
//! at each level, recomputed through the same reduction as every profile.

use super::tke::Fluctuations;
use crate::domain::BudgetResult;
use crate::field::FieldSnapshot;
use crate::grid::VerticalGrid;
use crate::mean::MeanState;
use crate::numerics::Sampler;
use crate::reduction::{horizontal_mean, HorizontalReduction};

pub(super) fn compute(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    mean: &MeanState,
    gravity: f64,
    reference_theta: f64,
) -> BudgetResult<Vec<f64>> {
    let fluctuations = Fluctuations::new(snapshot, grid, mean)?;
    let theta = Sampler::new(snapshot.theta, grid)?;
    let itot = snapshot.itot();
    let jtot = snapshot.jtot();
    let ktot = grid.ktot();

    let theta_mean = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| {
        theta.at_center(i, j, k)
    })?;
    let heat_flux = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| {
        fluctuations.w_prime(i, j, k) * (theta.at_center(i, j, k) - theta_mean[k])
    })?;

    let buoyancy_factor = gravity / reference_theta;
    Ok(heat_flux
        .into_iter()
        .map(|flux| buoyancy_factor * flux)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::compute;
    use crate::field::{Field3, FieldSnapshot, StaggerLocation};
    use crate::grid::VerticalGrid;
    use crate::mean::MeanState;
    use crate::reduction::SingleRankReduction;
    use std::f64::consts::TAU;

    #[test]
    fn correlated_updrafts_produce_and_anticorrelated_destroy() {
        let (itot, jtot, ktot) = (16, 4, 3);
        let grid = VerticalGrid::uniform(ktot, 3.0, 1.0, 1.0).expect("grid");
        let wave = |i: isize| (TAU * i as f64 / itot as f64).sin();

        let u = Field3::filled("u", StaggerLocation::XFace, itot, jtot, ktot, 1, 1, 0.0);
        let v = Field3::filled("v", StaggerLocation::YFace, itot, jtot, ktot, 1, 1, 0.0);
        let p = Field3::filled("p", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 0.0);
        let evisc = Field3::filled("evisc", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 0.0);
        let mut w = Field3::from_fn(
            "w",
            StaggerLocation::ZFace,
            itot,
            jtot,
            ktot + 1,
            1,
            1,
            |i, _, _| 0.2 * wave(i),
        );
        w.fill_periodic_halos();

        for theta_amplitude in [0.5, -0.5] {
            let mut theta = Field3::from_fn(
                "th",
                StaggerLocation::Center,
                itot,
                jtot,
                ktot,
                1,
                1,
                |i, _, _| 300.0 + theta_amplitude * wave(i),
            );
            theta.fill_periodic_halos();

            let snapshot = FieldSnapshot {
                u: &u,
                v: &v,
                w: &w,
                theta: &theta,
                p: &p,
                evisc: &evisc,
            };
            let reduction = SingleRankReduction::new(itot, jtot);
            let mut mean = MeanState::new(ktot);
            mean.recompute(&snapshot, &grid, &reduction).expect("means");

            let buoyancy = compute(&snapshot, &grid, &reduction, &mean, 9.81, 300.0)
                .expect("buoyancy");

            // discrete covariance of the sampled waves
            let mut flux = 0.0;
            for i in 0..itot as isize {
                flux += 0.2 * wave(i) * theta_amplitude * wave(i);
            }
            flux /= itot as f64;
            let expected = 9.81 / 300.0 * flux;

            for value in &buoyancy {
                assert!(
                    (value - expected).abs() < 1.0e-12,
                    "expected {expected}, got {value}"
                );
            }
            if theta_amplitude > 0.0 {
                assert!(buoyancy.iter().all(|value| *value > 0.0));
            } else {
                assert!(buoyancy.iter().all(|value| *value < 0.0));
            }
        }
    }
}
