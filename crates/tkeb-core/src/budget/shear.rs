//! Shear production: energy extracted from the mean flow by the vertical
//! turbulent momentum fluxes working against the mean shear,
//!
//!   P_shear(k) = -⟨u'w'⟩(k) d⟨u⟩/dz(k) - ⟨v'w'⟩(k) d⟨v⟩/dz(k)

use super::tke::Fluctuations;
use crate::domain::BudgetResult;
use crate::field::FieldSnapshot;
use crate::grid::VerticalGrid;
use crate::mean::MeanState;
use crate::numerics::vertical_derivative;
use crate::reduction::{horizontal_mean, HorizontalReduction};

pub(super) fn compute(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    mean: &MeanState,
) -> BudgetResult<Vec<f64>> {
    let fluctuations = Fluctuations::new(snapshot, grid, mean)?;
    let itot = snapshot.itot();
    let jtot = snapshot.jtot();
    let ktot = grid.ktot();

    let uw_flux = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| {
        fluctuations.u_prime(i, j, k) * fluctuations.w_prime(i, j, k)
    })?;
    let vw_flux = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| {
        fluctuations.v_prime(i, j, k) * fluctuations.w_prime(i, j, k)
    })?;

    let dudz = vertical_derivative(mean.u(), grid)?;
    let dvdz = vertical_derivative(mean.v(), grid)?;

    Ok((0..ktot)
        .map(|k| -uw_flux[k] * dudz[k] - vw_flux[k] * dvdz[k])
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
    fn sinusoidal_flux_against_linear_shear_matches_hand_computation() {
        let (itot, jtot, ktot) = (16, 4, 4);
        let grid = VerticalGrid::uniform(ktot, 4.0, 1.0, 1.0).expect("grid");
        let shear_rate = 2.0;

        // u = S*z + a*sin(x), w = b*sin(x): correlated fluctuations with a
        // height-independent covariance against a constant mean shear.
        let wave = |i: isize| (TAU * i as f64 / itot as f64).sin();
        let mut u = Field3::from_fn(
            "u",
            StaggerLocation::XFace,
            itot,
            jtot,
            ktot,
            1,
            1,
            |i, _, k| shear_rate * grid.z()[k] + 0.3 * wave(i),
        );
        let mut w = Field3::from_fn(
            "w",
            StaggerLocation::ZFace,
            itot,
            jtot,
            ktot + 1,
            1,
            1,
            |i, _, _| 0.1 * wave(i),
        );
        u.fill_periodic_halos();
        w.fill_periodic_halos();
        let v = Field3::filled("v", StaggerLocation::YFace, itot, jtot, ktot, 1, 1, 0.0);
        let theta = Field3::filled("th", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 300.0);
        let p = Field3::filled("p", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 0.0);
        let evisc = Field3::filled("evisc", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 0.0);

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

        // discrete covariance of the center-interpolated waves
        let mut flux = 0.0;
        for i in 0..itot as isize {
            let u_center = 0.3 * 0.5 * (wave(i) + wave(i + 1));
            let w_center = 0.1 * wave(i);
            flux += u_center * w_center;
        }
        flux /= itot as f64;
        let expected = -flux * shear_rate;

        let shear = compute(&snapshot, &grid, &reduction, &mean).expect("shear");
        for value in shear {
            assert!(
                (value - expected).abs() < 1.0e-12,
                "expected {expected}, got {value}"
            );
        }
    }

    #[test]
    fn quiescent_flow_produces_no_shear_term() {
        let (itot, jtot, ktot) = (4, 4, 3);
        let grid = VerticalGrid::uniform(ktot, 3.0, 1.0, 1.0).expect("grid");
        let u = Field3::filled("u", StaggerLocation::XFace, itot, jtot, ktot, 1, 1, 5.0);
        let v = Field3::filled("v", StaggerLocation::YFace, itot, jtot, ktot, 1, 1, -2.0);
        let w = Field3::filled("w", StaggerLocation::ZFace, itot, jtot, ktot + 1, 1, 1, 0.0);
        let theta = Field3::filled("th", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 300.0);
        let p = Field3::filled("p", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 0.0);
        let evisc = Field3::filled("evisc", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 0.0);

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

        let shear = compute(&snapshot, &grid, &reduction, &mean).expect("shear");
        assert!(shear.iter().all(|value| value.abs() < 1.0e-14));
    }
}
