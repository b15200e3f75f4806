//! Vertical transport terms: redistribution of TKE without net production.
//!
//! All three fluxes are evaluated at z-faces and differenced to cell
//! centers in flux form,
//!
//!   T(k) = -(F(k+1) - F(k)) / dz(k)
//!
//! so the dz-weighted vertical integral telescopes exactly to the boundary
//! fluxes: with no flux through the top and bottom faces the
//! domain-integrated transport vanishes to rounding.

use super::tke::Fluctuations;
use crate::domain::BudgetResult;
use crate::field::FieldSnapshot;
use crate::grid::VerticalGrid;
use crate::mean::MeanState;
use crate::numerics::Sampler;
use crate::reduction::{horizontal_mean, HorizontalReduction};

fn flux_divergence(face_flux: &[f64], grid: &VerticalGrid) -> Vec<f64> {
    let dz = grid.dz();
    (0..grid.ktot())
        .map(|k| -(face_flux[k + 1] - face_flux[k]) / dz[k])
        .collect()
}

/// Turbulent transport: -d⟨w'e'⟩/dz.
pub(super) fn turbulent(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    mean: &MeanState,
) -> BudgetResult<Vec<f64>> {
    let fluctuations = Fluctuations::new(snapshot, grid, mean)?;
    let w = Sampler::new(snapshot.w, grid)?;
    let ktot = grid.ktot();

    // e' lives at centers; average the bracketing centers onto each
    // interior face. At the boundary faces the clamped value multiplies
    // the boundary w, so a no-penetration boundary carries zero flux.
    let energy_at_face = |i: isize, j: isize, kf: usize| {
        if kf == 0 {
            fluctuations.energy(i, j, 0)
        } else if kf == ktot {
            fluctuations.energy(i, j, ktot - 1)
        } else {
            0.5 * (fluctuations.energy(i, j, kf - 1) + fluctuations.energy(i, j, kf))
        }
    };

    let face_flux = horizontal_mean(
        reduction,
        snapshot.itot(),
        snapshot.jtot(),
        ktot + 1,
        |i, j, kf| w.at_zface(i, j, kf) * energy_at_face(i, j, kf),
    )?;

    Ok(flux_divergence(&face_flux, grid))
}

/// Pressure transport: -d(⟨w'p'⟩/ρ₀)/dz.
pub(super) fn pressure(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    reference_density: f64,
) -> BudgetResult<Vec<f64>> {
    let p = Sampler::new(snapshot.p, grid)?;
    let w = Sampler::new(snapshot.w, grid)?;
    let itot = snapshot.itot();
    let jtot = snapshot.jtot();
    let ktot = grid.ktot();

    let p_mean = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| p.at_center(i, j, k))?;
    let p_prime_at_face = |i: isize, j: isize, kf: usize| {
        if kf == 0 {
            p.at_center(i, j, 0) - p_mean[0]
        } else if kf == ktot {
            p.at_center(i, j, ktot - 1) - p_mean[ktot - 1]
        } else {
            0.5 * ((p.at_center(i, j, kf - 1) - p_mean[kf - 1])
                + (p.at_center(i, j, kf) - p_mean[kf]))
        }
    };

    let inverse_density = 1.0 / reference_density;
    let face_flux = horizontal_mean(reduction, itot, jtot, ktot + 1, |i, j, kf| {
        w.at_zface(i, j, kf) * p_prime_at_face(i, j, kf) * inverse_density
    })?;

    Ok(flux_divergence(&face_flux, grid))
}

/// Viscous transport: d/dz(ν d⟨e'⟩/dz), the diffusive redistribution the
/// viscous term contributes on top of dissipation. The boundary faces
/// carry no diffusive flux.
pub(super) fn viscous(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    energy_mean: &[f64],
) -> BudgetResult<Vec<f64>> {
    let evisc = Sampler::new(snapshot.evisc, grid)?;
    let itot = snapshot.itot();
    let jtot = snapshot.jtot();
    let ktot = grid.ktot();

    let evisc_mean = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| {
        evisc.at_center(i, j, k)
    })?;

    let dzh = grid.dzh();
    let mut face_flux = vec![0.0; ktot + 1];
    for kf in 1..ktot {
        let viscosity = 0.5 * (evisc_mean[kf - 1] + evisc_mean[kf]);
        // downgradient flux, negated so flux_divergence adds energy where
        // the profile is locally depleted
        face_flux[kf] = -viscosity * (energy_mean[kf] - energy_mean[kf - 1]) / dzh[kf];
    }

    Ok(flux_divergence(&face_flux, grid))
}

#[cfg(test)]
mod tests {
    use super::{pressure, turbulent, viscous};
    use crate::budget::tke::mean_energy_profile;
    use crate::field::{Field3, FieldSnapshot, StaggerLocation};
    use crate::grid::VerticalGrid;
    use crate::mean::MeanState;
    use crate::numerics::stable_sum;
    use crate::reduction::SingleRankReduction;
    use std::f64::consts::TAU;

    fn snapshot_fields(
        itot: usize,
        jtot: usize,
        ktot: usize,
    ) -> (Field3, Field3, Field3, Field3, Field3, Field3) {
        let wave = |i: isize| (TAU * i as f64 / itot as f64).sin();
        // second harmonic, so the third-moment flux ⟨w'e'⟩ does not
        // average out the way a single-harmonic field would
        let wave2 = |i: isize| (2.0 * TAU * i as f64 / itot as f64).cos();
        let mut u = Field3::from_fn(
            "u",
            StaggerLocation::XFace,
            itot,
            jtot,
            ktot,
            1,
            1,
            |i, _, k| 0.4 * (k as f64 + 1.0) * wave(i),
        );
        // w vanishes on the top and bottom faces: no boundary flux leakage
        let mut w = Field3::from_fn(
            "w",
            StaggerLocation::ZFace,
            itot,
            jtot,
            ktot + 1,
            1,
            1,
            |i, _, kf| {
                if kf == 0 || kf == ktot {
                    0.0
                } else {
                    0.15 * wave2(i) * (kf as f64 * (ktot - kf) as f64)
                }
            },
        );
        let mut p = Field3::from_fn(
            "p",
            StaggerLocation::Center,
            itot,
            jtot,
            ktot,
            1,
            1,
            |i, _, k| 0.8 * wave2(i) + 0.05 * k as f64,
        );
        u.fill_periodic_halos();
        w.fill_periodic_halos();
        p.fill_periodic_halos();
        let v = Field3::filled("v", StaggerLocation::YFace, itot, jtot, ktot, 1, 1, 0.0);
        let theta = Field3::filled("th", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 300.0);
        let evisc = Field3::filled("evisc", StaggerLocation::Center, itot, jtot, ktot, 1, 1, 1.0e-3);
        (u, v, w, theta, p, evisc)
    }

    #[test]
    fn turbulent_transport_integrates_to_zero_without_boundary_flux() {
        let (itot, jtot, ktot) = (12, 6, 5);
        let grid = VerticalGrid::uniform(ktot, 10.0, 1.0, 1.0).expect("grid");
        let (u, v, w, theta, p, evisc) = snapshot_fields(itot, jtot, ktot);
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

        let transport = turbulent(&snapshot, &grid, &reduction, &mean).expect("transport");
        let weighted: Vec<f64> = transport
            .iter()
            .zip(grid.dz())
            .map(|(t, dz)| t * dz)
            .collect();
        let integral = stable_sum(&weighted);
        assert!(
            integral.abs() < 1.0e-12,
            "transport should redistribute, integral = {integral}"
        );
        // and actually redistributes something
        assert!(transport.iter().any(|t| t.abs() > 1.0e-8));
    }

    #[test]
    fn pressure_transport_integrates_to_zero_without_boundary_flux() {
        let (itot, jtot, ktot) = (12, 6, 5);
        let grid = VerticalGrid::uniform(ktot, 10.0, 1.0, 1.0).expect("grid");
        let (u, v, w, theta, p, evisc) = snapshot_fields(itot, jtot, ktot);
        let snapshot = FieldSnapshot {
            u: &u,
            v: &v,
            w: &w,
            theta: &theta,
            p: &p,
            evisc: &evisc,
        };
        let reduction = SingleRankReduction::new(itot, jtot);

        let transport = pressure(&snapshot, &grid, &reduction, 1.2).expect("transport");
        let weighted: Vec<f64> = transport
            .iter()
            .zip(grid.dz())
            .map(|(t, dz)| t * dz)
            .collect();
        assert!(stable_sum(&weighted).abs() < 1.0e-12);
        assert!(transport.iter().any(|t| t.abs() > 1.0e-8));
    }

    #[test]
    fn viscous_transport_integrates_to_zero_and_smooths_the_profile() {
        let (itot, jtot, ktot) = (12, 6, 5);
        let grid = VerticalGrid::uniform(ktot, 10.0, 1.0, 1.0).expect("grid");
        let (u, v, w, theta, p, evisc) = snapshot_fields(itot, jtot, ktot);
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
        let energy = mean_energy_profile(&snapshot, &grid, &reduction, &mean).expect("tke");

        let transport = viscous(&snapshot, &grid, &reduction, &energy).expect("transport");
        let weighted: Vec<f64> = transport
            .iter()
            .zip(grid.dz())
            .map(|(t, dz)| t * dz)
            .collect();
        assert!(stable_sum(&weighted).abs() < 1.0e-14);

        // diffusion drains the TKE maximum
        let peak = energy
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .expect("peak level");
        assert!(transport[peak] < 0.0);
    }
}
