//! Dissipation estimate from the strain-rate contraction,
//!
//!   ε(k) = -⟨2 ν_eff S'_ij S'_ij⟩(k)
//!
//! with S' the strain rate of the mean-subtracted velocity. The published
//! profile is a budget sink and must be ≤ 0; the raw contraction is only
//! trusted up to a tolerance, beyond which the level is flagged with a
//! consistency warning and the magnitude is published with the sink sign.

use super::tke::Fluctuations;
use crate::domain::{BudgetError, BudgetResult, ConsistencyWarning};
use crate::field::{Field3, FieldSnapshot};
use crate::grid::VerticalGrid;
use crate::mean::MeanState;
use crate::numerics::Sampler;
use crate::reduction::{horizontal_mean, HorizontalReduction};

fn require_halo(
    field: &Field3,
    direction: &'static str,
    available: usize,
) -> BudgetResult<()> {
    if available < 1 {
        return Err(BudgetError::MissingHalo {
            field: field.name().to_string(),
            direction,
            required: 1,
            available,
        });
    }
    Ok(())
}

pub(super) fn compute(
    snapshot: &FieldSnapshot<'_>,
    grid: &VerticalGrid,
    reduction: &dyn HorizontalReduction,
    mean: &MeanState,
    sign_tolerance: f64,
) -> BudgetResult<(Vec<f64>, Vec<ConsistencyWarning>)> {
    // the cross-direction stencils reach one cell sideways beyond what the
    // samplers themselves guarantee
    require_halo(snapshot.u, "y", snapshot.u.jgc())?;
    require_halo(snapshot.v, "x", snapshot.v.igc())?;
    require_halo(snapshot.w, "x", snapshot.w.igc())?;
    require_halo(snapshot.w, "y", snapshot.w.jgc())?;

    let fluctuations = Fluctuations::new(snapshot, grid, mean)?;
    let evisc = Sampler::new(snapshot.evisc, grid)?;
    let itot = snapshot.itot();
    let jtot = snapshot.jtot();
    let ktot = grid.ktot();
    let z = grid.z();
    let dz = grid.dz();
    let dx = grid.dx();
    let dy = grid.dy();

    // centered z-stencil of a center quantity, one-sided at the walls
    let ddz = |sample: &dyn Fn(usize) -> f64, k: usize| {
        if k == 0 {
            (sample(1) - sample(0)) / (z[1] - z[0])
        } else if k == ktot - 1 {
            (sample(ktot - 1) - sample(ktot - 2)) / (z[ktot - 1] - z[ktot - 2])
        } else {
            (sample(k + 1) - sample(k - 1)) / (z[k + 1] - z[k - 1])
        }
    };

    let contraction = |i: isize, j: isize, k: usize| {
        let u = snapshot.u;
        let v = snapshot.v;
        let w = snapshot.w;

        // normal strains come straight off the faces
        let dudx = (u.value(i + 1, j, k) - u.value(i, j, k)) / dx;
        let dvdy = (v.value(i, j + 1, k) - v.value(i, j, k)) / dy;
        let dwdz = (w.value(i, j, k + 1) - w.value(i, j, k)) / dz[k];

        let dudy = (fluctuations.u_prime(i, j + 1, k) - fluctuations.u_prime(i, j - 1, k))
            / (2.0 * dy);
        let dvdx = (fluctuations.v_prime(i + 1, j, k) - fluctuations.v_prime(i - 1, j, k))
            / (2.0 * dx);
        let dwdx = (fluctuations.w_prime(i + 1, j, k) - fluctuations.w_prime(i - 1, j, k))
            / (2.0 * dx);
        let dwdy = (fluctuations.w_prime(i, j + 1, k) - fluctuations.w_prime(i, j - 1, k))
            / (2.0 * dy);
        // ddz is linear and the base state depends on z alone, so the
        // stencil of u' is already du/dz - d⟨u⟩/dz
        let dudz = ddz(&|kk| fluctuations.u_prime(i, j, kk), k);
        let dvdz = ddz(&|kk| fluctuations.v_prime(i, j, kk), k);

        let s12 = 0.5 * (dudy + dvdx);
        let s13 = 0.5 * (dudz + dwdx);
        let s23 = 0.5 * (dvdz + dwdy);

        let strain = dudx * dudx
            + dvdy * dvdy
            + dwdz * dwdz
            + 2.0 * (s12 * s12 + s13 * s13 + s23 * s23);
        2.0 * evisc.at_center(i, j, k) * strain
    };

    let raw = horizontal_mean(reduction, itot, jtot, ktot, |i, j, k| contraction(i, j, k))?;

    let mut warnings = Vec::new();
    let mut profile = Vec::with_capacity(ktot);
    for (k, &value) in raw.iter().enumerate() {
        if value < -sign_tolerance {
            tracing::warn!(level = k, raw = value, "dissipation contraction sign inverted");
            warnings.push(ConsistencyWarning::DissipationSignInverted { level: k, raw: value });
        }
        profile.push(-value.abs());
    }
    Ok((profile, warnings))
}
