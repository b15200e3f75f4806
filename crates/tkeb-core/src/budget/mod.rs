//! The budget engine: one diagnostic step over a borrowed field snapshot.
//!
//! A step recomputes the mean base state, evaluates every term of
//! [`BudgetTerm::ALL`](crate::domain::BudgetTerm) in that fixed order, runs
//! the closure check, and returns the complete set of profiles. The term
//! order is load-bearing: each calculator issues its collective reductions
//! in sequence, and all ranks of the group must take them in the same
//! order. A step either produces every profile or returns an error with
//! nothing published.

mod buoyancy;
mod dissipation;
mod shear;
mod storage;
mod tke;
mod transport;

use crate::domain::{
    BudgetError, BudgetResult, BudgetStep, BudgetTerm, ConsistencyWarning, TermProfile,
};
use crate::field::FieldSnapshot;
use crate::grid::VerticalGrid;
use crate::mean::MeanState;
use crate::numerics::within_tolerance;
use crate::reduction::HorizontalReduction;

/// Physical and tolerance parameters of the budget evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetParams {
    /// Gravitational acceleration g.
    pub gravity: f64,
    /// Reference potential temperature θ₀ for the buoyancy factor.
    pub reference_theta: f64,
    /// Reference density ρ₀ for the pressure transport.
    pub reference_density: f64,
    /// Magnitude beyond which an inverted raw dissipation sign is flagged.
    pub dissipation_sign_tolerance: f64,
    /// Absolute closure tolerance on the per-level budget residual.
    pub closure_abs_tolerance: f64,
    /// Relative closure tolerance against the storage magnitude.
    pub closure_rel_tolerance: f64,
}

impl Default for BudgetParams {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            reference_theta: 300.0,
            reference_density: 1.2,
            dissipation_sign_tolerance: 1.0e-12,
            closure_abs_tolerance: 1.0e-10,
            closure_rel_tolerance: 1.0e-2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BudgetEngine {
    params: BudgetParams,
}

impl BudgetEngine {
    pub fn new(params: BudgetParams) -> BudgetResult<Self> {
        for (field, value) in [
            ("gravity", params.gravity),
            ("reference_theta", params.reference_theta),
            ("reference_density", params.reference_density),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BudgetError::InvalidParameter { field, value });
            }
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &BudgetParams {
        &self.params
    }

    /// Runs one full diagnostic step at simulation time `time`.
    ///
    /// `mean` is the caller-owned mutable context: its base-state profiles
    /// are overwritten from this snapshot before any flux is computed, and
    /// its TKE sample is advanced on success so the next step can measure
    /// storage.
    pub fn exec_step(
        &self,
        snapshot: &FieldSnapshot<'_>,
        grid: &VerticalGrid,
        reduction: &dyn HorizontalReduction,
        mean: &mut MeanState,
        time: f64,
    ) -> BudgetResult<BudgetStep> {
        snapshot.validate_tile()?;
        tracing::debug!(time, ktot = grid.ktot(), "budget diagnostic step");

        mean.recompute(snapshot, grid, reduction)?;
        let energy_mean = tke::mean_energy_profile(snapshot, grid, reduction, mean)?;

        let mut warnings = Vec::new();

        let shear = shear::compute(snapshot, grid, reduction, mean)?;
        let buoyancy = buoyancy::compute(
            snapshot,
            grid,
            reduction,
            mean,
            self.params.gravity,
            self.params.reference_theta,
        )?;
        let turbulent = transport::turbulent(snapshot, grid, reduction, mean)?;
        let pressure =
            transport::pressure(snapshot, grid, reduction, self.params.reference_density)?;
        let viscous = transport::viscous(snapshot, grid, reduction, &energy_mean)?;
        let (dissipation, mut dissipation_warnings) = dissipation::compute(
            snapshot,
            grid,
            reduction,
            mean,
            self.params.dissipation_sign_tolerance,
        )?;
        warnings.append(&mut dissipation_warnings);

        let (storage_profile, storage_warning) =
            storage::compute(&energy_mean, mean.previous_tke(), time)?;
        let storage_available = storage_warning.is_none();
        warnings.extend(storage_warning);

        let step = BudgetStep {
            time,
            profiles: vec![
                TermProfile::new(BudgetTerm::Shear, shear),
                TermProfile::new(BudgetTerm::Buoyancy, buoyancy),
                TermProfile::new(BudgetTerm::TurbulentTransport, turbulent),
                TermProfile::new(BudgetTerm::PressureTransport, pressure),
                TermProfile::new(BudgetTerm::ViscousTransport, viscous),
                TermProfile::new(BudgetTerm::Dissipation, dissipation),
                TermProfile::new(BudgetTerm::Storage, storage_profile),
            ],
            warnings,
        };

        let step = if storage_available {
            self.check_closure(step)
        } else {
            step
        };

        mean.store_tke_sample(time, energy_mean);
        Ok(step)
    }

    /// Compares the summed terms against the measured storage and flags
    /// the worst residual level when the budget fails to close. The step
    /// is still published; a non-closing budget is suspect, not invalid.
    fn check_closure(&self, mut step: BudgetStep) -> BudgetStep {
        let tendency = step.tendency_profile();
        let storage = match step.profile(BudgetTerm::Storage) {
            Some(profile) => profile.values.clone(),
            None => return step,
        };

        let mut worst: Option<(usize, f64, f64)> = None;
        for (k, (&lhs, &rhs)) in tendency.iter().zip(&storage).enumerate() {
            if within_tolerance(
                lhs,
                rhs,
                self.params.closure_abs_tolerance,
                self.params.closure_rel_tolerance,
                1.0e-12,
            ) {
                continue;
            }
            let residual = lhs - rhs;
            // the residual the level was actually allowed: the larger of
            // the absolute tolerance and the relative one at this scale
            let scale = lhs.abs().max(rhs.abs()).max(1.0e-12);
            let admissible = self
                .params
                .closure_abs_tolerance
                .max(self.params.closure_rel_tolerance * scale);
            if worst.map(|(_, r, _)| residual.abs() > r.abs()).unwrap_or(true) {
                worst = Some((k, residual, admissible));
            }
        }

        if let Some((level, residual, tolerance)) = worst {
            tracing::warn!(level, residual, tolerance, "budget does not close");
            step.warnings.push(ConsistencyWarning::ClosureResidual {
                level,
                residual,
                tolerance,
            });
        }
        step
    }
}
