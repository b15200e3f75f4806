pub mod errors;

pub use errors::{BudgetError, BudgetResult};

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The closed set of TKE budget terms.
///
/// Every diagnostic step produces exactly one profile per variant, in the
/// declaration order below. The order is also the collective-reduction
/// order, which must match across ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BudgetTerm {
    Shear,
    Buoyancy,
    TurbulentTransport,
    PressureTransport,
    ViscousTransport,
    Dissipation,
    Storage,
}

impl BudgetTerm {
    pub const ALL: [BudgetTerm; 7] = [
        Self::Shear,
        Self::Buoyancy,
        Self::TurbulentTransport,
        Self::PressureTransport,
        Self::ViscousTransport,
        Self::Dissipation,
        Self::Storage,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shear => "tke_shear",
            Self::Buoyancy => "tke_buoy",
            Self::TurbulentTransport => "tke_turb",
            Self::PressureTransport => "tke_pres",
            Self::ViscousTransport => "tke_visc",
            Self::Dissipation => "tke_diss",
            Self::Storage => "tke_stor",
        }
    }
}

impl Display for BudgetTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// One named contribution to the budget, defined at cell centers.
///
/// Write-once output: the engine fills it exactly once per step and hands
/// ownership to the statistics sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermProfile {
    pub term: BudgetTerm,
    pub values: Vec<f64>,
}

impl TermProfile {
    pub fn new(term: BudgetTerm, values: Vec<f64>) -> Self {
        Self { term, values }
    }

    pub fn levels(&self) -> usize {
        self.values.len()
    }
}

/// Non-fatal physical-consistency annotations attached to a completed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConsistencyWarning {
    /// The summed budget disagrees with the measured storage term.
    ClosureResidual {
        level: usize,
        residual: f64,
        tolerance: f64,
    },
    /// The raw strain contraction came out with an unphysical sign.
    DissipationSignInverted { level: usize, raw: f64 },
    /// No previous TKE sample existed; the storage profile is zero-filled.
    StorageUnavailable,
}

/// The complete output of one diagnostic step.
///
/// A step is all-or-nothing: either every term profile is present with the
/// full vertical extent, or the step failed and nothing was published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStep {
    pub time: f64,
    pub profiles: Vec<TermProfile>,
    pub warnings: Vec<ConsistencyWarning>,
}

impl BudgetStep {
    pub fn profile(&self, term: BudgetTerm) -> Option<&TermProfile> {
        self.profiles.iter().find(|profile| profile.term == term)
    }

    /// Sum of all non-storage terms at each level, the quantity the
    /// storage term should match for a closed budget.
    pub fn tendency_profile(&self) -> Vec<f64> {
        let levels = self
            .profiles
            .first()
            .map(TermProfile::levels)
            .unwrap_or(0);
        let mut tendency = vec![0.0; levels];
        for profile in &self.profiles {
            if profile.term == BudgetTerm::Storage {
                continue;
            }
            for (total, value) in tendency.iter_mut().zip(&profile.values) {
                *total += value;
            }
        }
        tendency
    }
}

#[cfg(test)]
mod tests {
    use super::{BudgetStep, BudgetTerm, TermProfile};

    #[test]
    fn term_order_is_stable_and_named() {
        assert_eq!(BudgetTerm::ALL.len(), 7);
        assert_eq!(BudgetTerm::Shear.to_string(), "tke_shear");
        assert_eq!(BudgetTerm::Dissipation.to_string(), "tke_diss");
    }

    #[test]
    fn tendency_excludes_storage() {
        let step = BudgetStep {
            time: 0.0,
            profiles: vec![
                TermProfile::new(BudgetTerm::Shear, vec![1.0, 2.0]),
                TermProfile::new(BudgetTerm::Dissipation, vec![-0.5, -0.5]),
                TermProfile::new(BudgetTerm::Storage, vec![100.0, 100.0]),
            ],
            warnings: Vec::new(),
        };
        assert_eq!(step.tendency_profile(), vec![0.5, 1.5]);
    }
}
