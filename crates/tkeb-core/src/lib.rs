//! Turbulence-kinetic-energy budget diagnostics for a horizontally
//! decomposed large-eddy-simulation domain.
//!
//! The engine borrows an instantaneous field snapshot, decomposes the
//! resolved-turbulence energy tendency into shear, buoyancy, transport,
//! dissipation, and storage contributions, and reduces them to
//! horizontal-mean vertical profiles through a single collective
//! reduction seam. It never advances simulation state and owns no file
//! format; completed steps go to a [`sink::StatisticsSink`].

pub mod budget;
pub mod domain;
pub mod field;
pub mod grid;
pub mod mean;
pub mod numerics;
pub mod reduction;
pub mod sink;

pub use budget::{BudgetEngine, BudgetParams};
pub use domain::{
    BudgetError, BudgetResult, BudgetStep, BudgetTerm, ConsistencyWarning, TermProfile,
};
pub use field::{Field3, FieldSnapshot, StaggerLocation};
pub use grid::VerticalGrid;
pub use mean::MeanState;
pub use reduction::{HorizontalReduction, SingleRankReduction};
pub use sink::{MemorySink, StatisticsSink};
