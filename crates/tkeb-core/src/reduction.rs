//! Horizontal reduction: the single collective operation of the engine.
//!
//! Every rank owning a tile of a horizontal slab contributes per-level
//! partial sums; the reduction sums them elementwise across the rank group
//! and the engine normalizes by the total point count. The trait is the
//! narrow seam that keeps the budget logic testable against an in-process
//! implementation; a distributed (MPI-backed) implementation lives with the
//! decomposition collaborator. All ranks must invoke the reduction in the
//! same term order every step, or the group deadlocks.

use crate::domain::{BudgetError, BudgetResult};
use crate::numerics::kahan_add;

pub trait HorizontalReduction {
    /// Elementwise sum of `partials` across all ranks of the slab group,
    /// leaving the global sums in place on every rank.
    fn reduce_sum(&self, partials: &mut [f64]) -> BudgetResult<()>;

    /// Total number of horizontal points in the slab, across all ranks.
    fn horizontal_point_count(&self) -> usize;
}

/// Single-process group: the reduction forwards its input unchanged.
#[derive(Debug, Clone, Copy)]
pub struct SingleRankReduction {
    points: usize,
}

impl SingleRankReduction {
    pub fn new(itot: usize, jtot: usize) -> Self {
        Self {
            points: itot * jtot,
        }
    }
}

impl HorizontalReduction for SingleRankReduction {
    fn reduce_sum(&self, _partials: &mut [f64]) -> BudgetResult<()> {
        Ok(())
    }

    fn horizontal_point_count(&self) -> usize {
        self.points
    }
}

/// Per-level compensated partial sums of `sample` over the local tile.
/// The fixed i-then-j traversal order makes the local partials
/// bit-reproducible for identical tiles.
pub fn tile_partial_sums(
    itot: usize,
    jtot: usize,
    levels: usize,
    sample: impl Fn(isize, isize, usize) -> f64,
) -> Vec<f64> {
    let mut partials = Vec::with_capacity(levels);
    for k in 0..levels {
        let mut sum = 0.0;
        let mut correction = 0.0;
        for j in 0..jtot as isize {
            for i in 0..itot as isize {
                kahan_add(&mut sum, &mut correction, sample(i, j, k));
            }
        }
        partials.push(sum);
    }
    partials
}

/// Sum-then-normalize: collective sum of the partials followed by division
/// by the slab point count. A zero-count slab is a precondition violation,
/// never a silent division by zero.
pub fn reduce_to_mean(
    reduction: &dyn HorizontalReduction,
    mut partials: Vec<f64>,
) -> BudgetResult<Vec<f64>> {
    let points = reduction.horizontal_point_count();
    if points == 0 {
        return Err(BudgetError::EmptyReduction);
    }
    reduction.reduce_sum(&mut partials)?;
    let normalization = 1.0 / points as f64;
    for value in &mut partials {
        *value *= normalization;
    }
    Ok(partials)
}

/// Local accumulation plus the collective, in one call: the horizontal
/// mean profile of `sample` over the whole slab.
pub fn horizontal_mean(
    reduction: &dyn HorizontalReduction,
    itot: usize,
    jtot: usize,
    levels: usize,
    sample: impl Fn(isize, isize, usize) -> f64,
) -> BudgetResult<Vec<f64>> {
    let partials = tile_partial_sums(itot, jtot, levels, sample);
    reduce_to_mean(reduction, partials)
}

#[cfg(test)]
mod tests {
    use super::{horizontal_mean, reduce_to_mean, HorizontalReduction, SingleRankReduction};
    use crate::domain::BudgetError;

    #[test]
    fn single_rank_mean_of_height_function_is_exact() {
        let reduction = SingleRankReduction::new(4, 3);
        // constant on each level, so the mean must reproduce it exactly
        let mean = horizontal_mean(&reduction, 4, 3, 5, |_, _, k| 2.0 * k as f64 + 1.0)
            .expect("mean");
        assert_eq!(mean, vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn zero_point_slab_is_a_precondition_violation() {
        let reduction = SingleRankReduction::new(0, 8);
        let error = reduce_to_mean(&reduction, vec![1.0, 2.0]).expect_err("empty slab");
        assert_eq!(error, BudgetError::EmptyReduction);
    }

    #[test]
    fn desync_from_the_collective_propagates() {
        struct DesyncReduction;
        impl HorizontalReduction for DesyncReduction {
            fn reduce_sum(&self, _partials: &mut [f64]) -> crate::domain::BudgetResult<()> {
                Err(BudgetError::ReductionDesync {
                    detail: "rank 3 missing".to_string(),
                })
            }
            fn horizontal_point_count(&self) -> usize {
                16
            }
        }

        let error = reduce_to_mean(&DesyncReduction, vec![0.0; 4]).expect_err("desync");
        assert!(matches!(error, BudgetError::ReductionDesync { .. }));
    }
}
