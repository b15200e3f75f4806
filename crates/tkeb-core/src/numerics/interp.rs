//! Staggered field sampler.
//!
//! Resolves samples defined at one staggered location onto the common
//! budget evaluation locations (cell centers, or z-faces for flux
//! divergences) by 2-point averaging per offset direction; a source
//! staggered in two directions relative to the target averages 4 points.
//! Halo availability and vertical extent are checked once at construction;
//! the sampler never fabricates boundary values itself.

use crate::domain::{BudgetError, BudgetResult};
use crate::field::{Field3, StaggerLocation};
use crate::grid::VerticalGrid;

#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    field: &'a Field3,
    ktot: usize,
}

impl<'a> Sampler<'a> {
    /// Fails fast if the field's vertical extent disagrees with the grid
    /// or if the halo needed for face-to-center averaging is absent.
    pub fn new(field: &'a Field3, grid: &VerticalGrid) -> BudgetResult<Self> {
        let expected_levels = grid.levels_at(field.location());
        if field.levels() != expected_levels {
            return Err(BudgetError::VerticalExtentMismatch {
                field: field.name().to_string(),
                location: field.location(),
                field_levels: field.levels(),
                grid_levels: expected_levels,
            });
        }

        match field.location() {
            StaggerLocation::XFace if field.igc() < 1 => Err(BudgetError::MissingHalo {
                field: field.name().to_string(),
                direction: "x",
                required: 1,
                available: field.igc(),
            }),
            StaggerLocation::YFace if field.jgc() < 1 => Err(BudgetError::MissingHalo {
                field: field.name().to_string(),
                direction: "y",
                required: 1,
                available: field.jgc(),
            }),
            _ => Ok(Self {
                field,
                ktot: grid.ktot(),
            }),
        }
    }

    pub fn location(&self) -> StaggerLocation {
        self.field.location()
    }

    /// Value at the center of cell `(i, j, k)`, `k` in `0..ktot`.
    /// Identity when the field already lives at cell centers.
    pub fn at_center(&self, i: isize, j: isize, k: usize) -> f64 {
        debug_assert!(k < self.ktot);
        let f = self.field;
        match f.location() {
            StaggerLocation::Center => f.value(i, j, k),
            StaggerLocation::XFace => 0.5 * (f.value(i, j, k) + f.value(i + 1, j, k)),
            StaggerLocation::YFace => 0.5 * (f.value(i, j, k) + f.value(i, j + 1, k)),
            StaggerLocation::ZFace => 0.5 * (f.value(i, j, k) + f.value(i, j, k + 1)),
        }
    }

    /// Value at z-face `k` of column `(i, j)`, `k` in `0..=ktot`. Face 0
    /// and face `ktot` are the domain boundaries; vertically staggered
    /// sources clamp to the adjacent interior level there, which only ever
    /// multiplies the boundary `w` values in flux evaluations.
    pub fn at_zface(&self, i: isize, j: isize, k: usize) -> f64 {
        debug_assert!(k <= self.ktot);
        let f = self.field;
        match f.location() {
            StaggerLocation::ZFace => f.value(i, j, k),
            StaggerLocation::Center => {
                let (below, above) = self.levels_around_face(k);
                0.5 * (f.value(i, j, below) + f.value(i, j, above))
            }
            StaggerLocation::XFace => {
                let (below, above) = self.levels_around_face(k);
                0.25 * (f.value(i, j, below)
                    + f.value(i + 1, j, below)
                    + f.value(i, j, above)
                    + f.value(i + 1, j, above))
            }
            StaggerLocation::YFace => {
                let (below, above) = self.levels_around_face(k);
                0.25 * (f.value(i, j, below)
                    + f.value(i, j + 1, below)
                    + f.value(i, j, above)
                    + f.value(i, j + 1, above))
            }
        }
    }

    fn levels_around_face(&self, k: usize) -> (usize, usize) {
        if k == 0 {
            (0, 0)
        } else if k == self.ktot {
            (self.ktot - 1, self.ktot - 1)
        } else {
            (k - 1, k)
        }
    }
}
