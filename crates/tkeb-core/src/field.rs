//! Staggered field arrays over the local horizontal tile.
//!
//! Fields are owned by the external field-state collaborator; the engine
//! only ever borrows them read-only for the duration of one diagnostic
//! call. Horizontal ghost cells are part of the allocation so stencils near
//! the tile edge read halo data populated by that collaborator, never
//! fabricated values.

use crate::domain::{BudgetError, BudgetResult};

/// Staggered position of a field within the grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaggerLocation {
    /// Cell center, the budget evaluation location.
    Center,
    /// Face normal to x; sample `i` sits on the left face of cell `i`.
    XFace,
    /// Face normal to y; sample `j` sits on the front face of cell `j`.
    YFace,
    /// Face normal to z; sample `k` sits on the bottom face of cell `k`,
    /// so z-face fields carry `ktot + 1` levels.
    ZFace,
}

/// A 3-D sample array over the local tile, including horizontal halo.
#[derive(Debug, Clone, PartialEq)]
pub struct Field3 {
    name: String,
    location: StaggerLocation,
    itot: usize,
    jtot: usize,
    levels: usize,
    igc: usize,
    jgc: usize,
    data: Vec<f64>,
}

impl Field3 {
    pub fn filled(
        name: impl Into<String>,
        location: StaggerLocation,
        itot: usize,
        jtot: usize,
        levels: usize,
        igc: usize,
        jgc: usize,
        value: f64,
    ) -> Self {
        let data = vec![value; (itot + 2 * igc) * (jtot + 2 * jgc) * levels];
        Self {
            name: name.into(),
            location,
            itot,
            jtot,
            levels,
            igc,
            jgc,
            data,
        }
    }

    /// Builds a field by evaluating `sample` at every point, ghost cells
    /// included. The closure sees signed tile indices, so a periodic or
    /// analytic extension decides what lands in the halo.
    pub fn from_fn(
        name: impl Into<String>,
        location: StaggerLocation,
        itot: usize,
        jtot: usize,
        levels: usize,
        igc: usize,
        jgc: usize,
        sample: impl Fn(isize, isize, usize) -> f64,
    ) -> Self {
        let mut field = Self::filled(name, location, itot, jtot, levels, igc, jgc, 0.0);
        for k in 0..levels {
            for j in -(jgc as isize)..(jtot + jgc) as isize {
                for i in -(igc as isize)..(itot + igc) as isize {
                    let index = field.index(i, j, k);
                    field.data[index] = sample(i, j, k);
                }
            }
        }
        field
    }

    fn index(&self, i: isize, j: isize, k: usize) -> usize {
        debug_assert!(i >= -(self.igc as isize) && i < (self.itot + self.igc) as isize);
        debug_assert!(j >= -(self.jgc as isize) && j < (self.jtot + self.jgc) as isize);
        debug_assert!(k < self.levels);
        let jstride = self.itot + 2 * self.igc;
        let kstride = jstride * (self.jtot + 2 * self.jgc);
        (i + self.igc as isize) as usize + (j + self.jgc as isize) as usize * jstride + k * kstride
    }

    /// Reads a sample; negative indices reach into the halo.
    pub fn value(&self, i: isize, j: isize, k: usize) -> f64 {
        self.data[self.index(i, j, k)]
    }

    pub fn set(&mut self, i: isize, j: isize, k: usize, value: f64) {
        let index = self.index(i, j, k);
        self.data[index] = value;
    }

    /// Copies the interior into the halo with periodic wrapping, the
    /// exchange a single-rank field-state collaborator performs.
    pub fn fill_periodic_halos(&mut self) {
        let itot = self.itot as isize;
        let jtot = self.jtot as isize;
        for k in 0..self.levels {
            for j in -(self.jgc as isize)..(self.jtot + self.jgc) as isize {
                for i in -(self.igc as isize)..(self.itot + self.igc) as isize {
                    if i >= 0 && i < itot && j >= 0 && j < jtot {
                        continue;
                    }
                    let wrapped = self.value(i.rem_euclid(itot), j.rem_euclid(jtot), k);
                    self.set(i, j, k, wrapped);
                }
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> StaggerLocation {
        self.location
    }

    pub fn itot(&self) -> usize {
        self.itot
    }

    pub fn jtot(&self) -> usize {
        self.jtot
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn igc(&self) -> usize {
        self.igc
    }

    pub fn jgc(&self) -> usize {
        self.jgc
    }
}

/// Read-only borrow of the instantaneous simulation state for one call.
#[derive(Debug, Clone, Copy)]
pub struct FieldSnapshot<'a> {
    pub u: &'a Field3,
    pub v: &'a Field3,
    pub w: &'a Field3,
    pub theta: &'a Field3,
    pub p: &'a Field3,
    /// Effective (molecular plus subgrid) viscosity at cell centers.
    pub evisc: &'a Field3,
}

impl<'a> FieldSnapshot<'a> {
    /// Checks that every field covers the same horizontal tile.
    pub fn validate_tile(&self) -> BudgetResult<()> {
        let itot = self.u.itot();
        let jtot = self.u.jtot();
        for field in [self.v, self.w, self.theta, self.p, self.evisc] {
            if field.itot() != itot || field.jtot() != jtot {
                return Err(BudgetError::TileShapeMismatch {
                    field: field.name().to_string(),
                    field_itot: field.itot(),
                    field_jtot: field.jtot(),
                    itot,
                    jtot,
                });
            }
        }
        Ok(())
    }

    pub fn itot(&self) -> usize {
        self.u.itot()
    }

    pub fn jtot(&self) -> usize {
        self.u.jtot()
    }
}
