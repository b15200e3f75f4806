//! Vertical grid metric for the budget evaluation.
//!
//! The grid collaborator owns the authoritative metric; this is the
//! read-only view the engine works against. Cell centers sit at `z[k]`
//! between the faces `zh[k]` and `zh[k + 1]`, so z-face quantities carry
//! one more level than cell-center quantities. The vertical spacing may be
//! stretched; the horizontal spacing is uniform.

use crate::domain::{BudgetError, BudgetResult};

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalGrid {
    z: Vec<f64>,
    zh: Vec<f64>,
    dz: Vec<f64>,
    dzh: Vec<f64>,
    dx: f64,
    dy: f64,
}

impl VerticalGrid {
    /// Builds the metric from explicit face heights, centers halfway
    /// between faces. Faces must be finite and strictly increasing.
    pub fn from_face_levels(zh: Vec<f64>, dx: f64, dy: f64) -> BudgetResult<Self> {
        if zh.len() < 3 {
            return Err(BudgetError::InsufficientLevels {
                levels: zh.len().saturating_sub(1),
            });
        }
        for (index, window) in zh.windows(2).enumerate() {
            if !window[0].is_finite() || !window[1].is_finite() || window[1] <= window[0] {
                return Err(BudgetError::NonMonotonicGrid {
                    index: index + 1,
                    previous: window[0],
                    current: window[1],
                });
            }
        }
        if !dx.is_finite() || dx <= 0.0 {
            return Err(BudgetError::InvalidParameter {
                field: "dx",
                value: dx,
            });
        }
        if !dy.is_finite() || dy <= 0.0 {
            return Err(BudgetError::InvalidParameter {
                field: "dy",
                value: dy,
            });
        }

        let ktot = zh.len() - 1;
        let z: Vec<f64> = (0..ktot).map(|k| 0.5 * (zh[k] + zh[k + 1])).collect();
        let dz: Vec<f64> = (0..ktot).map(|k| zh[k + 1] - zh[k]).collect();
        // dzh[k] is the center-to-center distance across face k; the
        // boundary faces fall back to the adjacent cell height.
        let mut dzh = Vec::with_capacity(ktot + 1);
        dzh.push(dz[0]);
        for k in 1..ktot {
            dzh.push(z[k] - z[k - 1]);
        }
        dzh.push(dz[ktot - 1]);

        Ok(Self {
            z,
            zh,
            dz,
            dzh,
            dx,
            dy,
        })
    }

    /// Uniform vertical spacing over `[0, depth]`.
    pub fn uniform(ktot: usize, depth: f64, dx: f64, dy: f64) -> BudgetResult<Self> {
        if ktot < 2 {
            return Err(BudgetError::InsufficientLevels { levels: ktot });
        }
        if !depth.is_finite() || depth <= 0.0 {
            return Err(BudgetError::InvalidParameter {
                field: "depth",
                value: depth,
            });
        }
        let step = depth / ktot as f64;
        let zh: Vec<f64> = (0..=ktot).map(|k| step * k as f64).collect();
        Self::from_face_levels(zh, dx, dy)
    }

    pub fn ktot(&self) -> usize {
        self.z.len()
    }

    /// Cell-center heights.
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Face heights, `ktot + 1` values.
    pub fn zh(&self) -> &[f64] {
        &self.zh
    }

    /// Cell heights, face-to-face.
    pub fn dz(&self) -> &[f64] {
        &self.dz
    }

    /// Center-to-center distances across each face, `ktot + 1` values.
    pub fn dzh(&self) -> &[f64] {
        &self.dzh
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Number of vertical samples a field at `location` must carry.
    pub fn levels_at(&self, location: crate::field::StaggerLocation) -> usize {
        match location {
            crate::field::StaggerLocation::ZFace => self.ktot() + 1,
            _ => self.ktot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::VerticalGrid;
    use crate::domain::BudgetError;

    #[test]
    fn uniform_grid_centers_sit_between_faces() {
        let grid = VerticalGrid::uniform(4, 100.0, 10.0, 10.0).expect("grid");
        assert_eq!(grid.ktot(), 4);
        assert_eq!(grid.zh(), &[0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(grid.z(), &[12.5, 37.5, 62.5, 87.5]);
        assert!(grid.dz().iter().all(|&dz| (dz - 25.0).abs() < 1.0e-12));
    }

    #[test]
    fn stretched_grid_keeps_center_to_center_spacing() {
        let grid =
            VerticalGrid::from_face_levels(vec![0.0, 10.0, 30.0, 70.0], 5.0, 5.0).expect("grid");
        assert_eq!(grid.dz(), &[10.0, 20.0, 40.0]);
        // interior face spacing is the distance between adjacent centers
        assert_eq!(grid.dzh()[1], 20.0 - 5.0);
        assert_eq!(grid.dzh()[2], 50.0 - 20.0);
        // boundary faces fall back to the adjacent cell height
        assert_eq!(grid.dzh()[0], 10.0);
        assert_eq!(grid.dzh()[3], 40.0);
    }

    #[test]
    fn non_monotonic_faces_are_rejected() {
        let error = VerticalGrid::from_face_levels(vec![0.0, 2.0, 1.0, 3.0], 1.0, 1.0)
            .expect_err("non-monotonic faces should fail");
        assert_eq!(
            error,
            BudgetError::NonMonotonicGrid {
                index: 2,
                previous: 2.0,
                current: 1.0,
            }
        );
    }

    #[test]
    fn degenerate_extents_are_rejected() {
        assert!(matches!(
            VerticalGrid::uniform(1, 10.0, 1.0, 1.0),
            Err(BudgetError::InsufficientLevels { levels: 1 })
        ));
        assert!(matches!(
            VerticalGrid::uniform(4, 10.0, -1.0, 1.0),
            Err(BudgetError::InvalidParameter { field: "dx", .. })
        ));
    }
}
