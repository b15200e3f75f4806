//! Synthetic sheared boundary layer for the demo command.
//!
//! The flow is a horizontally periodic analytic field: linear mean shear,
//! a warm rising plume mode, and a fluctuation envelope that grows slowly
//! in time so the storage term is nonzero. It exercises every budget term
//! without reading any simulation output.

use std::f64::consts::TAU;
use tkeb_core::{Field3, FieldSnapshot, StaggerLocation, VerticalGrid};

const HALO: usize = 1;

pub(super) struct DemoFlow {
    itot: usize,
    jtot: usize,
    ktot: usize,
    depth: f64,
    shear_rate: f64,
    growth_rate: f64,
}

pub(super) struct DemoFields {
    u: Field3,
    v: Field3,
    w: Field3,
    theta: Field3,
    p: Field3,
    evisc: Field3,
}

impl DemoFields {
    pub(super) fn snapshot(&self) -> FieldSnapshot<'_> {
        FieldSnapshot {
            u: &self.u,
            v: &self.v,
            w: &self.w,
            theta: &self.theta,
            p: &self.p,
            evisc: &self.evisc,
        }
    }
}

impl DemoFlow {
    pub(super) fn new(itot: usize, jtot: usize, ktot: usize, depth: f64) -> Self {
        Self {
            itot,
            jtot,
            ktot,
            depth,
            shear_rate: 5.0e-3,
            growth_rate: 1.0e-2,
        }
    }

    pub(super) fn grid(&self) -> tkeb_core::BudgetResult<VerticalGrid> {
        let dx = self.depth / self.itot as f64;
        let dy = self.depth / self.jtot as f64;
        VerticalGrid::uniform(self.ktot, self.depth, dx, dy)
    }

    /// Envelope peaking mid-column and vanishing on the boundary faces.
    fn face_shape(&self, kf: usize) -> f64 {
        let ktot = self.ktot as f64;
        4.0 * kf as f64 * (ktot - kf as f64) / (ktot * ktot)
    }

    fn center_shape(&self, k: usize) -> f64 {
        0.5 * (self.face_shape(k) + self.face_shape(k + 1))
    }

    pub(super) fn fields_at(&self, time: f64, grid: &VerticalGrid) -> DemoFields {
        let amplitude = 1.0 + self.growth_rate * time;
        let x = |i: isize| TAU * i as f64 / self.itot as f64;
        let y = |j: isize| TAU * j as f64 / self.jtot as f64;
        let (itot, jtot, ktot) = (self.itot, self.jtot, self.ktot);

        let u = Field3::from_fn(
            "u",
            StaggerLocation::XFace,
            itot,
            jtot,
            ktot,
            HALO,
            HALO,
            |i, _, k| {
                self.shear_rate * grid.z()[k]
                    + amplitude * 0.3 * x(i).sin() * self.center_shape(k)
            },
        );
        let v = Field3::from_fn(
            "v",
            StaggerLocation::YFace,
            itot,
            jtot,
            ktot,
            HALO,
            HALO,
            |_, j, k| amplitude * 0.2 * y(j).cos() * self.center_shape(k),
        );
        // downdrafts where u is fast, so shear production is positive
        let w = Field3::from_fn(
            "w",
            StaggerLocation::ZFace,
            itot,
            jtot,
            ktot + 1,
            HALO,
            HALO,
            |i, _, kf| -amplitude * 0.1 * x(i).sin() * self.face_shape(kf),
        );
        // cold air sinking: positive w' carries positive theta'
        let theta = Field3::from_fn(
            "th",
            StaggerLocation::Center,
            itot,
            jtot,
            ktot,
            HALO,
            HALO,
            |i, _, k| {
                300.0 + 3.0e-3 * grid.z()[k]
                    - amplitude * 0.4 * x(i).sin() * self.center_shape(k)
            },
        );
        let p = Field3::from_fn(
            "p",
            StaggerLocation::Center,
            itot,
            jtot,
            ktot,
            HALO,
            HALO,
            |i, _, k| amplitude * 0.8 * (2.0 * x(i)).cos() * self.center_shape(k),
        );
        let evisc = Field3::filled(
            "evisc",
            StaggerLocation::Center,
            itot,
            jtot,
            ktot,
            HALO,
            HALO,
            1.0e-3,
        );

        DemoFields {
            u,
            v,
            w,
            theta,
            p,
            evisc,
        }
    }
}
