//! Debug instrumentation hooks, modeled on the six `dmtxCallback*` function
//! pointers `dmtx.h` let callers install process-wide (`BuildMatrixRegion`,
//! `BuildMatrix`, `PlotPoint`, `XfrmPlotPoint`, `PlotModule`, `Final`).
//! Collected here as one struct of optional closures installed per-decode
//! instead of global function-pointer slots, so two decodes on disjoint
//! images no longer have to share process-wide callback state to get this
//! instrumentation. Each call site checks `if let Some(cb)` before doing any
//! work building the callback's arguments, so an absent hook costs one
//! branch, not an unused allocation.

use crate::decode::region::Region;
use crate::matrix3::Matrix3;
use crate::vector2::Vector2;

/// Arguments for the `PlotPoint` hook: a single pixel visited during edge
/// tracing, with a hue used by diagnostic renderers to distinguish trail
/// generations and a pane/display pair mirroring the original's multi-pane
/// debug viewer.
#[derive(Clone, Copy, Debug)]
pub struct PlottedPoint {
    pub x: i32,
    pub y: i32,
    pub hue: f32,
    pub pane: i32,
    pub display: i32,
}

/// Optional debug callbacks invoked during region detection and decoding.
/// All fields default to `None`; a `Decoder` holding an all-`None` set of
/// callbacks pays only the `if let Some` check at each call site.
#[derive(Default)]
pub struct DecodeCallbacks {
    build_matrix_region: Option<Box<dyn Fn(&Region)>>,
    build_matrix: Option<Box<dyn Fn(&Matrix3)>>,
    plot_point: Option<Box<dyn Fn(PlottedPoint)>>,
    xfrm_plot_point: Option<Box<dyn Fn(Vector2, &Matrix3, i32, i32)>>,
    plot_module: Option<Box<dyn Fn(&Region, i32, i32, f32)>>,
    final_callback: Option<Box<dyn Fn(&Region)>>,
}

impl DecodeCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_build_matrix_region(mut self, f: impl Fn(&Region) + 'static) -> Self {
        self.build_matrix_region = Some(Box::new(f));
        self
    }

    pub fn on_build_matrix(mut self, f: impl Fn(&Matrix3) + 'static) -> Self {
        self.build_matrix = Some(Box::new(f));
        self
    }

    pub fn on_plot_point(mut self, f: impl Fn(PlottedPoint) + 'static) -> Self {
        self.plot_point = Some(Box::new(f));
        self
    }

    pub fn on_xfrm_plot_point(mut self, f: impl Fn(Vector2, &Matrix3, i32, i32) + 'static) -> Self {
        self.xfrm_plot_point = Some(Box::new(f));
        self
    }

    pub fn on_plot_module(mut self, f: impl Fn(&Region, i32, i32, f32) + 'static) -> Self {
        self.plot_module = Some(Box::new(f));
        self
    }

    pub fn on_final(mut self, f: impl Fn(&Region) + 'static) -> Self {
        self.final_callback = Some(Box::new(f));
        self
    }

    pub(crate) fn notify_build_matrix_region(&self, region: &Region) {
        if let Some(cb) = &self.build_matrix_region {
            cb(region);
        }
    }

    pub(crate) fn notify_build_matrix(&self, matrix: &Matrix3) {
        if let Some(cb) = &self.build_matrix {
            cb(matrix);
        }
    }

    pub(crate) fn notify_plot_point(&self, point: PlottedPoint) {
        if let Some(cb) = &self.plot_point {
            cb(point);
        }
    }

    pub(crate) fn notify_xfrm_plot_point(&self, point: Vector2, xfrm: &Matrix3, pane: i32, display: i32) {
        if let Some(cb) = &self.xfrm_plot_point {
            cb(point, xfrm, pane, display);
        }
    }

    pub(crate) fn notify_plot_module(&self, region: &Region, row: i32, col: i32, hue: f32) {
        if let Some(cb) = &self.plot_module {
            cb(region, row, col, hue);
        }
    }

    pub(crate) fn notify_final(&self, region: &Region) {
        if let Some(cb) = &self.final_callback {
            cb(region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn absent_callbacks_are_silent() {
        let callbacks = DecodeCallbacks::new();
        let region = Region::default();
        callbacks.notify_build_matrix_region(&region);
        callbacks.notify_final(&region);
    }

    #[test]
    fn installed_callback_runs_on_notify() {
        let seen = Rc::new(Cell::new(false));
        let seen_clone = seen.clone();
        let callbacks = DecodeCallbacks::new().on_final(move |_region| seen_clone.set(true));

        callbacks.notify_final(&Region::default());
        assert!(seen.get());
    }
}
