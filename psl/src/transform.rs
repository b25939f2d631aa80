//! User units to integer device units.
//!
//! Device space has a resolution of 1200 dots per inch. All conversions round
//! half away from zero.

use crate::config::Unit;
use crate::error::{Error, Result};

/// Device dots per inch.
pub(crate) const DOTS_PER_INCH: f64 = 1200.0;
/// PostScript points per inch.
pub(crate) const POINTS_PER_INCH: f64 = 72.0;

/// A linear axes mapping installed by `begin_axes`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Axes {
    /// `[x0, x1, y0, y1]` in data units.
    pub(crate) limits: [f64; 4],
    /// The lower left corner in user units.
    pub(crate) origin: [f64; 2],
    /// The width and height in user units.
    pub(crate) dims: [f64; 2],
}

/// The mapping from user coordinates to device integers.
#[derive(Debug, Clone)]
pub struct Transform {
    x0: i32,
    y0: i32,
    x2ix: f64,
    y2iy: f64,
    dpu: f64,
    dpp: f64,
    axes: Option<Axes>,
}

impl Transform {
    pub(crate) fn new(unit: Unit) -> Self {
        let dpu = DOTS_PER_INCH / unit.per_inch();

        Self {
            x0: 0,
            y0: 0,
            x2ix: dpu,
            y2iy: dpu,
            dpu,
            dpp: DOTS_PER_INCH / POINTS_PER_INCH,
            axes: None,
        }
    }

    /// Convert an x coordinate to device units.
    pub fn to_device_x(&self, x: f64) -> i32 {
        self.x0 + (x * self.x2ix).round() as i32
    }

    /// Convert a y coordinate to device units.
    pub fn to_device_y(&self, y: f64) -> i32 {
        self.y0 + (y * self.y2iy).round() as i32
    }

    /// Convert a length in user units to device units.
    pub fn to_device_length(&self, z: f64) -> i32 {
        (z * self.dpu).round() as i32
    }

    /// Convert a length in points to device units.
    pub fn to_device_points(&self, p: f64) -> i32 {
        (p * self.dpp).round() as i32
    }

    /// Device dots per user unit.
    pub fn dots_per_unit(&self) -> f64 {
        self.dpu
    }

    /// Device dots per point.
    pub fn dots_per_point(&self) -> f64 {
        self.dpp
    }

    /// The size of one point in user units.
    pub(crate) fn points_to_units(&self) -> f64 {
        self.dpp / self.dpu
    }

    pub(crate) fn axes(&self) -> Option<&Axes> {
        self.axes.as_ref()
    }

    /// Install a linear mapping of the data window `x0..x1`, `y0..y1` onto
    /// the rectangle at `(llx, lly)` of the given size.
    pub(crate) fn begin_axes(
        &mut self,
        llx: f64,
        lly: f64,
        width: f64,
        height: f64,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    ) -> Result<()> {
        let (x_range, y_range) = (x1 - x0, y1 - y0);

        if x_range == 0.0 || y_range == 0.0 {
            return Err(Error::BadRange);
        }

        let axes = Axes {
            limits: [x0, x1, y0, y1],
            origin: [llx, lly],
            dims: [width, height],
        };

        let ox = self.to_device_x(llx - x0 * width / x_range);
        let oy = self.to_device_y(lly - y0 * height / y_range);
        self.x0 = ox;
        self.y0 = oy;
        self.x2ix = (width / x_range) * self.dpu;
        self.y2iy = (height / y_range) * self.dpu;
        self.axes = Some(axes);

        Ok(())
    }

    /// Restore the identity unit mapping.
    pub(crate) fn end_axes(&mut self) {
        self.x0 = 0;
        self.y0 = 0;
        self.x2ix = self.dpu;
        self.y2iy = self.dpu;
        self.axes = None;
    }
}
