//! Polylines in device space.
//!
//! Paths are quantized to device integers and then simplified so that the
//! drawn result is unchanged while redundant points are dropped. The
//! commands written for a path are relative draws (`D`) from the last
//! absolute position, which keeps the output small.

use crate::error::{Error, Result};
use crate::transform::Transform;
use bitflags::bitflags;
use core::fmt::Write;
use kurbo::Point;

/// A point in integer device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevicePoint {
    /// The x coordinate.
    pub x: i32,
    /// The y coordinate.
    pub y: i32,
}

impl DevicePoint {
    /// Create a new device point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

bitflags! {
    /// How a path is started and finished.
    ///
    /// The empty set continues drawing from the current point.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PenFlags: u32 {
        /// Move to the first point before drawing.
        const MOVE = 1;
        /// Stroke the path when done.
        const STROKE = 2;
        /// Coordinates are relative to the current point.
        const REL = 4;
        /// Close the path when done.
        const CLOSE = 8;
        /// Never close the path automatically, even if it ends where it
        /// started.
        const CLOSE_INTERIOR = 16;
    }
}

/// A strategy to drop points of a quantized path that do not change its
/// rendering.
pub trait PathSimplifier {
    /// Simplify `points` in place. The first and the last point are always
    /// kept.
    fn simplify(&self, points: &mut Vec<DevicePoint>);
}

/// Drops every point that lies within one device unit of the line between
/// the last kept point and a later point.
#[derive(Debug, Clone, Copy, Default)]
pub struct FarPoint;

impl PathSimplifier for FarPoint {
    fn simplify(&self, p: &mut Vec<DevicePoint>) {
        let n = p.len();
        if n < 2 {
            return;
        }

        let mut i = 0;
        let mut k = 0;

        for j in 2..n {
            let dx = p[j].x - p[i].x;
            let dy = p[j].y - p[i].y;
            // `d` is zero only for a closed span, where every intermediate
            // point is far.
            let d = dx.abs().max(dy.abs());

            let mut ij = j - 1;
            while ij > i {
                let bx = p[ij].x - p[i].x;
                if dx > 0 {
                    if bx < 0 || bx > dx {
                        break;
                    }
                } else if bx > 0 || bx < dx {
                    break;
                }

                let by = p[ij].y - p[i].y;
                if dy > 0 {
                    if by < 0 || by > dy {
                        break;
                    }
                } else if by > 0 || by < dy {
                    break;
                }

                let db = (dx as i64 * by as i64 - bx as i64 * dy as i64).abs();
                if db >= d as i64 {
                    break;
                }

                ij -= 1;
            }

            if ij > i {
                i = j - 1;
                k += 1;
                p[k] = p[i];
            }
        }

        if p[k] != p[n - 1] {
            k += 1;
            p[k] = p[n - 1];
        }

        p.truncate(k + 1);
    }
}

/// Drops only points inside exactly collinear runs, comparing the slope and
/// direction of consecutive steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collinear;

impl PathSimplifier for Collinear {
    fn simplify(&self, p: &mut Vec<DevicePoint>) {
        let n = p.len();
        if n < 2 {
            return;
        }

        // Seeds that make sure the first point is kept.
        let mut old_slope = -f64::MAX;
        let mut old_dir = 0;
        let mut k = 0;

        for i in 0..n - 1 {
            let dx = p[i + 1].x - p[i].x;
            let dy = p[i + 1].y - p[i].y;
            if dx == 0 && dy == 0 {
                continue;
            }

            let slope = if dx == 0 {
                f64::MAX.copysign(dy as f64)
            } else {
                dy as f64 / dx as f64
            };
            let dir = if dx >= 0 { 1 } else { -1 };

            if slope != old_slope || dir != old_dir {
                p[k] = p[i];
                k += 1;
                old_slope = slope;
                old_dir = dir;
            }
        }

        if k < 1 {
            p.truncate(1);
            return;
        }

        if p[k - 1] != p[n - 1] {
            p[k] = p[n - 1];
            k += 1;
        }

        p.truncate(k);
    }
}

/// Which [`PathSimplifier`] a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplifyPolicy {
    /// Always use [`FarPoint`].
    FarPoint,
    /// Always use [`Collinear`].
    Collinear,
    /// Use [`Collinear`] for paths longer than `threshold` points and
    /// [`FarPoint`] otherwise.
    Auto {
        /// The largest path length simplified with [`FarPoint`].
        threshold: usize,
    },
}

impl Default for SimplifyPolicy {
    fn default() -> Self {
        Self::Auto {
            threshold: 100_000_000,
        }
    }
}

impl SimplifyPolicy {
    /// The simplifier for a path of `n` points.
    pub fn simplifier(&self, n: usize) -> &'static dyn PathSimplifier {
        match self {
            Self::FarPoint => &FarPoint,
            Self::Collinear => &Collinear,
            Self::Auto { threshold } if n > *threshold => &Collinear,
            Self::Auto { .. } => &FarPoint,
        }
    }
}

/// Convert user points to device points without dropping any.
pub(crate) fn quantize(points: &[Point], t: &Transform) -> Vec<DevicePoint> {
    points
        .iter()
        .map(|p| DevicePoint::new(t.to_device_x(p.x), t.to_device_y(p.y)))
        .collect()
}

/// Convert user points to device points and simplify them.
pub fn simplify_path(points: &[Point], t: &Transform, policy: SimplifyPolicy) -> Vec<DevicePoint> {
    let mut device = quantize(points, t);
    policy.simplifier(device.len()).simplify(&mut device);
    device
}

/// Write the path painting suffix selected by `flags`.
fn finish(flags: PenFlags, out: &mut String) {
    if flags.contains(PenFlags::STROKE | PenFlags::CLOSE) {
        out.push_str("P S\n");
    } else if flags.contains(PenFlags::CLOSE) {
        out.push_str("P\n");
    } else if flags.contains(PenFlags::STROKE) {
        out.push_str("S\n");
    }
}

/// Write a simplified polyline. `current` is the last absolute device
/// position and is updated to the end of the line.
pub(crate) fn write_line(
    mut p: &[DevicePoint],
    mut flags: PenFlags,
    current: &mut DevicePoint,
    out: &mut String,
) {
    if p.is_empty() {
        return;
    }

    if p.len() > 1
        && flags.contains(PenFlags::MOVE)
        && p[0] == p[p.len() - 1]
        && !flags.contains(PenFlags::CLOSE_INTERIOR)
    {
        p = &p[..p.len() - 1];
        flags |= PenFlags::CLOSE;
    }

    let mut first = 0;
    if flags.contains(PenFlags::MOVE) {
        let _ = writeln!(out, "{} {} M", p[0].x, p[0].y);
        *current = p[0];
        first = 1;
        if p.len() == 1 {
            out.push_str("0 0 D\n");
        }
    }

    for &q in &p[first..] {
        if q != *current {
            let _ = writeln!(out, "{} {} D", q.x - current.x, q.y - current.y);
        }
        *current = q;
    }

    finish(flags, out);
}

/// Write a smooth curve through the knots `k` with the control points
/// `c1` and `c2` of each segment, all in device units.
pub(crate) fn write_curve(
    k: &[DevicePoint],
    c1: &[DevicePoint],
    c2: &[DevicePoint],
    mut flags: PenFlags,
    current: &mut DevicePoint,
    out: &mut String,
) {
    let Some(&last) = k.last() else {
        return;
    };

    if k.len() > 1 && flags.contains(PenFlags::MOVE) && k[0] == last {
        flags |= PenFlags::CLOSE;
    }

    let _ = writeln!(out, "{} {} M", k[0].x, k[0].y);
    for i in 0..k.len() - 1 {
        let _ = write!(out, "{} {} ", c1[i].x, c1[i].y);
        let _ = write!(out, "{} {} ", c2[i].x, c2[i].y);
        let _ = writeln!(out, "{} {} curveto", k[i + 1].x, k[i + 1].y);
    }
    *current = last;

    finish(flags, out);
}

/// A way to write a filled and outlined polygon.
pub(crate) trait PolygonRenderer {
    /// Write the polygon with the quantized vertices `points`.
    fn render(
        &self,
        points: Vec<DevicePoint>,
        current: &mut DevicePoint,
        out: &mut String,
    ) -> Result<()>;
}

/// Writes small polygons as a single `SP` call with relative vertices.
pub(crate) struct PatchRenderer;

/// The largest polygon written by [`PatchRenderer`].
pub(crate) const MAX_PATCH_POINTS: usize = 20;

impl PolygonRenderer for PatchRenderer {
    fn render(
        &self,
        points: Vec<DevicePoint>,
        _current: &mut DevicePoint,
        out: &mut String,
    ) -> Result<()> {
        let Some(&start) = points.first() else {
            return Err(Error::NoPolygon);
        };

        let mut unique = vec![start];
        for &p in &points[1..] {
            if unique.last() != Some(&p) {
                unique.push(p);
            }
        }
        // The closing point is implied.
        if unique.last() == Some(&start) {
            unique.pop();
        }

        if unique.is_empty() {
            return Err(Error::NoPolygon);
        }

        let mut n = unique.len() - 1;
        let n1 = n;
        for i in (0..n).rev() {
            let _ = write!(
                out,
                "{} {} ",
                unique[n].x - unique[i].x,
                unique[n].y - unique[i].y
            );
            n -= 1;
        }
        let _ = writeln!(out, "{} {} {} SP", n1, start.x, start.y);

        Ok(())
    }
}

/// Writes large polygons as a simplified path that is closed and painted
/// with `FO`.
pub(crate) struct PathRenderer {
    pub(crate) policy: SimplifyPolicy,
}

impl PolygonRenderer for PathRenderer {
    fn render(
        &self,
        mut points: Vec<DevicePoint>,
        current: &mut DevicePoint,
        out: &mut String,
    ) -> Result<()> {
        self.policy.simplifier(points.len()).simplify(&mut points);
        write_line(&points, PenFlags::MOVE, current, out);
        out.push_str("FO\n");

        Ok(())
    }
}

/// Pick the polygon renderer for a polygon of `n` vertices.
pub(crate) fn polygon_renderer(n: usize, policy: SimplifyPolicy) -> Box<dyn PolygonRenderer> {
    if n <= MAX_PATCH_POINTS {
        Box::new(PatchRenderer)
    } else {
        Box::new(PathRenderer { policy })
    }
}
