//! Straight vectors with heads.
//!
//! A vector is drawn in a local frame with the tail at the origin and the
//! shaft along the positive x axis. Each head is built around its own
//! origin: the start head opens towards positive x, the end head towards
//! negative x.

use super::{HeadKind, VectorParams, VectorV4Params};
use crate::error::Result;
use crate::path::PenFlags;
use crate::session::Session;
use core::f64::consts::PI;
use kurbo::{Point, Vec2};
use smallvec::{SmallVec, smallvec};
use std::io::Write;

/// The cosine of the 45 degree slant of tail feathers.
const FIN_SLANT_COS: f64 = 0.707106781187;
/// Feather length relative to the head length.
const FIN_LENGTH_SCALE: f64 = 0.66666667;
/// Feather height relative to the head half width.
const FIN_HEIGHT_SCALE: f64 = 0.5;

type Outline = SmallVec<[Point; 6]>;

/// The sizes shared by both heads of one vector.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeadGeometry {
    pub(crate) tail_width: f64,
    pub(crate) length: f64,
    pub(crate) half_width: f64,
    pub(crate) shape: f64,
}

impl HeadGeometry {
    /// The radius of the circle with the area of an arrow head.
    pub(crate) fn circle_radius(&self) -> f64 {
        (self.length * self.half_width / PI).sqrt()
    }

    /// Half the side of the square with the area of an arrow head.
    fn square_half_side(&self) -> f64 {
        (self.length * self.half_width).sqrt() / 2.0
    }

    /// How far the shaft stops short of the tip for a head of `kind`.
    pub(crate) fn setback(&self, kind: HeadKind) -> f64 {
        match kind {
            HeadKind::Arrow => 0.5 * (2.0 - self.shape) * self.length,
            HeadKind::ArrowPlain => 0.5 * self.tail_width * self.length / self.half_width,
            HeadKind::Tail => {
                FIN_SLANT_COS * self.half_width + FIN_LENGTH_SCALE * self.length
                    - self.tail_width
            }
            _ => 0.0,
        }
    }
}

/// What a head draws.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HeadPath {
    /// A closed outline used as clip path, then filled and outlined.
    Clipped(Outline),
    /// A circle or half circle around `(x, 0)`, clipped like an outline.
    Disk {
        x: f64,
        radius: f64,
        angles: [f64; 2],
    },
    /// An open polyline stroked with the head pen.
    Stroked(Outline),
    /// An open arrow stroked inside the triangle `clip`.
    Open { clip: [Point; 3], line: Outline },
    /// Feathers clipped like an outline, with an optional spine.
    Feathers {
        outline: Outline,
        spine: Option<(Point, Point)>,
    },
}

/// Build the head of `kind` at `xp`. `dir` is +1 for a start head and -1
/// for an end head; `side` is -1 or +1 for half heads and 0 for a full one.
pub(crate) fn head_path(
    kind: HeadKind,
    g: &HeadGeometry,
    xp: f64,
    dir: f64,
    side: i32,
    yshift: f64,
) -> HeadPath {
    let (hl, hw, tw) = (g.length, g.half_width, g.tail_width);
    let off = g.setback(kind);

    match kind {
        HeadKind::Arrow => {
            let mut p: Outline = smallvec![Point::new(xp, -dir * yshift)];
            if side != 1 {
                p.push(Point::new(xp + dir * hl, -dir * hw));
            }
            if side != 0 || g.shape != 0.0 {
                p.push(Point::new(xp + dir * off, -dir * yshift));
            }
            if side != -1 {
                p.push(Point::new(xp + dir * hl, dir * hw));
            }
            HeadPath::Clipped(p)
        }
        HeadKind::ArrowPlain => {
            let tip = Point::new(xp, -yshift);
            let back = xp + dir * hl;
            let mut line = Outline::new();
            if side != 1 {
                line.push(Point::new(back, -hw));
            }
            line.push(tip);
            if side != -1 {
                line.push(Point::new(back, hw));
            }
            HeadPath::Open {
                clip: [Point::new(back, -hw), tip, Point::new(back, hw)],
                line,
            }
        }
        HeadKind::Tail => {
            let fin_y = FIN_HEIGHT_SCALE * hw;
            let fin_len = FIN_LENGTH_SCALE * hl;
            let at = |dx: f64| xp + dir * (tw + off + dx);

            let start = Point::new(at(0.0), -yshift);
            let mut p: Outline = smallvec![start];
            if side != 1 {
                let x = at(-FIN_SLANT_COS * hw);
                p.push(Point::new(x, -fin_y));
                p.push(Point::new(x - dir * fin_len, -fin_y));
            }
            p.push(Point::new(at(-fin_len), -yshift));
            if side != -1 {
                let x = at(-FIN_SLANT_COS * hw - fin_len);
                p.push(Point::new(x, fin_y));
                p.push(Point::new(x + dir * fin_len, fin_y));
            }

            let spine = (side == 0).then(|| (start, Point::new(at(-hl), -yshift)));
            HeadPath::Feathers { outline: p, spine }
        }
        HeadKind::TailPlain => {
            let back = xp - dir * hl;
            let mut p = Outline::new();
            if side != 1 {
                p.push(Point::new(back, -hw));
            }
            p.push(Point::new(xp, -yshift));
            if side != -1 {
                p.push(Point::new(back, hw));
            }
            HeadPath::Stroked(p)
        }
        HeadKind::Circle => HeadPath::Disk {
            x: xp,
            radius: g.circle_radius(),
            angles: match side {
                -1 => [0.0, 180.0],
                1 => [180.0, 360.0],
                _ => [0.0, 360.0],
            },
        },
        HeadKind::Square => {
            let s = g.square_half_side();
            let (top, bottom) = match side {
                -1 => (s, 0.0),
                1 => (0.0, -s),
                _ => (s, -s),
            };
            HeadPath::Clipped(smallvec![
                Point::new(xp - s, top),
                Point::new(xp + s, top),
                Point::new(xp + s, bottom),
                Point::new(xp - s, bottom),
            ])
        }
        HeadKind::Terminal => {
            let (y0, y1) = match side {
                -1 => (0.0, hw),
                1 => (0.0, -hw),
                _ => (-hw, hw),
            };
            HeadPath::Stroked(smallvec![Point::new(xp, y0), Point::new(xp, y1)])
        }
    }
}

/// The operators that paint a clipped head.
pub(crate) fn clip_paint(fill: bool, outline: bool) -> String {
    format!(
        "P clip {} {} ",
        if fill { "fs" } else { "" },
        if outline { "P S" } else { "N" }
    )
}

impl<W: Write> Session<W> {
    /// Draw a head built by [`head_path`] in the current local frame.
    fn head(&mut self, path: &HeadPath, fill: bool, outline: bool, newline: bool) -> Result<()> {
        let paint = clip_paint(fill, outline);

        match path {
            HeadPath::Clipped(points) => {
                self.plot_line(points, PenFlags::MOVE)?;
                self.put_str(&paint);
            }
            HeadPath::Disk { x, radius, angles } => {
                self.plot_arc(*x, 0.0, *radius, angles[0], angles[1], PenFlags::MOVE)?;
                self.put_str(&paint);
            }
            HeadPath::Stroked(points) => {
                self.plot_line(points, PenFlags::MOVE | PenFlags::STROKE)?;
            }
            HeadPath::Open { clip, line } => {
                self.put_str("V ");
                self.plot_line(clip, PenFlags::MOVE)?;
                self.put_str("P clip N ");
                self.plot_line(line, PenFlags::MOVE | PenFlags::STROKE)?;
                self.put_str("U\n");
            }
            HeadPath::Feathers { outline: points, spine } => {
                self.plot_line(points, PenFlags::MOVE)?;
                self.put_str(&paint);
                if let Some((a, b)) = spine {
                    self.put_str("V 0 W ");
                    self.plot_segment(a.x, a.y, b.x, b.y)?;
                    self.put_str("U\n");
                }
            }
        }

        if newline {
            self.put_str("\n");
        }

        Ok(())
    }

    fn head_pen(&mut self, kind: HeadKind, pen_width: f64) -> Result<()> {
        let factor = if kind == HeadKind::ArrowPlain { 4.0 } else { 2.0 };
        self.put_str("PSL_vecheadpen\n");
        self.force_line_width(factor * pen_width)
    }

    /// Draw a straight vector from `(x, y)` to the tip in `params`. A
    /// vector that is shorter than one device unit draws nothing.
    pub fn vector(&mut self, x: f64, y: f64, params: &VectorParams) -> Result<()> {
        let status = params.status;
        let mut tail = Point::new(x, y);
        let mut tip = params.tip;

        if self.iz(tail.distance(tip)) == 0 {
            return Ok(());
        }
        let angle = (tip.y - tail.y).atan2(tip.x - tail.x).to_degrees();

        let trim = [
            if status.contains(super::VectorStatus::OFF_BEGIN) {
                params.trim[0]
            } else {
                0.0
            },
            if status.contains(super::VectorStatus::OFF_END) {
                params.trim[1]
            } else {
                0.0
            },
        ];
        if angle.abs() == 90.0 {
            tail.y += trim[0].copysign(angle);
            tip.y -= trim[1].copysign(angle);
        } else {
            let (s, c) = angle.to_radians().sin_cos();
            tail += Vec2::new(c, s) * trim[0];
            tip -= Vec2::new(c, s) * trim[1];
        }

        let length = tail.distance(tip);
        if self.iz(length) == 0 {
            return Ok(());
        }

        let g = HeadGeometry {
            tail_width: params.tail_width,
            length: params.head_length,
            half_width: 0.5 * params.head_width,
            shape: params.head_shape,
        };
        let kinds = params.kinds;
        let off = kinds.map(|k| g.setback(k));
        let mut heads = status.heads();
        let fill = status.contains(super::VectorStatus::FILL);
        let outline = status.contains(super::VectorStatus::OUTLINE);
        let side = [-status.side(0), status.side(1)];
        let r = g.circle_radius();

        self.set_line_width(params.tail_width / self.transform.points_to_units())?;
        self.annotate(format_args!("Start of Cartesian vector\n"))?;
        self.local_frame(tail, angle)?;

        let mut x0 = if heads & 1 != 0 { off[0] } else { 0.0 };
        let mut x1 = if heads & 2 != 0 { length - off[1] } else { length };
        if heads & 1 != 0 && side[0] != 0 && kinds[0] == HeadKind::Circle {
            x0 = -r;
        }
        if heads & 2 != 0 && side[1] != 0 && kinds[1] == HeadKind::Circle {
            x1 += r;
        }
        if x1 > x0 {
            self.plot_segment(x0, 0.0, x1, 0.0)?;
        }

        let mut xp = 0.0;
        if status.contains(super::VectorStatus::MID_FWD) {
            xp = -0.5 * length;
            heads = 2;
            if kinds[1] == HeadKind::Arrow {
                xp += 0.5 * g.length;
            }
        } else if status.contains(super::VectorStatus::MID_BWD) {
            xp = 0.5 * length;
            heads = 1;
            if kinds[0] == HeadKind::Arrow {
                xp -= 0.5 * g.length;
            }
        }

        if heads == 0 {
            self.put_str("U\n");
            return self.annotate(format_args!("End of Cartesian vector\n"));
        }

        let yshift = side.map(|s| 0.5 * s as f64 * g.tail_width);

        if heads & 1 != 0 {
            self.annotate(format_args!("Cartesian vector head at start\n"))?;
            self.head_pen(kinds[0], params.head_pen_width)?;
            let path = head_path(kinds[0], &g, xp, 1.0, side[0], yshift[0]);
            self.head(&path, fill, outline, false)?;
        }
        self.put_str("U\n");

        if heads & 2 != 0 {
            self.annotate(format_args!("Cartesian vector head at end\n"))?;
            self.local_frame(tip, angle)?;
            self.head_pen(kinds[1], params.head_pen_width)?;
            let path = head_path(kinds[1], &g, xp, -1.0, side[1], yshift[1]);
            self.head(&path, fill, outline, kinds[1] == HeadKind::Arrow)?;
            self.put_str("U\n");
        }

        self.annotate(format_args!("End of Cartesian vector\n"))
    }

    /// Save the graphics state and move the origin to `origin`, rotated by
    /// `angle` degrees.
    fn local_frame(&mut self, origin: Point, angle: f64) -> Result<()> {
        write!(self.out, "V {} {} T ", self.ix(origin.x), self.iy(origin.y))?;
        if angle != 0.0 {
            writeln!(self.out, "{} R", crate::num::g(angle))?;
        }

        Ok(())
    }

    /// Draw a vector of early plot formats as one filled polygon with
    /// `paint`. The shaft and head never become thinner than one device
    /// unit.
    pub fn plot_vector_v4(
        &mut self,
        x: f64,
        y: f64,
        params: &VectorV4Params,
        paint: crate::color::Paint,
    ) -> Result<()> {
        let tail = Point::new(x, y);
        let length = self.iz(tail.distance(params.tip));
        if length == 0 {
            return Ok(());
        }

        self.set_fill(paint, Some(params.outline))?;
        let angle = (params.tip.y - y).atan2(params.tip.x - x).to_degrees();
        write!(self.out, "V {} {} T ", self.ix(x), self.iy(y))?;
        if angle != 0.0 {
            write!(self.out, "{} R ", crate::num::g(angle))?;
        }

        let w2 = self.iz(0.5 * params.tail_width).max(1);
        let hw = self.iz(params.head_width).max(1);
        let hl = self.iz(params.head_length);
        let hl2 = self.iz(0.5 * params.head_shape * params.head_length);
        let hw2 = hw - w2;

        if params.double_head {
            let l2 = length - 2 * hl + 2 * hl2;
            writeln!(
                self.out,
                "{hl2} {hw2} {} {hl2} {} {} {hw} {hl} {hw} {} {} {l2} {} {hw2} {hl} {} Sv U",
                -l2, -hw2, -hl, -hl2, -hw2, -hl2, -hw
            )?;
        } else {
            let l2 = length - hl + hl2;
            writeln!(
                self.out,
                "{} {hl2} {} {} {hw} {hl} {hw} {} {} {l2} {} SV U",
                -l2, -hw2, -hl, -hl2, -hw2, -w2
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Unit};
    use crate::geometry::VectorStatus;

    fn geometry() -> HeadGeometry {
        HeadGeometry {
            tail_width: 0.1,
            length: 1.0,
            half_width: 0.5,
            shape: 0.0,
        }
    }

    #[test]
    fn flat_arrow_is_a_triangle() {
        let HeadPath::Clipped(p) = head_path(HeadKind::Arrow, &geometry(), 0.0, 1.0, 0, 0.0)
        else {
            panic!("arrow must be clipped");
        };
        assert_eq!(
            p.as_slice(),
            &[
                Point::new(0.0, 0.0),
                Point::new(1.0, -0.5),
                Point::new(1.0, 0.5)
            ]
        );
    }

    #[test]
    fn end_arrow_is_mirrored() {
        let g = HeadGeometry {
            shape: 0.5,
            ..geometry()
        };
        let HeadPath::Clipped(p) = head_path(HeadKind::Arrow, &g, 0.0, -1.0, 0, 0.0) else {
            panic!("arrow must be clipped");
        };
        assert_eq!(p.len(), 4);
        assert_eq!(p[1], Point::new(-1.0, 0.5));
        assert_eq!(p[2], Point::new(-0.75, 0.0));
    }

    #[test]
    fn half_heads() {
        let HeadPath::Clipped(p) = head_path(HeadKind::Arrow, &geometry(), 0.0, 1.0, 1, 0.05)
        else {
            panic!("arrow must be clipped");
        };
        // The left flank is dropped and the back is kept.
        assert_eq!(p.len(), 3);
        assert_eq!(p[2], Point::new(1.0, 0.5));

        let HeadPath::Stroked(t) = head_path(HeadKind::Terminal, &geometry(), 2.0, -1.0, -1, 0.0)
        else {
            panic!("terminal must be stroked");
        };
        assert_eq!(t.as_slice(), &[Point::new(2.0, 0.0), Point::new(2.0, 0.5)]);
    }

    #[test]
    fn feathers_have_a_spine_only_when_full() {
        let HeadPath::Feathers { outline, spine } =
            head_path(HeadKind::Tail, &geometry(), 0.0, 1.0, 0, 0.0)
        else {
            panic!("tail must be feathers");
        };
        assert_eq!(outline.len(), 6);
        assert!(spine.is_some());

        let HeadPath::Feathers { spine, .. } =
            head_path(HeadKind::Tail, &geometry(), 0.0, 1.0, -1, 0.0)
        else {
            panic!("tail must be feathers");
        };
        assert!(spine.is_none());
    }

    #[test]
    fn setbacks() {
        let g = geometry();
        assert_eq!(g.setback(HeadKind::Arrow), 1.0);
        assert_eq!(g.setback(HeadKind::ArrowPlain), 0.1);
        assert_eq!(g.setback(HeadKind::Square), 0.0);
    }

    fn vector_params(status: VectorStatus) -> VectorParams {
        VectorParams {
            tip: Point::new(2.0, 0.0),
            tail_width: 0.01,
            head_length: 0.2,
            head_width: 0.2,
            head_shape: 0.0,
            status,
            kinds: [HeadKind::Arrow; 2],
            trim: [0.0; 2],
            head_pen_width: 0.5,
        }
    }

    #[test]
    fn headless_vector() {
        let mut s = Session::in_memory(Config::default().with_unit(Unit::Inch));
        s.vector(0.0, 0.0, &vector_params(VectorStatus::empty())).unwrap();
        let out = String::from_utf8(s.finish().unwrap()).unwrap();
        assert_eq!(out, "12 W\nV 0 0 T N 0 0 M 2400 0 D S\nU\n");
    }

    #[test]
    fn null_vector_draws_nothing() {
        let mut s = Session::in_memory(Config::default().with_unit(Unit::Inch));
        let mut params = vector_params(VectorStatus::END);
        params.tip = Point::new(0.0, 0.0);
        s.vector(0.0, 0.0, &params).unwrap();
        assert!(s.finish().unwrap().is_empty());
    }

    #[test]
    fn vector_with_end_arrow() {
        let mut s = Session::in_memory(Config::default().with_unit(Unit::Inch));
        s.vector(0.0, 0.0, &vector_params(VectorStatus::END | VectorStatus::FILL))
            .unwrap();
        let out = String::from_utf8(s.finish().unwrap()).unwrap();
        assert!(out.starts_with("12 W\nV 0 0 T N 0 0 M 2160 0 D S\nU\nV 2400 0 T PSL_vecheadpen\n17 W\n"));
        assert!(out.ends_with("P clip fs N \nU\n"));
    }

    #[test]
    fn legacy_vector() {
        let mut s = Session::in_memory(Config::default().with_unit(Unit::Inch));
        let params = VectorV4Params {
            tip: Point::new(1.0, 0.0),
            tail_width: 0.1,
            head_length: 0.25,
            head_width: 0.1,
            head_shape: 0.0,
            double_head: false,
            outline: false,
        };
        s.plot_vector_v4(0.0, 0.0, &params, crate::color::Rgba::BLACK.into())
            .unwrap();
        let out = String::from_utf8(s.finish().unwrap()).unwrap();
        assert_eq!(
            out,
            "{0 A} FS\nO0\nV 0 0 T -900 0 -60 -300 120 300 120 0 -60 900 -60 SV U\n"
        );
    }
}
