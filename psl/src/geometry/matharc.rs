//! Circular arcs with heads.

use super::{HeadKind, MathArcParams, VectorStatus};
use crate::color::Paint;
use crate::error::Result;
use crate::num::g;
use crate::path::PenFlags;
use crate::session::Session;
use core::f64::consts::{PI, SQRT_2};
use kurbo::Point;
use std::io::Write;

/// The center of the circle of radius `r` through the tip `t` and the
/// flank point `f`, together with the angles of `f` and `t` seen from that
/// center.
///
/// Of the two candidate centers the one within `r` of the origin is used.
pub(crate) fn get_origin(t: Point, f: Point, r: f64) -> (Point, f64, f64) {
    let a0 = (t.x - f.x) / (f.y - t.y);
    let b0 = 0.5 * (f.x * f.x + f.y * f.y - t.x * t.x - t.y * t.y) / (f.y - t.y);
    let c0 = b0 - t.y;
    let a = 1.0 + a0 * a0;
    let b = 2.0 * (c0 * a0 - t.x);
    let c = t.x * t.x - r * r + c0 * c0;
    let q = (b * b - 4.0 * a * c).sqrt();

    let x1 = 0.5 * (-b + q) / a;
    let x2 = 0.5 * (-b - q) / a;
    let first = Point::new(x1, b0 + a0 * x1);
    let second = Point::new(x2, b0 + a0 * x2);

    let o = if first.to_vec2().hypot() < r {
        first
    } else {
        second
    };
    let flank = (f.y - o.y).atan2(f.x - o.x).to_degrees();
    let tip = (t.y - o.y).atan2(t.x - o.x).to_degrees();

    (o, flank, tip)
}

impl<W: Write> Session<W> {
    /// Draw the square angle mark of a 90 degree math arc.
    fn math_right_angle(&mut self, x: f64, y: f64, radius: f64, angle: f64) -> Result<()> {
        self.annotate(format_args!("Start of Math right angle\n"))?;
        writeln!(self.out, "V {} {} T {} R", self.ix(x), self.iy(y), g(angle))?;

        let size = radius / SQRT_2;
        let corner = [
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ];
        self.plot_line(&corner, PenFlags::MOVE | PenFlags::STROKE)?;
        self.put_str("U \n");

        self.annotate(format_args!("End of Math right angle\n"))
    }

    /// Draw an arc of `params.radius` around `(x, y)` with optional heads
    /// whose flanks are circular arcs themselves.
    pub fn math_arc(&mut self, x: f64, y: f64, params: &MathArcParams) -> Result<()> {
        let status = params.status;
        let [a1, a2] = params.angles;

        if status.contains(VectorStatus::MARC90) && (90.0 - (a2 - a1).abs()).abs() < 1.0e-8 {
            return self.math_right_angle(x, y, params.radius, a1);
        }

        self.annotate(format_args!("Start of Math arc\n"))?;
        let trim = [
            if status.contains(VectorStatus::OFF_BEGIN) {
                params.trim[0]
            } else {
                0.0
            },
            if status.contains(VectorStatus::OFF_END) {
                params.trim[1]
            } else {
                0.0
            },
        ];
        writeln!(self.out, "V {} {} T", self.ix(x), self.iy(y))?;

        let kinds = params.kinds;
        let r = params.radius;
        let mut angle = [a1 + trim[0], a2 - trim[1]];
        let head_length = params.head_length;
        let half_width = 0.5 * params.head_width;
        let mut heads = status.heads();
        let outline = status.contains(VectorStatus::OUTLINE);
        let fill = status.contains(VectorStatus::FILL);
        let circle_r = (head_length * half_width / PI).sqrt();
        let sign = [1.0, -1.0];

        // Angles spanned by the head length and the circle radius.
        let da = head_length * 180.0 / (PI * r);
        let da_c = circle_r * 180.0 / (PI * r);

        let mut side = [0; 2];
        let mut tangle = angle;
        let mut off = [0.0; 2];
        for i in 0..2 {
            side[i] = status.side(i);
            if kinds[i] == HeadKind::Arrow {
                off[i] = sign[i] * da * (1.0 - 0.5 * params.head_shape);
            }
            if heads & (i as u32 + 1) != 0 {
                if side[i] != 0 && kinds[i] == HeadKind::Circle {
                    off[i] -= 0.5 * sign[i] * da_c;
                }
                tangle[i] += off[i];
            }
        }
        side[0] = -side[0];
        // Half heads sit half a line width off the arc.
        let rshift = side.map(|s| 0.5 * s as f64 * params.arc_width);

        self.set_line_width(params.arc_width / self.transform.points_to_units())?;
        self.plot_arc(0.0, 0.0, r, tangle[0], tangle[1], PenFlags::MOVE | PenFlags::STROKE)?;

        if status.contains(VectorStatus::MID_FWD) {
            angle[1] = 0.5 * (angle[0] + angle[1]);
            heads = 2;
            if kinds[1] == HeadKind::Arrow {
                angle[1] += 0.5 * da;
            }
            tangle[1] = angle[1] + off[1];
        } else if status.contains(VectorStatus::MID_BWD) {
            angle[0] = 0.5 * (angle[0] + angle[1]);
            heads = 1;
            if kinds[0] == HeadKind::Arrow {
                angle[0] -= 0.5 * da;
            }
            tangle[0] = angle[0] + off[0];
        }

        if heads != 0 {
            let current = self.state.fill.unwrap_or(Paint::NoChange);
            self.set_fill(current, Some(true))?;
            self.put_str("PSL_vecheadpen\n");
            self.force_line_width(2.0 * params.head_pen_width)?;
        }

        let paint = super::vector::clip_paint(fill, outline);
        for i in 0..2 {
            if heads & (i as u32 + 1) == 0 {
                continue;
            }
            self.annotate(format_args!(
                "Mathangle head at {}\n",
                if i == 0 { "start" } else { "end" }
            ))?;

            let (sa, ca) = angle[i].to_radians().sin_cos();
            let r2 = r + sign[i] * rshift[i];
            let tip = Point::new(r2 * ca, r2 * sa);

            match kinds[i] {
                HeadKind::Arrow => {
                    let (sb, cb) = (angle[i] + sign[i] * da).to_radians().sin_cos();
                    self.put_str("V\n");

                    if side[i] as f64 != sign[i] {
                        let outer = Point::new((r2 + half_width) * cb, (r2 + half_width) * sb);
                        let (o, mut b1, mut b2) = get_origin(tip, outer, r2);
                        if i == 0 && b2 > b1 {
                            b2 -= 360.0;
                        } else if i == 1 && b1 > b2 {
                            b1 -= 360.0;
                        }
                        self.plot_arc(o.x, o.y, r2, b2, b1, PenFlags::MOVE)?;
                        let (st, ct) = tangle[i].to_radians().sin_cos();
                        self.plot_point(r2 * ct - outer.x, r2 * st - outer.y, PenFlags::REL)?;
                    } else {
                        self.plot_arc(0.0, 0.0, r2, angle[i], tangle[i], PenFlags::MOVE)?;
                    }

                    if side[i] as f64 != -sign[i] {
                        let inner = Point::new((r2 - half_width) * cb, (r2 - half_width) * sb);
                        let (o, mut b1, b2) = get_origin(tip, inner, r2);
                        if i == 0 && b1 < b2 {
                            b1 += 360.0;
                        } else if i == 1 && b1 > b2 {
                            b1 -= 360.0;
                        }
                        self.plot_arc(o.x, o.y, r2, b1, b2, PenFlags::empty())?;
                    } else {
                        self.plot_arc(0.0, 0.0, r2, tangle[i], angle[i], PenFlags::empty())?;
                    }

                    writeln!(self.out, "{paint}U")?;
                }
                HeadKind::Circle => {
                    self.put_str("V\n");
                    let (from, to) = match side[i] {
                        -1 => (angle[i] + 90.0, angle[i] + 270.0),
                        1 => (angle[i] - 90.0, angle[i] + 90.0),
                        _ => (0.0, 360.0),
                    };
                    self.plot_arc(tip.x, tip.y, circle_r, from, to, PenFlags::MOVE)?;
                    writeln!(self.out, "{paint}U")?;
                }
                HeadKind::Terminal => {
                    let at = |d: f64| Point::new((r + d) * ca, (r + d) * sa);
                    let bar = match side[i] {
                        -1 => [at(-half_width), at(0.0)],
                        1 => [at(0.0), at(half_width)],
                        _ => [at(-half_width), at(half_width)],
                    };
                    self.plot_line(&bar, PenFlags::MOVE | PenFlags::STROKE)?;
                }
                other => {
                    ldebug!("math arcs do not draw {:?} heads", other);
                }
            }
        }

        self.put_str("U \n");
        self.annotate(format_args!("End of Math arc\n"))
    }
}
