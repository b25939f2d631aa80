//! Lines, curves, polygons, symbols and clip paths.

use super::Session;
use crate::bezier::fit_bezier;
use crate::color::Paint;
use crate::error::{Error, Result};
use crate::geometry::Symbol;
use crate::num::g;
use crate::path::{self, DevicePoint, PenFlags};
use bitflags::bitflags;
use kurbo::Point;
use std::io::Write;

const SMALL: f64 = 1.0e-10;

bitflags! {
    /// How a piece of a clip path is used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClipFlags: u32 {
        /// The piece starts a new clip path.
        const START = 1;
        /// The piece ends the clip path, which is then activated.
        const END = 2;
        /// Clip with the even-odd rule instead of nonzero winding.
        const EVEN_ODD = 4;
    }
}

impl<W: Write> Session<W> {
    pub(crate) fn put_str(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Draw a polyline through `points`, simplified so that the rendering
    /// does not change.
    pub fn plot_line(&mut self, points: &[Point], flags: PenFlags) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let device = path::simplify_path(points, &self.transform, self.config.simplify);
        let mut s = String::new();
        path::write_line(&device, flags, &mut self.state.point, &mut s);
        self.put_str(&s);

        Ok(())
    }

    /// Draw a smooth Bezier spline through `points`.
    pub fn plot_curve(&mut self, points: &[Point], flags: PenFlags) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let (px1, px2) = fit_bezier(&xs)?;
        let (py1, py2) = fit_bezier(&ys)?;

        let knots = path::quantize(points, &self.transform);
        let control = |xs: &[f64], ys: &[f64]| -> Vec<DevicePoint> {
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| DevicePoint::new(self.ix(x), self.iy(y)))
                .collect()
        };
        let c1 = control(&px1, &py1);
        let c2 = control(&px2, &py2);

        let mut s = String::new();
        path::write_curve(&knots, &c1, &c2, flags, &mut self.state.point, &mut s);
        self.put_str(&s);

        Ok(())
    }

    /// Move or draw to a single point. With [`PenFlags::REL`] the point is
    /// an offset from the current point.
    pub fn plot_point(&mut self, x: f64, y: f64, flags: PenFlags) -> Result<()> {
        let (ix, iy) = (self.ix(x), self.iy(y));
        let current = self.state.point;

        if flags.contains(PenFlags::REL) {
            if flags.contains(PenFlags::STROKE) {
                writeln!(self.out, "{ix} {iy} D S")?;
            } else if ix == 0 && iy == 0 {
                return Ok(());
            } else if flags.contains(PenFlags::MOVE) {
                writeln!(self.out, "{ix} {iy} G")?;
            } else {
                writeln!(self.out, "{ix} {iy} D")?;
            }
            self.state.point = DevicePoint::new(current.x + ix, current.y + iy);
        } else {
            let (dx, dy) = (ix - current.x, iy - current.y);
            if flags.contains(PenFlags::STROKE) {
                writeln!(self.out, "{dx} {dy} D S")?;
            } else if flags.contains(PenFlags::MOVE) {
                writeln!(self.out, "{ix} {iy} M")?;
            } else if dx == 0 && dy == 0 {
                return Ok(());
            } else {
                writeln!(self.out, "{dx} {dy} D")?;
            }
            self.state.point = DevicePoint::new(ix, iy);
        }

        Ok(())
    }

    /// Stroke a single line segment.
    pub fn plot_segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<()> {
        let (ix, iy) = (self.ix(x0), self.iy(y0));
        let end = DevicePoint::new(self.ix(x1), self.iy(y1));
        writeln!(
            self.out,
            "N {ix} {iy} M {} {} D S",
            end.x - ix,
            end.y - iy
        )?;
        self.state.point = end;

        Ok(())
    }

    /// Draw a circular arc from `a1` to `a2` degrees, clockwise when `a1`
    /// is the larger angle.
    pub fn plot_arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        a1: f64,
        a2: f64,
        flags: PenFlags,
    ) -> Result<()> {
        if (a1 - a2).abs() > 360.0 {
            return Err(Error::BadRange);
        }
        if radius < 0.0 {
            return Err(Error::BadSize);
        }

        if flags.contains(PenFlags::MOVE) {
            self.put_str("N ");
        }
        write!(
            self.out,
            "{} {} {} {} {} arc",
            self.ix(x),
            self.iy(y),
            self.iz(radius),
            g(a1),
            g(a2)
        )?;
        if a1 > a2 {
            self.put_str("n");
        }
        self.put_str(if flags.contains(PenFlags::STROKE) {
            " S\n"
        } else {
            "\n"
        });

        Ok(())
    }

    /// Draw the axis aligned rectangle with corners `(x0, y0)` and
    /// `(x1, y1)` using the current fill and outline.
    pub fn plot_box(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<()> {
        let (llx, lly) = (self.ix(x0), self.iy(y0));
        writeln!(
            self.out,
            "{} {} {llx} {lly} Sb",
            self.iy(y1) - lly,
            self.ix(x1) - llx
        )?;

        Ok(())
    }

    /// Draw a closed polygon using the current fill and outline.
    pub fn plot_polygon(&mut self, points: &[Point]) -> Result<()> {
        let device = path::quantize(points, &self.transform);
        let renderer = path::polygon_renderer(device.len(), self.config.simplify);
        let mut s = String::new();
        renderer.render(device, &mut self.state.point, &mut s)?;
        self.put_str(&s);

        Ok(())
    }

    /// Draw a symbol at `(x, y)` using the current pen, fill and outline.
    pub fn plot_symbol(&mut self, x: f64, y: f64, symbol: &Symbol) -> Result<()> {
        let (ix, iy) = (self.ix(x), self.iy(y));

        match *symbol {
            Symbol::Mark(kind, size) => {
                writeln!(self.out, "{} {ix} {iy} S{}", self.iz(0.5 * size), kind.code())?;
            }
            Symbol::Ellipse {
                angle,
                major,
                minor,
            } => {
                writeln!(
                    self.out,
                    "{} {} {} {ix} {iy} Se",
                    self.iz(0.5 * major),
                    self.iz(0.5 * minor),
                    g(angle)
                )?;
            }
            Symbol::Rect { width, height } => {
                writeln!(self.out, "{} {} {ix} {iy} Sr", self.iz(height), self.iz(width))?;
            }
            Symbol::RoundRect {
                width,
                height,
                radius,
            } => {
                writeln!(
                    self.out,
                    "{} {} {} {ix} {iy} SR",
                    self.iz(height),
                    self.iz(width),
                    self.iz(radius)
                )?;
            }
            Symbol::RotRect {
                angle,
                width,
                height,
            } => {
                writeln!(
                    self.out,
                    "{} {} {} {ix} {iy} Sj",
                    self.iz(height),
                    self.iz(width),
                    g(angle)
                )?;
            }
            Symbol::Wedge(ref params) => self.wedge(x, y, params)?,
            Symbol::MathArc(ref params) => self.math_arc(x, y, params)?,
            Symbol::Vector(ref params) => self.vector(x, y, params)?,
        }

        Ok(())
    }

    /// Draw a simple axis with annotations every `interval` along one side
    /// of the rectangle installed by [`Session::begin_axes`]. Sides are
    /// numbered 0 (bottom), 1 (right), 2 (top) and 3 (left).
    pub fn plot_axis(&mut self, interval: f64, label: &str, font_size: f64, side: u8) -> Result<()> {
        let Some(axes) = self.transform.axes().copied() else {
            lwarn!("axis requested without an axes mapping");
            return Err(Error::BadRange);
        };

        if interval <= 0.0 {
            lwarn!("axis annotation interval must be positive ({})", interval);
            return Err(Error::BadValue);
        }

        let side = usize::from(side % 4);
        let k = 2 * (side % 2);
        let (lo, hi) = (axes.limits[k], axes.limits[k + 1]);
        let (val0, val1) = (lo.min(hi), lo.max(hi));
        if val1 - val0 == 0.0 {
            lwarn!("axis range is empty");
            return Err(Error::BadRange);
        }
        let reverse = lo > hi;

        // As many decimals as the interval has.
        let decimals = g(interval)
            .to_string()
            .split_once('.')
            .map_or(0, |(_, frac)| frac.len());
        let annotation = |v: f64| {
            if decimals > 0 {
                format!("{v:.decimals$}")
            } else {
                g(v).to_string()
            }
        };

        let [mut x, mut y] = axes.origin;
        if side == 1 {
            x += axes.dims[0];
        }
        if side == 2 {
            y += axes.dims[1];
        }
        let mut length = axes.dims[side % 2];
        let angle = if side % 2 == 1 { 90.0 } else { 0.0 };
        let sign = if side < 2 { -1.0 } else { 1.0 };
        let justify = if side < 2 { -10 } else { -2 };
        let mut dy = sign * font_size * self.transform.points_to_units();

        write!(self.out, "\nV {} {} T {} R\n", self.iz(x), self.iz(y), g(angle))?;
        writeln!(self.out, "N 0 0 M {} 0 D S", self.iz(length))?;

        let scale = length / (val1 - val0);
        let annot_off = dy;
        let label_off = 2.5 * dy;
        dy *= 0.5;

        let mut val = (val0 / interval).ceil() * interval;
        while val <= val1 + SMALL {
            let mut xx = (val - val0) * scale;
            if reverse {
                xx = length - xx;
            }
            writeln!(self.out, "{} 0 M 0 {} D S", self.iz(xx), self.iz(dy))?;
            write!(self.out, "{} {} M ", self.iz(xx), self.iz(annot_off))?;
            let text = annotation(val);
            self.plot_text(xx, annot_off, -font_size, Some(&text), 0.0, justify, 0)?;
            val += interval;
        }

        length *= 0.5;
        write!(self.out, "{} {} M ", self.iz(length), self.iz(label_off))?;
        self.plot_text(length, label_off, -1.5 * font_size, Some(label), 0.0, justify, 0)?;
        self.put_str("U\n");

        Ok(())
    }

    /// Add a piece to a clip path, painting it with `paint` when the path
    /// ends. Clipping stays on until [`Session::end_clipping`].
    pub fn begin_clipping(&mut self, points: &[Point], paint: Paint, flags: ClipFlags) -> Result<()> {
        if flags.contains(ClipFlags::START) {
            self.annotate(format_args!("Start of polygon clip path\n"))?;
            self.put_str("clipsave\n");
        }

        if !points.is_empty() {
            let mut pen = PenFlags::MOVE;
            if !flags.contains(ClipFlags::START | ClipFlags::END) {
                pen |= PenFlags::CLOSE_INTERIOR;
            }
            self.plot_line(points, pen)?;
        }

        if flags.contains(ClipFlags::END) {
            if let Paint::Color(_) = paint {
                let color = self.color(&paint);
                write!(self.out, "V {color} eofill U ")?;
            }
            self.state.clip_depth += 1;
            self.put_str(if flags.contains(ClipFlags::EVEN_ODD) {
                "PSL_eoclip N\n"
            } else {
                "PSL_clip N\n"
            });
            self.annotate(format_args!(
                "End of polygon clip path.  Polygon clipping is currently ON\n"
            ))?;
        }

        Ok(())
    }

    /// Undo `levels` clip paths, or all of them for `None`. A request for
    /// more levels than are active restores only the active ones.
    pub fn end_clipping(&mut self, levels: Option<u32>) -> Result<()> {
        let depth = self.state.clip_depth.max(0) as u32;

        let n = match levels {
            None => {
                self.put_str("PSL_nclip {PSL_cliprestore} repeat\n");
                self.annotate(format_args!("Clipping is currently OFF\n"))?;
                self.state.clip_depth = 0;
                return Ok(());
            }
            Some(n) if n > depth => {
                lwarn!("asked to restore {} clip paths but only {} are active", n, depth);
                depth
            }
            Some(n) => n,
        };

        match n {
            0 => {}
            1 => {
                self.put_str("PSL_cliprestore\n");
                self.annotate(format_args!("Clipping reduced by 1 level\n"))?;
            }
            n => {
                writeln!(self.out, "{n} {{PSL_cliprestore}} repeat")?;
                self.annotate(format_args!("Clipping reduced by {n} levels\n"))?;
            }
        }
        self.state.clip_depth -= n as i32;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Unit};
    use crate::geometry::MarkKind;

    fn session() -> Session<Vec<u8>> {
        Session::in_memory(Config::default().with_unit(Unit::Inch))
    }

    fn output(s: Session<Vec<u8>>) -> String {
        String::from_utf8(s.finish().unwrap()).unwrap()
    }

    #[test]
    fn collinear_line() {
        let mut s = session();
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        s.plot_line(&points, PenFlags::MOVE | PenFlags::STROKE).unwrap();
        assert_eq!(output(s), "0 0 M\n2400 0 D\nS\n");
    }

    #[test]
    fn empty_line() {
        let mut s = session();
        s.plot_line(&[], PenFlags::MOVE).unwrap();
        assert_eq!(output(s), "");
    }

    #[test]
    fn points() {
        let mut s = session();
        s.plot_point(1.0, 1.0, PenFlags::MOVE).unwrap();
        s.plot_point(1.0, 1.0, PenFlags::empty()).unwrap();
        s.plot_point(2.0, 1.0, PenFlags::empty()).unwrap();
        s.plot_point(0.5, 0.0, PenFlags::REL | PenFlags::MOVE).unwrap();
        s.plot_point(0.0, 0.5, PenFlags::REL | PenFlags::STROKE).unwrap();
        assert_eq!(s.state.point, DevicePoint::new(3000, 1800));
        assert_eq!(
            output(s),
            "1200 1200 M\n1200 0 D\n600 0 G\n0 600 D S\n"
        );
    }

    #[test]
    fn arcs() {
        let mut s = session();
        s.plot_arc(0.0, 0.0, 1.0, 0.0, 90.0, PenFlags::MOVE | PenFlags::STROKE)
            .unwrap();
        s.plot_arc(0.0, 0.0, 1.0, 90.0, 0.0, PenFlags::empty()).unwrap();
        assert_eq!(
            s.plot_arc(0.0, 0.0, 1.0, 0.0, 400.0, PenFlags::empty()),
            Err(Error::BadRange)
        );
        assert_eq!(
            s.plot_arc(0.0, 0.0, -1.0, 0.0, 90.0, PenFlags::empty()),
            Err(Error::BadSize)
        );
        assert_eq!(
            output(s),
            "N 0 0 1200 0 90 arc S\n0 0 1200 90 0 arcn\n"
        );
    }

    #[test]
    fn box_and_segment() {
        let mut s = session();
        s.plot_box(1.0, 1.0, 2.0, 3.0).unwrap();
        s.plot_segment(0.0, 0.0, 1.0, 0.5).unwrap();
        assert_eq!(output(s), "2400 1200 1200 1200 Sb\nN 0 0 M 1200 600 D S\n");
    }

    #[test]
    fn small_polygon_uses_patch() {
        let mut s = session();
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        s.plot_polygon(&points).unwrap();
        assert_eq!(output(s), "0 1200 1200 0 2 0 0 SP\n");
    }

    #[test]
    fn large_polygon_uses_path() {
        let mut s = session();
        let points: Vec<Point> = (0..30)
            .map(|i| {
                let a = (i as f64 * 12.0).to_radians();
                Point::new(a.cos(), a.sin())
            })
            .collect();
        s.plot_polygon(&points).unwrap();
        let out = output(s);
        assert!(out.starts_with("1200 0 M\n"));
        assert!(out.ends_with("FO\n"));
    }

    #[test]
    fn marks_and_rects() {
        let mut s = session();
        s.plot_symbol(1.0, 1.0, &Symbol::Mark(MarkKind::Circle, 0.5)).unwrap();
        s.plot_symbol(
            0.0,
            0.0,
            &Symbol::Rect {
                width: 1.0,
                height: 0.5,
            },
        )
        .unwrap();
        s.plot_symbol(
            0.0,
            0.0,
            &Symbol::Ellipse {
                angle: 30.0,
                major: 2.0,
                minor: 1.0,
            },
        )
        .unwrap();
        assert_eq!(
            output(s),
            "300 1200 1200 Sc\n600 1200 0 0 Sr\n1200 600 30 0 0 Se\n"
        );
    }

    #[test]
    fn clipping() {
        let mut s = session();
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        s.begin_clipping(&square, Paint::NoChange, ClipFlags::START | ClipFlags::END)
            .unwrap();
        s.begin_clipping(&square, Paint::NoChange, ClipFlags::START | ClipFlags::END)
            .unwrap();
        assert_eq!(s.state.clip_depth, 2);
        s.end_clipping(Some(2)).unwrap();
        assert_eq!(s.state.clip_depth, 0);
        let clip = "clipsave\n0 0 M\n1200 0 D\n0 1200 D\n-1200 0 D\nPSL_clip N\n";
        assert_eq!(output(s), format!("{clip}{clip}2 {{PSL_cliprestore}} repeat\n"));
    }

    #[test]
    fn clip_restores_are_limited_to_active_paths() {
        let mut s = session();
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ];
        s.begin_clipping(&square, Paint::NoChange, ClipFlags::START | ClipFlags::END)
            .unwrap();
        s.put_str("%\n");
        s.end_clipping(Some(5)).unwrap();
        assert_eq!(s.state.clip_depth, 0);
        s.end_clipping(Some(3)).unwrap();
        s.end_clipping(Some(1)).unwrap();
        assert_eq!(s.state.clip_depth, 0);

        let out = output(s);
        assert!(!out.contains("repeat"));
        assert!(out.ends_with("%\nPSL_cliprestore\n"));
    }

    #[test]
    fn axis_requires_axes() {
        let mut s = session();
        assert_eq!(s.plot_axis(1.0, "x", 10.0, 0), Err(Error::BadRange));
    }

    #[test]
    fn bottom_axis() {
        let mut s = session();
        s.begin_axes(1.0, 1.0, 4.0, 2.0, 0.0, 0.0, 10.0, 5.0).unwrap();
        assert_eq!(s.plot_axis(0.0, "x", 10.0, 0), Err(Error::BadValue));
        s.plot_axis(2.0, "Distance", 10.0, 0).unwrap();
        let out = output(s);

        assert!(out.starts_with("\nV 1200 1200 T 0 R\nN 0 0 M 4800 0 D S\n"));
        assert_eq!(out.matches(" 0 M 0 -83 D S\n").count(), 6);
        assert!(out.contains("(10) tc"));
        assert!(out.contains("(Distance) tc"));
        assert!(out.ends_with("U\n"));
    }
}
