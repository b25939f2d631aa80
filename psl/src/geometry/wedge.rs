//! Pie wedges with optional windshields and spider webs.

use super::{WedgeParams, WedgeStatus};
use crate::error::Result;
use crate::num::g;
use crate::path::PenFlags;
use crate::session::Session;
use kurbo::Point;
use std::io::Write;

const SMALL: f64 = 1.0e-10;

/// `start`, `start + step`, ... up to `to`.
fn steps(start: f64, step: f64, to: f64) -> impl Iterator<Item = f64> {
    core::iter::successors(Some(start), move |v| Some(v + step))
        .take_while(move |v| *v <= to + SMALL)
}

impl<W: Write> Session<W> {
    /// Paint the wedge outline with `op`, which is `fs` to fill or `os` to
    /// stroke.
    fn wedge_outline(&mut self, x: f64, y: f64, params: &WedgeParams, op: &str) -> Result<()> {
        let [a1, a2] = params.angles;

        if params.inner_radius > 0.0 {
            writeln!(
                self.out,
                "V {} {} T 0 0 {} {} {} arc 0 0 {} {} {} arcn P {op} U",
                self.ix(x),
                self.iy(y),
                self.iz(params.radius),
                g(a1),
                g(a2),
                self.iz(params.inner_radius),
                g(a2),
                g(a1)
            )?;
        } else {
            writeln!(
                self.out,
                "{} {} {} {} {} 2 copy M 5 2 roll arc {op}",
                self.iz(params.radius),
                g(a1),
                g(a2),
                self.ix(x),
                self.iy(y)
            )?;
        }

        Ok(())
    }

    /// Draw a pie wedge around `(x, y)`.
    pub fn wedge(&mut self, x: f64, y: f64, params: &WedgeParams) -> Result<()> {
        let [a1, a2] = params.angles;
        let (r, ri) = (params.radius, params.inner_radius);
        let windshield = ri > 0.0;
        let status = params.status;

        if status.is_empty() && !windshield {
            writeln!(
                self.out,
                "{} {} {} {} {} Sw",
                self.iz(r),
                g(a1),
                g(a2),
                self.ix(x),
                self.iy(y)
            )?;
            return Ok(());
        }

        if params.fill {
            self.wedge_outline(x, y, params, "fs")?;
        }

        if !status.is_empty() {
            self.put_str("V PSL_spiderpen\n");
        }

        if status.contains(WedgeStatus::ARCS) {
            if params.dr > 0.0 {
                let first = if windshield {
                    (ri / params.dr).ceil() * params.dr
                } else {
                    params.dr
                };
                for radius in steps(first, params.dr, r) {
                    self.plot_arc(x, y, radius, a1, a2, PenFlags::MOVE | PenFlags::STROKE)?;
                }
            } else {
                self.plot_arc(x, y, r, a1, a2, PenFlags::MOVE | PenFlags::STROKE)?;
                if windshield {
                    self.plot_arc(x, y, ri, a1, a2, PenFlags::MOVE | PenFlags::STROKE)?;
                }
            }
        }

        if status.contains(WedgeStatus::RADIALS) {
            let at = |radius: f64, angle: f64| {
                let (s, c) = angle.to_radians().sin_cos();
                Point::new(x + radius * c, y + radius * s)
            };

            if params.da > 0.0 {
                let first = (a1 / params.da).ceil() * params.da;
                for angle in steps(first, params.da, a2) {
                    self.plot_line(&[at(ri, angle), at(r, angle)], PenFlags::MOVE | PenFlags::STROKE)?;
                }
            } else if windshield {
                for angle in [a1, a2] {
                    self.plot_line(&[at(ri, angle), at(r, angle)], PenFlags::MOVE | PenFlags::STROKE)?;
                }
            } else {
                let jaw = [at(r, a1), Point::new(x, y), at(r, a2)];
                self.plot_line(&jaw, PenFlags::MOVE | PenFlags::STROKE)?;
            }
        }

        if !status.is_empty() {
            self.put_str("U\n");
        }

        if params.outline {
            self.wedge_outline(x, y, params, "os")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Unit};

    fn run(params: &WedgeParams) -> String {
        let mut s = Session::in_memory(Config::default().with_unit(Unit::Inch));
        s.wedge(1.0, 1.0, params).unwrap();
        String::from_utf8(s.finish().unwrap()).unwrap()
    }

    #[test]
    fn plain_wedge() {
        let params = WedgeParams {
            radius: 1.0,
            angles: [10.0, 80.0],
            ..Default::default()
        };
        assert_eq!(run(&params), "1200 10 80 1200 1200 Sw\n");
    }

    #[test]
    fn windshield() {
        let params = WedgeParams {
            radius: 1.0,
            angles: [0.0, 90.0],
            inner_radius: 0.5,
            fill: true,
            outline: true,
            ..Default::default()
        };
        assert_eq!(
            run(&params),
            "V 1200 1200 T 0 0 1200 0 90 arc 0 0 600 90 0 arcn P fs U\n\
             V 1200 1200 T 0 0 1200 0 90 arc 0 0 600 90 0 arcn P os U\n"
        );
    }

    #[test]
    fn spider_web() {
        let params = WedgeParams {
            radius: 1.0,
            angles: [0.0, 90.0],
            status: WedgeStatus::ARCS | WedgeStatus::RADIALS,
            dr: 0.5,
            da: 45.0,
            ..Default::default()
        };
        let out = run(&params);
        assert!(out.starts_with("V PSL_spiderpen\n"));
        assert_eq!(out.matches(" arc S\n").count(), 2);
        // Radial lines at 0, 45 and 90 degrees.
        assert_eq!(out.matches("D\nS\n").count(), 3);
        assert!(out.ends_with("U\n"));
    }

    #[test]
    fn step_sequence() {
        let v: Vec<f64> = steps(0.5, 0.5, 1.5).collect();
        assert_eq!(v, [0.5, 1.0, 1.5]);
    }
}
