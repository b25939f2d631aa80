//! The graphics state and its setters.
//!
//! Every setter compares against the state last written and only emits an
//! operator when something changes.

use super::Session;
use super::plot::OriginMode;
use crate::color::{ColorFormat, Paint, Rgba, put_color};
use crate::error::{Error, Result};
use crate::font::Encoding;
use crate::num::g;
use crate::path::DevicePoint;
use crate::text::TextMode;
use crate::text::paragraph::FontDims;
use std::io::Write;

/// The transparency blend modes of PDF.
const TRANSPARENCY_MODES: [&str; 16] = [
    "Color",
    "ColorBurn",
    "ColorDodge",
    "Darken",
    "Difference",
    "Exclusion",
    "HardLight",
    "Hue",
    "Lighten",
    "Luminosity",
    "Multiply",
    "Normal",
    "Overlay",
    "Saturation",
    "Screen",
    "SoftLight",
];

/// The shape of open line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Square ends at the end points.
    #[default]
    Butt = 0,
    /// Semicircular ends.
    Round = 1,
    /// Square ends extended by half the line width.
    Square = 2,
}

/// The shape of corners between line segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Sharp corners.
    #[default]
    Miter = 0,
    /// Rounded corners.
    Round = 1,
    /// Cut off corners.
    Bevel = 2,
}

/// A dash pattern in points and its phase.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Dash {
    pub(crate) pattern: String,
    pub(crate) offset: f64,
}

/// Everything the output currently has in effect.
#[derive(Debug, Clone)]
pub(crate) struct GraphicsState {
    /// `None` until the first color is set in a plot.
    pub(crate) stroke: Option<Paint>,
    pub(crate) fill: Option<Paint>,
    pub(crate) outline: Option<bool>,
    /// The line width in points, negative when unknown.
    pub(crate) line_width: f64,
    pub(crate) line_cap: LineCap,
    pub(crate) line_join: LineJoin,
    /// The miter limit as an angle in degrees, 0 for the default.
    pub(crate) miter_limit: i32,
    pub(crate) dash: Option<Dash>,
    pub(crate) font: usize,
    /// The font size in points, 0 when it must be written again.
    pub(crate) font_size: f64,
    pub(crate) font_dims: FontDims,
    pub(crate) color_format: ColorFormat,
    pub(crate) text_mode: TextMode,
    pub(crate) transparency: f64,
    pub(crate) transparency_mode: String,
    /// The last absolute position in device units.
    pub(crate) point: DevicePoint,
    pub(crate) clip_depth: i32,
    /// Whether the header of a plot has been written.
    pub(crate) in_plot: bool,
    /// How the origin of the current plot was placed.
    pub(crate) origin: [OriginMode; 2],
    pub(crate) offset: [f64; 2],
    /// Whether the paragraph procedures have been written.
    pub(crate) text_init: bool,
    /// The text of the last text box, shown by a text call without text.
    pub(crate) last_text: String,
}

impl GraphicsState {
    pub(crate) fn new() -> Self {
        Self {
            stroke: None,
            fill: None,
            outline: None,
            line_width: -1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 0,
            dash: None,
            font: 0,
            font_size: 0.0,
            font_dims: FontDims::default(),
            color_format: ColorFormat::Significant,
            text_mode: TextMode::default(),
            transparency: 0.0,
            transparency_mode: "Normal".to_string(),
            point: DevicePoint::default(),
            clip_depth: 0,
            in_plot: false,
            origin: [OriginMode::Relative; 2],
            offset: [0.0; 2],
            text_init: false,
            last_text: String::new(),
        }
    }

    /// The transparency of the current stroke color.
    pub(crate) fn stroke_alpha(&self) -> f64 {
        self.stroke.map_or(0.0, |p| p.alpha())
    }
}

/// Format a dash pattern in points as a `setdash` call.
pub(crate) fn put_dash(pattern: Option<&str>, offset: f64, ip: impl Fn(f64) -> i32) -> String {
    let lengths: Vec<i32> = pattern
        .unwrap_or("")
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| ip(crate::num::atof(t)))
        .collect();

    if lengths.is_empty() {
        return "[] 0 B".to_string();
    }

    let lengths: Vec<String> = lengths.iter().map(i32::to_string).collect();
    format!("[{}] {} B", lengths.join(" "), ip(offset))
}

impl<W: Write> Session<W> {
    pub(crate) fn color(&self, paint: &Paint) -> String {
        put_color(
            paint,
            self.config.color_mode,
            self.state.color_format,
            &self.state.transparency_mode,
        )
    }

    /// Set the stroke color. [`Paint::NoChange`] and [`Paint::Skip`] leave
    /// the current color in place.
    pub fn set_color(&mut self, paint: Paint) -> Result<()> {
        if matches!(paint, Paint::NoChange | Paint::Skip) {
            return Ok(());
        }
        if self.state.stroke.is_some_and(|p| p.same(&paint)) {
            return Ok(());
        }

        // A color without transparency does not reset it by itself.
        if paint.alpha() == 0.0 && self.state.stroke_alpha() != 0.0 {
            self.out.extend_from_slice(b"1 /Normal PSL_transp ");
        }

        let color = self.color(&paint);
        writeln!(self.out, "{color}")?;
        self.state.stroke = Some(paint);

        Ok(())
    }

    /// Set the fill of polygons and symbols, and switch their outline on or
    /// off. [`Paint::Skip`] turns filling off, and an `outline` of `None`
    /// keeps the current outline setting.
    pub fn set_fill(&mut self, paint: Paint, outline: Option<bool>) -> Result<()> {
        let unchanged =
            paint == Paint::NoChange || self.state.fill.is_some_and(|p| p.same(&paint));

        if !unchanged {
            if paint == Paint::Skip {
                self.out.extend_from_slice(b"FQ\n");
            } else {
                let color = self.color(&paint);
                if paint.alpha() == 0.0 && self.state.stroke_alpha() != 0.0 {
                    writeln!(self.out, "{{{color} 1 /Normal PSL_transp}} FS")?;
                } else {
                    writeln!(self.out, "{{{color}}} FS")?;
                }
            }
            self.state.fill = Some(paint);
        }

        if let Some(outline) = outline
            && self.state.outline != Some(outline)
        {
            writeln!(self.out, "O{}", u8::from(outline))?;
            self.state.outline = Some(outline);
        }

        Ok(())
    }

    /// Set the line width in points.
    pub fn set_line_width(&mut self, width: f64) -> Result<()> {
        if width < 0.0 {
            lwarn!("selected line width is negative ({}), ignored", width);
            return Err(Error::BadWidth);
        }
        if width == self.state.line_width {
            return Ok(());
        }

        self.force_line_width(width)
    }

    /// Set the line width even if it is already in effect.
    pub(crate) fn force_line_width(&mut self, width: f64) -> Result<()> {
        if width < 0.0 {
            lwarn!("selected line width is negative ({}), ignored", width);
            return Err(Error::BadWidth);
        }

        writeln!(self.out, "{} W", self.ip(width))?;
        self.state.line_width = width;

        Ok(())
    }

    /// Set the shape of line ends.
    pub fn set_line_cap(&mut self, cap: LineCap) -> Result<()> {
        if cap != self.state.line_cap {
            if self.state.in_plot {
                writeln!(self.out, "{} setlinecap", cap as i32)?;
            }
            self.state.line_cap = cap;
        }

        Ok(())
    }

    /// Set the shape of line corners.
    pub fn set_line_join(&mut self, join: LineJoin) -> Result<()> {
        if join != self.state.line_join {
            if self.state.in_plot {
                writeln!(self.out, "{} setlinejoin", join as i32)?;
            }
            self.state.line_join = join;
        }

        Ok(())
    }

    /// Set the miter limit as the smallest angle in degrees that is still
    /// mitered. 0 selects the PostScript default.
    pub fn set_miter_limit(&mut self, limit: i32) -> Result<()> {
        if limit != self.state.miter_limit {
            if self.state.in_plot {
                let ratio = if limit == 0 {
                    10.0
                } else {
                    1.0 / (0.5 * limit as f64).to_radians().sin()
                };
                writeln!(self.out, "{} setmiterlimit", g(ratio))?;
            }
            self.state.miter_limit = limit;
        }

        Ok(())
    }

    /// Set the dash pattern, a list of lengths in points separated by
    /// spaces. `None` or an empty pattern draws solid lines.
    pub fn set_dash(&mut self, pattern: Option<&str>, offset: f64) -> Result<()> {
        let pattern = pattern.filter(|p| !p.is_empty());

        let Some(pattern) = pattern else {
            if self.state.dash.take().is_some() {
                self.out.extend_from_slice(b"[] 0 B\n");
            }
            return Ok(());
        };

        if let Some(dash) = &self.state.dash
            && dash.pattern == pattern
            && crate::color::eq(dash.offset, offset)
        {
            return Ok(());
        }

        let dash = put_dash(Some(pattern), offset, |p| self.ip(p));
        writeln!(self.out, "{dash}")?;
        self.state.dash = Some(Dash {
            pattern: pattern.to_string(),
            offset,
        });

        Ok(())
    }

    /// Select the current font. Out of range numbers select font 0.
    pub fn set_font(&mut self, font: usize) -> Result<()> {
        if font == self.state.font {
            return Ok(());
        }

        let font = if font >= self.fonts.len() {
            lwarn!(
                "selected font ({}) out of range (0-{}), reset to 0",
                font,
                self.fonts.len() - 1
            );
            0
        } else {
            font
        };

        self.state.font = font;
        self.state.font_size = 0.0;
        self.encode_font(font)
    }

    /// Set the relative size of sub- and superscripts and small caps, and
    /// the baseline shifts of sub- and superscripts. A value outside `0..1`
    /// is replaced by its default.
    pub fn set_font_dims(
        &mut self,
        subsup: f64,
        scaps: f64,
        sup_lc: f64,
        sup_uc: f64,
        sub_down: f64,
    ) -> Result<()> {
        let defaults = FontDims::default();
        let check = |value: f64, default: f64, what: &str| {
            if value <= 0.0 || value >= 1.0 {
                lwarn!(
                    "{} ({}) exceeds the allowable range, reset to {}",
                    what,
                    value,
                    default
                );
                default
            } else {
                value
            }
        };

        self.state.font_dims = FontDims {
            subsup: check(subsup, defaults.subsup, "size of sub- and superscripts"),
            scaps: check(scaps, defaults.scaps, "size of small caps"),
            sup_up_lc: check(sup_lc, defaults.sup_up_lc, "lower case superscript shift"),
            sup_up_uc: check(sup_uc, defaults.sup_up_uc, "upper case superscript shift"),
            sub_down: check(sub_down, defaults.sub_down, "subscript shift"),
        };

        Ok(())
    }

    /// Write color components with a fixed number of decimals in `1..=3`.
    pub fn set_format(&mut self, decimals: usize) -> Result<()> {
        if (1..=3).contains(&decimals) {
            self.state.color_format = ColorFormat::Fixed(decimals);
        } else {
            lwarn!("selected decimals for color out of range ({}), ignored", decimals);
        }

        Ok(())
    }

    /// Choose how `-` is rendered in text.
    pub fn set_text_mode(&mut self, mode: TextMode) -> Result<()> {
        self.state.text_mode = mode;

        Ok(())
    }

    /// Set the transparency of everything drawn next, from 0 (opaque) to 1.
    pub fn set_transparency(&mut self, transparency: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&transparency) {
            lwarn!("bad transparency value ({}), ignored", transparency);
            return Err(Error::BadRange);
        }
        if transparency == self.state.transparency {
            return Ok(());
        }

        writeln!(
            self.out,
            "{} /{} PSL_transp",
            g(1.0 - transparency),
            self.state.transparency_mode
        )?;
        self.state.transparency = transparency;

        Ok(())
    }

    /// Set the blend mode used with transparency, such as `Multiply`.
    pub fn set_transparency_mode(&mut self, mode: &str) -> Result<()> {
        if mode.is_empty() {
            return Ok(());
        }
        if !TRANSPARENCY_MODES.contains(&mode) {
            lwarn!("unknown transparency mode {}", mode);
        }

        self.state.transparency_mode = mode.to_string();

        Ok(())
    }

    /// Change the magnification, the page color and the encoding of the
    /// next plot. A zero scale keeps its current value.
    pub fn set_defaults(
        &mut self,
        scales: [f64; 2],
        page_color: Option<Rgba>,
        encoding: Encoding,
    ) -> Result<()> {
        for (m, s) in self.config.magnify.iter_mut().zip(scales) {
            if s != 0.0 {
                *m = s;
            }
        }
        if let Some(color) = page_color {
            self.config.page_color = color;
        }
        self.config.encoding = encoding;

        Ok(())
    }

    /// Move the origin to `(x, y)` and rotate by `angle` degrees. With
    /// `forward` the translation comes first.
    pub fn set_origin(&mut self, x: f64, y: f64, angle: f64, forward: bool) -> Result<()> {
        let rotate = !crate::color::eq(angle, 0.0);

        if !forward && rotate {
            writeln!(self.out, "{} R", g(angle))?;
        }
        if !crate::color::eq(x, 0.0) || !crate::color::eq(y, 0.0) {
            writeln!(self.out, "{} {} T", self.ix(x), self.iy(y))?;
        }
        if forward && rotate {
            writeln!(self.out, "{} R", g(angle))?;
        }

        Ok(())
    }

    /// Move the current point without drawing.
    pub fn set_current_point(&mut self, x: f64, y: f64) -> Result<()> {
        self.state.point = DevicePoint::new(self.ix(x), self.iy(y));
        writeln!(self.out, "{} {} M", self.state.point.x, self.state.point.y)?;

        Ok(())
    }

    /// Define `/name` as a length in user units.
    pub fn def_units(&mut self, name: &str, value: f64) -> Result<()> {
        writeln!(self.out, "/{name} {} def", self.iz(value))?;

        Ok(())
    }

    /// Define `/name` as a length in points.
    pub fn def_points(&mut self, name: &str, value: f64) -> Result<()> {
        writeln!(self.out, "/{name} {} def", self.ip(value))?;

        Ok(())
    }

    /// Define `/name` as an integer.
    pub fn def_integer(&mut self, name: &str, value: i32) -> Result<()> {
        writeln!(self.out, "/{name} {value} def")?;

        Ok(())
    }

    /// Define `/name` as a procedure that sets a complete pen.
    pub fn def_pen(
        &mut self,
        name: &str,
        width: f64,
        dash: Option<&str>,
        offset: f64,
        color: Paint,
    ) -> Result<()> {
        let color = self.color(&color);
        let dash = put_dash(dash, offset, |p| self.ip(p));
        writeln!(self.out, "/{name} {{{} W {color} {dash}}} def", self.ip(width))?;

        Ok(())
    }

    /// Define `/name` as a procedure that sets a color.
    pub fn def_color(&mut self, name: &str, color: Paint) -> Result<()> {
        let color = self.color(&color);
        writeln!(self.out, "/{name} {{{color}}} def")?;

        Ok(())
    }
}
