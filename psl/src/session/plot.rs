//! Plot lifecycle: the document header, the page setup and the trailer.

use super::Session;
use super::state::{LineCap, LineJoin};
use crate::color::{Paint, Rgba};
use crate::error::{Error, Result};
use crate::num::g;
use crate::resources;
use crate::text::paragraph::FontDims;
use crate::transform::Transform;
use std::io::Write;

/// The DSC language level of the output.
const LANGUAGE_LEVEL: u32 = 2;

/// Where the origin of a new plot is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginMode {
    /// Relative to the previous origin.
    #[default]
    Relative,
    /// Relative to the previous origin, and moved back by
    /// [`Session::end_plot`].
    RelativeReset,
    /// Relative to the lower left corner of the page.
    Page,
    /// Relative to the center of the page.
    Center,
}

/// How a plot is started.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Portrait rather than landscape orientation.
    pub portrait: bool,
    /// Continue the document of a previous plot instead of starting one.
    pub overlay: bool,
    /// Write the font encoding again, after the encoding was changed with
    /// [`Session::set_defaults`]. Only used by overlays.
    pub change_encoding: bool,
    /// How the origin is placed in x and y.
    pub origin: [OriginMode; 2],
    /// The offset of the origin in user units.
    pub offset: [f64; 2],
    /// The paper width and height in points. A negative width asks for
    /// manual paper feed.
    pub page_size: [f64; 2],
    /// The document title.
    pub title: Option<String>,
    /// Fonts listed as needed resources.
    pub fonts: Vec<usize>,
    /// The number of copies to print.
    pub copies: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            portrait: true,
            overlay: false,
            change_encoding: false,
            origin: [OriginMode::Relative; 2],
            offset: [0.0; 2],
            page_size: [612.0, 792.0],
            title: None,
            fonts: Vec::new(),
            copies: 1,
        }
    }
}

impl<W: Write> Session<W> {
    /// Start a plot. A plot that is not an overlay begins a new document
    /// with the complete header and procedure library.
    pub fn begin_plot(&mut self, options: &PlotOptions) -> Result<()> {
        let [width, height] = options.page_size.map(f64::abs);
        let manual_feed = options.page_size[0] < 0.0;
        let landscape = !(options.overlay || options.portrait);

        self.transform = Transform::new(self.config.unit);
        self.state.origin = options.origin;
        self.state.offset = options.offset;
        self.state.line_width = -1.0;
        self.state.stroke = None;
        self.state.fill = None;
        self.state.outline = None;
        self.state.font_size = 0.0;
        self.state.font_dims = FontDims::default();
        self.set_transparency_mode("Normal")?;

        linfo!(
            "begin {} in {} of {}x{} points",
            if options.overlay { "overlay" } else { "plot" },
            if landscape { "landscape" } else { "portrait" },
            width,
            height
        );

        if options.overlay {
            if options.change_encoding {
                let encoding = self.config.encoding;
                self.annotate(format_args!(
                    "Encode fonts using selected character set: {}\n",
                    encoding.name()
                ))?;
                self.out
                    .extend_from_slice(resources::encoding(encoding).as_bytes());
                self.def_font_encoding()?;
            }
        } else {
            self.write_header(options, width, height, landscape, manual_feed)?;
        }

        self.state.in_plot = true;
        self.set_color(Paint::Color(Rgba::BLACK))?;
        self.set_fill(Paint::Skip, Some(false))?;

        if self.config.comments {
            self.put_str("% Set plot origin:\n");
        }
        for (i, axis) in ["x", "y"].into_iter().enumerate() {
            let offset = self.iz(options.offset[i]);
            match options.origin[i] {
                OriginMode::Page => write!(self.out, "{offset} PSL_{axis}orig sub ")?,
                OriginMode::Center => write!(
                    self.out,
                    "{offset} PSL_{axis}orig sub PSL_page_{axis}size 2 div add "
                )?,
                OriginMode::Relative | OriginMode::RelativeReset => {
                    write!(self.out, "{offset} ")?;
                }
            }
        }
        self.put_str("TM\n");

        Ok(())
    }

    fn write_header(
        &mut self,
        options: &PlotOptions,
        width: f64,
        height: f64,
        landscape: bool,
        manual_feed: bool,
    ) -> Result<()> {
        self.fonts.reset_encoded();
        self.state.text_init = false;

        self.put_str("%!PS-Adobe-3.0\n");
        writeln!(
            self.out,
            "%%BoundingBox: 0 0 {} {}",
            width.round() as i64,
            height.round() as i64
        )?;
        // Room for a tighter box written in place later.
        writeln!(
            self.out,
            "%%HiResBoundingBox: 0 0 {width:.4} {height:.4}             "
        )?;
        match &options.title {
            Some(title) => writeln!(self.out, "%%Title: {title}\n%%Creator: PSL")?,
            None => writeln!(
                self.out,
                "%%Title: PSL v{} document\n%%Creator: PSL",
                env!("CARGO_PKG_VERSION")
            )?,
        }
        writeln!(
            self.out,
            "%%For: {}",
            self.config.user_name.as_deref().unwrap_or("unknown")
        )?;
        if !options.fonts.is_empty() {
            self.put_str("%%DocumentNeededResources: font");
            for &font in options.fonts.iter().filter(|&&f| f < self.fonts.len()) {
                write!(self.out, " {}", self.fonts.name(font))?;
            }
            self.put_str("\n");
        }
        writeln!(
            self.out,
            "%%CreationDate: {}",
            self.config.creation_date.as_deref().unwrap_or("")
        )?;
        writeln!(self.out, "%%LanguageLevel: {LANGUAGE_LEVEL}")?;
        self.put_str("%%DocumentData: Clean7Bit\n");
        writeln!(
            self.out,
            "%%Orientation: {}",
            if landscape { "Landscape" } else { "Portrait" }
        )?;
        self.put_str("%%Pages: 1\n%%EndComments\n\n");

        self.put_str("%%BeginProlog\n");
        resources::bulkcopy(resources::PROLOGUE, self.config.comments, &mut self.out);
        self.out
            .extend_from_slice(resources::encoding(self.config.encoding).as_bytes());
        self.def_font_encoding()?;
        self.put_str("%%EndProlog\n\n");

        self.put_str("%%BeginSetup\n");
        self.put_str("/PSLevel /languagelevel where {pop languagelevel} {1} ifelse def\n");
        self.put_str("PSLevel 1 gt { << /WhiteIsOpaque true >> setpagedevice } if\n");
        if manual_feed {
            self.put_str("PSLevel 1 gt { << /ManualFeed true >> setpagedevice } if\n");
        } else if width > 0.0 && height > 0.0 {
            writeln!(
                self.out,
                "PSLevel 1 gt {{ << /PageSize [{} {}] /ImagingBBox null >> setpagedevice }} if",
                g(width),
                g(height)
            )?;
        }
        if options.copies > 1 {
            writeln!(self.out, "/#copies {} def", options.copies)?;
        }
        self.put_str("%%EndSetup\n\n");
        self.put_str("%%Page: 1 1\n\n");

        self.put_str("%%BeginPageSetup\n");
        let scale = 1.0 / self.transform.dots_per_point();
        self.annotate(format_args!("Init coordinate system and scales\n"))?;
        self.annotate(format_args!(
            "Scale initialized to {}, so 1 {} equals {} Postscript units\n",
            g(scale),
            self.config.unit.name(),
            g(self.transform.dots_per_unit())
        ))?;
        self.put_str("V ");
        if landscape {
            write!(self.out, "{} 0 T 90 R ", g(width))?;
        }
        let [mx, my] = self.config.magnify;
        writeln!(self.out, "{} {} scale", g(mx * scale), g(my * scale))?;
        self.put_str("%%EndPageSetup\n\n");

        let page = self.config.page_color;
        if !(page.is_gray() && crate::color::eq(page.r, 1.0)) {
            let color = self.color(&Paint::Color(page));
            writeln!(
                self.out,
                "systemdict /PSL_no_pagefill known not {{clippath {color} F N}} if"
            )?;
        }
        self.annotate(format_args!("End of PSL header\n"))?;

        let (xsize, ysize) = if landscape {
            (height, width)
        } else {
            (width, height)
        };
        self.def_points("PSL_page_xsize", xsize)?;
        self.def_points("PSL_page_ysize", ysize)?;

        self.put_str("/PSL_plot_completion {} def\n");
        self.put_str("/PSL_movie_label_completion {} def\n");
        self.put_str("/PSL_movie_prog_indicator_completion {} def\n");

        // Only settings that differ from the PostScript defaults are written.
        let (cap, join, miter) = (
            self.state.line_cap,
            self.state.line_join,
            self.state.miter_limit,
        );
        self.state.line_cap = LineCap::Butt;
        self.state.line_join = LineJoin::Miter;
        self.state.miter_limit = 0;
        self.state.in_plot = true;
        self.set_line_cap(cap)?;
        self.set_line_join(join)?;
        self.set_miter_limit(miter)?;

        self.put_str("%PSL_End_Header\ngsave\n");

        Ok(())
    }

    /// Finish the current plot. With `last_page` the page is shown and the
    /// document trailer is written; otherwise later overlays can continue
    /// the document. All pending output is flushed to the sink.
    pub fn end_plot(&mut self, last_page: bool) -> Result<()> {
        if !self.state.in_plot {
            lwarn!("end of plot requested without a plot in progress");
            return Err(Error::NoSession);
        }

        self.pattern_cleanup()?;
        self.set_dash(None, 0.0)?;
        if self.state.stroke_alpha() != 0.0 {
            self.put_str("1 /Normal PSL_transp\n");
        }

        if last_page {
            self.put_str("\ngrestore\n");
            self.annotate(format_args!(
                "Run PSL movie label completion function, if defined\n"
            ))?;
            self.put_str(
                "PSL_movie_label_completion /PSL_movie_label_completion {} def\n",
            );
            self.annotate(format_args!(
                "Run PSL movie progress indicator completion function, if defined\n"
            ))?;
            self.put_str(
                "PSL_movie_prog_indicator_completion /PSL_movie_prog_indicator_completion {} def\n",
            );
            self.put_str("%PSL_Begin_Trailer\n%%PageTrailer\n");
            self.annotate(format_args!("Reset transformations and call showpage\n"))?;
            self.put_str("U\nshowpage\n\n%%Trailer\n\nend\n%%EOF\n");
        } else if self.state.origin.contains(&OriginMode::RelativeReset) {
            if self.config.comments {
                self.put_str("% Reset plot origin:\n");
            }
            let [x, y] = [0, 1].map(|i| {
                if self.state.origin[i] == OriginMode::RelativeReset {
                    -self.iz(self.state.offset[i])
                } else {
                    0
                }
            });
            writeln!(self.out, "{x} {y} TM")?;
        }

        self.state.in_plot = false;
        ldebug!("end of plot, {} bytes pending", self.out.len());

        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Unit};

    fn output(s: Session<Vec<u8>>) -> String {
        String::from_utf8(s.finish().unwrap()).unwrap()
    }

    #[test]
    fn document_structure() {
        let mut s = Session::in_memory(
            Config::default()
                .with_unit(Unit::Inch)
                .with_user_name("tester")
                .with_creation_date("Fri Oct 16 12:00:00 2026"),
        );
        let options = PlotOptions {
            offset: [1.0, 1.0],
            ..PlotOptions::default()
        };
        s.begin_plot(&options).unwrap();
        s.end_plot(true).unwrap();
        let out = output(s);

        assert!(out.starts_with(
            "%!PS-Adobe-3.0\n%%BoundingBox: 0 0 612 792\n\
             %%HiResBoundingBox: 0 0 612.0000 792.0000             \n"
        ));
        assert!(out.contains("%%For: tester\n%%CreationDate: Fri Oct 16 12:00:00 2026\n"));
        assert!(out.contains("%%Orientation: Portrait\n"));
        assert!(out.contains("V 0.06 0.06 scale\n%%EndPageSetup\n"));
        assert!(out.contains("/PSL_page_xsize 10200 def\n/PSL_page_ysize 13200 def\n"));
        assert!(out.contains("%PSL_End_Header\ngsave\n0 A\nFQ\nO0\n1200 1200 TM\n"));
        assert!(out.contains("/F0 {/Helvetica Y}!\n"));
        assert!(out.ends_with("U\nshowpage\n\n%%Trailer\n\nend\n%%EOF\n"));
    }

    #[test]
    fn landscape_and_page_color() {
        let mut s = Session::in_memory(
            Config::default().with_page_color(Rgba::new(1.0, 0.0, 0.0)),
        );
        let options = PlotOptions {
            portrait: false,
            ..PlotOptions::default()
        };
        s.begin_plot(&options).unwrap();
        let out = output(s);
        assert!(out.contains("%%Orientation: Landscape\n"));
        assert!(out.contains("V 612 0 T 90 R 0.06 0.06 scale\n"));
        assert!(out.contains("systemdict /PSL_no_pagefill known not {clippath 1 0 0 C F N} if\n"));
    }

    #[test]
    fn overlays_reset_their_origin() {
        let mut s = Session::in_memory(Config::default().with_unit(Unit::Inch));
        let options = PlotOptions {
            overlay: true,
            origin: [OriginMode::RelativeReset, OriginMode::Center],
            offset: [1.0, 0.5],
            ..PlotOptions::default()
        };
        s.begin_plot(&options).unwrap();
        s.end_plot(false).unwrap();
        assert_eq!(
            output(s),
            "0 A\nFQ\nO0\n1200 600 PSL_yorig sub PSL_page_ysize 2 div add TM\n-1200 0 TM\n"
        );
    }

    #[test]
    fn end_without_plot() {
        let mut s = Session::in_memory(Config::default());
        assert_eq!(s.end_plot(true), Err(Error::NoSession));
    }
}
