//! The drawing session.
//!
//! A [`Session`] owns the output sink and all state of the document being
//! written. Drawing operations append PostScript to an internal buffer,
//! which is handed to the sink at the end of every page and when the session
//! is finished.

mod draw;
mod image;
mod plot;
mod raster;
mod state;
mod text;

pub use draw::ClipFlags;
pub use image::{ColorImage, EpsInfo, ImageSource, MaskColor, load_eps};
pub use plot::{OriginMode, PlotOptions};
pub use raster::{RasterImage, load_raster};
pub use state::{LineCap, LineJoin};
pub use text::BoxShape;

use crate::codec::stream::StreamOptions;
use crate::config::{Config, Verbosity};
use crate::error::Result;
use crate::font::FontTable;
use crate::transform::Transform;
use core::fmt;
use image::PatternTable;
use state::GraphicsState;
use std::io::Write;

/// A PostScript document being written to `W`.
pub struct Session<W: Write> {
    sink: W,
    pub(crate) out: Vec<u8>,
    pub(crate) config: Config,
    pub(crate) transform: Transform,
    pub(crate) fonts: FontTable,
    pub(crate) state: GraphicsState,
    pub(crate) patterns: PatternTable,
}

impl Session<Vec<u8>> {
    /// Create a session that writes into memory. The document is returned
    /// by [`Session::finish`].
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Vec::new())
    }
}

impl<W: Write> Session<W> {
    /// Create a new session writing to `sink`.
    pub fn new(config: Config, sink: W) -> Self {
        let transform = Transform::new(config.unit);
        let fonts = FontTable::new(&config.fonts);
        let patterns = PatternTable::new();

        ldebug!(
            "new session with unit {}, {} fonts",
            config.unit.name(),
            fonts.len()
        );

        Self {
            sink,
            out: Vec::with_capacity(64 * 1024),
            state: GraphicsState::new(),
            config,
            transform,
            fonts,
            patterns,
        }
    }

    /// Write all pending output to the sink and return it.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    /// Write all pending output to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.sink.write_all(&self.out)?;
        self.out.clear();
        self.sink.flush()?;

        Ok(())
    }

    /// The configuration of this session.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The mapping from user coordinates to device units.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The cap height of a font relative to its size, if the font exists.
    pub fn font_height(&self, font: usize) -> Option<f64> {
        (font < self.fonts.len()).then(|| self.fonts.height(font))
    }

    /// The number of fonts known to this session.
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub(crate) fn ix(&self, x: f64) -> i32 {
        self.transform.to_device_x(x)
    }

    pub(crate) fn iy(&self, y: f64) -> i32 {
        self.transform.to_device_y(y)
    }

    pub(crate) fn iz(&self, z: f64) -> i32 {
        self.transform.to_device_length(z)
    }

    pub(crate) fn ip(&self, p: f64) -> i32 {
        self.transform.to_device_points(p)
    }

    pub(crate) fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            color_mode: self.config.color_mode,
            compression: self.config.compression,
            deflate_level: self.config.deflate_level,
            transport: self.config.transport,
        }
    }

    /// Write a comment block if comments are enabled.
    pub(crate) fn annotate(&mut self, args: fmt::Arguments<'_>) -> Result<()> {
        if self.config.comments {
            self.out.extend_from_slice(b"%\n% ");
            self.out.write_fmt(args)?;
            self.out.extend_from_slice(b"%\n");
        }

        Ok(())
    }

    /// Write a comment block if comments are enabled. `text` should end with
    /// a newline.
    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.annotate(format_args!("{text}"))
    }

    /// Copy `text` to the output followed by a newline.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        self.out.extend_from_slice(text.as_bytes());
        self.out.push(b'\n');

        Ok(())
    }

    /// Start a named group of objects.
    pub fn begin_layer(&mut self, layer: i32) -> Result<()> {
        writeln!(self.out, "%%BeginObject PSL_Layer_{layer}")?;

        Ok(())
    }

    /// End the group started by [`Session::begin_layer`].
    pub fn end_layer(&mut self) -> Result<()> {
        self.out.extend_from_slice(b"%%EndObject\n");

        Ok(())
    }

    /// Report a message at `level` if the session is verbose enough.
    pub fn message(&self, level: Verbosity, text: &str) -> Result<()> {
        if level > self.config.verbosity {
            return Ok(());
        }

        let text = text.trim_end();
        match level {
            Verbosity::Quiet => {}
            Verbosity::Fatal | Verbosity::Normal => lwarn!("{}", text),
            Verbosity::Verbose => linfo!("{}", text),
            Verbosity::Debug => ltrace!("{}", text),
        }

        Ok(())
    }

    /// Map the data window `x0..x1`, `y0..y1` onto the rectangle of the
    /// given size at `(llx, lly)`. Coordinates of later calls are data
    /// coordinates until [`Session::end_axes`].
    pub fn begin_axes(
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
        self.transform
            .begin_axes(llx, lly, width, height, x0, y0, x1, y1)
    }

    /// Return to plain user coordinates.
    pub fn end_axes(&mut self) -> Result<()> {
        self.transform.end_axes();

        Ok(())
    }
}
