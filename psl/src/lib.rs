/*!
A PostScript emission engine for vector plots, images and typeset text.

A [`Session`] writes one PostScript document. Every drawing call appends
PostScript to the session buffer, in device units of 1/1200 inch, and the
buffer is handed to the output sink at the end of each plot.

```
use psl::{Config, PlotOptions, Session, Unit};

let mut session = Session::in_memory(Config::default().with_unit(Unit::Inch));
session.begin_plot(&PlotOptions::default())?;
session.plot_text(1.0, 1.0, 12.0, Some("Hello"), 0.0, 1, 0)?;
session.end_plot(true)?;

let document = session.finish()?;
assert!(document.starts_with(b"%!PS-Adobe-3.0\n"));
# Ok::<(), psl::Error>(())
```

Images are written as ASCII85 or hex encoded streams, compressed with
run-length, LZW or DEFLATE coding. The codecs are available on their own
in [`codec`].

## Cargo features
- `deflate` (default): DEFLATE compression of images via `flate2`.
- `logging`: forward warnings and diagnostics to the `log` crate.

## Safety
This crate forbids unsafe code via a crate-level attribute.
*/

#![forbid(unsafe_code)]

#[macro_use]
mod log;

mod bezier;
pub mod codec;
mod color;
mod config;
mod error;
mod font;
mod geometry;
mod num;
mod path;
mod resources;
mod session;
mod text;
mod transform;

pub use bezier::fit_bezier;
pub use color::{Paint, Rgba};
pub use config::{ColorMode, Compression, Config, CustomFont, Transport, Unit, Verbosity};
pub use error::{Error, Result};
pub use font::Encoding;
pub use geometry::{
    HeadKind, MarkKind, MathArcParams, Symbol, VectorParams, VectorStatus, VectorV4Params,
    WedgeParams, WedgeStatus,
};
pub use kurbo::Point;
pub use path::{
    Collinear, DevicePoint, FarPoint, PathSimplifier, PenFlags, SimplifyPolicy, simplify_path,
};
pub use session::{
    BoxShape, ClipFlags, ColorImage, EpsInfo, ImageSource, LineCap, LineJoin, MaskColor,
    OriginMode, PlotOptions, RasterImage, Session, load_eps, load_raster,
};
pub use text::TextMode;
pub use transform::Transform;
