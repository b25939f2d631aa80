//! Bitmaps, color images, EPS inclusion and image patterns.

use super::Session;
use crate::codec::bitpack::pack_bits;
use crate::codec::colormap::index_colors;
use crate::codec::stream::{StreamKind, StreamOptions, stream_dump};
use crate::color::{Paint, Rgba, gray_byte, rgb_to_cmyk_bytes, u255};
use crate::config::{ColorMode, Transport};
use crate::error::{Error, Result};
use crate::num::g;
use crate::resources;
use crate::transform::DOTS_PER_INCH;
use std::io::Write;

/// The number of predefined patterns, and the number of user images that
/// can be registered.
pub(crate) const N_PATTERNS: usize = 90;

const COLORSPACE: [&str; 3] = ["Gray", "RGB", "CMYK"];
const DECODE: [&str; 3] = ["0 1", "0 1 0 1 0 1", "0 1 0 1 0 1 0 1"];

#[derive(Debug, Clone, Default)]
struct PatternSlot {
    defined: bool,
    width: usize,
    height: usize,
    depth: u32,
    /// The resolution the pattern procedure was written for, if any.
    dpi: Option<u32>,
    colors: Option<(Paint, Paint)>,
}

/// The predefined patterns and registered user images of a session.
#[derive(Debug, Clone)]
pub(crate) struct PatternTable {
    slots: Vec<PatternSlot>,
    user_names: Vec<String>,
}

impl PatternTable {
    pub(crate) fn new() -> Self {
        Self {
            slots: vec![PatternSlot::default(); 2 * N_PATTERNS],
            user_names: Vec::new(),
        }
    }

    fn any_defined(&self) -> bool {
        self.slots.iter().any(|s| s.defined)
    }
}

/// The bitmap behind a pattern fill.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// One of the predefined 64 by 64 pixel patterns, numbered from 1 to 90.
    Predefined(usize),
    /// A named user image. The name identifies the image across calls.
    User {
        /// The name of the image.
        name: &'a str,
        /// The pixel data, rows starting on byte boundaries.
        data: &'a [u8],
        /// The width in pixels.
        width: usize,
        /// The height in pixels.
        height: usize,
        /// The bits per pixel: 1, 8 or 24.
        depth: u32,
    },
}

/// A color that a color image treats as transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskColor {
    /// A gray level of an 8-bit image.
    Gray(u8),
    /// A color of a 24-bit image.
    Rgb([u8; 3]),
}

/// A gray or color image.
#[derive(Debug, Clone, Copy)]
pub struct ColorImage<'a> {
    /// The pixel data, rows starting on byte boundaries.
    pub data: &'a [u8],
    /// The width in pixels.
    pub width: usize,
    /// The height in pixels.
    pub height: usize,
    /// The bits per pixel: 1, 2, 4, 8 or 24.
    pub bits: u32,
    /// Ask the interpreter to smooth the image when scaling it up.
    pub interpolate: bool,
    /// A color that is left transparent.
    pub mask: Option<MaskColor>,
}

/// The bounding box of an EPS file in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsInfo {
    /// The left edge.
    pub llx: f64,
    /// The bottom edge.
    pub lly: f64,
    /// The right edge.
    pub trx: f64,
    /// The top edge.
    pub try_: f64,
}

impl EpsInfo {
    fn width(&self) -> f64 {
        self.trx - self.llx
    }

    fn height(&self) -> f64 {
        self.try_ - self.lly
    }
}

impl Default for EpsInfo {
    fn default() -> Self {
        Self {
            llx: 0.0,
            lly: 0.0,
            trx: 720.0,
            try_: 720.0,
        }
    }
}

fn parse_numbers<const N: usize>(text: &str) -> Option<[f64; N]> {
    let mut values = [0.0; N];
    let mut tokens = text.split_ascii_whitespace();
    for v in &mut values {
        *v = tokens.next()?.parse().ok()?;
    }

    Some(values)
}

/// Check that `data` is PostScript and find its bounding box.
///
/// The high resolution bounding box is used when it directly follows the
/// plain one. Comments inside embedded documents are skipped, and a file
/// without a usable bounding box gets `0 0 720 720`.
pub fn load_eps(data: &[u8]) -> Result<EpsInfo> {
    if !data.starts_with(b"%!PS") {
        lwarn!("could not find the EPS magic key");
        return Err(Error::ReadFailure);
    }

    let text = String::from_utf8_lossy(data);
    let mut lines = text.lines();
    let mut nested = 0;

    while let Some(line) = lines.next() {
        if line.starts_with("%%Begin") {
            nested += 1;
        } else if nested > 0 && line.starts_with("%%End") {
            nested -= 1;
        } else if nested == 0
            && let Some(rest) = line.strip_prefix("%%BoundingBox:")
            && !rest.contains("(atend)")
        {
            let Some([llx, lly, trx, try_]) = parse_numbers::<4>(rest) else {
                lwarn!("malformed BoundingBox, defaults assumed");
                return Ok(EpsInfo::default());
            };
            let mut info = EpsInfo { llx, lly, trx, try_ };

            if let Some(next) = lines.next()
                && let Some(rest) = next.strip_prefix("%%HiResBoundingBox:")
                && !rest.contains("(atend)")
                && let Some([llx, lly, trx, try_]) = parse_numbers::<4>(rest)
            {
                info = EpsInfo { llx, lly, trx, try_ };
            }

            return Ok(info);
        }
    }

    lwarn!("no proper BoundingBox, defaults assumed: 0 0 720 720");
    Ok(EpsInfo::default())
}

/// Move `(x, y)` from the justification point to the lower left corner of a
/// box of `width` by `height`.
pub(crate) fn justify_origin(x: f64, y: f64, width: f64, height: f64, justify: i32) -> (f64, f64) {
    if justify > 1 {
        (
            x - 0.5 * ((justify + 3) % 4) as f64 * width,
            y - 0.5 * (justify / 4) as f64 * height,
        )
    } else {
        (x, y)
    }
}

/// Fill in a zero size from the other one and the aspect ratio.
fn keep_aspect(mut xsize: f64, mut ysize: f64, width: f64, height: f64) -> (f64, f64) {
    if crate::color::eq(xsize, 0.0) {
        xsize = ysize * width / height;
    }
    if crate::color::eq(ysize, 0.0) {
        ysize = xsize * height / width;
    }

    (xsize, ysize)
}

fn opaque(paint: Paint) -> Option<Rgba> {
    match paint {
        Paint::Color(c) => Some(c),
        _ => None,
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

impl<W: Write> Session<W> {
    /// The bytes of a single color in the indexed color space of a bitmap.
    fn palette_entry(&self, c: &Rgba) -> (&'static str, String) {
        if c.is_gray() {
            ("Gray", hex_bytes(&[u255(c.r)]))
        } else {
            match self.config.color_mode {
                ColorMode::Gray => ("Gray", hex_bytes(&[u255(c.yiq())])),
                ColorMode::Cmyk => ("CMYK", hex_bytes(&c.to_cmyk().map(u255))),
                _ => ("RGB", hex_bytes(&[u255(c.r), u255(c.g), u255(c.b)])),
            }
        }
    }

    /// Write the indexed color space of a 1-bit image. Returns whether the
    /// bits must be inverted.
    fn bitimage_colormap(&mut self, fg: Option<Rgba>, bg: Option<Rgba>) -> Result<bool> {
        self.put_str(" [/Indexed /Device");

        let invert = match (fg, bg) {
            (Some(f), Some(b)) => {
                if f.is_gray() && b.is_gray() {
                    write!(self.out, "Gray 1 <{}>", hex_bytes(&[u255(f.r), u255(b.r)]))?;
                } else {
                    let (space, f) = match self.config.color_mode {
                        ColorMode::Gray => ("Gray", hex_bytes(&[u255(f.yiq())])),
                        ColorMode::Cmyk => ("CMYK", hex_bytes(&f.to_cmyk().map(u255))),
                        _ => ("RGB", hex_bytes(&[u255(f.r), u255(f.g), u255(f.b)])),
                    };
                    let (_, b) = match self.config.color_mode {
                        ColorMode::Gray => ("Gray", hex_bytes(&[u255(b.yiq())])),
                        ColorMode::Cmyk => ("CMYK", hex_bytes(&b.to_cmyk().map(u255))),
                        _ => ("RGB", hex_bytes(&[u255(b.r), u255(b.g), u255(b.b)])),
                    };
                    write!(self.out, "{space} 1 <{f}{b}>")?;
                }
                false
            }
            (Some(c), None) | (None, Some(c)) => {
                let (space, bytes) = self.palette_entry(&c);
                write!(self.out, "{space} 0 <{bytes}>")?;
                fg.is_none()
            }
            (None, None) => false,
        };

        self.put_str("] setcolorspace");

        Ok(invert)
    }

    /// Draw a 1-bit image of `nx` by `ny` pixels. Set bits are painted with
    /// `fg` and clear bits with `bg`; a paint that is not a color leaves
    /// those bits transparent. A zero size follows from the other size and
    /// the aspect ratio.
    pub fn plot_bit_image(
        &mut self,
        x: f64,
        y: f64,
        xsize: f64,
        ysize: f64,
        justify: i32,
        data: &[u8],
        nx: usize,
        ny: usize,
        fg: Paint,
        bg: Paint,
    ) -> Result<()> {
        if nx == 0 || ny == 0 || data.len() < nx.div_ceil(8) * ny {
            lwarn!("bit image of {} by {} pixels has too little data", nx, ny);
            return Err(Error::BadSize);
        }

        let (fg, bg) = (opaque(fg), opaque(bg));
        if fg.is_none() && bg.is_none() {
            lwarn!("bit image with two transparent colors is invisible, skipped");
            return Ok(());
        }

        let (xsize, ysize) = keep_aspect(xsize, ysize, nx as f64, ny as f64);
        let (x, y) = justify_origin(x, y, xsize, ysize, justify);

        self.annotate(format_args!("Start of 1-bit image\n"))?;
        write!(
            self.out,
            "V N {} {} T {} {} scale",
            self.ix(x),
            self.iy(y),
            self.iz(xsize),
            self.iz(ysize)
        )?;
        let invert = u8::from(self.bitimage_colormap(fg, bg)?);
        write!(self.out, "\n<< /ImageType 1 /Decode [{} {}] ", invert, 1 - invert)?;

        let kind = if fg.is_none() || bg.is_none() {
            StreamKind::ImageMask
        } else {
            StreamKind::Image
        };
        let options = self.stream_options();
        stream_dump(&mut self.out, data, nx, ny, 1, &options, kind);

        self.put_str("U\n");
        self.annotate(format_args!("End of 1-bit image\n"))
    }

    /// Draw a gray or color image. 24-bit images with few colors are
    /// written as indexed images of the smallest sufficient depth.
    pub fn plot_color_image(
        &mut self,
        x: f64,
        y: f64,
        xsize: f64,
        ysize: f64,
        justify: i32,
        image: &ColorImage<'_>,
    ) -> Result<()> {
        let (nx, ny, bits) = (image.width, image.height, image.bits);
        if !matches!(bits, 1 | 2 | 4 | 8 | 24) {
            lwarn!("images with {} bits per pixel are not supported", bits);
            return Err(Error::BadValue);
        }
        if nx == 0 || ny == 0 || image.data.len() < (bits as usize * nx).div_ceil(8) * ny {
            lwarn!("image of {} by {} pixels has too little data", nx, ny);
            return Err(Error::BadSize);
        }

        // A gray mask of a color image is the gray color.
        let mask = match (image.mask, bits) {
            (Some(MaskColor::Gray(v)), 24) => Some(MaskColor::Rgb([v; 3])),
            (Some(MaskColor::Rgb(_)), _) if bits != 24 => {
                lwarn!("a color mask needs a 24-bit image, not {} bits", bits);
                return Err(Error::BadValue);
            }
            (Some(MaskColor::Gray(v)), _) if bits < 8 && u32::from(v) >= 1 << bits => {
                lwarn!("mask level {} does not fit in {} bits", v, bits);
                return Err(Error::BadValue);
            }
            (mask, _) => mask,
        };

        let (xsize, ysize) = keep_aspect(xsize, ysize, nx as f64, ny as f64);
        let (x, y) = justify_origin(x, y, xsize, ysize, justify);

        let mode = self.config.color_mode;
        let id = if mode == ColorMode::Gray || bits < 24 {
            0
        } else if mode == ColorMode::Cmyk {
            2
        } else {
            1
        };
        let space = COLORSPACE[id];
        let interpolate = if image.interpolate { " /Interpolate true" } else { "" };

        let mask_rgb = match mask {
            Some(MaskColor::Rgb(c)) => Some(c),
            _ => None,
        };
        let indexed = (mode != ColorMode::Gray && bits == 24)
            .then(|| index_colors(image.data, nx * ny, mask_rgb))
            .flatten();

        let (ox, oy, sx, sy) = (self.ix(x), self.iy(y), self.iz(xsize), self.iz(ysize));

        if let Some(indexed) = indexed {
            let ncolors = indexed.palette.len();
            let mut indices = indexed.indices;
            let depth = pack_bits(&mut indices, nx, ny, ncolors);

            self.annotate(format_args!("Start of indexed {space} image [{depth} bit]\n"))?;
            writeln!(
                self.out,
                "V N {ox} {oy} T {sx} {sy} scale [/Indexed /Device{space} {} <",
                ncolors - 1
            )?;
            // The lookup table is a hex string whatever the image transport.
            let palette: Vec<u8> = indexed.palette.concat();
            let palette_options = StreamOptions {
                compression: crate::config::Compression::None,
                transport: Transport::Hex,
                ..self.stream_options()
            };
            stream_dump(&mut self.out, &palette, ncolors, 1, 24, &palette_options, StreamKind::Inline);
            self.put_str("] setcolorspace\n<< /ImageType ");
            if mask_rgb.is_some() {
                self.put_str("4 /MaskColor[0]");
            } else {
                write!(self.out, "1{interpolate}")?;
            }
            write!(self.out, " /Decode [0 {}] ", (1u32 << depth) - 1)?;
            let options = self.stream_options();
            stream_dump(&mut self.out, &indices, nx, ny, u32::from(depth), &options, StreamKind::Image);
            self.put_str("U\n");

            return self.annotate(format_args!("End of indexed {space} image\n"));
        }

        self.annotate(format_args!("Start of {space} image [{bits} bit]\n"))?;
        write!(
            self.out,
            "V N {ox} {oy} T {sx} {sy} scale /Device{space} setcolorspace"
        )?;
        match mask {
            Some(MaskColor::Rgb(c)) => {
                let levels = match id {
                    0 => vec![gray_byte(&c)],
                    2 => rgb_to_cmyk_bytes(&c).to_vec(),
                    _ => c.to_vec(),
                };
                let levels: Vec<String> = levels.iter().map(u8::to_string).collect();
                write!(self.out, "\n<< /ImageType 4 /MaskColor [{}]", levels.join(" "))?;
            }
            Some(MaskColor::Gray(v)) => write!(self.out, "\n<< /ImageType 4 /MaskColor [{v}]")?,
            None => write!(self.out, "\n<< /ImageType 1{interpolate}")?,
        }
        write!(self.out, " /Decode [{}] ", DECODE[id])?;
        let options = self.stream_options();
        stream_dump(&mut self.out, image.data, nx, ny, bits, &options, StreamKind::Image);
        self.put_str("U\n");

        self.annotate(format_args!("End of {space} image\n"))
    }

    /// Place an EPS file loaded with [`load_eps`] so that its bounding box
    /// fills `xsize` by `ysize`.
    pub fn plot_eps_image(
        &mut self,
        x: f64,
        y: f64,
        xsize: f64,
        ysize: f64,
        justify: i32,
        data: &[u8],
        info: &EpsInfo,
    ) -> Result<()> {
        let (width, height) = (info.width(), info.height());
        if width <= 0.0 || height <= 0.0 {
            lwarn!("EPS bounding box is empty");
            return Err(Error::BadSize);
        }

        let (xsize, ysize) = keep_aspect(xsize, ysize, width, height);
        let (x, y) = justify_origin(x, y, xsize, ysize, justify);
        let dpu = self.transform.dots_per_unit();

        self.put_str("PSL_eps_begin\n");
        writeln!(
            self.out,
            "{} {} T {} {} scale",
            self.ix(x),
            self.iy(y),
            g(xsize * dpu / width),
            g(ysize * dpu / height)
        )?;
        writeln!(self.out, "{} {} T", g(-info.llx), g(-info.lly))?;
        writeln!(
            self.out,
            "N {llx} {lly} M {trx} {lly} L {trx} {try_} L {llx} {try_} L P clip N",
            llx = g(info.llx),
            lly = g(info.lly),
            trx = g(info.trx),
            try_ = g(info.try_)
        )?;
        self.put_str("%%BeginDocument: psimage.eps\n");
        self.out.extend_from_slice(data);
        self.put_str("%%EndDocument\n");
        self.put_str("PSL_eps_end\n");

        Ok(())
    }

    /// Write the image data procedure `/image<n>` of a pattern slot.
    fn init_pattern(&mut self, number: usize, data: &[u8], width: usize, height: usize, depth: u32) -> Result<()> {
        let slot = &mut self.patterns.slots[number - 1];
        slot.defined = true;
        slot.width = width;
        slot.height = height;
        slot.depth = depth;
        slot.dpi = None;
        slot.colors = None;

        self.annotate(format_args!("Define pattern {number}\n"))?;
        writeln!(self.out, "/image{number} {{{}", self.config.transport.string_start())?;
        let options = self.stream_options();
        stream_dump(&mut self.out, data, width, height, depth, &options, StreamKind::Inline);
        self.put_str("} def\n");

        Ok(())
    }

    /// Prepare a pattern fill from `source` and return its number, for use
    /// as [`Paint::Pattern`]. One bit images are painted with `fg` and `bg`
    /// like [`Session::plot_bit_image`]. A `dpi` of 0 maps one pixel to one
    /// device dot.
    pub fn set_image(&mut self, source: ImageSource<'_>, dpi: u32, fg: Paint, bg: Paint) -> Result<usize> {
        let number = match source {
            ImageSource::Predefined(n) => {
                if !(1..=N_PATTERNS).contains(&n) {
                    lwarn!("pattern number {} outside the valid range (1-{})", n, N_PATTERNS);
                    return Err(Error::BadValue);
                }
                if !self.patterns.slots[n - 1].defined {
                    let bitmap = resources::pattern(n);
                    self.init_pattern(n, &bitmap, resources::PATTERN_SIZE, resources::PATTERN_SIZE, 1)?;
                }
                n
            }
            ImageSource::User {
                name,
                data,
                width,
                height,
                depth,
            } => match self.patterns.user_names.iter().position(|u| u == name) {
                Some(i) => N_PATTERNS + i + 1,
                None => {
                    if self.patterns.user_names.len() >= N_PATTERNS {
                        lwarn!("already maintaining {} user images", N_PATTERNS);
                        return Err(Error::BadValue);
                    }
                    if !matches!(depth, 1 | 8 | 24)
                        || width == 0
                        || height == 0
                        || data.len() < (depth as usize * width).div_ceil(8) * height
                    {
                        lwarn!("user image {} has a bad size or depth", name);
                        return Err(Error::BadSize);
                    }
                    self.patterns.user_names.push(name.to_string());
                    let n = N_PATTERNS + self.patterns.user_names.len();
                    self.init_pattern(n, data, width, height, depth)?;
                    n
                }
            },
        };

        let slot = self.patterns.slots[number - 1].clone();
        let same_colors = slot
            .colors
            .is_some_and(|(f, b)| f.same(&fg) && b.same(&bg));
        if slot.dpi == Some(dpi) && same_colors {
            return Ok(number);
        }

        let transparent = opaque(fg).is_none() || opaque(bg).is_none();
        let mask = slot.depth == 1 && transparent;
        let kind = if mask { "imagemask" } else { "image" };
        let (mut nx, mut ny) = (slot.width as i64, slot.height as i64);
        if dpi != 0 {
            nx = (nx as f64 * DOTS_PER_INCH / dpi as f64).round() as i64;
            ny = (ny as f64 * DOTS_PER_INCH / dpi as f64).round() as i64;
        }

        self.annotate(format_args!("Setup {kind} fill using pattern {number}\n"))?;
        write!(self.out, "/pattern{number} {{V {nx} {ny} scale")?;
        self.put_str(
            "\n<< /PaintType 1 /PatternType 1 /TilingType 1 /BBox [0 0 1 1] /XStep 1 /YStep 1 /PaintProc\n   {begin",
        );
        if slot.depth == 1 {
            let invert = u8::from(self.bitimage_colormap(opaque(fg), opaque(bg))?);
            write!(self.out, "\n<< /ImageType 1 /Decode [{} {}]", invert, 1 - invert)?;
        } else {
            let id = if self.config.color_mode == ColorMode::Cmyk { 2 } else { 1 };
            write!(
                self.out,
                " /Device{} setcolorspace\n<< /ImageType 1 /Decode [{}]",
                COLORSPACE[id], DECODE[id]
            )?;
        }
        write!(
            self.out,
            " /Width {} /Height {} /BitsPerComponent {}",
            slot.width,
            slot.height,
            slot.depth.min(8)
        )?;
        write!(
            self.out,
            "\n   /ImageMatrix [{w} 0 0 -{h} 0 {h}] /DataSource image{number}\n>> {kind} end}}\n>> matrix makepattern U}} def\n",
            w = slot.width,
            h = slot.height
        )?;

        let slot = &mut self.patterns.slots[number - 1];
        slot.dpi = Some(dpi);
        slot.colors = Some((fg, bg));

        Ok(number)
    }

    /// Superseded by [`Session::set_image`]; only logs a warning.
    #[deprecated = "use `set_image` instead"]
    pub fn set_pattern(&mut self, _number: usize, _dpi: u32, _fg: Paint, _bg: Paint) -> Result<()> {
        lwarn!("set_pattern has been deprecated, see set_image instead");

        Ok(())
    }

    /// Remove all pattern definitions from the dictionary.
    pub(crate) fn pattern_cleanup(&mut self) -> Result<()> {
        if !self.patterns.any_defined() {
            return Ok(());
        }

        self.annotate(format_args!("Undefine patterns and images\n"))?;
        for n in 1..=2 * N_PATTERNS {
            if self.patterns.slots[n - 1].defined {
                writeln!(self.out, "currentdict /image{n} undef")?;
                writeln!(self.out, "currentdict /pattern{n} undef")?;
                self.patterns.slots[n - 1] = PatternSlot::default();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compression, Config, Unit};

    fn session(mode: ColorMode) -> Session<Vec<u8>> {
        Session::in_memory(
            Config::default()
                .with_unit(Unit::Inch)
                .with_color_mode(mode)
                .with_compression(Compression::None),
        )
    }

    fn output(s: Session<Vec<u8>>) -> String {
        String::from_utf8(s.finish().unwrap()).unwrap()
    }

    #[test]
    fn eps_bounding_box() {
        let eps = b"%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 100 50\n\
                    %%HiResBoundingBox: 0 0 99.5 49.5\n%%EndComments\n";
        let info = load_eps(eps).unwrap();
        assert_eq!(info.trx, 99.5);
        assert_eq!(info.try_, 49.5);

        let nested = b"%!PS\n%%BeginDocument: x\n%%BoundingBox: 1 1 2 2\n%%EndDocument\n\
                       %%BoundingBox: (atend)\n%%BoundingBox: 10 20 30 40\nshowpage\n";
        assert_eq!(
            load_eps(nested).unwrap(),
            EpsInfo {
                llx: 10.0,
                lly: 20.0,
                trx: 30.0,
                try_: 40.0
            }
        );

        assert_eq!(load_eps(b"%!PS\n").unwrap(), EpsInfo::default());
        assert_eq!(load_eps(b"GIF89a").unwrap_err(), Error::ReadFailure);
    }

    #[test]
    fn eps_placement() {
        let mut s = session(ColorMode::Rgb);
        let info = EpsInfo {
            llx: 10.0,
            lly: 10.0,
            trx: 110.0,
            try_: 60.0,
        };
        s.plot_eps_image(1.0, 1.0, 2.0, 0.0, 1, b"%!PS\nshowpage\n", &info)
            .unwrap();
        assert_eq!(
            output(s),
            "PSL_eps_begin\n1200 1200 T 24 24 scale\n-10 -10 T\n\
             N 10 10 M 110 10 L 110 60 L 10 60 L P clip N\n\
             %%BeginDocument: psimage.eps\n%!PS\nshowpage\n%%EndDocument\nPSL_eps_end\n"
        );
    }

    #[test]
    fn justification() {
        assert_eq!(justify_origin(1.0, 1.0, 2.0, 2.0, 1), (1.0, 1.0));
        assert_eq!(justify_origin(1.0, 1.0, 2.0, 2.0, 6), (0.0, 0.0));
        assert_eq!(justify_origin(1.0, 1.0, 2.0, 2.0, 11), (-1.0, -1.0));
    }

    #[test]
    fn bit_image_with_transparent_background() {
        let mut s = session(ColorMode::Rgb);
        s.plot_bit_image(
            0.0,
            0.0,
            1.0,
            1.0,
            1,
            &[0xf0],
            8,
            1,
            Rgba::new(1.0, 0.0, 0.0).into(),
            Paint::Skip,
        )
        .unwrap();
        let out = output(s);
        assert!(out.starts_with(
            "V N 0 0 T 1200 1200 scale [/Indexed /DeviceRGB 0 <FF0000>] setcolorspace\n\
             << /ImageType 1 /Decode [0 1] /Width 8"
        ));
        assert!(out.contains(">> imagemask\n"));
    }

    #[test]
    fn three_colors_become_two_bits() {
        let mut s = session(ColorMode::Rgb);
        let colors = [[255u8, 0, 0], [0, 255, 0], [0, 0, 255]];
        let data: Vec<u8> = (0..100).flat_map(|i| colors[i % 3]).collect();
        let image = ColorImage {
            data: &data,
            width: 10,
            height: 10,
            bits: 24,
            interpolate: false,
            mask: None,
        };
        s.plot_color_image(0.0, 0.0, 1.0, 1.0, 1, &image).unwrap();
        let out = output(s);
        assert!(out.contains("[/Indexed /DeviceRGB 2 <\nFF000000FF000000FF>\n] setcolorspace"));
        assert!(out.contains("/Decode [0 3] /Width 10 /Height 10 /BitsPerComponent 2"));
    }

    #[test]
    fn gray_image_with_mask() {
        let mut s = session(ColorMode::Rgb);
        let image = ColorImage {
            data: &[0, 128, 255, 128],
            width: 2,
            height: 2,
            bits: 8,
            interpolate: false,
            mask: Some(MaskColor::Gray(128)),
        };
        s.plot_color_image(0.0, 0.0, 1.0, 0.0, 1, &image).unwrap();
        let out = output(s);
        assert!(out.starts_with(
            "V N 0 0 T 1200 1200 scale /DeviceGray setcolorspace\n\
             << /ImageType 4 /MaskColor [128] /Decode [0 1] "
        ));
    }

    #[test]
    fn gray_mask_of_a_color_image_keeps_its_colors() {
        let mut s = session(ColorMode::Rgb);
        let data: Vec<u8> = [[200u8, 10, 10], [10, 200, 10]].repeat(2).concat();
        let image = ColorImage {
            data: &data,
            width: 4,
            height: 1,
            bits: 24,
            interpolate: false,
            mask: Some(MaskColor::Gray(0)),
        };
        s.plot_color_image(0.0, 0.0, 1.0, 0.0, 1, &image).unwrap();
        let out = output(s);
        assert!(out.contains(
            "[/Indexed /DeviceRGB 2 <\n000000C80A0A0AC80A>\n] setcolorspace\n\
             << /ImageType 4 /MaskColor[0] /Decode [0 3] "
        ));
    }

    #[test]
    fn direct_color_mask_follows_the_color_mode() {
        let mut s = session(ColorMode::Cmyk);
        let image = ColorImage {
            data: &[0, 0, 255, 0, 255, 0],
            width: 2,
            height: 1,
            bits: 24,
            interpolate: true,
            mask: Some(MaskColor::Rgb([255, 0, 0])),
        };
        s.plot_color_image(0.0, 0.0, 1.0, 0.0, 1, &image).unwrap();
        assert!(output(s).contains(
            "/DeviceCMYK setcolorspace\n<< /ImageType 4 /MaskColor [0 255 255 0] /Decode [0 1 0 1 0 1 0 1] "
        ));

        let mut s = session(ColorMode::Rgb);
        let gray = ColorImage {
            data: &[0, 3, 1, 2],
            width: 4,
            height: 1,
            bits: 8,
            interpolate: false,
            mask: Some(MaskColor::Rgb([3, 3, 3])),
        };
        assert_eq!(s.plot_color_image(0.0, 0.0, 1.0, 0.0, 1, &gray), Err(Error::BadValue));
        let two_bits = ColorImage {
            data: &[0x1b],
            bits: 2,
            mask: Some(MaskColor::Gray(4)),
            ..gray
        };
        assert_eq!(s.plot_color_image(0.0, 0.0, 1.0, 0.0, 1, &two_bits), Err(Error::BadValue));
        assert_eq!(output(s), "");
    }

    #[test]
    fn bad_images() {
        let mut s = session(ColorMode::Rgb);
        let mut image = ColorImage {
            data: &[0; 3],
            width: 2,
            height: 2,
            bits: 8,
            interpolate: false,
            mask: None,
        };
        assert_eq!(s.plot_color_image(0.0, 0.0, 1.0, 1.0, 1, &image), Err(Error::BadSize));
        image.bits = 12;
        assert_eq!(s.plot_color_image(0.0, 0.0, 1.0, 1.0, 1, &image), Err(Error::BadValue));
    }

    #[test]
    fn patterns_are_defined_once() {
        let mut s = session(ColorMode::Rgb);
        let black: Paint = Rgba::BLACK.into();
        let white: Paint = Rgba::WHITE.into();
        assert_eq!(s.set_image(ImageSource::Predefined(7), 300, black, white), Ok(7));
        assert_eq!(s.set_image(ImageSource::Predefined(7), 300, black, white), Ok(7));
        assert_eq!(
            s.set_image(ImageSource::Predefined(91), 300, black, white),
            Err(Error::BadValue)
        );
        s.pattern_cleanup().unwrap();

        let out = output(s);
        assert_eq!(out.matches("/image7 {<~\n").count(), 1);
        assert_eq!(out.matches("/pattern7 {V 256 256 scale").count(), 1);
        assert!(out.contains("[/Indexed /DeviceGray 1 <00FF>] setcolorspace"));
        assert!(out.ends_with("currentdict /image7 undef\ncurrentdict /pattern7 undef\n"));
    }

    #[test]
    fn user_images_are_numbered_after_patterns() {
        let mut s = session(ColorMode::Rgb);
        let source = ImageSource::User {
            name: "dots",
            data: &[0x55; 8],
            width: 8,
            height: 8,
            depth: 1,
        };
        let n = s.set_image(source, 0, Rgba::BLACK.into(), Paint::Skip).unwrap();
        assert_eq!(n, 91);
        assert_eq!(s.set_image(source, 0, Rgba::BLACK.into(), Paint::Skip), Ok(91));
        assert!(output(s).contains(">> imagemask end}"));
    }
}
