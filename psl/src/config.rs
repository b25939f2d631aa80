//! Session configuration.

use crate::color::Rgba;
use crate::error::Error;
use crate::font::Encoding;
use crate::path::SimplifyPolicy;
use core::str::FromStr;

/// The user unit of all coordinates and lengths passed to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// Centimeters.
    #[default]
    Cm,
    /// Inches.
    Inch,
    /// Meters.
    Meter,
    /// PostScript points.
    Point,
}

impl Unit {
    /// The number of units in one inch.
    pub fn per_inch(self) -> f64 {
        match self {
            Self::Cm => 2.54,
            Self::Inch => 1.0,
            Self::Meter => 0.0254,
            Self::Point => 72.0,
        }
    }

    /// The name used in document comments.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cm => "cm",
            Self::Inch => "inch",
            Self::Meter => "m",
            Self::Point => "point",
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "cm" => Ok(Self::Cm),
            "i" | "inch" => Ok(Self::Inch),
            "m" | "meter" => Ok(Self::Meter),
            "p" | "pt" | "point" => Ok(Self::Point),
            _ => Err(Error::BadValue),
        }
    }
}

/// How colors are written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Red, green and blue.
    #[default]
    Rgb,
    /// Cyan, magenta, yellow and black.
    Cmyk,
    /// Hue, saturation and value.
    Hsv,
    /// Gray levels only.
    Gray,
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "cmyk" => Ok(Self::Cmyk),
            "hsv" => Ok(Self::Hsv),
            "gray" | "grey" => Ok(Self::Gray),
            _ => Err(Error::BadValue),
        }
    }
}

/// The compression applied to image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// No compression.
    #[default]
    None,
    /// PostScript run-length encoding.
    Rle,
    /// LZW with 9 to 12 bit codes.
    Lzw,
    /// A zlib stream.
    Deflate,
}

impl Compression {
    /// The PostScript decode filter for this compression, or an empty
    /// string.
    pub(crate) fn filter(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Rle => "/RunLengthDecode filter",
            Self::Lzw => "/LZWDecode filter",
            Self::Deflate => "/FlateDecode filter",
        }
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "rle" => Ok(Self::Rle),
            "lzw" => Ok(Self::Lzw),
            "deflate" | "flate" => Ok(Self::Deflate),
            _ => Err(Error::BadValue),
        }
    }
}

/// The binary-to-text transport of image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// ASCII base-85.
    #[default]
    Ascii85,
    /// Hexadecimal.
    Hex,
}

impl Transport {
    /// The decode filter of image data in this transport.
    pub(crate) fn filter(self) -> &'static str {
        match self {
            Self::Ascii85 => "/ASCII85Decode filter",
            Self::Hex => "/ASCIIHexDecode filter",
        }
    }

    /// The delimiter opening a string literal in this transport.
    pub(crate) fn string_start(self) -> &'static str {
        match self {
            Self::Ascii85 => "<~",
            Self::Hex => "<",
        }
    }
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii85" | "a85" => Ok(Self::Ascii85),
            "hex" => Ok(Self::Hex),
            _ => Err(Error::BadValue),
        }
    }
}

/// The level of messages a session reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Report nothing.
    Quiet,
    /// Report fatal errors only.
    Fatal,
    /// Report errors and warnings.
    #[default]
    Normal,
    /// Report progress information.
    Verbose,
    /// Report everything.
    Debug,
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "q" => Ok(Self::Quiet),
            "fatal" | "f" => Ok(Self::Fatal),
            "normal" | "n" => Ok(Self::Normal),
            "verbose" | "v" => Ok(Self::Verbose),
            "debug" | "d" => Ok(Self::Debug),
            _ => Err(Error::BadValue),
        }
    }
}

/// A font that is not part of the standard font table.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFont {
    /// The PostScript font name.
    pub name: String,
    /// The cap height relative to the font size.
    pub height: f64,
}

/// Options that stay fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct Config {
    /// The user unit.
    pub unit: Unit,
    /// How colors are written.
    pub color_mode: ColorMode,
    /// The compression of image data.
    pub compression: Compression,
    /// The zlib level for DEFLATE compression. 0 selects the default of 6.
    pub deflate_level: u32,
    /// The transport of image data.
    pub transport: Transport,
    /// The message level.
    pub verbosity: Verbosity,
    /// Whether comments are written to the output.
    pub comments: bool,
    /// Magnification of the plot in x and y.
    pub magnify: [f64; 2],
    /// The page color.
    pub page_color: Rgba,
    /// The character encoding used to reencode fonts.
    pub encoding: Encoding,
    /// How polylines are simplified.
    pub simplify: SimplifyPolicy,
    /// Additional fonts appended after the standard ones.
    pub fonts: Vec<CustomFont>,
    /// The `%%For` user name. `None` writes `unknown`.
    pub user_name: Option<String>,
    /// The `%%CreationDate` value. `None` writes an empty date.
    pub creation_date: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit: Unit::default(),
            color_mode: ColorMode::default(),
            compression: Compression::default(),
            deflate_level: 0,
            transport: Transport::default(),
            verbosity: Verbosity::default(),
            comments: false,
            magnify: [1.0, 1.0],
            page_color: Rgba::WHITE,
            encoding: Encoding::default(),
            simplify: SimplifyPolicy::default(),
            fonts: Vec::new(),
            user_name: None,
            creation_date: None,
        }
    }
}

impl Config {
    /// Set the user unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the color mode.
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }

    /// Set the image compression.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the zlib level used for DEFLATE compression.
    pub fn with_deflate_level(mut self, level: u32) -> Self {
        self.deflate_level = level;
        self
    }

    /// Set the image transport.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Set the message level.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Enable or disable comments in the output.
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    /// Set the magnification in x and y.
    pub fn with_magnify(mut self, magnify: [f64; 2]) -> Self {
        self.magnify = magnify;
        self
    }

    /// Set the page color.
    pub fn with_page_color(mut self, page_color: Rgba) -> Self {
        self.page_color = page_color;
        self
    }

    /// Set the character encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the path simplification policy.
    pub fn with_simplify(mut self, simplify: SimplifyPolicy) -> Self {
        self.simplify = simplify;
        self
    }

    /// Append a custom font to the font table.
    pub fn with_font(mut self, name: impl Into<String>, height: f64) -> Self {
        self.fonts.push(CustomFont {
            name: name.into(),
            height,
        });
        self
    }

    /// Set the `%%For` user name.
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Set the `%%CreationDate` value.
    pub fn with_creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = Some(date.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options() {
        assert_eq!("cm".parse::<Unit>(), Ok(Unit::Cm));
        assert_eq!("CMYK".parse::<ColorMode>(), Ok(ColorMode::Cmyk));
        assert_eq!("lzw".parse::<Compression>(), Ok(Compression::Lzw));
        assert_eq!("hex".parse::<Transport>(), Ok(Transport::Hex));
        assert_eq!("debug".parse::<Verbosity>(), Ok(Verbosity::Debug));
        assert_eq!("furlong".parse::<Unit>(), Err(Error::BadValue));
    }

    #[test]
    fn builder() {
        let config = Config::default()
            .with_unit(Unit::Cm)
            .with_comments(true)
            .with_font("MyFont", 0.7);
        assert_eq!(config.unit, Unit::Cm);
        assert!(config.comments);
        assert_eq!(config.fonts.len(), 1);
        assert_eq!(Unit::Meter.per_inch(), 0.0254);
    }
}
