//! Colors and paints.
//!
//! A color is always stored as RGB with a transparency in `0..=1`. The
//! conversion to the configured output color model only happens when a color
//! is written.

use crate::config::ColorMode;
use crate::num::g;
use core::fmt::{self, Write};

const EPSILON: f64 = 1.0e-10;

pub(crate) fn eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// An RGB color with transparency. All components are in `0..=1`, and an
/// alpha of 0 is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Transparency, where 0 is opaque and 1 is fully transparent.
    pub a: f64,
}

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self::gray(0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::gray(1.0);

    /// An opaque color.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 0.0 }
    }

    /// An opaque gray level.
    pub const fn gray(level: f64) -> Self {
        Self::new(level, level, level)
    }

    /// Return this color with the given transparency.
    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    /// Whether both colors have the same components and transparency.
    pub fn same(&self, other: &Self) -> bool {
        eq(self.r, other.r) && eq(self.g, other.g) && eq(self.b, other.b) && eq(self.a, other.a)
    }

    /// Whether red, green and blue are equal.
    pub fn is_gray(&self) -> bool {
        eq(self.r, self.g) && eq(self.r, self.b)
    }

    /// The luminance of this color.
    pub fn yiq(&self) -> f64 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// Convert to CMYK without undercolor removal. Components below 0.0005
    /// are snapped to zero.
    pub fn to_cmyk(&self) -> [f64; 4] {
        let mut cmyk = [1.0 - self.r, 1.0 - self.g, 1.0 - self.b, 0.0];
        let k = cmyk[0].min(cmyk[1]).min(cmyk[2]);
        cmyk[3] = k;

        for c in &mut cmyk[..3] {
            *c -= k;
        }

        for c in &mut cmyk {
            if *c < 0.0005 {
                *c = 0.0;
            }
        }

        cmyk
    }

    /// Convert an opaque CMYK color back to RGB.
    pub fn from_cmyk(cmyk: [f64; 4]) -> Self {
        Self::new(
            1.0 - cmyk[0] - cmyk[3],
            1.0 - cmyk[1] - cmyk[3],
            1.0 - cmyk[2] - cmyk[3],
        )
    }

    /// Convert to hue (degrees), saturation and value.
    pub fn to_hsv(&self) -> [f64; 3] {
        let rgb = [self.r, self.g, self.b];
        let (mut imax, mut imin) = (0, 0);

        for i in 1..3 {
            if rgb[i] > rgb[imax] {
                imax = i;
            }
            if rgb[i] < rgb[imin] {
                imin = i;
            }
        }

        let diff = rgb[imax] - rgb[imin];
        let saturation = if eq(rgb[imax], 0.0) {
            0.0
        } else {
            diff / rgb[imax]
        };
        let value = rgb[imax];

        if eq(saturation, 0.0) {
            return [0.0, saturation, value];
        }

        let mut hue =
            120.0 * imax as f64 + 60.0 * (rgb[(imax + 1) % 3] - rgb[(imax + 2) % 3]) / diff;
        if hue < 0.0 {
            hue += 360.0;
        }
        if hue > 360.0 {
            hue -= 360.0;
        }

        [hue, saturation, value]
    }
}

/// What to paint a stroke or an area with.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Paint {
    /// Keep the current paint.
    #[default]
    NoChange,
    /// Paint nothing.
    Skip,
    /// Fill with a previously defined pattern.
    Pattern(usize),
    /// A solid color.
    Color(Rgba),
}

impl Paint {
    /// The transparency of a solid color, 0 for anything else.
    pub(crate) fn alpha(&self) -> f64 {
        match self {
            Self::Color(c) => c.a,
            _ => 0.0,
        }
    }

    pub(crate) fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Color(a), Self::Color(b)) => a.same(b),
            (a, b) => a == b,
        }
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Self::Color(c)
    }
}

/// The number format of color components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ColorFormat {
    /// Three significant digits.
    #[default]
    Significant,
    /// A fixed number of decimals in `1..=3`.
    Fixed(usize),
}

struct Component(f64, ColorFormat);

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.1 {
            ColorFormat::Significant => write!(f, "{}", crate::num::g3(self.0)),
            ColorFormat::Fixed(n) => write!(f, "{:.*}", n, self.0),
        }
    }
}

/// Format a paint as a PostScript color setting procedure body.
pub(crate) fn put_color(
    paint: &Paint,
    mode: ColorMode,
    format: ColorFormat,
    transparency_mode: &str,
) -> String {
    let mut s = String::new();

    let c = match paint {
        Paint::NoChange | Paint::Skip => return s,
        Paint::Pattern(n) => {
            let _ = write!(s, "pattern{n} I");
            return s;
        }
        Paint::Color(c) => c,
    };

    let f = |v| Component(v, format);

    let _ = if c.is_gray() {
        write!(s, "{} A", f(c.r))
    } else {
        match mode {
            ColorMode::Gray => write!(s, "{} A", f(c.yiq())),
            ColorMode::Rgb => write!(s, "{} {} {} C", f(c.r), f(c.g), f(c.b)),
            ColorMode::Cmyk => {
                let k = c.to_cmyk();
                write!(s, "{} {} {} {} K", f(k[0]), f(k[1]), f(k[2]), f(k[3]))
            }
            ColorMode::Hsv => {
                let h = c.to_hsv();
                write!(s, "{} {} {} H", f(h[0]), f(h[1]), f(h[2]))
            }
        }
    };

    if !eq(c.a, 0.0) {
        let _ = write!(s, " {} /{} PSL_transp", g(1.0 - c.a), transparency_mode);
    }

    s
}

/// Scale a `0..=1` component to a byte, rounding half to even.
pub(crate) fn u255(s: f64) -> u8 {
    (s * 255.0).round_ties_even().clamp(0.0, 255.0) as u8
}

/// Convert one RGB pixel to CMYK bytes.
pub(crate) fn rgb_to_cmyk_bytes(rgb: &[u8]) -> [u8; 4] {
    let mut cmyk = [255 - rgb[0], 255 - rgb[1], 255 - rgb[2], 0];
    cmyk[3] = cmyk[0].min(cmyk[1]).min(cmyk[2]);

    for i in 0..3 {
        cmyk[i] -= cmyk[3];
    }

    cmyk
}

/// The luminance of an RGB pixel as a byte.
pub(crate) fn gray_byte(rgb: &[u8]) -> u8 {
    (0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64).round_ties_even()
        as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(c: Rgba, mode: ColorMode) -> String {
        put_color(&Paint::Color(c), mode, ColorFormat::Significant, "Normal")
    }

    #[test]
    fn gray_detection() {
        assert!(Rgba::gray(0.5).is_gray());
        assert!(Rgba::new(0.5, 0.5, 0.5 + 1e-12).is_gray());
        assert!(!Rgba::new(0.5, 0.5, 0.6).is_gray());
    }

    #[test]
    fn cmyk_round_trip() {
        for c in [
            Rgba::new(0.2, 0.4, 0.6),
            Rgba::new(1.0, 0.0, 0.5),
            Rgba::new(0.9, 0.9, 0.1),
        ] {
            let back = Rgba::from_cmyk(c.to_cmyk());
            assert!((back.r - c.r).abs() <= 0.0005);
            assert!((back.g - c.g).abs() <= 0.0005);
            assert!((back.b - c.b).abs() <= 0.0005);
        }
    }

    #[test]
    fn black_is_taken_out_of_every_ink() {
        let cmyk = Rgba::new(0.2, 0.4, 0.6).to_cmyk();
        let expected = [0.4, 0.2, 0.0, 0.4];
        for (c, e) in cmyk.iter().zip(expected) {
            assert!((c - e).abs() < 1e-12, "{cmyk:?}");
        }
        assert_eq!(Rgba::BLACK.to_cmyk(), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn hsv() {
        assert_eq!(Rgba::new(1.0, 0.0, 0.0).to_hsv(), [0.0, 1.0, 1.0]);
        assert_eq!(Rgba::new(0.0, 0.0, 1.0).to_hsv(), [240.0, 1.0, 1.0]);
        assert_eq!(Rgba::gray(0.3).to_hsv(), [0.0, 0.0, 0.3]);
    }

    #[test]
    fn color_procedures() {
        assert_eq!(put(Rgba::BLACK, ColorMode::Rgb), "0 A");
        assert_eq!(put(Rgba::new(1.0, 0.0, 0.5), ColorMode::Rgb), "1 0 0.5 C");
        assert_eq!(put(Rgba::new(1.0, 0.0, 0.0), ColorMode::Cmyk), "0 1 1 0 K");
        assert_eq!(put(Rgba::new(1.0, 0.0, 0.0), ColorMode::Hsv), "0 1 1 H");
        assert_eq!(put(Rgba::new(1.0, 0.0, 0.0), ColorMode::Gray), "0.299 A");
        assert_eq!(
            put(Rgba::gray(0.5).with_alpha(0.25), ColorMode::Rgb),
            "0.5 A 0.75 /Normal PSL_transp"
        );
        assert_eq!(
            put_color(
                &Paint::Pattern(3),
                ColorMode::Rgb,
                ColorFormat::Significant,
                "Normal"
            ),
            "pattern3 I"
        );
        assert_eq!(
            put_color(
                &Paint::Color(Rgba::gray(0.5)),
                ColorMode::Rgb,
                ColorFormat::Fixed(2),
                "Normal"
            ),
            "0.50 A"
        );
    }

    #[test]
    fn pixel_conversion() {
        assert_eq!(rgb_to_cmyk_bytes(&[255, 0, 0]), [0, 255, 255, 0]);
        assert_eq!(rgb_to_cmyk_bytes(&[0, 0, 0]), [0, 0, 0, 255]);
        assert_eq!(gray_byte(&[255, 255, 255]), 255);
        assert_eq!(u255(0.5), 128);
    }
}
