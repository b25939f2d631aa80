//! The font table and character encodings.

use crate::config::CustomFont;
use crate::error::Error;
use crate::num::atoi;
use core::str::FromStr;
use phf::phf_map;

/// The index of the Symbol font.
pub(crate) const SYMBOL_FONT: usize = 12;

/// The standard 35 Adobe fonts plus 4 Japanese fonts: name, height of `A`
/// at unit size, and whether the font must never be reencoded.
const STANDARD_FONTS: [(&str, f64, bool); 39] = [
    ("Helvetica", 0.700, false),
    ("Helvetica-Bold", 0.700, false),
    ("Helvetica-Oblique", 0.700, false),
    ("Helvetica-BoldOblique", 0.700, false),
    ("Times-Roman", 0.662, false),
    ("Times-Bold", 0.676, false),
    ("Times-Italic", 0.653, false),
    ("Times-BoldItalic", 0.669, false),
    ("Courier", 0.571, false),
    ("Courier-Bold", 0.626, false),
    ("Courier-Oblique", 0.571, false),
    ("Courier-BoldOblique", 0.626, false),
    ("Symbol", 0.673, true),
    ("AvantGarde-Book", 0.740, false),
    ("AvantGarde-BookOblique", 0.740, false),
    ("AvantGarde-Demi", 0.740, false),
    ("AvantGarde-DemiOblique", 0.740, false),
    ("Bookman-Demi", 0.681, false),
    ("Bookman-DemiItalic", 0.681, false),
    ("Bookman-Light", 0.681, false),
    ("Bookman-LightItalic", 0.681, false),
    ("Helvetica-Narrow", 0.718, false),
    ("Helvetica-Narrow-Bold", 0.718, false),
    ("Helvetica-Narrow-Oblique", 0.718, false),
    ("Helvetica-Narrow-BoldOblique", 0.718, false),
    ("NewCenturySchlbk-Roman", 0.722, false),
    ("NewCenturySchlbk-Italic", 0.722, false),
    ("NewCenturySchlbk-Bold", 0.722, false),
    ("NewCenturySchlbk-BoldItalic", 0.722, false),
    ("Palatino-Roman", 0.692, false),
    ("Palatino-Italic", 0.692, false),
    ("Palatino-Bold", 0.692, false),
    ("Palatino-BoldItalic", 0.692, false),
    ("ZapfChancery-MediumItalic", 0.708, false),
    ("ZapfDingbats", 0.692, true),
    ("Ryumin-Light-EUC-H", 0.882, true),
    ("Ryumin-Light-EUC-V", 0.882, true),
    ("GothicBBB-Medium-EUC-H", 0.877, true),
    ("GothicBBB-Medium-EUC-V", 0.877, true),
];

static STANDARD_INDEX: phf::Map<&'static str, usize> = phf_map! {
    "Helvetica" => 0,
    "Helvetica-Bold" => 1,
    "Helvetica-Oblique" => 2,
    "Helvetica-BoldOblique" => 3,
    "Times-Roman" => 4,
    "Times-Bold" => 5,
    "Times-Italic" => 6,
    "Times-BoldItalic" => 7,
    "Courier" => 8,
    "Courier-Bold" => 9,
    "Courier-Oblique" => 10,
    "Courier-BoldOblique" => 11,
    "Symbol" => 12,
    "AvantGarde-Book" => 13,
    "AvantGarde-BookOblique" => 14,
    "AvantGarde-Demi" => 15,
    "AvantGarde-DemiOblique" => 16,
    "Bookman-Demi" => 17,
    "Bookman-DemiItalic" => 18,
    "Bookman-Light" => 19,
    "Bookman-LightItalic" => 20,
    "Helvetica-Narrow" => 21,
    "Helvetica-Narrow-Bold" => 22,
    "Helvetica-Narrow-Oblique" => 23,
    "Helvetica-Narrow-BoldOblique" => 24,
    "NewCenturySchlbk-Roman" => 25,
    "NewCenturySchlbk-Italic" => 26,
    "NewCenturySchlbk-Bold" => 27,
    "NewCenturySchlbk-BoldItalic" => 28,
    "Palatino-Roman" => 29,
    "Palatino-Italic" => 30,
    "Palatino-Bold" => 31,
    "Palatino-BoldItalic" => 32,
    "ZapfChancery-MediumItalic" => 33,
    "ZapfDingbats" => 34,
    "Ryumin-Light-EUC-H" => 35,
    "Ryumin-Light-EUC-V" => 36,
    "GothicBBB-Medium-EUC-H" => 37,
    "GothicBBB-Medium-EUC-V" => 38,
};

/// A character encoding that fonts are reencoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Adobe StandardEncoding.
    #[default]
    Standard,
    /// StandardEncoding with accented letters and a minus sign in unused slots.
    StandardPlus,
    /// The ISOLatin1Encoding of PostScript level 2.
    IsoLatin1,
    /// ISOLatin1Encoding with additional Latin letters in unused slots.
    IsoLatin1Plus,
    /// ISO 8859-1.
    Iso8859_1,
    /// ISO 8859-15.
    Iso8859_15,
}

impl Encoding {
    /// The encoding name used in the output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::StandardPlus => "Standard+",
            Self::IsoLatin1 => "ISOLatin1",
            Self::IsoLatin1Plus => "ISOLatin1+",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::Iso8859_15 => "ISO-8859-15",
        }
    }

    /// The column of the national character table used for `@` shorthands,
    /// or 0 when the encoding has none.
    pub(crate) fn shorthand_column(self) -> usize {
        match self {
            Self::Standard => 1,
            Self::StandardPlus => 2,
            Self::IsoLatin1 => 3,
            Self::IsoLatin1Plus => 4,
            Self::Iso8859_1 | Self::Iso8859_15 => 0,
        }
    }

    pub(crate) fn is_iso_latin1(self) -> bool {
        matches!(self, Self::IsoLatin1 | Self::IsoLatin1Plus)
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "Standard+" => Ok(Self::StandardPlus),
            "ISOLatin1" => Ok(Self::IsoLatin1),
            "ISOLatin1+" => Ok(Self::IsoLatin1Plus),
            "ISO-8859-1" => Ok(Self::Iso8859_1),
            "ISO-8859-15" => Ok(Self::Iso8859_15),
            _ => Err(Error::BadValue),
        }
    }
}

#[derive(Debug, Clone)]
struct FontEntry {
    name: String,
    height: f64,
    never_encode: bool,
    encoded: bool,
}

/// The fonts of a session with their per-plot reencoding state.
#[derive(Debug, Clone)]
pub(crate) struct FontTable {
    fonts: Vec<FontEntry>,
}

impl FontTable {
    pub(crate) fn new(custom: &[CustomFont]) -> Self {
        let standard = STANDARD_FONTS
            .iter()
            .map(|&(name, height, never_encode)| FontEntry {
                name: name.to_string(),
                height,
                never_encode,
                encoded: never_encode,
            });
        let custom = custom.iter().map(|f| FontEntry {
            name: f.name.clone(),
            height: f.height,
            never_encode: false,
            encoded: false,
        });

        Self {
            fonts: standard.chain(custom).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.fonts.len()
    }

    pub(crate) fn name(&self, font: usize) -> &str {
        &self.fonts[font].name
    }

    pub(crate) fn height(&self, font: usize) -> f64 {
        self.fonts[font].height
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.name.as_str())
    }

    pub(crate) fn is_encoded(&self, font: usize) -> bool {
        self.fonts[font].encoded
    }

    pub(crate) fn mark_encoded(&mut self, font: usize) {
        self.fonts[font].encoded = true;
    }

    /// Forget which fonts have been reencoded, as a new prologue is written.
    pub(crate) fn reset_encoded(&mut self) {
        for f in &mut self.fonts {
            f.encoded = f.never_encode;
        }
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        STANDARD_INDEX
            .get(name)
            .copied()
            .or_else(|| self.fonts.iter().position(|f| f.name == name))
    }

    /// Resolve a font reference of the form `33` or `Helvetica-Bold`,
    /// optionally followed by `%` and more text.
    ///
    /// Returns `None` for an empty reference. Unknown fonts and malformed or
    /// out of range numbers resolve to font 0.
    pub(crate) fn resolve(&self, reference: &[u8]) -> Option<usize> {
        let end = memchr::memchr(b'%', reference).unwrap_or(reference.len());
        let name = &reference[..end];

        if name.is_empty() {
            return None;
        }

        if name[0].is_ascii_digit() {
            // A reference that starts with a digit must be all digits.
            let font = if name[name.len() - 1].is_ascii_digit() {
                atoi(&String::from_utf8_lossy(name))
            } else {
                -1
            };
            if font < 0 || font as usize >= self.len() {
                lwarn!("font number {} outside the valid range, reset to 0", font);
                return Some(0);
            }

            return Some(font as usize);
        }

        // A soft hyphen stands in for a hyphen in font names.
        let name: String = name
            .iter()
            .map(|&b| if b == 0o255 { '-' } else { b as char })
            .collect();

        match self.lookup(&name) {
            Some(font) => Some(font),
            None => {
                lwarn!(
                    "font {} not recognized, reset to {}",
                    name,
                    self.fonts[0].name
                );
                Some(0)
            }
        }
    }
}
