//! Escaping and character translation of text strings.

use crate::font::{Encoding, FontTable, SYMBOL_FONT};
use smallvec::SmallVec;

/// How a `-` in text is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// As a hyphen.
    #[default]
    Hyphen,
    /// As a minus sign, where the encoding has one.
    Minus,
}

/// The `@` shorthands for national characters, with their replacement for
/// no encoding, Standard, Standard+, ISOLatin1 and ISOLatin1+.
const SHORTHANDS: [(u8, [&[u8]; 5]); 16] = [
    (b'A', [b"AA", b"AA", b"\\375", b"\\305", b"\\305"]),
    (b'E', [b"AE", b"\\341", b"\\341", b"\\306", b"\\306"]),
    (b'O', [b"OE", b"\\351", b"\\351", b"\\330", b"\\330"]),
    (b'a', [b"aa", b"aa", b"\\376", b"\\345", b"\\345"]),
    (b'e', [b"ae", b"\\361", b"\\361", b"\\346", b"\\346"]),
    (b'o', [b"oe", b"\\371", b"\\371", b"\\370", b"\\370"]),
    (b'C', [b"C", b"C", b"\\201", b"\\307", b"\\307"]),
    (b'N', [b"N", b"N", b"\\204", b"\\321", b"\\321"]),
    (b'U', [b"U", b"UE", b"\\335", b"\\334", b"\\334"]),
    (b'c', [b"c", b"c", b"\\215", b"\\347", b"\\347"]),
    (b'n', [b"n", b"n", b"\\227", b"\\361", b"\\361"]),
    (b's', [b"ss", b"\\373", b"\\373", b"\\337", b"\\337"]),
    (b'u', [b"u", b"ue", b"\\370", b"\\374", b"\\374"]),
    (b'i', [b"i", b"\\354", b"\\354", b"\\355", b"\\355"]),
    (b'@', [b"@", b"\\100", b"\\100", b"\\100", b"\\100"]),
    (b'.', [b"*", b"\\312", b"\\217", b"\\260", b"\\260"]),
];

/// A text string ready to be placed between parentheses in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedText {
    /// The escaped bytes.
    pub(crate) text: Vec<u8>,
    /// Fonts referenced by escapes, which must be reencoded before use.
    pub(crate) fonts: SmallVec<[usize; 4]>,
}

impl PreparedText {
    pub(crate) fn has_escapes(&self) -> bool {
        memchr::memchr(b'@', &self.text).is_some()
    }
}

/// Escape the characters that are special in PostScript strings and
/// translate the `@` shorthands of national characters.
///
/// Other `@` escapes are kept for the tokenizer, and a font switch
/// `@%font%` records the font so that it can be reencoded.
pub(crate) fn prepare_text(
    text: &[u8],
    encoding: Encoding,
    mode: TextMode,
    fonts: &FontTable,
) -> PreparedText {
    let column = encoding.shorthand_column();
    let mut out = Vec::with_capacity(text.len() + 16);
    let mut used = SmallVec::new();
    let mut i = 0;

    while i < text.len() {
        let c = text[i];

        if column != 0 && c == b'@' {
            i += 1;
            let Some(&next) = text.get(i) else {
                out.push(b'@');
                break;
            };

            if let Some((_, codes)) = SHORTHANDS.iter().find(|(k, _)| *k == next) {
                out.extend_from_slice(codes[column]);
                i += 1;
                continue;
            }

            match next {
                b'%' => {
                    if let Some(font) = fonts.resolve(&text[i + 1..]) {
                        used.push(font);
                    }
                    out.extend_from_slice(b"@%");
                    i += 1;
                    while i < text.len() && text[i] != b'%' {
                        out.push(text[i]);
                        i += 1;
                    }
                }
                _ => {
                    if next == b'~' {
                        used.push(SYMBOL_FONT);
                    }
                    out.push(b'@');
                    out.push(next);
                    i += 1;
                }
            }
        } else {
            if matches!(c, b'{' | b'}' | b'[' | b']' | b'(' | b')' | b'<' | b'>')
                && out.last() != Some(&b'\\')
            {
                out.push(b'\\');
            }
            out.push(c);
            i += 1;
        }
    }

    fix_utf8(&mut out, encoding, mode);

    PreparedText {
        text: out,
        fonts: used,
    }
}

/// Fold two-byte UTF-8 sequences of Latin letters into single byte codes,
/// and swap hyphens and minus signs according to `mode`.
fn fix_utf8(text: &mut Vec<u8>, encoding: Encoding, mode: TextMode) {
    let minus = mode == TextMode::Minus;

    if encoding == Encoding::StandardPlus && minus {
        for k in 0..text.len() {
            if text[k] == b'-' && (k == 0 || text[k - 1] != b'@') {
                text[k] = 0o224;
            }
        }
    }

    let latin1 = encoding.is_iso_latin1();

    if !latin1 && encoding != Encoding::Iso8859_1 {
        return;
    }

    let mut lead_bytes = 0;

    for k in 0..text.len() {
        let c = text[k];
        if c == 0o303 || c == 0o305 {
            lead_bytes += 1;
        } else if latin1 && (k == 0 || text[k - 1] != b'@') {
            if c == 0o255 && minus {
                text[k] = b'-';
            } else if c == b'-' && !minus {
                text[k] = 0o255;
            }
        }
    }

    if lead_bytes == 0 {
        return;
    }

    let mut out = Vec::with_capacity(text.len());
    let mut k = 0;

    while k < text.len() {
        let c = text[k];
        let next = text.get(k + 1).copied();

        let folded = match (c, next) {
            (0o303, Some(n @ 0o200..=0o277)) => Some(n + 64),
            (0o305, Some(n)) => match n {
                0o201 => Some(0o203),
                0o202 => Some(0o213),
                0o222 => Some(0o200),
                0o223 => Some(0o210),
                0o240 => Some(0o206),
                0o241 => Some(0o177),
                0o270 => Some(0o211),
                0o275 => Some(0o212),
                0o276 => Some(0o037),
                _ => None,
            },
            _ => None,
        };

        match folded {
            Some(byte) => {
                out.push(byte);
                k += 2;
            }
            None if (c == 0o303 || c == 0o305) && next.is_some() => {
                out.extend_from_slice(&text[k..k + 2]);
                k += 2;
            }
            None => {
                out.push(c);
                k += 1;
            }
        }
    }

    *text = out;
}
