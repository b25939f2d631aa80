//! The inline escape language of text strings.
//!
//! An escape starts with `@` followed by a command character:
//!
//! | Escape | Meaning |
//! | --- | --- |
//! | `@~` | toggle the Symbol font |
//! | `@%font%`, `@%%` | switch to a font by number or name, and back |
//! | `@:size:`, `@::` | switch to a font size in points, and back |
//! | `@;r/g/b;`, `@;gray;`, `@;;` | switch the text color (0-255), and back |
//! | `@-`, `@+` | toggle subscript and superscript |
//! | `@#` | toggle small caps |
//! | `@_` | toggle underline |
//! | `@!ab` | overprint the characters `a` and `b` |
//! | `@@` | a literal `@` |

use crate::color::Rgba;
use crate::num::atof;

/// A color change requested by `@;...;`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ColorChange {
    /// Back to the color before the last change.
    Reset,
    /// A new color, possibly with transparency.
    Set(Rgba),
    /// A malformed or out of range color, which is ignored.
    Bad,
}

/// One piece of a text string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    Text(&'a [u8]),
    ToggleSymbol,
    /// A font reference, or `None` to switch back.
    SwitchFont(Option<&'a [u8]>),
    /// A size in points, or `None` to switch back.
    SetSize(Option<f64>),
    SetColor(ColorChange),
    ToggleSub,
    ToggleSuper,
    ToggleSmallCaps,
    ToggleUnderline,
    /// Two characters, each a single byte or a `\ddd` octal escape.
    ComposeChar(&'a [u8], &'a [u8]),
    Literal(u8),
}

/// Split a prepared text string into tokens.
pub(crate) struct Tokenizer<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(text: &'a [u8]) -> Self {
        Self { text, pos: 0 }
    }

    /// The bytes from the current position up to `delim`, which is
    /// consumed. Without a delimiter the rest of the text is returned.
    fn until(&mut self, delim: u8) -> &'a [u8] {
        let rest = &self.text[self.pos..];
        match memchr::memchr(delim, rest) {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None => {
                self.pos = self.text.len();
                rest
            }
        }
    }

    /// A character of a composite, either a single byte or an octal escape.
    fn character(&mut self) -> &'a [u8] {
        let rest = &self.text[self.pos..];
        let len = if rest.first() == Some(&b'\\') { 4 } else { 1 };
        let len = len.min(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn text(&mut self) -> Token<'a> {
        let rest = &self.text[self.pos..];
        let end = memchr::memchr(b'@', rest).unwrap_or(rest.len());
        self.pos += end;
        Token::Text(&rest[..end])
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let &c = self.text.get(self.pos)?;

        if c != b'@' {
            return Some(self.text());
        }

        let &command = self.text.get(self.pos + 1)?;
        self.pos += 2;

        let token = match command {
            b'~' => Token::ToggleSymbol,
            b'-' => Token::ToggleSub,
            b'+' => Token::ToggleSuper,
            b'#' => Token::ToggleSmallCaps,
            b'_' => Token::ToggleUnderline,
            b'@' => Token::Literal(b'@'),
            b'%' => {
                let name = self.until(b'%');
                Token::SwitchFont((!name.is_empty()).then_some(name))
            }
            b':' => {
                let size = self.until(b':');
                Token::SetSize((!size.is_empty()).then(|| atof(&String::from_utf8_lossy(size))))
            }
            b';' => {
                let spec = self.until(b';');
                Token::SetColor(if spec.is_empty() {
                    ColorChange::Reset
                } else {
                    parse_color(spec)
                })
            }
            b'!' => {
                let first = self.character();
                let second = self.character();
                Token::ComposeChar(first, second)
            }
            _ => {
                // Not an escape, the text resumes after the `@`.
                self.pos -= 1;
                self.text()
            }
        };

        Some(token)
    }
}

/// Parse `r/g/b` or `gray` in `0..=255`, optionally followed by `@` and a
/// transparency in percent.
fn parse_color(spec: &[u8]) -> ColorChange {
    let Ok(spec) = core::str::from_utf8(spec) else {
        return ColorChange::Bad;
    };

    let (rgb, alpha) = match spec.split_once('@') {
        Some((rgb, pct)) => (rgb, atof(pct) / 100.0),
        None => (spec, 0.0),
    };

    let parts: Result<Vec<f64>, _> = rgb.split('/').map(|p| p.trim().parse::<f64>()).collect();
    let Ok(mut parts) = parts else {
        return ColorChange::Bad;
    };

    for p in &mut parts {
        *p /= 255.0;
        if !(0.0..=1.0).contains(p) {
            return ColorChange::Bad;
        }
    }

    match parts.as_slice() {
        &[gray] => ColorChange::Set(Rgba::gray(gray).with_alpha(alpha)),
        &[r, g, b] => ColorChange::Set(Rgba::new(r, g, b).with_alpha(alpha)),
        _ => ColorChange::Bad,
    }
}

/// Which toggles of the escape language are switched on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Toggles {
    pub(crate) symbol: bool,
    pub(crate) font: bool,
    pub(crate) size: bool,
    pub(crate) color: bool,
    pub(crate) sub: bool,
    pub(crate) sup: bool,
    pub(crate) small_caps: bool,
    pub(crate) underline: bool,
}

impl Toggles {
    /// Flip the toggle that `token` controls.
    pub(crate) fn apply(&mut self, token: &Token<'_>) {
        match token {
            Token::ToggleSymbol => self.symbol = !self.symbol,
            Token::SwitchFont(_) => self.font = !self.font,
            Token::SetSize(_) => self.size = !self.size,
            Token::SetColor(_) => self.color = !self.color,
            Token::ToggleSub => self.sub = !self.sub,
            Token::ToggleSuper => self.sup = !self.sup,
            Token::ToggleSmallCaps => self.small_caps = !self.small_caps,
            Token::ToggleUnderline => self.underline = !self.underline,
            Token::Text(_) | Token::ComposeChar(..) | Token::Literal(_) => {}
        }
    }

    /// Warn about every toggle that was left on at the end of `text`.
    /// Returns whether any was.
    pub(crate) fn warn_open(&self, text: &str) -> bool {
        let open = [
            (self.sub, "sub-scripting"),
            (self.sup, "super-scripting"),
            (self.small_caps, "small-caps"),
            (self.symbol, "symbol font change"),
            (self.size, "font-size change"),
            (self.color, "font-color change"),
            (self.underline, "text underline"),
        ];

        for (on, what) in open {
            if on {
                lwarn!("{} not terminated [{}]", what, text);
            }
        }

        open.iter().any(|(on, _)| *on) || self.font
    }
}
