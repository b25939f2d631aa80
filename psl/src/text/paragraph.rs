//! Breaking paragraphs into typeset words.

use super::prepare::{PreparedText, TextMode, prepare_text};
use super::tokenizer::{ColorChange, Token, Tokenizer, Toggles};
use crate::color::Rgba;
use crate::font::{Encoding, FontTable, SYMBOL_FONT};
use rustc_hash::FxHashMap;

/// The word is followed by one space.
pub(crate) const ONE_SPACE: u8 = 1;
/// The word is followed by two spaces.
pub(crate) const TWO_SPACES: u8 = 2;
/// The word is indented by a tab.
pub(crate) const TAB: u8 = 4;
/// The first character of a composite.
pub(crate) const COMPOSITE_1: u8 = 8;
/// The second character of a composite.
pub(crate) const COMPOSITE_2: u8 = 16;
/// The word is underlined.
pub(crate) const UNDERLINE: u8 = 32;
/// Every flag except the number of spaces.
const NO_SPACES: u8 = TAB | COMPOSITE_1 | COMPOSITE_2 | UNDERLINE;

/// Relative sizes and offsets of subscripts, superscripts and small caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FontDims {
    /// Size of sub- and superscripts relative to the font size.
    pub(crate) subsup: f64,
    /// Size of small caps relative to the font size.
    pub(crate) scaps: f64,
    /// Superscript shift after lower case letters.
    pub(crate) sup_up_lc: f64,
    /// Superscript shift after upper case letters.
    pub(crate) sup_up_uc: f64,
    /// Subscript shift.
    pub(crate) sub_down: f64,
}

impl Default for FontDims {
    fn default() -> Self {
        Self {
            subsup: 0.7,
            scaps: 0.85,
            sup_up_lc: 0.35,
            sup_up_uc: 0.35,
            sub_down: 0.25,
        }
    }
}

/// A run of text with uniform attributes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Word {
    pub(crate) text: Vec<u8>,
    pub(crate) font: usize,
    /// Font size in device units.
    pub(crate) size: i32,
    /// Baseline shift in device units.
    pub(crate) baseshift: i32,
    pub(crate) flag: u8,
    pub(crate) color: Rgba,
}

impl Word {
    #[cfg(test)]
    fn spaces(&self) -> u8 {
        self.flag & (ONE_SPACE | TWO_SPACES)
    }

    fn set_spaces(&mut self, spaces: u8) {
        self.flag = (self.flag & NO_SPACES) | spaces;
    }
}

/// Everything that controls how a paragraph is broken into words.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParagraphStyle {
    pub(crate) font: usize,
    pub(crate) color: Rgba,
    /// Device units per point.
    pub(crate) dots_per_point: f64,
    pub(crate) dims: FontDims,
    pub(crate) encoding: Encoding,
    pub(crate) mode: TextMode,
}

/// A paragraph broken into words, with its distinct fonts and colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Paragraph {
    pub(crate) words: Vec<Word>,
    /// The distinct fonts in order of first use.
    pub(crate) fonts: Vec<usize>,
    /// The index into `fonts` of each word.
    pub(crate) font_index: Vec<usize>,
    /// The distinct colors in order of first use.
    pub(crate) colors: Vec<Rgba>,
    /// The index into `colors` of each word.
    pub(crate) color_index: Vec<usize>,
    /// Fonts referenced by escapes.
    pub(crate) used_fonts: Vec<usize>,
}

struct State {
    font: usize,
    old_font: usize,
    size: f64,
    color: Rgba,
    last_color: Rgba,
    toggles: Toggles,
}

impl State {
    fn word(&self, text: &[u8], flag: u8, style: &ParagraphStyle) -> Word {
        let tabs = text.iter().take_while(|&&c| c == b'\t').count();
        let text = &text[tabs..];
        let fs = self.size * style.dots_per_point;
        let t = &self.toggles;

        let (size, baseshift, text) = if t.small_caps {
            let upper = text.to_ascii_uppercase();
            ((style.dims.scaps * fs).round(), 0.0, upper)
        } else if t.sup {
            (
                (style.dims.subsup * fs).round(),
                (style.dims.sup_up_lc * fs).round(),
                text.to_vec(),
            )
        } else if t.sub {
            (
                (style.dims.subsup * fs).round(),
                (-style.dims.sub_down * fs).round(),
                text.to_vec(),
            )
        } else {
            (fs.round(), 0.0, text.to_vec())
        };

        let mut flag = flag;
        if tabs > 0 {
            flag |= TAB;
        }
        if t.underline {
            flag |= UNDERLINE;
        }

        Word {
            text,
            font: self.font,
            size: size as i32,
            baseshift: baseshift as i32,
            flag,
            color: self.color,
        }
    }
}

/// Split `text` into the words of one or more paragraphs.
///
/// Words are separated by spaces, and a word ending in `\r` ends a
/// paragraph. Escapes split words further into runs with uniform font, size,
/// color and baseline.
pub(crate) fn process_paragraph(
    text: &str,
    fontsize: f64,
    style: &ParagraphStyle,
    fonts: &FontTable,
) -> Paragraph {
    let mut raw: Vec<&[u8]> = vec![];

    for word in text.as_bytes().split(|&c| c == b' ').filter(|w| !w.is_empty()) {
        match word.strip_suffix(b"\r") {
            Some(word) => {
                raw.push(word);
                raw.push(b"");
            }
            None => raw.push(word),
        }
    }

    let mut state = State {
        font: style.font,
        old_font: style.font,
        size: fontsize,
        color: style.color,
        last_color: Rgba::BLACK,
        toggles: Toggles::default(),
    };

    let mut words: Vec<Word> = vec![];
    let mut used_fonts = vec![];

    for raw_word in raw {
        let PreparedText {
            text: clean,
            fonts: referenced,
        } = prepare_text(raw_word, style.encoding, style.mode, fonts);
        used_fonts.extend(referenced);

        if memchr::memchr(b'@', &clean).is_none() {
            words.push(state.word(&clean, ONE_SPACE, style));
            continue;
        }

        for token in Tokenizer::new(&clean) {
            state.toggles.apply(&token);

            match token {
                Token::Text(text) => words.push(state.word(text, 0, style)),
                Token::Literal(c) => words.push(state.word(&[c], 0, style)),
                Token::ComposeChar(first, second) => {
                    words.push(state.word(first, COMPOSITE_1, style));
                    words.push(state.word(second, COMPOSITE_2, style));
                }
                Token::ToggleSymbol => {
                    state.font = if state.font == SYMBOL_FONT {
                        state.old_font
                    } else {
                        SYMBOL_FONT
                    };
                }
                Token::SwitchFont(None) => state.font = state.old_font,
                Token::SwitchFont(Some(name)) => {
                    state.old_font = state.font;
                    state.font = fonts.resolve(name).unwrap_or(state.font);
                }
                Token::SetSize(size) => state.size = size.unwrap_or(fontsize),
                Token::SetColor(ColorChange::Reset) => state.color = state.last_color,
                Token::SetColor(ColorChange::Set(color)) => {
                    state.last_color = state.color;
                    state.color = color;
                }
                Token::SetColor(ColorChange::Bad) => {
                    lwarn!("bad color change in paragraph, ignored");
                }
                Token::ToggleSub
                | Token::ToggleSuper
                | Token::ToggleSmallCaps
                | Token::ToggleUnderline => {}
            }
        }

        // The word as a whole is followed by a space.
        if let Some(last) = words.last_mut() {
            last.set_spaces(ONE_SPACE);
        }
    }

    state.toggles.warn_open(text);

    while words.last().is_some_and(|w| w.text.is_empty()) {
        words.pop();
    }

    if words.is_empty() {
        return Paragraph {
            used_fonts,
            ..Paragraph::default()
        };
    }

    for i in 1..words.len() {
        let ends_sentence = words[i - 1].text.last() == Some(&b'.');
        if ends_sentence && words[i].text.first().is_some_and(u8::is_ascii_uppercase) {
            words[i - 1].set_spaces(TWO_SPACES);
        }
        // No space around a paragraph break.
        if words[i].text.is_empty() {
            words[i - 1].set_spaces(0);
            words[i].set_spaces(0);
        }
    }

    if let Some(last) = words.last_mut() {
        last.set_spaces(0);
    }

    let (colors, color_index) = dedup(words.iter().map(|w| w.color), |c: &Rgba| {
        [c.r.to_bits(), c.g.to_bits(), c.b.to_bits()]
    });
    let (fonts, font_index) = dedup(words.iter().map(|w| w.font), |&f| f);

    Paragraph {
        words,
        fonts,
        font_index,
        colors,
        color_index,
        used_fonts,
    }
}

/// The distinct items in order of first appearance, and the index of each
/// item among them.
fn dedup<T: Copy, K: core::hash::Hash + Eq>(
    items: impl Iterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> (Vec<T>, Vec<usize>) {
    let mut seen = FxHashMap::default();
    let mut unique = vec![];
    let mut index = vec![];

    for item in items {
        let i = *seen.entry(key(&item)).or_insert_with(|| {
            unique.push(item);
            unique.len() - 1
        });
        index.push(i);
    }

    (unique, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> ParagraphStyle {
        ParagraphStyle {
            font: 0,
            color: Rgba::BLACK,
            dots_per_point: 1200.0 / 72.0,
            dims: FontDims::default(),
            encoding: Encoding::Standard,
            mode: TextMode::Hyphen,
        }
    }

    fn process(text: &str) -> Paragraph {
        process_paragraph(text, 12.0, &style(), &FontTable::new(&[]))
    }

    #[test]
    fn sentence_spacing_and_small_caps() {
        let p = process("Hello. @#World@#");
        assert_eq!(p.words.len(), 2);
        assert_eq!(p.words[0].text, b"Hello.");
        assert_eq!(p.words[0].spaces(), 2);
        assert_eq!(p.words[1].text, b"WORLD");
        assert_eq!(p.words[1].size, 170);
        assert_eq!(p.words[1].spaces(), 0);
    }

    #[test]
    fn words_and_breaks() {
        let p = process("one  two\r three");
        let texts: Vec<&[u8]> = p.words.iter().map(|w| w.text.as_slice()).collect();
        assert_eq!(texts, vec![&b"one"[..], b"two", b"", b"three"]);
        assert_eq!(p.words[0].spaces(), 1);
        assert_eq!(p.words[1].spaces(), 0);
        assert_eq!(p.words[2].spaces(), 0);
        assert_eq!(p.words[0].size, 200);
    }

    #[test]
    fn escapes_split_words() {
        let p = process("H@-2@-O is@+x@+");
        let texts: Vec<&[u8]> = p.words.iter().map(|w| w.text.as_slice()).collect();
        assert_eq!(texts, vec![&b"H"[..], b"2", b"O", b"is", b"x"]);
        assert_eq!(p.words[1].baseshift, -50);
        assert_eq!(p.words[1].size, 140);
        assert_eq!(p.words[2].spaces(), 1);
        assert_eq!(p.words[4].baseshift, 70);
    }

    #[test]
    fn distinct_fonts_and_colors() {
        let p = process("a @;255/0/0;b@;; @%Times-Roman%c@%% d");
        assert_eq!(p.fonts, vec![0, 4]);
        assert_eq!(p.font_index, vec![0, 0, 1, 0]);
        assert_eq!(p.colors, vec![Rgba::BLACK, Rgba::new(1.0, 0.0, 0.0)]);
        assert_eq!(p.color_index, vec![0, 1, 0, 0]);
        assert_eq!(p.used_fonts, vec![4]);
    }

    #[test]
    fn composite() {
        let p = process("@!o/");
        assert_eq!(p.words.len(), 2);
        assert_eq!(p.words[0].flag, COMPOSITE_1);
        assert_eq!(p.words[1].flag, COMPOSITE_2);
    }

    #[test]
    fn unterminated_toggle() {
        let p = process("x@+2");
        assert_eq!(p.words.len(), 2);
        assert_eq!(p.words[1].size, 140);
    }

    #[test]
    fn empty() {
        assert!(process("   ").words.is_empty());
    }
}
