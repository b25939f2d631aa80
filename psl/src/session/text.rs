//! Text: single lines with escapes, text boxes and paragraphs.

use super::Session;
use crate::color::{Paint, Rgba};
use crate::error::{Error, Result};
use crate::font::SYMBOL_FONT;
use crate::num::g3;
use crate::path::DevicePoint;
use crate::resources;
use crate::text::paragraph::{ParagraphStyle, process_paragraph};
use crate::text::prepare::{PreparedText, prepare_text};
use crate::text::tokenizer::{ColorChange, Token, Tokenizer, Toggles};
use std::io::Write;

/// The longest text accepted by a single call.
const MAX_TEXT: usize = 4096;

/// The justification operators of plain text, by justification code.
const JUSTIFY_OPS: [&str; 12] = [
    "", "bl ", "bc ", "br ", "", "ml ", "mc ", "mr ", "", "tl ", "tc ", "tr ",
];

/// Offsets for left, center and right (or bottom, middle and top) alignment.
const ALIGN: [&str; 3] = ["0", "-2 div", "neg"];

/// The operators that paint a piece of text, by text mode.
const PAINT_OPS: [&str; 4] = [
    "Z",
    "false charpath fs",
    "false charpath fs",
    "false charpath V S U fs",
];

/// The outline of a box behind a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxShape {
    /// Straight corners.
    #[default]
    Straight,
    /// Rounded corners.
    Rounded,
    /// Sides that bulge outward.
    Convex,
    /// Sides that curve inward.
    Concave,
}

/// What a text measurement leaves behind.
#[derive(Debug, Clone, Copy)]
enum Measure<'a> {
    /// Define `<name>_w`, `_h`, `_d`, `_x0` and `_x1`.
    Define(&'a str),
    /// Leave the width on the stack.
    Width,
    /// Leave the height on the stack.
    Height,
    /// Leave the width and the height on the stack.
    Both,
}

fn check_justify(justify: i32) -> Result<()> {
    if justify > 11 || (justify != 0 && justify % 4 == 0) {
        lwarn!("bad text justification ({})", justify);
        return Err(Error::BadJustify);
    }

    Ok(())
}

fn check_length(text: &str) -> Result<()> {
    if text.len() >= MAX_TEXT - 1 {
        lwarn!("text item longer than {} bytes, not plotted", MAX_TEXT);
        return Err(Error::BadText);
    }

    Ok(())
}

/// Strip blanks around `text` when `justify` asks for it, and return the
/// justification without that request.
fn strip(text: &str, justify: i32) -> (&str, i32) {
    if justify < 0 {
        (text.trim_matches(' '), -justify)
    } else {
        (text, justify)
    }
}

/// Whether `text` has a subscript directly followed by a superscript, or
/// the other way around, so that the second is stacked above the first.
fn stacks_scripts(text: &[u8]) -> bool {
    text.windows(4).any(|w| w == b"@-@+" || w == b"@+@-")
}

impl<W: Write> Session<W> {
    fn put_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Reencode `font` with the session encoding the first time it is used.
    pub(crate) fn encode_font(&mut self, font: usize) -> Result<()> {
        if self.fonts.is_encoded(font) {
            return Ok(());
        }

        let encoding = self.config.encoding.name();
        let name = self.fonts.name(font).to_string();
        write!(
            self.out,
            "PSL_font_encode {font} get 0 eq {{{encoding}_Encoding /{name} /{name} PSL_reencode PSL_font_encode {font} 1 put}} if"
        )?;
        self.put_str(if self.config.comments {
            "\t% Set this font\n"
        } else {
            "\n"
        });
        self.fonts.mark_encoded(font);

        Ok(())
    }

    /// Select the current font at `size` points.
    fn put_font(&mut self, size: f64) -> Result<()> {
        if size == self.state.font_size {
            return Ok(());
        }

        self.state.font_size = size;
        writeln!(self.out, "{} F{}", self.ip(size), self.state.font)?;

        Ok(())
    }

    /// Write the reencoding flags and the font selection procedures.
    pub(crate) fn def_font_encoding(&mut self) -> Result<()> {
        let n = self.fonts.len();
        self.put_str("/PSL_font_encode ");
        for _ in 0..n {
            self.put_str("0 ");
        }
        write!(self.out, "{n} array astore def")?;
        self.put_str(if self.config.comments {
            "\t% Initially zero\n"
        } else {
            "\n"
        });

        for i in 0..n {
            let name = self.fonts.name(i).to_string();
            writeln!(self.out, "/F{i} {{/{name} Y}}!")?;
        }

        Ok(())
    }

    fn prepare(&mut self, text: &str) -> Result<PreparedText> {
        let prepared = prepare_text(
            text.as_bytes(),
            self.config.encoding,
            self.state.text_mode,
            &self.fonts,
        );

        self.encode_font(self.state.font)?;
        for &font in &prepared.fonts {
            self.encode_font(font)?;
        }

        Ok(prepared)
    }

    /// Write the pieces of a text with escapes, each painted with `op`.
    ///
    /// Fonts, sizes and baseline shifts change between pieces. When `show`
    /// is false the text is only laid out as a path for measuring, so color
    /// changes, underlines and composite characters are left out.
    fn write_pieces(&mut self, text: &[u8], fontsize: f64, op: &str, show: bool) -> Result<Toggles> {
        let sep = if show { "\n" } else { " " };
        let dims = self.state.font_dims;
        let stacked = stacks_scripts(text);

        let mut tokens = Tokenizer::new(text).peekable();
        let mut toggles = Toggles::default();
        let mut font = self.state.font;
        let mut old_font = font;
        let mut base = fontsize;
        let mut size = fontsize;
        let mut upper_case = false;
        let (mut last_sub, mut last_sup) = (false, false);
        let mut previous: Vec<u8> = vec![];
        let mut color = Rgba::BLACK;
        let mut last_color = Rgba::BLACK;

        if !text.starts_with(b"@")
            && let Some(Token::Text(first)) = tokens.next()
        {
            self.put_str("(");
            self.put_bytes(first);
            write!(self.out, ") {op}{sep}")?;
            upper_case = !first.last().is_some_and(u8::is_ascii_lowercase);
        }

        while let Some(token) = tokens.next() {
            toggles.apply(&token);
            let next: &[u8] = match tokens.peek() {
                Some(Token::Text(t)) => t,
                _ => b"",
            };
            let small = dims.subsup * base;

            match token {
                Token::Text(_) | Token::Literal(_) => {
                    let piece = match token {
                        Token::Text(t) if toggles.small_caps => t.to_ascii_uppercase(),
                        Token::Text(t) => t.to_vec(),
                        Token::Literal(b) => vec![b],
                        _ => vec![],
                    };
                    if last_sub && last_sup {
                        self.put_str("/PSL_last_width PSL_last_width (");
                        self.put_bytes(&previous);
                        self.put_str(") sw sub dup 0 lt {pop 0} if def\nPSL_last_width 0 G ");
                        last_sub = false;
                        last_sup = false;
                    }
                    write!(self.out, "{} F{font} (", self.ip(size))?;
                    self.put_bytes(&piece);
                    write!(self.out, ") {op}{sep}")?;
                    if !toggles.sup {
                        upper_case = !piece.last().is_some_and(u8::is_ascii_lowercase);
                    }
                }
                Token::ComposeChar(first, second) => {
                    if show {
                        write!(self.out, "{} F{font} (", self.ip(size))?;
                        self.put_bytes(second);
                        write!(self.out, ") E exch {op} -2 div dup 0 G\n(")?;
                        self.put_bytes(first);
                        writeln!(
                            self.out,
                            ") E -2 div dup 0 G exch {op} sub neg dup 0 lt {{pop 0}} if 0 G"
                        )?;
                    }
                }
                Token::ToggleSymbol => {
                    font = if font == SYMBOL_FONT {
                        old_font
                    } else {
                        SYMBOL_FONT
                    };
                }
                Token::SwitchFont(None) => font = old_font,
                Token::SwitchFont(Some(name)) => {
                    old_font = font;
                    font = self.fonts.resolve(name).unwrap_or(font);
                }
                Token::ToggleSub | Token::ToggleSuper => {
                    let sub = matches!(token, Token::ToggleSub);
                    let (on, other_done) = if sub {
                        (toggles.sub, last_sup)
                    } else {
                        (toggles.sup, last_sub)
                    };

                    if on {
                        if other_done {
                            self.put_str("PSL_last_width neg 0 G ");
                        } else if stacked {
                            write!(self.out, "/PSL_last_width {} F{font} (", self.ip(small))?;
                            self.put_bytes(next);
                            self.put_str(") sw def\n");
                        }
                        if !next.is_empty() {
                            previous = next.to_vec();
                        }
                    } else {
                        let done = (other_done || next.is_empty()) && stacked;
                        if sub {
                            last_sub = done;
                        } else {
                            last_sup = done;
                        }
                    }

                    size = if on { small } else { base };
                    let step = if sub {
                        -self.ip(dims.sub_down * base)
                    } else if upper_case {
                        self.ip(dims.sup_up_uc * base)
                    } else {
                        self.ip(dims.sup_up_lc * base)
                    };
                    let dy = if on { step } else { -step };
                    write!(self.out, "0 {dy} G ")?;
                }
                Token::ToggleSmallCaps => {
                    size = if toggles.small_caps {
                        dims.scaps * base
                    } else {
                        base
                    };
                }
                Token::SetSize(new) => {
                    base = new.unwrap_or(fontsize);
                    size = base;
                }
                Token::SetColor(change) => {
                    if !show {
                        continue;
                    }
                    match change {
                        ColorChange::Reset => {
                            let c = self.color(&Paint::Color(last_color));
                            write!(self.out, "{c} ")?;
                            color = last_color;
                        }
                        ColorChange::Set(new) => {
                            let c = self.color(&Paint::Color(new));
                            write!(self.out, "{c} ")?;
                            last_color = color;
                            color = new;
                        }
                        ColorChange::Bad => lwarn!("bad color change in text, ignored"),
                    }
                }
                Token::ToggleUnderline => {
                    if !show {
                        continue;
                    }
                    if toggles.underline {
                        self.put_str("currentpoint /y0_u edef /x0_u edef\n");
                    } else {
                        writeln!(
                            self.out,
                            "V {} W currentpoint pop /x1_u edef x0_u y0_u {} sub M x1_u x0_u sub 0 D S x1_u y0_u M U",
                            self.ip(0.025 * base),
                            self.ip(0.075 * base)
                        )?;
                    }
                }
            }
        }

        Ok(toggles)
    }

    /// Lay out prepared text as a path and keep its dimensions.
    fn measure(&mut self, text: &[u8], fontsize: f64, measure: Measure<'_>) -> Result<()> {
        self.put_font(fontsize)?;

        if memchr::memchr(b'@', text).is_none() {
            self.put_str("(");
            self.put_bytes(text);
            match measure {
                Measure::Define(n) => writeln!(
                    self.out,
                    ") V MU 0 0 M E /{n}_w edef FP pathbbox N /{n}_h edef /{n}_x1 edef /{n}_d edef /{n}_x0 edef U"
                )?,
                Measure::Width => self.put_str(") sw "),
                Measure::Height => self.put_str(") sh "),
                Measure::Both => self.put_str(") sb "),
            }
            return Ok(());
        }

        self.put_str("V MU 0 0 M ");
        let toggles = self.write_pieces(text, fontsize, "FP", false)?;
        match measure {
            Measure::Width => self.put_str("pathbbox N pop exch pop add U "),
            Measure::Height => self.put_str("pathbbox N 4 1 roll pop pop pop U "),
            Measure::Both => self.put_str("pathbbox N 4 1 roll exch pop add exch U "),
            Measure::Define(n) => writeln!(
                self.out,
                "pathbbox N /{n}_h edef /{n}_x1 edef /{n}_d edef /{n}_x0 edef /{n}_w {n}_x1 {n}_x0 add def U"
            )?,
        }
        toggles.warn_open(&String::from_utf8_lossy(text));

        Ok(())
    }

    /// Define `<name>_w`, `<name>_h`, `<name>_d`, `<name>_x0` and
    /// `<name>_x1` as the dimensions of `text` at `fontsize` points.
    pub fn def_text_dim(&mut self, name: &str, fontsize: f64, text: &str) -> Result<()> {
        check_length(text)?;
        let prepared = self.prepare(text)?;

        self.measure(&prepared.text, fontsize, Measure::Define(name))
    }

    /// Write a single line of text at `(x, y)`.
    ///
    /// `justify` selects the reference point of the text, from 1 (bottom
    /// left) to 11 (top right); a negative value also strips surrounding
    /// blanks. A negative `fontsize` continues at the current point, and
    /// `None` text shows the text of the last [`Session::plot_text_box`].
    /// `mode` 0 fills the glyphs, 1 and 3 outline them, 2 prepares a path
    /// for a pattern fill.
    pub fn plot_text(
        &mut self,
        x: f64,
        y: f64,
        fontsize: f64,
        text: Option<&str>,
        angle: f64,
        justify: i32,
        mode: i32,
    ) -> Result<()> {
        if fontsize == 0.0 {
            return Ok(());
        }
        let op = usize::try_from(mode)
            .ok()
            .and_then(|m| PAINT_OPS.get(m))
            .copied()
            .ok_or(Error::BadFlag)?;

        let (raw, justify) = match text {
            Some(text) => {
                check_length(text)?;
                let (text, justify) = strip(text, justify);
                (text.to_string(), justify)
            }
            None => (self.state.last_text.clone(), justify.abs()),
        };
        check_justify(justify)?;

        let fontsize = if fontsize > 0.0 {
            let (ix, iy) = (self.ix(x), self.iy(y));
            self.state.point = DevicePoint::new(ix, iy);
            write!(self.out, "{ix} {iy} M ")?;
            fontsize
        } else {
            -fontsize
        };

        let prepared = self.prepare(&raw)?;
        self.put_font(fontsize)?;

        let rotated = angle != 0.0;
        if rotated {
            write!(self.out, "V {} R ", g3(angle))?;
        }

        if !prepared.has_escapes() {
            self.put_str("(");
            self.put_bytes(&prepared.text);
            write!(self.out, ") {}{op}", JUSTIFY_OPS[justify as usize])?;
            match mode {
                1 => self.put_str(" S"),
                2 | 3 => self.put_str(" N"),
                _ => {}
            }
            self.put_str(if rotated { " U\n" } else { "\n" });
            return Ok(());
        }

        if justify > 1 {
            let x_just = ((justify + 3) % 4) as usize;
            let y_just = (justify / 4) as usize;
            if x_just != 0 && y_just != 0 {
                self.measure(&prepared.text, fontsize, Measure::Both)?;
                writeln!(self.out, "{} exch {} exch G", ALIGN[y_just], ALIGN[x_just])?;
            } else if x_just != 0 {
                self.measure(&prepared.text, fontsize, Measure::Width)?;
                writeln!(self.out, "{} 0 G", ALIGN[x_just])?;
            } else {
                self.measure(&prepared.text, fontsize, Measure::Height)?;
                writeln!(self.out, "{} 0 exch G", ALIGN[y_just])?;
            }
        }

        let toggles = self.write_pieces(&prepared.text, fontsize, op, true)?;
        match mode {
            1 => self.put_str("S\n"),
            2 | 3 => self.put_str("N\n"),
            _ => {}
        }
        if rotated {
            self.put_str("U\n");
        }
        self.state.font_size = 0.0;
        toggles.warn_open(&raw);

        Ok(())
    }

    /// Draw the box that a later [`Session::plot_text`] with `None` text
    /// fills, using the current fill and outline. `offset` is the clearance
    /// around the text; `rounded` rounds the corners when both clearances
    /// are positive.
    pub fn plot_text_box(
        &mut self,
        x: f64,
        y: f64,
        fontsize: f64,
        text: &str,
        angle: f64,
        justify: i32,
        offset: [f64; 2],
        rounded: bool,
    ) -> Result<()> {
        if fontsize == 0.0 {
            return Ok(());
        }
        check_length(text)?;
        let (text, justify) = strip(text, justify);
        check_justify(justify)?;

        let new_anchor = fontsize > 0.0;
        let fontsize = fontsize.abs();
        let [dx, dy] = offset;
        let rounded = rounded && dx > 0.0 && dy > 0.0;

        self.annotate(format_args!("PSL_plottextbox begin:\n"))?;
        self.encode_font(self.state.font)?;
        self.put_font(fontsize)?;
        self.put_str("V\n");

        self.def_text_dim("PSL_dim", fontsize, text)?;
        self.def_units("PSL_dx", dx)?;
        self.def_units("PSL_dy", dy)?;

        if new_anchor {
            let (ix, iy) = (self.ix(x), self.iy(y));
            self.state.point = DevicePoint::new(ix, iy);
            write!(self.out, "{ix} {iy} T ")?;
        }
        if angle != 0.0 {
            write!(self.out, "{} R ", g3(angle))?;
        }
        if justify > 1 {
            let x_just = ((justify + 3) % 4) as usize;
            let y_just = (justify / 4) as usize;
            if x_just != 0 {
                write!(self.out, "PSL_dim_w {} ", ALIGN[x_just])?;
            } else {
                self.put_str("0 ");
            }
            if y_just != 0 {
                write!(self.out, "PSL_dim_h {} ", ALIGN[y_just])?;
            } else {
                self.put_str("0 ");
            }
            self.put_str("T\n");
        }

        self.put_str(
            "PSL_dim_h PSL_dim_d sub PSL_dy 2 mul add PSL_dim_x1 PSL_dim_x0 sub PSL_dx 2 mul add ",
        );
        if rounded {
            writeln!(
                self.out,
                "{} PSL_dim_x0 PSL_dx sub PSL_dim_d PSL_dy sub SB",
                self.iz(dx.min(dy))
            )?;
        } else {
            self.put_str("PSL_dim_x0 PSL_dx sub PSL_dim_d PSL_dy sub Sb\n");
        }
        self.put_str("U\n");
        self.annotate(format_args!("PSL_plottextbox end:\n"))?;
        self.state.last_text = text.to_string();

        Ok(())
    }

    /// Set the line spacing, the width and the alignment of paragraphs.
    /// `justify` is 1 (left), 2 (center), 3 (right) or 4 (justified).
    pub fn set_paragraph(&mut self, line_space: f64, width: f64, justify: i32) -> Result<()> {
        if !(1..=4).contains(&justify) {
            lwarn!("bad paragraph justification ({})", justify);
            return Err(Error::BadJustify);
        }
        if line_space <= 0.0 {
            lwarn!("bad line spacing ({})", line_space);
            return Err(Error::BadValue);
        }
        if width <= 0.0 {
            lwarn!("bad paragraph width ({})", width);
            return Err(Error::BadValue);
        }

        self.annotate(format_args!("PSL_setparagraph settings:\n"))?;
        self.def_units("PSL_linespace", line_space)?;
        self.def_units("PSL_parwidth", width)?;
        writeln!(self.out, "/PSL_parjust {justify} def")?;

        Ok(())
    }

    fn comment_or_newline(&mut self, comment: &str) {
        if self.config.comments {
            self.put_str("\t% ");
            self.put_str(comment);
        }
        self.put_str("\n");
    }

    /// Write the word arrays of a paragraph. Returns false when the
    /// paragraph has no words and nothing was written.
    fn define_paragraph(&mut self, y: f64, fontsize: f64, text: &str) -> Result<bool> {
        let fill = match self.state.stroke {
            Some(Paint::Color(c)) => c,
            _ => Rgba::BLACK,
        };
        let style = ParagraphStyle {
            font: self.state.font,
            color: fill,
            dots_per_point: self.transform.dots_per_point(),
            dims: self.state.font_dims,
            encoding: self.config.encoding,
            mode: self.state.text_mode,
        };
        let paragraph = process_paragraph(text, fontsize, &style, &self.fonts);

        self.encode_font(self.state.font)?;
        for &font in paragraph.used_fonts.iter().chain(&paragraph.fonts) {
            self.encode_font(font)?;
        }

        let n = paragraph.words.len();
        if n == 0 {
            ldebug!("paragraph without words, nothing to place");
            return Ok(false);
        }

        if !self.state.text_init {
            resources::bulkcopy(resources::TEXT, self.config.comments, &mut self.out);
            self.state.text_init = true;
        }

        self.annotate(format_args!("PSL_plotparagraph begin:\n"))?;
        self.annotate(format_args!("Define array of fonts:\n"))?;
        self.put_str("/PSL_fontname\n");
        for &font in &paragraph.fonts {
            let name = self.fonts.name(font).to_string();
            writeln!(self.out, "/{name}")?;
        }
        writeln!(self.out, "{} array astore def", paragraph.fonts.len())?;

        self.annotate(format_args!("Initialize variables:\n"))?;
        writeln!(self.out, "/PSL_n {n} def\n/PSL_n1 {} def", n - 1)?;
        self.def_units("PSL_y0", y)?;
        self.put_str("/PSL_spaces [() ( ) (  ) ] def\n");
        self.put_str("/PSL_lastfn -1 def\n/PSL_lastfz -1 def\n/PSL_lastfc -1 def\n");
        self.put_str("/PSL_UL 0 def\n/PSL_show {ashow} def\n");

        self.annotate(format_args!("Define array of words:\n"))?;
        self.put_str("/PSL_word");
        let mut column = 0;
        for word in &paragraph.words {
            self.put_str(if column == 0 { "\n(" } else { " (" });
            self.put_bytes(&word.text);
            self.put_str(")");
            column += word.text.len() + 1;
            if column >= 60 {
                column = 0;
            }
        }
        writeln!(self.out, "\n{n} array astore def")?;

        let arrays: [(&str, &str, usize, Vec<i64>); 5] = [
            (
                "Define array of word font numbers:\n",
                "PSL_fnt",
                25,
                paragraph.font_index.iter().map(|&i| i as i64).collect(),
            ),
            (
                "Define array of word fontsizes:\n",
                "PSL_size",
                15,
                paragraph.words.iter().map(|w| i64::from(w.size)).collect(),
            ),
            (
                "Define array of word spaces to follow:\n",
                "PSL_flag",
                25,
                paragraph.words.iter().map(|w| i64::from(w.flag)).collect(),
            ),
            (
                "Define array of word baseline shifts:\n",
                "PSL_bshift",
                25,
                paragraph
                    .words
                    .iter()
                    .map(|w| i64::from(w.baseshift))
                    .collect(),
            ),
            (
                "Define array of word colors indices:\n",
                "PSL_color",
                25,
                paragraph.color_index.iter().map(|&i| i as i64).collect(),
            ),
        ];
        for (comment, name, per_line, values) in arrays {
            self.annotate(format_args!("{comment}"))?;
            write!(self.out, "/{name}")?;
            for (i, v) in values.iter().enumerate() {
                let sep = if i % per_line == 0 { '\n' } else { ' ' };
                write!(self.out, "{sep}{v}")?;
            }
            writeln!(self.out, "\n{n} array astore def")?;
        }

        self.annotate(format_args!("Define array of word colors:\n"))?;
        self.put_str("/PSL_rgb\n");
        for c in &paragraph.colors {
            writeln!(self.out, "{} {} {}", g3(c.r), g3(c.g), g3(c.b))?;
        }
        writeln!(self.out, "{} array astore def", 3 * paragraph.colors.len())?;

        self.annotate(format_args!("Define array of word widths:\n"))?;
        writeln!(self.out, "/PSL_width {n} array def")?;
        self.put_str("/PSL_max_word_width 0 def\n0 1 PSL_n1 {");
        self.comment_or_newline("Determine word width given the font and fontsize for each word");
        self.put_str("  /i edef");
        self.comment_or_newline("Loop index i");
        self.put_str("  PSL_size i get PSL_fontname PSL_fnt i get get Y");
        self.comment_or_newline("Get and set font and size");
        self.put_str("  PSL_width i PSL_word i get stringwidth pop put");
        self.comment_or_newline("Calculate and store width");
        self.put_str(
            "  PSL_width i get PSL_max_word_width gt { /PSL_max_word_width PSL_width i get def} if",
        );
        self.comment_or_newline("Keep track of widest word");
        self.put_str("} for\n");
        self.put_str("PSL_max_word_width PSL_parwidth gt { /PSL_parwidth PSL_max_word_width def } if");
        self.comment_or_newline("Auto-widen paragraph width if widest word exceeds it");

        self.annotate(format_args!("Define array of word char counts:\n"))?;
        writeln!(self.out, "/PSL_count {n} array def")?;
        self.put_str("0 1 PSL_n1 {PSL_count exch dup PSL_word exch get length put} for\n");

        self.annotate(format_args!(
            "For composite chars, set width and count to zero for 2nd char:\n"
        ))?;
        self.put_str("1 1 PSL_n1 {\n  /k edef\n  PSL_flag k get 16 and 16 eq {\n");
        self.put_str("    /k1 k 1 sub def\n    /w1 PSL_width k1 get def\n    /w2 PSL_width k get def\n");
        self.put_str("    PSL_width k1 w1 w2 gt {w1} {w2} ifelse put\n    PSL_width k 0 put\n");
        self.put_str("    PSL_count k 0 put\n  } if\n} for\n");

        Ok(true)
    }

    /// Move to the paragraph origin and make the upper left corner of its
    /// box the origin.
    fn paragraph_frame(&mut self, x: f64, y: f64, angle: f64) -> Result<()> {
        self.put_str("V ");
        self.set_origin(x, y, angle, true)?;

        Ok(())
    }

    fn paragraph_justify(&mut self, justify: i32) -> Result<()> {
        self.put_str("0 0 M\n0 PSL_textjustifier");
        self.comment_or_newline("Just get paragraph height");

        writeln!(self.out, "/PSL_justify {justify} def")?;
        self.put_str("/PSL_x0 PSL_parwidth PSL_justify 1 sub 4 mod 0.5 mul neg mul def\n");
        self.put_str(match justify {
            9.. => "/PSL_y0 0 def\n",
            5..=8 => "/PSL_y0 PSL_parheight 2 div def\n",
            _ => "/PSL_y0 PSL_parheight def\n",
        });
        self.put_str("/PSL_txt_y0 PSL_top neg def\n");
        self.put_str("PSL_x0 PSL_y0 T\n");

        Ok(())
    }

    /// Typeset one or more paragraphs with the settings of
    /// [`Session::set_paragraph`]. Paragraphs are separated by a `\r` at the
    /// end of their last word. `None` text places the paragraph defined by
    /// the last [`Session::plot_paragraph_box`].
    pub fn plot_paragraph(
        &mut self,
        x: f64,
        y: f64,
        fontsize: f64,
        text: Option<&str>,
        angle: f64,
        justify: i32,
    ) -> Result<()> {
        if fontsize == 0.0 {
            return Ok(());
        }
        check_justify(justify)?;

        if let Some(text) = text
            && !self.define_paragraph(y, fontsize, text)?
        {
            return Ok(());
        }

        self.paragraph_frame(x, y, angle)?;
        self.paragraph_justify(justify)?;

        self.put_str("0 PSL_txt_y0 T");
        self.comment_or_newline("Move to col 0 on first baseline");
        self.put_str("0 0 M\n1 PSL_textjustifier U");
        self.comment_or_newline("Place the paragraph");

        Ok(())
    }

    /// Draw the box that fits the typeset paragraph with the current fill
    /// and outline. The paragraph itself is placed by a following
    /// [`Session::plot_paragraph`] with `None` text.
    pub fn plot_paragraph_box(
        &mut self,
        x: f64,
        y: f64,
        fontsize: f64,
        text: &str,
        angle: f64,
        justify: i32,
        offset: [f64; 2],
        shape: BoxShape,
    ) -> Result<()> {
        if offset[0] < 0.0 || offset[1] < 0.0 {
            lwarn!("bad paragraph box offset ({}/{})", offset[0], offset[1]);
            return Err(Error::BadValue);
        }
        if fontsize == 0.0 {
            return Ok(());
        }
        check_justify(justify)?;

        if !self.define_paragraph(y, fontsize, text)? {
            return Ok(());
        }

        self.paragraph_frame(x, y, angle)?;
        self.def_units("PSL_xgap", offset[0])?;
        self.def_units("PSL_ygap", offset[1])?;
        self.paragraph_justify(justify)?;

        self.annotate(format_args!("Start PSL box beneath text block:\n"))?;
        match shape {
            BoxShape::Convex => {
                self.put_str("/PSL_h PSL_parheight 2 div PSL_ygap add def\n");
                self.put_str("/PSL_w PSL_parwidth 2 div PSL_xgap add def\n");
                self.put_str("/PSL_rx PSL_w PSL_w mul PSL_xgap PSL_xgap mul add 2 PSL_xgap mul div def\n");
                self.put_str("/PSL_ry PSL_h PSL_h mul PSL_ygap PSL_ygap mul add 2 PSL_ygap mul div def\n");
                self.put_str("/PSL_ax PSL_w PSL_rx PSL_xgap sub atan def\n");
                self.put_str("/PSL_ay PSL_h PSL_ry PSL_ygap sub atan def\n");
                self.annotate(format_args!("PSL_path:\n"))?;
                self.put_str("PSL_xgap neg PSL_ygap M\n");
                self.put_str("PSL_ry PSL_xgap 2 mul sub PSL_parheight 2 div neg PSL_ry 180 PSL_ay sub 180 PSL_ay add arc\n");
                self.put_str("PSL_parwidth 2 div PSL_parheight 2 PSL_ygap mul add PSL_rx sub neg PSL_rx 270 PSL_ax sub 270 PSL_ax add arc\n");
                self.put_str("PSL_parwidth PSL_xgap 2 mul add PSL_ry sub PSL_parheight 2 div neg PSL_ry PSL_ay dup neg exch arc\n");
                self.put_str("PSL_parwidth 2 div PSL_ygap 2 mul PSL_rx sub PSL_rx 90 PSL_ax sub 90 PSL_ax add arc\n");
            }
            BoxShape::Concave => {
                self.put_str("/PSL_h PSL_parheight 2 div PSL_ygap 2 mul add def\n");
                self.put_str("/PSL_w PSL_parwidth 2 div PSL_xgap 2 mul add def\n");
                self.put_str("/PSL_rx PSL_w PSL_w mul PSL_xgap PSL_xgap mul add 2 PSL_xgap mul div def\n");
                self.put_str("/PSL_ry PSL_h PSL_h mul PSL_ygap PSL_ygap mul add 2 PSL_ygap mul div def\n");
                self.put_str("/PSL_ax PSL_w PSL_rx PSL_xgap sub atan def\n");
                self.put_str("/PSL_ay PSL_h PSL_ry PSL_ygap sub atan def\n");
                self.annotate(format_args!("PSL_path:\n"))?;
                self.put_str("PSL_xgap 2 mul neg PSL_ygap 2 mul M\n");
                self.put_str("PSL_xgap PSL_ry add neg PSL_parheight 2 div neg PSL_ry PSL_ay dup neg arcn\n");
                self.put_str("PSL_parwidth 2 div PSL_parheight PSL_ygap add PSL_rx add neg PSL_rx 90 PSL_ax add 90 PSL_ax sub arcn\n");
                self.put_str("PSL_parwidth PSL_xgap add PSL_ry add PSL_parheight 2 div neg PSL_ry 180 PSL_ay add 180 PSL_ay sub arcn\n");
                self.put_str("PSL_parwidth 2 div PSL_ygap PSL_rx add PSL_rx 270 PSL_ax add 270 PSL_ax sub arcn\n");
            }
            BoxShape::Rounded => {
                self.put_str("/XL PSL_xgap neg def\n/XR PSL_parwidth PSL_xgap add def\n");
                self.put_str("/YT PSL_ygap def\n/YB PSL_parheight PSL_ygap add neg def\n");
                self.put_str("/PSL_r PSL_xgap PSL_ygap lt {PSL_xgap} {PSL_ygap} ifelse def\n");
                self.annotate(format_args!("PSL_path:\n"))?;
                self.put_str("XL PSL_r add YB M\n");
                self.put_str("XR YB XR YT PSL_r arct XR YT XL YT PSL_r arct\n");
                self.put_str("XL YT XL YB PSL_r arct XL YB XR YB PSL_r arct\n");
            }
            BoxShape::Straight => {
                self.put_str("/XL PSL_xgap neg def\n/XR PSL_parwidth PSL_xgap add def\n");
                self.put_str("/YT PSL_ygap def\n/YB PSL_parheight PSL_ygap add neg def\n");
                self.annotate(format_args!("PSL_path:\n"))?;
                self.put_str("XL YT M XL YB L XR YB L XR YT L\n");
            }
        }
        self.put_str("P FO U\n");
        self.annotate(format_args!("End PSL box beneath text block:\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Unit};

    fn session() -> Session<Vec<u8>> {
        Session::in_memory(Config::default().with_unit(Unit::Inch))
    }

    fn output(s: Session<Vec<u8>>) -> String {
        String::from_utf8_lossy(&s.finish().unwrap()).into_owned()
    }

    const ENCODE_F0: &str = "PSL_font_encode 0 get 0 eq {Standard_Encoding /Helvetica /Helvetica PSL_reencode PSL_font_encode 0 1 put} if\n";

    #[test]
    fn plain_text() {
        let mut s = session();
        s.plot_text(1.0, 1.0, 12.0, Some("Hello (World)"), 0.0, 6, 0)
            .unwrap();
        assert_eq!(
            output(s),
            format!("1200 1200 M {ENCODE_F0}200 F0\n(Hello \\(World\\)) mc Z\n")
        );
    }

    #[test]
    fn rotated_outline_text() {
        let mut s = session();
        s.plot_text(0.0, 0.0, 12.0, Some("  A  "), 30.0, -1, 1).unwrap();
        assert!(output(s).ends_with("V 30 R (A) bl false charpath fs S U\n"));
    }

    #[test]
    fn text_with_subscript() {
        let mut s = session();
        s.plot_text(0.0, 0.0, 10.0, Some("H@-2@-O"), 0.0, 1, 0).unwrap();
        let out = output(s);
        assert!(out.ends_with("(H) Z\n0 -42 G 117 F0 (2) Z\n0 42 G 167 F0 (O) Z\n"));
    }

    #[test]
    fn escaped_text_is_justified_by_measuring() {
        let mut s = session();
        s.plot_text(0.0, 0.0, 10.0, Some("@~a@~"), 0.0, 2, 0).unwrap();
        let out = output(s);
        assert!(out.contains("V MU 0 0 M 167 F12 (a) FP pathbbox N pop exch pop add U -2 div 0 G\n"));
        assert!(out.ends_with("167 F12 (a) Z\n"));
    }

    #[test]
    fn bad_text_arguments() {
        let mut s = session();
        assert_eq!(
            s.plot_text(0.0, 0.0, 10.0, Some("x"), 0.0, 4, 0),
            Err(Error::BadJustify)
        );
        assert_eq!(
            s.plot_text(0.0, 0.0, 10.0, Some("x"), 0.0, 1, 7),
            Err(Error::BadFlag)
        );
        let long = "x".repeat(MAX_TEXT);
        assert_eq!(
            s.plot_text(0.0, 0.0, 10.0, Some(&long), 0.0, 1, 0),
            Err(Error::BadText)
        );
        s.plot_text(0.0, 0.0, 0.0, Some("x"), 0.0, 1, 0).unwrap();
        assert_eq!(output(s), "");
    }

    #[test]
    fn text_dimensions() {
        let mut s = session();
        s.def_text_dim("PSL_dim", 12.0, "abc").unwrap();
        assert_eq!(
            output(s),
            format!(
                "{ENCODE_F0}200 F0\n(abc) V MU 0 0 M E /PSL_dim_w edef FP pathbbox N \
                 /PSL_dim_h edef /PSL_dim_x1 edef /PSL_dim_d edef /PSL_dim_x0 edef U\n"
            )
        );
    }

    #[test]
    fn text_box_then_text() {
        let mut s = session();
        s.plot_text_box(1.0, 1.0, 12.0, " label ", 0.0, -6, [0.1, 0.1], true)
            .unwrap();
        s.plot_text(1.0, 1.0, 12.0, None, 0.0, 6, 0).unwrap();
        let out = output(s);
        assert!(out.contains("/PSL_dx 120 def\n/PSL_dy 120 def\n1200 1200 T PSL_dim_w -2 div PSL_dim_h -2 div T\n"));
        assert!(out.contains("120 PSL_dim_x0 PSL_dx sub PSL_dim_d PSL_dy sub SB\nU\n"));
        assert!(out.ends_with("1200 1200 M (label) mc Z\n"));
    }

    #[test]
    fn paragraph_settings() {
        let mut s = session();
        assert_eq!(s.set_paragraph(0.2, 3.0, 5), Err(Error::BadJustify));
        assert_eq!(s.set_paragraph(0.0, 3.0, 1), Err(Error::BadValue));
        s.set_paragraph(0.2, 3.0, 4).unwrap();
        assert_eq!(
            output(s),
            "/PSL_linespace 240 def\n/PSL_parwidth 3600 def\n/PSL_parjust 4 def\n"
        );
    }

    #[test]
    fn paragraph_arrays() {
        let mut s = session();
        s.plot_paragraph(0.0, 0.0, 12.0, Some("Hello. World"), 0.0, 1)
            .unwrap();
        let out = output(s);
        assert!(out.contains("/PSL_fontname\n/Helvetica\n1 array astore def\n"));
        assert!(out.contains("/PSL_n 2 def\n/PSL_n1 1 def\n"));
        assert!(out.contains("/PSL_word\n(Hello.) (World)\n2 array astore def\n"));
        assert!(out.contains("/PSL_flag\n2 0\n2 array astore def\n"));
        assert!(out.contains("/PSL_rgb\n0 0 0\n3 array astore def\n"));
        assert!(out.ends_with("0 0 M\n1 PSL_textjustifier U\n"));
    }

    #[test]
    fn empty_paragraph_is_skipped() {
        let mut s = session();
        s.plot_paragraph(0.0, 0.0, 12.0, Some("   "), 0.0, 1).unwrap();
        assert_eq!(output(s), ENCODE_F0);
    }

    #[test]
    fn paragraph_box() {
        let mut s = session();
        assert_eq!(
            s.plot_paragraph_box(0.0, 0.0, 12.0, "x", 0.0, 1, [-1.0, 0.0], BoxShape::Straight),
            Err(Error::BadValue)
        );
        s.plot_paragraph_box(0.0, 0.0, 12.0, "x", 0.0, 10, [0.1, 0.1], BoxShape::Straight)
            .unwrap();
        let out = output(s);
        assert!(out.contains("/PSL_y0 0 def\n"));
        assert!(out.ends_with("XL YT M XL YB L XR YB L XR YT L\nP FO U\n"));
    }
}
