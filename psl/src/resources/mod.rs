//! The embedded PostScript procedure library and the predefined fill
//! patterns.

use crate::font::Encoding;

/// The procedure library written in every document prolog.
pub(crate) const PROLOGUE: &str = include_str!("prologue.ps");

/// The paragraph procedures, written before the first paragraph.
pub(crate) const TEXT: &str = include_str!("text.ps");

/// The side of a predefined pattern in pixels.
pub(crate) const PATTERN_SIZE: usize = 64;

/// The definition of `/<name>_Encoding` for `encoding`.
pub(crate) fn encoding(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::Standard => include_str!("encodings/Standard.ps"),
        Encoding::StandardPlus => include_str!("encodings/Standard+.ps"),
        Encoding::IsoLatin1 => include_str!("encodings/ISOLatin1.ps"),
        Encoding::IsoLatin1Plus => include_str!("encodings/ISOLatin1+.ps"),
        Encoding::Iso8859_1 => include_str!("encodings/ISO-8859-1.ps"),
        Encoding::Iso8859_15 => include_str!("encodings/ISO-8859-15.ps"),
    }
}

/// Copy a library file to `out`.
///
/// Lines starting with `%-` are always dropped. Without comments, blank
/// lines and comments are dropped too, except DSC comments starting with
/// `%%`.
pub(crate) fn bulkcopy(text: &str, comments: bool, out: &mut Vec<u8>) {
    for line in text.lines() {
        if line.starts_with("%-") {
            continue;
        }

        if comments {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
            continue;
        }

        if line.starts_with("%%") {
            out.extend_from_slice(line.trim_end().as_bytes());
            out.push(b'\n');
            continue;
        }

        let code = match memchr::memchr(b'%', line.as_bytes()) {
            Some(i) => &line[..i],
            None => line,
        };
        let code = code.trim_end();
        if !code.is_empty() {
            out.extend_from_slice(code.as_bytes());
            out.push(b'\n');
        }
    }
}

/// Whether pixel `(x, y)` of predefined pattern `n` is inked.
///
/// Patterns come in nine families of ten, each family varying spacing and
/// weight. All periods divide the pattern size so the tiles join.
fn inked(n: usize, x: usize, y: usize) -> bool {
    const PERIOD: [usize; 10] = [32, 16, 8, 4, 32, 16, 8, 4, 16, 8];
    const WEIGHT: [usize; 10] = [1, 1, 1, 1, 2, 2, 2, 2, 4, 4];

    let family = (n - 1) / 10;
    let k = (n - 1) % 10;
    let (p, w) = (PERIOD[k], WEIGHT[k]);
    let size = PATTERN_SIZE;

    match family {
        0 => x % p < w && y % p < w,
        1 => y % p < w,
        2 => x % p < w,
        3 => (x + y) % p < w,
        4 => (x + size - y) % p < w,
        5 => x % p < w || y % p < w,
        6 => (x + y) % p < w || (x + size - y) % p < w,
        7 => {
            let s = [2, 4, 8, 16, 32][k % 5];
            if k < 5 {
                (x / s + y / s) % 2 == 0
            } else {
                // Bricks: mortar rows, with joints shifted every other row.
                let row = y / s;
                let shift = if row % 2 == 0 { 0 } else { s };
                y % s == 0 || (x + shift) % (2 * s) == 0
            }
        }
        8 => {
            // Rings, then dots, centred in square cells.
            const CELL: [usize; 5] = [64, 32, 16, 32, 64];
            const RING: [f64; 5] = [1.0, 1.0, 1.0, 2.0, 3.0];
            const DOT: [f64; 5] = [0.3, 0.3, 0.3, 0.6, 0.6];

            let p = CELL[k % 5];
            let (cx, cy) = ((x % p) as f64 + 0.5, (y % p) as f64 + 0.5);
            let c = p as f64 / 2.0;
            let d = (cx - c).hypot(cy - c);
            if k < 5 {
                (d - c * 0.75).abs() < RING[k]
            } else {
                d < c * DOT[k - 5]
            }
        }
        _ => {
            let a = p / 2;
            let tri = (x % p).abs_diff(a);
            (y + tri) % p < w
        }
    }
}

/// The 64 by 64 1-bit image of predefined pattern `n` in `1..=90`, with
/// rows padded to bytes. Inked pixels are 0 and index the foreground.
pub(crate) fn pattern(n: usize) -> Vec<u8> {
    let n = n.clamp(1, 90);
    let row_bytes = PATTERN_SIZE / 8;
    let mut bits = vec![0_u8; row_bytes * PATTERN_SIZE];

    for y in 0..PATTERN_SIZE {
        for x in 0..PATTERN_SIZE {
            if !inked(n, x, y) {
                bits[y * row_bytes + x / 8] |= 0x80 >> (x % 8);
            }
        }
    }

    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copy(text: &str, comments: bool) -> String {
        let mut out = vec![];
        bulkcopy(text, comments, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn comments_are_stripped() {
        let text = "%- internal\n%\n% About this\n%%DSC line  \n\n/A {B} def\t% trailing\n  \n";
        assert_eq!(copy(text, false), "%%DSC line\n/A {B} def\n");
        assert_eq!(
            copy(text, true),
            "%\n% About this\n%%DSC line  \n\n/A {B} def\t% trailing\n  \n"
        );
    }

    #[test]
    fn library_opens_a_dictionary() {
        let out = copy(PROLOGUE, false);
        assert!(out.starts_with("/PSL_dict 300 dict def PSL_dict begin\n"));
        assert!(!out.contains("%-"));
        assert!(out.lines().all(|l| !l.trim().is_empty()));
        assert!(out.contains("/TM {"));
        assert!(copy(TEXT, false).contains("/PSL_textjustifier {"));
    }

    #[test]
    fn encodings_define_their_vector() {
        for e in [
            Encoding::Standard,
            Encoding::StandardPlus,
            Encoding::IsoLatin1,
            Encoding::IsoLatin1Plus,
            Encoding::Iso8859_1,
            Encoding::Iso8859_15,
        ] {
            assert!(encoding(e).starts_with(&format!("/{}_Encoding ", e.name())));
        }
        assert!(encoding(Encoding::StandardPlus).contains("8#224 /minus put"));
    }

    #[test]
    fn patterns() {
        let all: Vec<Vec<u8>> = (1..=90).map(pattern).collect();
        for (i, p) in all.iter().enumerate() {
            assert_eq!(p.len(), 512, "pattern {}", i + 1);
            assert!(p.iter().any(|&b| b != 0xff), "pattern {} is blank", i + 1);
            assert!(p.iter().any(|&b| b != 0), "pattern {} is solid", i + 1);
        }
        for i in 0..all.len() {
            for j in i + 1..all.len() {
                assert_ne!(all[i], all[j], "patterns {} and {}", i + 1, j + 1);
            }
        }

        // Sparse dots at the corners of 32 pixel cells.
        let dots = &all[0];
        assert_eq!(dots[0], 0x7f);
        assert_eq!(dots[4], 0x7f);
        assert_eq!(dots[1], 0xff);
        assert!(dots[8..].iter().take(8).all(|&b| b == 0xff));
    }
}
