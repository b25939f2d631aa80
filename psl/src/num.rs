//! Number formatting and lenient parsing in the conventions PostScript
//! output relies on.

use core::fmt;

/// A float printed with `%g` semantics: `precision` significant digits,
/// trailing zeros removed, exponent form outside of `1e-4..10^precision`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct G {
    value: f64,
    precision: usize,
}

/// Format with 6 significant digits.
pub(crate) fn g(value: f64) -> G {
    G {
        value,
        precision: 6,
    }
}

/// Format with 3 significant digits.
pub(crate) fn g3(value: f64) -> G {
    G {
        value,
        precision: 3,
    }
}

impl fmt::Display for G {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.value;

        if v.is_nan() {
            return f.write_str("nan");
        }

        if v.is_infinite() {
            return f.write_str(if v < 0.0 { "-inf" } else { "inf" });
        }

        if v == 0.0 {
            return f.write_str(if v.is_sign_negative() { "-0" } else { "0" });
        }

        let p = self.precision.max(1);
        // The exponent must be taken after rounding to `p` digits.
        let sci = format!("{:.*e}", p - 1, v);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
        let x: i32 = exp.parse().unwrap_or(0);

        if x < -4 || x >= p as i32 {
            let sign = if x < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", strip_zeros(mantissa), sign, x.abs())
        } else {
            let fixed = format!("{:.*}", (p as i32 - 1 - x) as usize, v);
            f.write_str(strip_zeros(&fixed))
        }
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Parse the longest leading float of `s`, like C's `atof`. Returns 0 when
/// there is none.
pub(crate) fn atof(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut best = 0.0;

    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let mut seen_digit = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        seen_digit = true;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            seen_digit = true;
        }
    }

    if seen_digit {
        end = i;
        if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            let mut j = i + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            let digits = j;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > digits {
                end = j;
            }
        }
    }

    if end > 0 {
        best = s[..end].parse().unwrap_or(0.0);
    }

    best
}

/// Parse the longest leading integer of `s`, like C's `atoi`.
pub(crate) fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }

    s[..i].parse().unwrap_or(0)
}
