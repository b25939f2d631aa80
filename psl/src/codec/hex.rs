//! The hexadecimal transport.

/// Append `data` as uppercase hex digits to `out`, breaking lines once they
/// exceed 95 characters.
pub fn encode(data: &[u8], out: &mut Vec<u8>) {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

    out.reserve(data.len() * 2 + data.len() / 48);
    let mut line_len = 0;

    for &byte in data {
        out.push(DIGITS[(byte >> 4) as usize]);
        out.push(DIGITS[(byte & 0xf) as usize]);
        line_len += 2;

        if line_len > 95 {
            out.push(b'\n');
            line_len = 0;
        }
    }
}
