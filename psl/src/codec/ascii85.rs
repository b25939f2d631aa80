//! The ASCII base-85 transport.

/// A newline is inserted once a line reaches this many characters.
const MAX_LINE_LEN: usize = 95;

/// Append the ASCII85 encoding of `data` to `out`, followed by the `~>`
/// end marker and a newline. Empty input appends nothing.
///
/// A full group of four zero bytes becomes `z`, and a final group of `n`
/// bytes becomes `n + 1` characters.
pub fn encode(data: &[u8], out: &mut Vec<u8>) {
    if data.is_empty() {
        return;
    }

    out.reserve(data.len() * 5 / 4 + data.len() / 76 + 4);
    let mut line_len = 0;

    for chunk in data.chunks(4) {
        let mut n = 0u32;
        for (i, &byte) in chunk.iter().enumerate() {
            n |= (byte as u32) << (24 - 8 * i);
        }

        if n == 0 && chunk.len() == 4 {
            out.push(b'z');
            line_len += 1;
            continue;
        }

        let mut tuple = [0u8; 5];
        for c in tuple.iter_mut().rev() {
            *c = (n % 85) as u8 + b'!';
            n /= 85;
        }

        out.extend_from_slice(&tuple[..chunk.len() + 1]);
        line_len += chunk.len() + 1;

        if line_len + 1 > MAX_LINE_LEN {
            out.push(b'\n');
            line_len = 0;
        }
    }

    out.extend_from_slice(b"~>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a85(data: &[u8]) -> String {
        let mut out = vec![];
        encode(data, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn hello() {
        assert_eq!(a85(b"Hello"), "87cURDZ~>\n");
    }

    #[test]
    fn zero_group() {
        assert_eq!(a85(&[0, 0, 0, 0, 0]), "z!!~>\n");
    }

    #[test]
    fn empty() {
        assert_eq!(a85(&[]), "");
    }

    #[test]
    fn line_breaks() {
        let text = a85(&[0xff; 400]);
        assert!(text.lines().all(|l| l.len() <= MAX_LINE_LEN));
        assert_eq!(text.lines().next().unwrap().len(), 95);
    }
}
