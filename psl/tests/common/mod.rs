//! Reference decoders for the filters used in the output.

#![allow(dead_code)]

/// Decode ASCII85 text up to the `~>` marker.
pub fn ascii85_decode(text: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    let mut group = vec![];

    let flush = |group: &mut Vec<u8>, out: &mut Vec<u8>| {
        let n = group.len();
        if n == 0 {
            return;
        }
        group.resize(5, b'u');
        let value = group
            .iter()
            .fold(0_u64, |acc, &c| acc * 85 + u64::from(c - b'!'));
        let bytes = (value as u32).to_be_bytes();
        out.extend_from_slice(&bytes[..n - 1]);
        group.clear();
    };

    for &c in text {
        match c {
            b'~' => break,
            b'z' => out.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group.push(c);
                if group.len() == 5 {
                    flush(&mut group, &mut out);
                }
            }
            _ => {}
        }
    }
    flush(&mut group, &mut out);

    out
}

/// Decode a `RunLengthDecode` stream.
pub fn rle_decode(data: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    let mut i = 0;

    while i < data.len() {
        let len = data[i];
        match len {
            128 => break,
            0..=127 => {
                let n = len as usize + 1;
                out.extend_from_slice(&data[i + 1..i + 1 + n]);
                i += 1 + n;
            }
            _ => {
                out.extend(core::iter::repeat_n(data[i + 1], 257 - len as usize));
                i += 2;
            }
        }
    }

    out
}

/// Decode hex digits up to the `>` marker, skipping white space.
pub fn hex_decode(text: &[u8]) -> Vec<u8> {
    let digits: Vec<u8> = text
        .iter()
        .take_while(|&&c| c != b'>')
        .filter(|c| !c.is_ascii_whitespace())
        .map(|&c| (c as char).to_digit(16).unwrap() as u8)
        .collect();
    digits.chunks(2).map(|d| d[0] << 4 | d.get(1).copied().unwrap_or(0)).collect()
}

/// Decode an `LZWDecode` stream with early change.
pub fn lzw_decode(data: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    let mut table: Vec<Vec<u8>> = vec![];
    let reset = |table: &mut Vec<Vec<u8>>| {
        table.clear();
        table.extend((0..=255_u8).map(|b| vec![b]));
        table.push(vec![]);
        table.push(vec![]);
    };
    reset(&mut table);

    let (mut width, mut pos) = (9, 0);
    let mut previous: Option<Vec<u8>> = None;

    while pos + width <= data.len() * 8 {
        let mut code = 0_usize;
        for _ in 0..width {
            let bit = (data[pos / 8] >> (7 - pos % 8)) & 1;
            code = (code << 1) | bit as usize;
            pos += 1;
        }

        match code {
            256 => {
                reset(&mut table);
                width = 9;
                previous = None;
                continue;
            }
            257 => break,
            _ => {}
        }

        let entry = if code < table.len() {
            table[code].clone()
        } else {
            let p = previous.clone().expect("code before the table is known");
            let mut e = p.clone();
            e.push(p[0]);
            e
        };
        out.extend_from_slice(&entry);

        if let Some(mut p) = previous.take() {
            p.push(entry[0]);
            table.push(p);
        }
        previous = Some(entry);

        if table.len() + 1 >= 1 << width && width < 12 {
            width += 1;
        }
    }

    out
}
