//! PostScript run-length encoding.

/// Byte that ends a run-length stream.
const EOD: u8 = 128;
/// The longest run or literal group.
const MAX_GROUP: usize = 127;
/// The encoder keeps going while it has written fewer bytes than this, even
/// when the output is not shorter than the input read so far.
const GRACE: usize = 512;

/// Run-length encode `input`.
///
/// Runs of equal bytes become a length byte `257 - len` followed by the
/// byte, literal groups become `len - 1` followed by the bytes, and the
/// stream ends with 128. Returns `None` when the result would not be
/// shorter than the input.
pub fn encode(input: &[u8]) -> Option<Vec<u8>> {
    let n = input.len();
    let mut output = Vec::with_capacity(n.max(GRACE) + 136);
    let mut count = 0;

    while count < n && (output.len() < count || output.len() < GRACE) {
        let pixel = input[count];
        let mut end = count + 1;

        while end < n && end - count < MAX_GROUP && input[end] == pixel {
            end += 1;
        }

        if end - count == 1 {
            // Extend the literal until three equal bytes in a row show up.
            while end < n && end - count < MAX_GROUP && (end < 2 || input[end] != input[end - 2])
            {
                end += 1;
            }
            // Leave a starting run for the next group.
            while end < n && input[end] == input[end - 1] {
                end -= 1;
            }

            output.push((end - count - 1) as u8);
            output.extend_from_slice(&input[count..end]);
        } else {
            output.push((257 - (end - count)) as u8);
            output.push(pixel);
        }

        count = end;
    }

    output.push(EOD);

    if count < n || output.len() > n {
        ldebug!("RLE inflated {} to {} bytes, no compression done", count, output.len());
        return None;
    }

    ldebug!("RLE compressed {} to {} bytes", n, output.len());

    Some(output)
}
