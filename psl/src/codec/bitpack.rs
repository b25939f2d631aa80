//! Packing of palette indices into 1, 2 or 4 bits per pixel.

/// The smallest supported depth that can hold `ncolors` distinct indices.
pub fn depth_for(ncolors: usize) -> u8 {
    match ncolors {
        0..=2 => 1,
        3..=4 => 2,
        5..=16 => 4,
        _ => 8,
    }
}

/// Pack one index byte per pixel into the depth needed for `ncolors`
/// colors, in place. Every row of `nx` pixels starts on a byte boundary and
/// the unused low bits of a row's last byte are zero.
///
/// Returns the resulting depth. With more than 16 colors the buffer is left
/// unchanged and 8 is returned.
pub fn pack_bits(buffer: &mut Vec<u8>, nx: usize, ny: usize, ncolors: usize) -> u8 {
    let depth = depth_for(ncolors);

    if depth == 8 {
        return 8;
    }

    if buffer.len() < nx * ny {
        buffer.resize(nx * ny, 0);
    }

    let per_byte = (8 / depth) as usize;
    let row_bytes = (nx * depth as usize).div_ceil(8);
    let mut out = 0;

    for j in 0..ny {
        let row = j * nx;

        for i in 0..row_bytes {
            let mut byte = 0u8;

            for k in 0..per_byte {
                let x = i * per_byte + k;
                let value = if x < nx { buffer[row + x] } else { 0 };
                byte |= value << (8 - depth as usize * (k + 1));
            }

            // The write position never overtakes the unread input.
            buffer[out] = byte;
            out += 1;
        }
    }

    buffer.truncate(out);
    ldebug!("image depth reduced to {} bits", depth);

    depth
}
