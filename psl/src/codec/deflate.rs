//! zlib compression of image data.

/// Compress `input` as a zlib stream at `level`, where 0 selects the
/// default level 6. Returns `None` unless the result is strictly smaller
/// than the input.
#[cfg(feature = "deflate")]
pub fn encode(input: &[u8], level: u32) -> Option<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let level = if level == 0 { 6 } else { level.min(9) };

    let mut e = ZlibEncoder::new(Vec::with_capacity(input.len()), Compression::new(level));
    e.write_all(input).ok()?;
    let out = e.finish().ok()?;

    if out.len() >= input.len() {
        ldebug!("no deflate compression done");
        return None;
    }

    ldebug!(
        "DEFLATE compressed {} to {} bytes at level {}",
        input.len(),
        out.len(),
        level
    );

    Some(out)
}

/// Always declines, as the crate was built without the `deflate` feature.
#[cfg(not(feature = "deflate"))]
pub fn encode(input: &[u8], level: u32) -> Option<Vec<u8>> {
    let _ = (input, level);
    lwarn!("cannot deflate because the `deflate` feature is disabled");
    None
}
