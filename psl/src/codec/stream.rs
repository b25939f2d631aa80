//! Image dictionaries and their data streams.

use super::{ascii85, deflate, hex, lzw::LzwEncoder, rle};
use crate::color::{gray_byte, rgb_to_cmyk_bytes};
use crate::config::{ColorMode, Compression, Transport};
use std::io::Write;

/// How the encoded data is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamKind {
    /// The data of an `image` dictionary.
    Image,
    /// The data of an `imagemask` dictionary.
    ImageMask,
    /// Data read by a procedure, followed by its decode filter name.
    Inline,
}

/// Encoding settings of a session.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StreamOptions {
    pub(crate) color_mode: ColorMode,
    pub(crate) compression: Compression,
    pub(crate) deflate_level: u32,
    pub(crate) transport: Transport,
}

fn compress(data: &[u8], options: &StreamOptions) -> Option<Vec<u8>> {
    match options.compression {
        Compression::None => None,
        Compression::Rle => rle::encode(data),
        Compression::Lzw => LzwEncoder::new().encode(data),
        Compression::Deflate => deflate::encode(data, options.deflate_level),
    }
}

/// Append the image dictionary tail and the encoded data of an `nx` by `ny`
/// image with `nbits` bits per pixel to `out`.
///
/// 24-bit data is converted to CMYK or gray first when the color mode asks
/// for it. A compression that does not pay off falls back to no filter.
pub(crate) fn stream_dump(
    out: &mut Vec<u8>,
    buffer: &[u8],
    nx: usize,
    ny: usize,
    nbits: u32,
    options: &StreamOptions,
    kind: StreamKind,
) {
    let nbytes = ((nbits as usize * nx).div_ceil(8) * ny).min(buffer.len());
    let buffer = &buffer[..nbytes];

    let converted: Option<Vec<u8>> = match (options.color_mode, nbits) {
        (ColorMode::Cmyk, 24) => Some(buffer.chunks_exact(3).flat_map(rgb_to_cmyk_bytes).collect()),
        (ColorMode::Gray, 24) => Some(buffer.chunks_exact(3).map(gray_byte).collect()),
        _ => None,
    };
    let data = converted.as_deref().unwrap_or(buffer);

    let compressed = compress(data, options);
    let compression = if compressed.is_some() {
        options.compression
    } else {
        Compression::None
    };
    let data = compressed.as_deref().unwrap_or(data);

    if kind != StreamKind::Inline {
        let _ = writeln!(
            out,
            "/Width {} /Height {} /BitsPerComponent {}",
            nx,
            ny,
            nbits.min(8)
        );
        let _ = write!(
            out,
            "   /ImageMatrix [{} 0 0 {} 0 {}] /DataSource currentfile",
            nx,
            -(ny as i64),
            ny
        );
        let _ = write!(out, " {}", options.transport.filter());
        if compression != Compression::None {
            let _ = write!(out, " {}", compression.filter());
        }
        let operator = if kind == StreamKind::Image {
            "image"
        } else {
            "imagemask"
        };
        let _ = write!(out, "\n>> {operator}\n");
    }

    match options.transport {
        Transport::Ascii85 => ascii85::encode(data, out),
        Transport::Hex => {
            hex::encode(data, out);
            out.extend_from_slice(b">\n");
        }
    }

    if kind == StreamKind::Inline {
        out.extend_from_slice(compression.filter().as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(compression: Compression, transport: Transport) -> StreamOptions {
        StreamOptions {
            color_mode: ColorMode::Rgb,
            compression,
            deflate_level: 0,
            transport,
        }
    }

    #[test]
    fn image_dictionary() {
        let mut out = vec![];
        stream_dump(
            &mut out,
            &[0xff, 0x00],
            2,
            1,
            8,
            &options(Compression::None, Transport::Hex),
            StreamKind::Image,
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/Width 2 /Height 1 /BitsPerComponent 8\n   /ImageMatrix [2 0 0 -1 0 1] \
             /DataSource currentfile /ASCIIHexDecode filter\n>> image\nFF00>\n"
        );
    }

    #[test]
    fn declined_compression_has_no_filter() {
        let mut out = vec![];
        stream_dump(
            &mut out,
            &[1, 2, 3, 4],
            4,
            1,
            8,
            &options(Compression::Rle, Transport::Ascii85),
            StreamKind::ImageMask,
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("currentfile /ASCII85Decode filter\n>> imagemask\n"));
        assert!(!text.contains("RunLength"));
    }

    #[test]
    fn inline_data_ends_with_filter() {
        let mut out = vec![];
        stream_dump(
            &mut out,
            &[0; 1024],
            1024,
            1,
            8,
            &options(Compression::Rle, Transport::Hex),
            StreamKind::Inline,
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("/RunLengthDecode filter"));
        assert!(!text.contains("/Width"));
    }

    #[test]
    fn cmyk_conversion() {
        let mut out = vec![];
        let mut opts = options(Compression::None, Transport::Hex);
        opts.color_mode = ColorMode::Cmyk;
        stream_dump(&mut out, &[255, 0, 0], 1, 1, 24, &opts, StreamKind::Inline);
        assert_eq!(out, b"00FFFF00>\n");
    }
}
