//! Sun rasterfiles.

use super::image::{ColorImage, ImageSource};
use crate::error::{Error, Result};

const MAGIC: u32 = 0x59a6_6a95;
/// Starts a run in byte-encoded files.
const ESC: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Old,
    Standard,
    ByteEncoded,
    Rgb,
}

impl Layout {
    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Old),
            1 => Some(Self::Standard),
            2 => Some(Self::ByteEncoded),
            3 => Some(Self::Rgb),
            _ => None,
        }
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let v = self.data.get(self.offset..self.offset.checked_add(len)?)?;
        self.offset += len;

        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_be_bytes(self.read_bytes(4)?.try_into().ok()?))
    }
}

#[derive(Debug)]
struct Header {
    width: usize,
    height: usize,
    depth: u32,
    length: usize,
    layout: u32,
    map_length: usize,
}

fn read_header(r: &mut Reader<'_>) -> Option<(u32, Header)> {
    let magic = r.read_u32()?;
    let width = r.read_u32()? as usize;
    let height = r.read_u32()? as usize;
    let depth = r.read_u32()?;
    let length = r.read_u32()? as usize;
    let layout = r.read_u32()?;
    let _map_type = r.read_u32()?;
    let map_length = r.read_u32()? as usize;

    let header = Header {
        width,
        height,
        depth,
        length,
        layout,
        map_length,
    };

    Some((magic, header))
}

/// Undo the run-length coding of a byte-encoded file, producing at most
/// `len` bytes.
fn unpack_runs(data: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    let mut bytes = data.iter().copied();

    while out.len() < len {
        let Some(byte) = bytes.next() else {
            break;
        };
        if byte != ESC {
            out.push(byte);
            continue;
        }

        match bytes.next() {
            None | Some(0) => out.push(ESC),
            Some(count) => {
                let value = bytes.next().unwrap_or(0);
                out.extend(core::iter::repeat_n(value, count as usize + 1));
            }
        }
    }

    out.truncate(len);
    out
}

/// A decoded Sun rasterfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// The width in pixels.
    pub width: usize,
    /// The height in pixels.
    pub height: usize,
    /// The bits per pixel: 1, 8 or 24. Color mapped and 32-bit files are
    /// expanded to 24-bit RGB.
    pub depth: u32,
    /// The pixels, rows starting on byte boundaries. In 1-bit images set
    /// bits are foreground.
    pub data: Vec<u8>,
}

impl RasterImage {
    /// The image for [`Session::plot_color_image`](super::Session::plot_color_image).
    pub fn color_image(&self) -> ColorImage<'_> {
        ColorImage {
            data: &self.data,
            width: self.width,
            height: self.height,
            bits: self.depth,
            interpolate: false,
            mask: None,
        }
    }

    /// The image as a pattern source named `name` for
    /// [`Session::set_image`](super::Session::set_image).
    pub fn source<'a>(&'a self, name: &'a str) -> ImageSource<'a> {
        ImageSource::User {
            name,
            data: &self.data,
            width: self.width,
            height: self.height,
            depth: self.depth,
        }
    }
}

/// Decode a Sun rasterfile of depth 1, 8, 24 or 32.
///
/// Byte-encoded files are expanded, the 16-bit row padding is removed, and
/// color maps and BGR or XBGR pixels are turned into RGB.
pub fn load_raster(data: &[u8]) -> Result<RasterImage> {
    let mut r = Reader::new(data);

    let Some((magic, header)) = read_header(&mut r) else {
        lwarn!("error reading rasterfile header");
        return Err(Error::ReadFailure);
    };
    if magic != MAGIC {
        lwarn!("not a Sun rasterfile (magic number {:#x})", magic);
        return Err(Error::ReadFailure);
    }
    let Some(layout) = Layout::from_u32(header.layout) else {
        lwarn!("can only read Sun rasterfiles of types 0 to 3, not {}", header.layout);
        return Err(Error::BadValue);
    };
    if !matches!(header.depth, 1 | 8 | 24 | 32) {
        lwarn!("rasterfiles of depth {} are not supported", header.depth);
        return Err(Error::BadValue);
    }
    if header.width == 0 || header.height == 0 {
        lwarn!("rasterfile of {} by {} pixels is empty", header.width, header.height);
        return Err(Error::BadSize);
    }

    let Header {
        width,
        height,
        depth,
        ..
    } = header;

    let Some(map) = r.read_bytes(header.map_length) else {
        lwarn!("error reading the rasterfile color map");
        return Err(Error::ReadFailure);
    };

    let row = (width * depth as usize).div_ceil(8);
    let padded_row = row + row % 2;
    let size = padded_row * height;

    let length = if header.length == 0 || layout == Layout::Old {
        size
    } else {
        header.length
    };
    let Some(body) = r.read_bytes(length) else {
        lwarn!("rasterfile holds less than its {} bytes of pixels", length);
        return Err(Error::ReadFailure);
    };

    let pixels = if layout == Layout::ByteEncoded {
        unpack_runs(body, size)
    } else {
        body.to_vec()
    };
    if pixels.len() < size {
        lwarn!("rasterfile holds {} of {} bytes of pixels", pixels.len(), size);
        return Err(Error::ReadFailure);
    }

    let n = map.len() / 3;
    let (red, green, blue) = (&map[..n], &map[n..2 * n], &map[2 * n..3 * n]);
    let lookup = |table: &[u8], v: u8| {
        if table.is_empty() {
            v
        } else {
            table.get(v as usize).copied().unwrap_or_default()
        }
    };

    let rows = pixels.chunks_exact(padded_row).map(|r| &r[..row]);
    let (depth, data): (u32, Vec<u8>) = match depth {
        1 => (1, rows.flatten().copied().collect()),
        8 if n == 0 => (8, rows.flatten().copied().collect()),
        8 => (
            24,
            rows.flatten()
                .flat_map(|&i| [lookup(red, i), lookup(green, i), lookup(blue, i)])
                .collect(),
        ),
        _ => {
            let bytes = depth as usize / 8;
            let skip = bytes - 3;
            let data = rows
                .flat_map(|r| r.chunks_exact(bytes))
                .flat_map(|p| {
                    let p = &p[skip..];
                    let (r, g, b) = if layout == Layout::Rgb {
                        (p[0], p[1], p[2])
                    } else {
                        (p[2], p[1], p[0])
                    };
                    [lookup(red, r), lookup(green, g), lookup(blue, b)]
                })
                .collect();
            (24, data)
        }
    };

    ldebug!("rasterfile of {} by {} pixels at {} bits loaded", width, height, depth);

    Ok(RasterImage {
        width,
        height,
        depth,
        data,
    })
}
