//! Indexing of 24-bit images into a palette.

use rustc_hash::FxHashMap;

/// The largest palette an indexed image can have.
pub const MAX_COLORS: usize = 256;

/// An image whose pixels are indices into a palette of RGB colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    /// One palette index per pixel, row by row.
    pub indices: Vec<u8>,
    /// The distinct colors, in order of first appearance.
    pub palette: Vec<[u8; 3]>,
}

/// Index the `npixels` RGB pixels in `pixels`.
///
/// When `mask` is given, it always becomes palette entry 0, so that a color
/// masked image can refer to it by index. Returns `None` when the image has
/// more than 256 colors, or at least as many colors as pixels, in which case
/// a palette does not pay off.
pub fn index_colors(pixels: &[u8], npixels: usize, mask: Option<[u8; 3]>) -> Option<IndexedImage> {
    let mut palette: Vec<[u8; 3]> = Vec::new();
    let mut lookup = FxHashMap::default();

    if let Some(mask) = mask {
        lookup.insert(mask, 0u8);
        palette.push(mask);
    }

    let mut indices = Vec::with_capacity(npixels);

    for rgb in pixels.chunks_exact(3).take(npixels) {
        let rgb = [rgb[0], rgb[1], rgb[2]];

        let index = match lookup.get(&rgb) {
            Some(&index) => index,
            None => {
                if palette.len() == MAX_COLORS {
                    ldebug!("too many colors to make a colormap, using direct color");
                    return None;
                }

                let index = palette.len() as u8;
                lookup.insert(rgb, index);
                palette.push(rgb);
                index
            }
        };

        indices.push(index);
    }

    if palette.len() >= npixels {
        ldebug!("a colormap is inefficient for this image, using direct color");
        return None;
    }

    ldebug!("colormap of {} colors created", palette.len());

    Some(IndexedImage { indices, palette })
}
