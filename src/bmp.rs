//! 1-bit monochrome BMP writer for the engraver.
//!
//! Layout: 14-byte file header, 40-byte BITMAPINFOHEADER, a two entry
//! palette (0 = white, 1 = black) and bottom-up rows packed MSB-first,
//! each row padded to a multiple of 4 bytes.

use std::io::Write;

use crate::consts::{BLACK_THRESHOLD, PIXELS_PER_METER};
use crate::error::{Error, Result};
use crate::surface::RasterSurface;

pub const CONTENT_TYPE: &str = "image/bmp";
pub const FILE_HEADER_LEN: usize = 14;
pub const INFO_HEADER_LEN: usize = 40;
pub const PALETTE_LEN: usize = 8;
pub const PIXEL_OFFSET: usize = FILE_HEADER_LEN + INFO_HEADER_LEN + PALETTE_LEN;

/// Encoded BMP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpBytes(Vec<u8>);

impl BmpBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        out.write_all(&self.0)?;
        out.flush()?;
        Ok(())
    }
}

impl AsRef<[u8]> for BmpBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Bytes per encoded row, 4-byte aligned.
pub fn row_size(width: u32) -> usize {
    (width as usize).div_ceil(32) * 4
}

/// Encode a rendered surface, optionally mirrored left to right.
pub fn encode(surface: &RasterSurface, mirror: bool) -> Result<BmpBytes> {
    encode_rgba(surface.width(), surface.height(), surface.as_raw(), mirror)
}

/// Encode a raw top-down RGBA buffer.
///
/// Fails only when `rgba` is not `width * height * 4` bytes long.
pub fn encode_rgba(width: u32, height: u32, rgba: &[u8], mirror: bool) -> Result<BmpBytes> {
    let (w, h) = (width as usize, height as usize);
    let expected = w * h * 4;
    if rgba.len() != expected {
        return Err(Error::Surface { expected, found: rgba.len() });
    }

    let stride = row_size(width);
    let image_size = stride * h;
    let file_size = PIXEL_OFFSET + image_size;
    let mut out = Vec::with_capacity(file_size);

    // file header
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(PIXEL_OFFSET as u32).to_le_bytes());

    // BITMAPINFOHEADER, positive height = bottom-up rows
    out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(image_size as u32).to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes());

    // palette, B G R reserved
    out.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0x00]);
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    for y in (0..h).rev() {
        let row = &rgba[y * w * 4..(y + 1) * w * 4];
        let start = out.len();
        let mut bits = 0u8;
        let mut count = 0u8;

        for x in 0..w {
            let src = if mirror { w - 1 - x } else { x };
            let p = &row[src * 4..src * 4 + 4];
            bits = (bits << 1) | is_ink(p[0], p[1], p[2]) as u8;
            count += 1;
            if count == 8 {
                out.push(bits);
                bits = 0;
                count = 0;
            }
        }
        if count > 0 {
            out.push(bits << (8 - count));
        }
        while (out.len() - start) % 4 != 0 {
            out.push(0);
        }
    }

    debug_assert_eq!(out.len(), file_size);
    Ok(BmpBytes(out))
}

/// Luminance at or below the threshold engraves.
fn is_ink(r: u8, g: u8, b: u8) -> bool {
    let gray = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    gray <= BLACK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BLACK, WHITE};
    use crate::surface::Rect;

    fn u32_at(b: &[u8], off: usize) -> u32 {
        u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
    }

    fn i32_at(b: &[u8], off: usize) -> i32 {
        i32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
    }

    #[test]
    fn headers_are_byte_exact() {
        let s = RasterSurface::new(590, 236);
        let bmp = encode(&s, false).unwrap();
        let b = bmp.as_bytes();
        let stride = 590usize.div_ceil(32) * 4;
        assert_eq!(stride, 76);
        assert_eq!(b.len(), 62 + stride * 236);
        assert_eq!(&b[0..2], b"BM");
        assert_eq!(u32_at(b, 2) as usize, b.len());
        assert_eq!(u32_at(b, 6), 0);
        assert_eq!(u32_at(b, 10), 62);
        assert_eq!(u32_at(b, 14), 40);
        assert_eq!(i32_at(b, 18), 590);
        assert_eq!(i32_at(b, 22), 236);
        assert_eq!(&b[26..30], &[1, 0, 1, 0]);
        assert_eq!(u32_at(b, 30), 0);
        assert_eq!(u32_at(b, 34) as usize, stride * 236);
        assert_eq!(i32_at(b, 38), 11811);
        assert_eq!(i32_at(b, 42), 11811);
        assert_eq!(u32_at(b, 46), 2);
        assert_eq!(u32_at(b, 50), 2);
        assert_eq!(&b[54..58], &[255, 255, 255, 0]);
        assert_eq!(&b[58..62], &[0, 0, 0, 0]);
        assert_eq!(bmp.content_type(), "image/bmp");
    }

    #[test]
    fn white_surface_encodes_to_zero_bits() {
        let s = RasterSurface::new(37, 5);
        let bmp = encode(&s, false).unwrap();
        assert!(bmp.as_bytes()[PIXEL_OFFSET..].iter().all(|&b| b == 0));
    }

    #[test]
    fn black_surface_sets_every_pixel_bit() {
        let mut s = RasterSurface::new(12, 3);
        s.fill(BLACK);
        let bmp = encode(&s, false).unwrap();
        for row in bmp.as_bytes()[PIXEL_OFFSET..].chunks(row_size(12)) {
            assert_eq!(row, &[0xFF, 0xF0, 0x00, 0x00]);
        }
    }

    #[test]
    fn rows_are_written_bottom_up() {
        let mut s = RasterSurface::new(8, 2);
        s.fill_rect(Rect::new(0.0, 0.0, 8.0, 1.0), BLACK);
        let b = encode(&s, false).unwrap().into_vec();
        // first stored row is the bottom (white) one
        assert_eq!(&b[62..66], &[0, 0, 0, 0]);
        assert_eq!(&b[66..70], &[0xFF, 0, 0, 0]);
    }

    #[test]
    fn mirroring_reverses_columns() {
        let mut s = RasterSurface::new(16, 4);
        s.fill_rect(Rect::new(0.0, 0.0, 3.0, 4.0), BLACK);
        s.fill_rect(Rect::new(9.0, 1.0, 10.0, 3.0), BLACK);
        let plain = encode(&s, false).unwrap().into_vec();
        let mirrored = encode(&s, true).unwrap().into_vec();
        let stride = row_size(16);
        for (a, b) in plain[62..].chunks(stride).zip(mirrored[62..].chunks(stride)) {
            let a = u16::from_be_bytes([a[0], a[1]]);
            let b = u16::from_be_bytes([b[0], b[1]]);
            assert_eq!(a.reverse_bits(), b);
        }
    }

    #[test]
    fn threshold_splits_mid_grey() {
        assert!(is_ink(127, 127, 127));
        assert!(!is_ink(130, 130, 130));
        assert!(is_ink(255, 0, 0));
        assert!(!is_ink(WHITE[0], WHITE[1], WHITE[2]));
        // light dead-zone grey stays white
        assert!(!is_ink(0xD1, 0xD5, 0xDB));
    }

    #[test]
    fn truncated_buffer_is_unreadable() {
        let err = encode_rgba(4, 4, &[0u8; 10], false).unwrap_err();
        assert!(matches!(err, Error::Surface { expected: 64, found: 10 }));
    }

    #[test]
    fn zero_area_encodes_headers_only() {
        let bmp = encode(&RasterSurface::new(0, 0), true).unwrap();
        assert_eq!(bmp.len(), 62);
    }
}
