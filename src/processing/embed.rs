//! # LSB Embedding and Extraction
//!
//! One bit per pixel, stored in the least significant bit of the red channel
//! (channel 0). Pixels are visited in raster order: row by row from the top,
//! left to right within a row.
//!
//! ```text
//! bit i  ->  pixel (i % width, i / width), channel 0, bit 0
//! ```
//!
//! The other seven bits of the red channel and every other channel are left
//! untouched.

use log::debug;

use super::bits::{END_MARKER, END_MARKER_BITS};
use super::pixels::PixelBuffer;
use crate::common::error::{Result, StegoError};

/// Channel that carries the hidden bits (red for RGB(A) images).
pub const EMBED_CHANNEL: usize = 0;

/// Write `bits` into the low bits of `buffer`.
///
/// Capacity is checked before the first write, so on
/// [`StegoError::CapacityExceeded`] the buffer is unchanged.
pub fn embed<B: PixelBuffer + ?Sized>(bits: &[bool], buffer: &mut B) -> Result<()> {
    if buffer.channel_count() <= EMBED_CHANNEL {
        return Err(StegoError::Input(
            "image has no addressable channel".to_string(),
        ));
    }

    let available = buffer.pixel_count();
    if bits.len() > available {
        return Err(StegoError::CapacityExceeded {
            needed: bits.len(),
            available,
        });
    }

    let width = buffer.width() as usize;
    for (i, &bit) in bits.iter().enumerate() {
        let (x, y) = ((i % width) as u32, (i / width) as u32);
        let value = buffer.channel(x, y, EMBED_CHANNEL);
        buffer.set_channel(x, y, EMBED_CHANNEL, (value & 0xFE) | u8::from(bit));
    }

    debug!("Embedded {} bits into {} pixels", bits.len(), available);
    Ok(())
}

/// Read low bits in raster order until the end marker is found.
///
/// The marker is only recognised at byte boundaries, matching the way frames
/// are written. The returned bits exclude the marker.
///
/// # Errors
/// [`StegoError::NoHiddenMessage`] if the buffer is exhausted before the marker,
/// or if the marker is the very first thing found.
pub fn extract<B: PixelBuffer + ?Sized>(buffer: &B) -> Result<Vec<bool>> {
    if buffer.channel_count() <= EMBED_CHANNEL {
        return Err(StegoError::Input(
            "image has no addressable channel".to_string(),
        ));
    }

    let width = buffer.width() as usize;
    let mut bits = Vec::new();
    let mut window: u16 = 0;

    for i in 0..buffer.pixel_count() {
        let (x, y) = ((i % width) as u32, (i / width) as u32);
        let bit = buffer.channel(x, y, EMBED_CHANNEL) & 1;

        window = (window << 1) | u16::from(bit);
        bits.push(bit == 1);

        if bits.len() >= END_MARKER_BITS && bits.len() % 8 == 0 && window == END_MARKER {
            bits.truncate(bits.len() - END_MARKER_BITS);
            if bits.is_empty() {
                return Err(StegoError::NoHiddenMessage);
            }
            debug!("Found end marker after {} frame bits", bits.len());
            return Ok(bits);
        }
    }

    Err(StegoError::NoHiddenMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::bits::{bit_decode, bit_encode};
    use image::{ImageBuffer, Rgb, RgbImage};

    fn create_test_image(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        })
    }

    #[test]
    fn test_embed_extract_roundtrip() {
        let mut img = create_test_image(32, 32);
        let bits = bit_encode("Hello, steganography!").unwrap();

        embed(&bits, &mut img).unwrap();
        let extracted = extract(&img).unwrap();

        assert_eq!(bit_decode(&extracted), "Hello, steganography!");
    }

    #[test]
    fn test_only_red_lsb_changes() {
        let original = create_test_image(16, 16);
        let mut img = original.clone();
        embed(&bit_encode("xyz").unwrap(), &mut img).unwrap();

        for (a, b) in original.pixels().zip(img.pixels()) {
            assert_eq!(a.0[0] & 0xFE, b.0[0] & 0xFE);
            assert_eq!(a.0[1], b.0[1]);
            assert_eq!(a.0[2], b.0[2]);
        }
    }

    #[test]
    fn test_raster_order() {
        let mut img = RgbImage::new(3, 2);
        let bits = [true, false, false, true, true, false];
        embed(&bits, &mut img).unwrap();

        assert_eq!(img.get_pixel(0, 0).0[0], 1);
        assert_eq!(img.get_pixel(1, 0).0[0], 0);
        assert_eq!(img.get_pixel(2, 0).0[0], 0);
        assert_eq!(img.get_pixel(0, 1).0[0], 1);
        assert_eq!(img.get_pixel(1, 1).0[0], 1);
        assert_eq!(img.get_pixel(2, 1).0[0], 0);
    }

    #[test]
    fn test_exact_capacity_fits() {
        let mut img = create_test_image(8, 3);
        let bits = bit_encode("a").unwrap();
        assert_eq!(bits.len(), 24);
        embed(&bits, &mut img).unwrap();
        assert_eq!(bit_decode(&extract(&img).unwrap()), "a");
    }

    #[test]
    fn test_capacity_exceeded_leaves_buffer_untouched() {
        let original = create_test_image(10, 10);
        let mut img = original.clone();
        let bits = bit_encode("this does not fit in 100 pixels").unwrap();

        let result = embed(&bits, &mut img);
        assert!(matches!(
            result,
            Err(StegoError::CapacityExceeded { available: 100, .. })
        ));
        assert_eq!(img, original);
    }

    #[test]
    fn test_no_marker_is_no_hidden_message() {
        let img = RgbImage::new(20, 20);
        assert!(matches!(extract(&img), Err(StegoError::NoHiddenMessage)));
    }

    #[test]
    fn test_marker_only_is_no_hidden_message() {
        let mut img = RgbImage::new(20, 20);
        embed(&bit_encode("").unwrap(), &mut img).unwrap();
        assert!(matches!(extract(&img), Err(StegoError::NoHiddenMessage)));
    }

    #[test]
    fn test_unaligned_marker_is_ignored() {
        // 0x7F 0xFF 0x00 contains fifteen ones followed by a zero starting at bit 1.
        let mut img = RgbImage::new(64, 1);
        let mut bits = Vec::new();
        for byte in [0x7Fu8, 0xFF, 0x00, b'k'] {
            for i in (0..8).rev() {
                bits.push((byte >> i) & 1 == 1);
            }
        }
        bits.extend(std::iter::repeat(true).take(15));
        bits.push(false);
        embed(&bits, &mut img).unwrap();

        let extracted = extract(&img).unwrap();
        assert_eq!(extracted.len(), 32);
    }
}
