//! # Pixel Buffer Access
//!
//! The codec never touches a file or a color model directly. It sees an image
//! as a grid of pixels with one or more addressable 8-bit channels, through the
//! [`PixelBuffer`] trait. The image I/O layer (the `image` crate) provides the
//! buffers; any `ImageBuffer` with 8-bit subpixels implements the trait.

use image::{ImageBuffer, Pixel};
use std::ops::{Deref, DerefMut};

/// Raster access used by embedding and extraction.
///
/// Coordinates and channel indices must be stable between the encode and the
/// decode call for a given image.
pub trait PixelBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Number of 8-bit channels per pixel.
    fn channel_count(&self) -> usize;

    fn channel(&self, x: u32, y: u32, channel: usize) -> u8;
    fn set_channel(&mut self, x: u32, y: u32, channel: usize, value: u8);

    /// Total number of pixels (one embeddable bit each).
    fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
}

impl<P, C> PixelBuffer for ImageBuffer<P, C>
where
    P: Pixel<Subpixel = u8>,
    C: Deref<Target = [u8]> + DerefMut,
{
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn channel_count(&self) -> usize {
        P::CHANNEL_COUNT as usize
    }

    fn channel(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.get_pixel(x, y).channels()[channel]
    }

    fn set_channel(&mut self, x: u32, y: u32, channel: usize, value: u8) {
        self.get_pixel_mut(x, y).channels_mut()[channel] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn test_rgba_access() {
        let mut img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]));
        assert_eq!(PixelBuffer::width(&img), 4);
        assert_eq!(PixelBuffer::height(&img), 3);
        assert_eq!(img.channel_count(), 4);
        assert_eq!(img.pixel_count(), 12);

        img.set_channel(2, 1, 0, 11);
        assert_eq!(img.channel(2, 1, 0), 11);
        assert_eq!(img.get_pixel(2, 1).0, [11, 20, 30, 255]);
        assert_eq!(img.get_pixel(1, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_gray_has_one_channel() {
        let img = GrayImage::from_pixel(2, 2, Luma([7]));
        assert_eq!(img.channel_count(), 1);
        assert_eq!(img.channel(1, 1, 0), 7);
    }
}
