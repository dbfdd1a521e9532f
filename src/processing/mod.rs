//! # Image Processing and Steganography
//!
//! Hides a framed message in the least significant bits of an image and
//! recovers it again.
//!
//! ## Modules
//!
//! - [`pixels`]: the [`PixelBuffer`] raster trait and its `image` crate implementation
//! - [`bits`]: text ↔ bit sequence, end marker
//! - [`embed`]: LSB embedding and extraction in raster order
//! - [`frame`]: metadata record + separator + payload
//! - [`capacity`]: how much fits in an image
//! - [`steganography`]: the public encode/decode pipeline and the file-level [`StegCodec`]

pub mod bits;
pub mod capacity;
pub mod embed;
pub mod frame;
pub mod pixels;
pub mod steganography;

// Re-export main functions for convenience
pub use capacity::CapacityReport;
pub use frame::Metadata;
pub use pixels::PixelBuffer;
pub use steganography::{decode, encode, encode_in_place, inspect, write_png, StegCodec};
