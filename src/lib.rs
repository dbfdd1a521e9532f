//! # stegvault
//!
//! Hides text messages in the least significant bits of image pixels, with
//! optional password protection (PBKDF2-HMAC-SHA256 + AES-256-CBC).
//!
//! ```ignore
//! use stegvault::{decode, encode};
//!
//! let cover = image::open("cover.png")?.to_rgba8();
//! let stego = encode(&cover, "meet at noon", Some("Pass123!"))?;
//! assert_eq!(decode(&stego, Some("Pass123!"))?, "meet at noon");
//! ```

pub mod common;
pub mod crypto;
pub mod processing;

pub use common::error::{Result, StegoError};
pub use processing::{
    decode, encode, encode_in_place, inspect, write_png, CapacityReport, Metadata, PixelBuffer,
    StegCodec,
};
