//! # LSB Steganography Pipeline
//!
//! Ties the frame format, the bit codec, the embedder and the cipher together
//! into the two public operations.
//!
//! ## Encoding Process
//! 1. Optionally encrypt the message with the password (fresh salt and IV)
//! 2. Build the frame: metadata JSON + `|||` + payload
//! 3. Convert the frame to bits (8 per character, MSB first) + end marker
//! 4. Check capacity, then write one bit per pixel into the red channel LSB
//!
//! ## Decoding Process
//! 1. Read red channel LSBs in raster order until the end marker
//! 2. Convert bits back to text and split the frame at the first `|||`
//! 3. Parse the metadata; decrypt the payload if it is marked encrypted
//!
//! [`encode`] and [`decode`] work on any [`PixelBuffer`]. [`StegCodec`] wraps
//! them for encoded image files: it accepts PNG, JPEG, BMP and GIF input and
//! always produces PNG, since any lossy re-encoding destroys the hidden bits.

use image::{ImageFormat, RgbaImage};
use log::{debug, info};
use std::io::Cursor;

use super::bits::{bit_decode, bit_encode};
use super::capacity::CapacityReport;
use super::embed::{embed, extract};
use super::frame::{build_frame, parse_frame, Metadata};
use super::pixels::PixelBuffer;
use crate::common::config::{StegConfig, DEFAULT_MAX_INPUT_BYTES, DEFAULT_MIN_INPUT_BYTES};
use crate::common::error::{Result, StegoError};
use crate::crypto::{check_strength, open, seal};

/// Input formats accepted by [`StegCodec`].
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::Gif,
];

/// Build the bit sequence for `message`, encrypting it when a non-empty
/// password is given.
fn frame_bits_for(message: &str, password: Option<&str>) -> Result<Vec<bool>> {
    let frame = match password.filter(|p| !p.is_empty()) {
        Some(password) => {
            let sealed = seal(message, password)?;
            let metadata = Metadata::encrypted(sealed.params, message.chars().count());
            build_frame(&metadata, &sealed.ciphertext)?
        }
        None => build_frame(&Metadata::plain(message), message)?,
    };

    bit_encode(&frame)
}

/// Hide `message` in a copy of `image`.
///
/// The input image is never modified; on error nothing is returned.
///
/// # Arguments
/// - `image`: Cover image
/// - `message`: Text to hide. Without a password every character must be in
///   the single-byte range (U+0000..=U+00FF).
/// - `password`: Encrypts the message when present and non-empty
///
/// # Errors
/// - [`StegoError::CapacityExceeded`] if the frame does not fit
/// - [`StegoError::Encoding`] if the message has characters above U+00FF
///
/// # Example
/// ```ignore
/// let stego = encode(&cover, "HELLO", Some("Pass123!"))?;
/// assert_eq!(decode(&stego, Some("Pass123!"))?, "HELLO");
/// ```
pub fn encode<B: PixelBuffer + Clone>(image: &B, message: &str, password: Option<&str>) -> Result<B> {
    let bits = frame_bits_for(message, password)?;

    if bits.len() > image.pixel_count() {
        return Err(StegoError::CapacityExceeded {
            needed: bits.len(),
            available: image.pixel_count(),
        });
    }

    let mut output = image.clone();
    embed(&bits, &mut output)?;
    Ok(output)
}

/// Hide `message` directly in `buffer`.
///
/// Same as [`encode`] but without the copy. The buffer is untouched on error.
pub fn encode_in_place<B: PixelBuffer + ?Sized>(
    buffer: &mut B,
    message: &str,
    password: Option<&str>,
) -> Result<()> {
    let bits = frame_bits_for(message, password)?;
    embed(&bits, buffer)
}

/// Extract and parse the frame hidden in `image`.
fn read_frame<B: PixelBuffer + ?Sized>(image: &B) -> Result<(Metadata, String)> {
    let bits = extract(image)?;
    let text = bit_decode(&bits);
    debug!("Extracted frame of {} characters", text.chars().count());
    parse_frame(&text)
}

/// Recover the message hidden in `image`.
///
/// The password is only needed when the frame is marked encrypted; it is
/// ignored otherwise.
///
/// # Errors
/// - [`StegoError::NoHiddenMessage`] if no end marker is found
/// - [`StegoError::InvalidFrameFormat`] / [`StegoError::InvalidMetadata`] for
///   malformed frames
/// - [`StegoError::IncorrectPassword`] if the frame is encrypted and the
///   password is missing or wrong
pub fn decode<B: PixelBuffer + ?Sized>(image: &B, password: Option<&str>) -> Result<String> {
    let (metadata, payload) = read_frame(image)?;

    let Some(params) = metadata.encryption_data.as_ref() else {
        return Ok(payload);
    };

    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(StegoError::IncorrectPassword)?;

    open(&payload, params, password, metadata.message_length)
}

/// Read the frame metadata without decrypting anything.
pub fn inspect<B: PixelBuffer + ?Sized>(image: &B) -> Result<Metadata> {
    read_frame(image).map(|(metadata, _)| metadata)
}

/// Encode a buffer as PNG bytes.
pub fn write_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut output_bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)
        .map_err(|e| StegoError::Output(e.to_string()))?;
    Ok(output_bytes)
}

/// File-level front end used by the CLI and the HTTP server.
///
/// Holds the input size limits and whether the encode-side password policy is
/// enforced.
#[derive(Debug, Clone)]
pub struct StegCodec {
    min_input_bytes: usize,
    max_input_bytes: usize,
    enforce_password_policy: bool,
}

impl Default for StegCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_BYTES, true)
    }
}

impl StegCodec {
    pub fn new(max_input_bytes: usize, enforce_password_policy: bool) -> Self {
        Self {
            min_input_bytes: DEFAULT_MIN_INPUT_BYTES,
            max_input_bytes,
            enforce_password_policy,
        }
    }

    /// Override the smallest accepted input file size.
    pub fn with_min_input_bytes(mut self, min_input_bytes: usize) -> Self {
        self.min_input_bytes = min_input_bytes;
        self
    }

    pub fn from_config(config: &StegConfig) -> Self {
        Self::new(
            config.limits.max_input_bytes,
            config.security.enforce_password_policy,
        )
        .with_min_input_bytes(config.limits.min_input_bytes)
    }

    /// Decode an image file into an RGBA buffer.
    ///
    /// # Errors
    /// [`StegoError::Input`] if the file is too small or too large, not a
    /// supported format, or cannot be decoded.
    pub fn load_image(&self, bytes: &[u8]) -> Result<RgbaImage> {
        if bytes.len() < self.min_input_bytes {
            return Err(StegoError::Input(format!(
                "image file appears to be corrupted or too small: {} bytes (minimum {})",
                bytes.len(),
                self.min_input_bytes
            )));
        }

        if bytes.len() > self.max_input_bytes {
            return Err(StegoError::Input(format!(
                "image file is too large: {} bytes (limit {})",
                bytes.len(),
                self.max_input_bytes
            )));
        }

        let format = image::guess_format(bytes)
            .map_err(|e| StegoError::Input(format!("unrecognised image format: {e}")))?;

        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(StegoError::Input(format!(
                "unsupported image format {format:?}; use PNG, JPEG, BMP or GIF"
            )));
        }

        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| StegoError::Input(e.to_string()))?;

        let rgba = img.to_rgba8();
        debug!("Loaded {:?} image {}x{}", format, rgba.width(), rgba.height());
        Ok(rgba)
    }

    /// Hide `message` in an image file and return PNG bytes.
    pub fn encode_bytes(&self, input: &[u8], message: &str, password: Option<&str>) -> Result<Vec<u8>> {
        let password = password.filter(|p| !p.is_empty());
        if let (true, Some(password)) = (self.enforce_password_policy, password) {
            check_strength(password)?;
        }

        let cover = self.load_image(input)?;
        let stego = encode(&cover, message, password)?;

        info!(
            "Hid {} characters in {}x{} image (encrypted: {})",
            message.chars().count(),
            stego.width(),
            stego.height(),
            password.is_some()
        );

        write_png(&stego)
    }

    /// Recover the message hidden in an image file.
    pub fn decode_bytes(&self, input: &[u8], password: Option<&str>) -> Result<String> {
        let img = self.load_image(input)?;
        let message = decode(&img, password)?;
        info!("Recovered {} characters", message.chars().count());
        Ok(message)
    }

    /// Read the frame metadata of an image file.
    pub fn inspect_bytes(&self, input: &[u8]) -> Result<Metadata> {
        inspect(&self.load_image(input)?)
    }

    /// Capacity summary for an image file.
    pub fn capacity_bytes(&self, input: &[u8]) -> Result<CapacityReport> {
        let img = self.load_image(input)?;
        Ok(CapacityReport::new(img.width(), img.height()))
    }
}
