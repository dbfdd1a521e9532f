//! # Capacity Accounting
//!
//! An image holds one bit per pixel. A frame costs eight bits per character
//! plus the 16-bit end marker, and the metadata header is part of the frame,
//! so small images are dominated by overhead: a 10×10 image (100 bits) cannot
//! even hold an empty message.

use serde::Serialize;

use super::bits::END_MARKER_BITS;
use super::frame::{Metadata, SEPARATOR};
use crate::crypto::{EncryptionParams, IV_LEN, MAC_LEN, SALT_LEN};

const AES_BLOCK: usize = 16;

/// Number of bit slots in a `width × height` image.
pub fn available_bits(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Bits needed to embed `frame_text`, end marker included.
pub fn frame_bits(frame_text: &str) -> usize {
    frame_text.chars().count() * 8 + END_MARKER_BITS
}

/// Frame length in characters for a message of `message_chars` single-byte
/// characters.
pub fn frame_chars(message_chars: usize, encrypted: bool) -> usize {
    let (metadata, payload_chars) = if encrypted {
        let ciphertext = (message_chars / AES_BLOCK + 1) * AES_BLOCK;
        let params = EncryptionParams {
            iv: [0; IV_LEN],
            salt: [0; SALT_LEN],
            mac: Some([0; MAC_LEN]),
        };
        (
            Metadata::encrypted(params, message_chars),
            ciphertext.div_ceil(3) * 4,
        )
    } else {
        (
            Metadata {
                is_encrypted: false,
                encryption_data: None,
                message_length: message_chars,
            },
            message_chars,
        )
    };

    header_chars(&metadata) + SEPARATOR.len() + payload_chars
}

fn header_chars(metadata: &Metadata) -> usize {
    serde_json::to_string(metadata).map_or(0, |json| json.len())
}

/// Longest message (in single-byte characters) that fits in the image, or
/// `None` if not even an empty message fits.
pub fn max_message_chars(width: u32, height: u32, encrypted: bool) -> Option<usize> {
    let available = available_bits(width, height);
    let fits = |n: usize| frame_chars(n, encrypted) * 8 + END_MARKER_BITS <= available;

    if !fits(0) {
        return None;
    }

    // Largest n with fits(n); fits is monotonic in n.
    let (mut lo, mut hi) = (0usize, available / 8);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Some(lo)
}

/// Capacity summary for an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    pub width: u32,
    pub height: u32,
    pub available_bits: usize,
    pub max_plain_chars: Option<usize>,
    pub max_encrypted_chars: Option<usize>,
}

impl CapacityReport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available_bits: available_bits(width, height),
            max_plain_chars: max_message_chars(width, height, false),
            max_encrypted_chars: max_message_chars(width, height, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::seal;
    use crate::processing::frame::build_frame;

    #[test]
    fn test_frame_bits() {
        assert_eq!(frame_bits(""), 16);
        assert_eq!(frame_bits("HELLO"), 56);
    }

    #[test]
    fn test_plain_frame_chars_matches_built_frame() {
        for message in ["", "HELLO", "a much longer message of some thirty characters"] {
            let frame = build_frame(&Metadata::plain(message), message).unwrap();
            assert_eq!(frame_chars(message.len(), false), frame.len());
        }
    }

    #[test]
    fn test_encrypted_frame_chars_matches_built_frame() {
        for message in ["", "secret", "exactly sixteen!", "spans more than two AES blocks of data"] {
            let sealed = seal(message, "Pass123!").unwrap();
            let metadata = Metadata::encrypted(sealed.params, message.len());
            let frame = build_frame(&metadata, &sealed.ciphertext).unwrap();
            assert_eq!(frame_chars(message.len(), true), frame.len());
        }
    }

    #[test]
    fn test_tiny_image_holds_nothing() {
        assert_eq!(max_message_chars(10, 10, false), None);
    }

    #[test]
    fn test_max_is_tight() {
        let n = max_message_chars(64, 64, false).unwrap();
        assert!(frame_chars(n, false) * 8 + 16 <= 4096);
        assert!(frame_chars(n + 1, false) * 8 + 16 > 4096);
    }

    #[test]
    fn test_encryption_costs_capacity() {
        let report = CapacityReport::new(64, 64);
        assert_eq!(report.available_bits, 4096);
        assert!(report.max_encrypted_chars.unwrap() < report.max_plain_chars.unwrap());
    }
}
