//! Text ↔ bit sequence conversion.
//!
//! Each character is one byte, most significant bit first. Characters above
//! U+00FF have no single-byte form and are rejected.

use crate::common::error::{Result, StegoError};

/// Bit pattern appended after the frame: `1111111111111110`.
pub const END_MARKER: u16 = 0b1111_1111_1111_1110;
/// Length of [`END_MARKER`] in bits.
pub const END_MARKER_BITS: usize = 16;

/// Convert `text` to bits and append the end marker.
///
/// # Errors
/// [`StegoError::Encoding`] if a character is above U+00FF, or if the text
/// contains the marker bytes `0xFF 0xFE`, which would end extraction early.
pub fn bit_encode(text: &str) -> Result<Vec<bool>> {
    let bytes = text
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| {
                StegoError::Encoding(format!(
                    "character {c:?} (U+{:04X}) is outside the single-byte range",
                    u32::from(c)
                ))
            })
        })
        .collect::<Result<Vec<u8>>>()?;

    let [hi, lo] = END_MARKER.to_be_bytes();
    if bytes.windows(2).any(|pair| pair == [hi, lo]) {
        return Err(StegoError::Encoding(
            "text contains the end marker sequence \\u{ff}\\u{fe}".to_string(),
        ));
    }

    let mut bits = Vec::with_capacity(bytes.len() * 8 + END_MARKER_BITS);
    for byte in bytes {
        push_bits(&mut bits, u16::from(byte), 8);
    }
    push_bits(&mut bits, END_MARKER, END_MARKER_BITS);

    Ok(bits)
}

/// Convert bits back to text, one character per whole byte.
///
/// Trailing bits that do not fill a byte are dropped.
pub fn bit_decode(bits: &[bool]) -> String {
    bits.chunks_exact(8)
        .map(|chunk| {
            let byte = chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit));
            char::from(byte)
        })
        .collect()
}

fn push_bits(bits: &mut Vec<bool>, value: u16, count: usize) {
    for i in (0..count).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}
