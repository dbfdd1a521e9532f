//! # Frame Format
//!
//! The unit hidden in an image is a *frame*: a JSON metadata record, the
//! three-byte separator `|||`, then the payload text.
//!
//! ```text
//! {"isEncrypted":false,"messageLength":5}|||HELLO
//! {"isEncrypted":true,"encryptionData":{"iv":"…","salt":"…","mac":"…"},"messageLength":6}|||<base64>
//! ```
//!
//! Only the first separator is significant, so the payload may itself contain
//! `|||`. Metadata never does: its fields are booleans, integers and hex.

use serde::{Deserialize, Serialize};

use crate::common::error::{Result, StegoError};
use crate::crypto::EncryptionParams;

/// Separator between metadata and payload.
pub const SEPARATOR: &str = "|||";

/// Fixed-schema metadata record at the head of every frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub is_encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_data: Option<EncryptionParams>,
    /// Character count of the message before encryption
    pub message_length: usize,
}

impl Metadata {
    /// Metadata for an unencrypted message.
    pub fn plain(message: &str) -> Self {
        Self {
            is_encrypted: false,
            encryption_data: None,
            message_length: message.chars().count(),
        }
    }

    /// Metadata for an encrypted message of `message_length` characters.
    pub fn encrypted(params: EncryptionParams, message_length: usize) -> Self {
        Self {
            is_encrypted: true,
            encryption_data: Some(params),
            message_length,
        }
    }

    fn validate(&self) -> Result<()> {
        match (self.is_encrypted, &self.encryption_data) {
            (true, None) => Err(StegoError::InvalidMetadata(
                "encrypted frame without encryptionData".to_string(),
            )),
            (false, Some(_)) => Err(StegoError::InvalidMetadata(
                "encryptionData on an unencrypted frame".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Serialize `metadata` and join it with `payload`.
pub fn build_frame(metadata: &Metadata, payload: &str) -> Result<String> {
    metadata.validate()?;

    let header = serde_json::to_string(metadata)
        .map_err(|e| StegoError::InvalidMetadata(e.to_string()))?;

    let mut frame = String::with_capacity(header.len() + SEPARATOR.len() + payload.len());
    frame.push_str(&header);
    frame.push_str(SEPARATOR);
    frame.push_str(payload);
    Ok(frame)
}

/// Split a frame at its first separator and parse the metadata.
///
/// # Errors
/// - [`StegoError::InvalidFrameFormat`] if there is no separator
/// - [`StegoError::InvalidMetadata`] if the text before it is not a valid record
pub fn parse_frame(text: &str) -> Result<(Metadata, String)> {
    let (header, payload) = text
        .split_once(SEPARATOR)
        .ok_or(StegoError::InvalidFrameFormat)?;

    let metadata: Metadata =
        serde_json::from_str(header).map_err(|e| StegoError::InvalidMetadata(e.to_string()))?;
    metadata.validate()?;

    if !metadata.is_encrypted && payload.chars().count() != metadata.message_length {
        return Err(StegoError::InvalidMetadata(format!(
            "messageLength is {} but the payload has {} characters",
            metadata.message_length,
            payload.chars().count()
        )));
    }

    Ok((metadata, payload.to_string()))
}
