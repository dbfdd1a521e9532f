//! # Payload Encryption
//!
//! Password-based protection applied to a message before it is hidden.
//!
//! ## Modules
//!
//! - [`kdf`]: PBKDF2-HMAC-SHA256 key derivation from password + random salt
//! - [`cipher`]: AES-256-CBC with PKCS#7 padding and an HMAC tag over the ciphertext
//! - [`password`]: encode-side password strength policy
//!
//! The IV, salt and tag are not secret. They travel inside the frame metadata as
//! an [`EncryptionParams`] record, so decryption only needs the password.

pub mod cipher;
pub mod kdf;
pub mod password;

use serde::{Deserialize, Serialize};

pub use cipher::{open, seal, Sealed, IV_LEN, MAC_LEN};
pub use kdf::{derive_key, KDF_ITERATIONS, KEY_LEN, SALT_LEN};
pub use password::check_strength;

/// Per-encryption parameters stored alongside the ciphertext.
///
/// On the wire the fields are lowercase hex strings: `iv` (16 bytes), `salt`
/// (32 bytes) and an optional `mac` (32 bytes). Frames written without a tag
/// are still accepted and fall back to the plausibility check on decrypt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncryptionDataRecord", into = "EncryptionDataRecord")]
pub struct EncryptionParams {
    pub iv: [u8; IV_LEN],
    pub salt: [u8; SALT_LEN],
    pub mac: Option<[u8; MAC_LEN]>,
}

/// Textual shape of [`EncryptionParams`] inside the metadata JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptionDataRecord {
    iv: String,
    salt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mac: Option<String>,
}

impl From<EncryptionParams> for EncryptionDataRecord {
    fn from(params: EncryptionParams) -> Self {
        Self {
            iv: hex::encode(params.iv),
            salt: hex::encode(params.salt),
            mac: params.mac.map(hex::encode),
        }
    }
}

impl TryFrom<EncryptionDataRecord> for EncryptionParams {
    type Error = String;

    fn try_from(record: EncryptionDataRecord) -> Result<Self, Self::Error> {
        let mac = match record.mac {
            Some(mac) => Some(decode_hex::<MAC_LEN>("mac", &mac)?),
            None => None,
        };

        Ok(Self {
            iv: decode_hex("iv", &record.iv)?,
            salt: decode_hex("salt", &record.salt)?,
            mac,
        })
    }
}

fn decode_hex<const N: usize>(field: &str, value: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(value).map_err(|e| format!("{field} is not valid hex: {e}"))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("{field} must be {N} bytes, got {}", b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptionParams {
        EncryptionParams {
            iv: [0xab; IV_LEN],
            salt: [0x01; SALT_LEN],
            mac: None,
        }
    }

    #[test]
    fn test_params_serialize_as_hex() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"iv":"{}","salt":"{}"}}"#, "ab".repeat(16), "01".repeat(32))
        );
    }

    #[test]
    fn test_params_reject_wrong_length() {
        let json = format!(r#"{{"iv":"{}","salt":"{}"}}"#, "ab".repeat(8), "01".repeat(32));
        let err = serde_json::from_str::<EncryptionParams>(&json).unwrap_err();
        assert!(err.to_string().contains("iv must be 16 bytes"));
    }

    #[test]
    fn test_params_reject_bad_hex() {
        let json = format!(r#"{{"iv":"{}","salt":"zz"}}"#, "ab".repeat(16));
        assert!(serde_json::from_str::<EncryptionParams>(&json).is_err());
    }

    #[test]
    fn test_params_with_mac() {
        let params = EncryptionParams {
            mac: Some([7u8; MAC_LEN]),
            ..sample()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.ends_with(&format!(r#""mac":"{}"}}"#, "07".repeat(32))));

        let parsed: EncryptionParams = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, params);
    }
}
