//! AES-256-CBC payload encryption.
//!
//! The cipher itself is unauthenticated, so a wrong key does not reliably fail
//! at the padding check. Two layers sit on top of it:
//!
//! - **Tag**: `HMAC-SHA256(mac_key, iv || ciphertext)` where `mac_key` is an HMAC
//!   of the derived key with a fixed label. When the frame carries a tag,
//!   a wrong password is detected deterministically before decrypting.
//! - **Plausibility**: for frames without a tag, the decrypted bytes must be
//!   valid UTF-8 and the recorded length must match either the plaintext
//!   character count or the length of the encoded ciphertext. Untagged frames
//!   written by the browser app record the latter.
//!
//! The ciphertext travels as standard base64 text so the frame stays within
//! single-byte characters.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose, Engine as _};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use log::debug;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::kdf::{derive_key, generate_salt, KEY_LEN};
use super::EncryptionParams;
use crate::common::error::{Result, StegoError};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// IV length in bytes (one AES block).
pub const IV_LEN: usize = 16;
/// HMAC-SHA256 tag length in bytes.
pub const MAC_LEN: usize = 32;

const BLOCK_LEN: usize = 16;
const MAC_KEY_LABEL: &[u8] = b"stegvault/mac/v1";

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// Returns `(ciphertext, iv)`.
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN]) -> (Vec<u8>, [u8; IV_LEN]) {
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext =
        Aes256CbcEnc::new(&(*key).into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    (ciphertext, iv)
}

/// Decrypt `ciphertext` under `key` and `iv`.
///
/// A padding failure means the key (or IV) is wrong and is reported as
/// [`StegoError::IncorrectPassword`].
pub fn decrypt(ciphertext: &[u8], key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(StegoError::InvalidFrameFormat);
    }

    Aes256CbcDec::new(&(*key).into(), &(*iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| StegoError::IncorrectPassword)
}

fn mac_key(key: &[u8; KEY_LEN]) -> Result<Zeroizing<[u8; MAC_LEN]>> {
    let mut mac = new_hmac(key)?;
    mac.update(MAC_KEY_LABEL);

    let mut out = Zeroizing::new([0u8; MAC_LEN]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

// HMAC takes keys of any length, so this only fails if the primitive is broken.
fn new_hmac(key: &[u8]) -> Result<HmacSha256> {
    <HmacSha256 as KeyInit>::new_from_slice(key)
        .map_err(|e| StegoError::Crypto(format!("HMAC key setup failed: {e}")))
}

/// Authentication tag over `iv || ciphertext`.
pub fn compute_tag(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], ciphertext: &[u8]) -> Result<[u8; MAC_LEN]> {
    let mut mac = new_hmac(&*mac_key(key)?)?;
    mac.update(iv);
    mac.update(ciphertext);

    let mut tag = [0u8; MAC_LEN];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Constant-time tag check. A mismatch means the password is wrong.
pub fn verify_tag(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
    tag: &[u8; MAC_LEN],
) -> Result<()> {
    let mut mac = new_hmac(&*mac_key(key)?)?;
    mac.update(iv);
    mac.update(ciphertext);
    mac.verify_slice(tag)
        .map_err(|_| StegoError::IncorrectPassword)
}

/// A message encrypted under a password, ready to be framed.
#[derive(Debug, Clone)]
pub struct Sealed {
    /// Base64 ciphertext
    pub ciphertext: String,
    pub params: EncryptionParams,
}

/// Encrypt a message with a password.
///
/// Draws a fresh salt and IV, derives the key, encrypts the UTF-8 bytes and
/// tags the result.
pub fn seal(message: &str, password: &str) -> Result<Sealed> {
    let salt = generate_salt();
    let key = derive_key(password, &salt);

    let (ciphertext, iv) = encrypt(message.as_bytes(), &key);
    let mac = compute_tag(&key, &iv, &ciphertext)?;

    debug!(
        "Sealed {} plaintext bytes into {} ciphertext bytes",
        message.len(),
        ciphertext.len()
    );

    Ok(Sealed {
        ciphertext: general_purpose::STANDARD.encode(&ciphertext),
        params: EncryptionParams {
            iv,
            salt,
            mac: Some(mac),
        },
    })
}

/// Decrypt a framed ciphertext with a password.
///
/// `message_length` is the length recorded in the frame metadata. Tagged
/// frames must match the plaintext character count. Untagged frames may
/// instead record the length of the base64 ciphertext.
///
/// # Errors
/// - [`StegoError::InvalidFrameFormat`] if the ciphertext is not valid base64 or
///   not a whole number of blocks
/// - [`StegoError::IncorrectPassword`] if the tag does not verify, the padding is
///   invalid, or (untagged frames only) the output is not plausible text
/// - [`StegoError::InvalidMetadata`] if a tagged frame decrypts to a message
///   whose length disagrees with the metadata
pub fn open(
    ciphertext: &str,
    params: &EncryptionParams,
    password: &str,
    message_length: usize,
) -> Result<String> {
    let encoded_len = ciphertext.len();
    let ciphertext = general_purpose::STANDARD
        .decode(ciphertext)
        .map_err(|_| StegoError::InvalidFrameFormat)?;

    let key = derive_key(password, &params.salt);

    if let Some(tag) = &params.mac {
        verify_tag(&key, &params.iv, &ciphertext, tag)?;
    }

    let plaintext = decrypt(&ciphertext, &key, &params.iv)?;
    let message = String::from_utf8(plaintext).map_err(|_| StegoError::IncorrectPassword)?;

    let plain_len = message.chars().count();
    let length_ok = match params.mac {
        Some(_) => plain_len == message_length,
        None => plain_len == message_length || encoded_len == message_length,
    };

    if !length_ok {
        return Err(match params.mac {
            Some(_) => StegoError::InvalidMetadata(
                "messageLength does not match the decrypted message".to_string(),
            ),
            None => StegoError::IncorrectPassword,
        });
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = [3u8; KEY_LEN];
        let (ct, iv) = encrypt(b"Hello, steganography!", &key);
        assert_eq!(ct.len() % BLOCK_LEN, 0);
        assert_eq!(decrypt(&ct, &key, &iv).unwrap(), b"Hello, steganography!");
    }

    #[test]
    fn ivs_are_fresh() {
        let key = [3u8; KEY_LEN];
        let (ct1, iv1) = encrypt(b"same message", &key);
        let (ct2, iv2) = encrypt(b"same message", &key);
        assert_ne!(iv1, iv2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn empty_plaintext_pads_to_one_block() {
        let key = [1u8; KEY_LEN];
        let (ct, iv) = encrypt(b"", &key);
        assert_eq!(ct.len(), BLOCK_LEN);
        assert!(decrypt(&ct, &key, &iv).unwrap().is_empty());
    }

    #[test]
    fn truncated_ciphertext_is_a_format_error() {
        let key = [1u8; KEY_LEN];
        let (ct, iv) = encrypt(b"some text here", &key);
        assert!(matches!(
            decrypt(&ct[..ct.len() - 1], &key, &iv),
            Err(StegoError::InvalidFrameFormat)
        ));
    }

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal("secret", "Pass123!").unwrap();
        assert!(sealed.params.mac.is_some());
        let message = open(&sealed.ciphertext, &sealed.params, "Pass123!", 6).unwrap();
        assert_eq!(message, "secret");
    }

    #[test]
    fn wrong_password_is_detected_by_tag() {
        let sealed = seal("secret", "Pass123!").unwrap();
        let result = open(&sealed.ciphertext, &sealed.params, "WrongPass", 6);
        assert!(matches!(result, Err(StegoError::IncorrectPassword)));
    }

    #[test]
    fn wrong_password_without_tag_uses_plausibility_check() {
        let mut sealed = seal("secret", "Pass123!").unwrap();
        sealed.params.mac = None;

        assert_eq!(
            open(&sealed.ciphertext, &sealed.params, "Pass123!", 6).unwrap(),
            "secret"
        );
        let result = open(&sealed.ciphertext, &sealed.params, "WrongPass", 6);
        assert!(matches!(result, Err(StegoError::IncorrectPassword)));
    }

    #[test]
    fn untagged_frame_may_record_ciphertext_length() {
        let mut sealed = seal("secret", "Pass123!").unwrap();
        sealed.params.mac = None;
        let encoded_len = sealed.ciphertext.len();

        assert_eq!(
            open(&sealed.ciphertext, &sealed.params, "Pass123!", encoded_len).unwrap(),
            "secret"
        );
        assert!(matches!(
            open(&sealed.ciphertext, &sealed.params, "WrongPass", encoded_len),
            Err(StegoError::IncorrectPassword)
        ));
        assert!(matches!(
            open(&sealed.ciphertext, &sealed.params, "Pass123!", 5),
            Err(StegoError::IncorrectPassword)
        ));
    }

    #[test]
    fn hmac_accepts_any_key_length() {
        for len in [0, 16, KEY_LEN, 64, 200] {
            assert!(new_hmac(&vec![7u8; len]).is_ok());
        }
    }

    #[test]
    fn unicode_plaintext_roundtrip() {
        let sealed = seal("héllo wörld ✓", "Pass123!").unwrap();
        let message = open(&sealed.ciphertext, &sealed.params, "Pass123!", 13).unwrap();
        assert_eq!(message, "héllo wörld ✓");
    }

    #[test]
    fn tampered_ciphertext_fails_tag() {
        let sealed = seal("secret message", "Pass123!").unwrap();
        let mut raw = general_purpose::STANDARD.decode(&sealed.ciphertext).unwrap();
        raw[0] ^= 1;
        let tampered = general_purpose::STANDARD.encode(&raw);
        let result = open(&tampered, &sealed.params, "Pass123!", 14);
        assert!(matches!(result, Err(StegoError::IncorrectPassword)));
    }

    #[test]
    fn length_mismatch_on_tagged_frame_is_metadata_error() {
        let sealed = seal("secret", "Pass123!").unwrap();
        let result = open(&sealed.ciphertext, &sealed.params, "Pass123!", 7);
        assert!(matches!(result, Err(StegoError::InvalidMetadata(_))));
    }

    #[test]
    fn non_base64_ciphertext_is_format_error() {
        let sealed = seal("secret", "Pass123!").unwrap();
        let result = open("not base64 !!", &sealed.params, "Pass123!", 6);
        assert!(matches!(result, Err(StegoError::InvalidFrameFormat)));
    }
}
