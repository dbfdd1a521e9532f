//! Password → key derivation.
//!
//! PBKDF2 with HMAC-SHA256. The iteration count is part of the frame format:
//! changing it makes previously written images undecryptable, so it is a
//! constant rather than a setting.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 iteration count for format version 1.
pub const KDF_ITERATIONS: u32 = 10_000;
/// Derived key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;
/// Salt length in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Derive the AES-256 key from a password and salt.
///
/// Deterministic for identical inputs. The key is wiped when dropped.
pub fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, KDF_ITERATIONS, &mut *key);
    key
}

/// Fresh random salt for a single encryption.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}
