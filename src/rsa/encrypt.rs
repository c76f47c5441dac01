// RSA Encryption Implementation
// Textbook exponentiation with the public key, no padding

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_traits::Zero;

use super::bigint::{mod_pow, to_twos_complement_le, RsaBigInt};
use super::keygen::RsaPublicKey;
use crate::error::{Error, Result};

/// Encrypt bytes using RSA public key
///
/// The plaintext is read as an unsigned little-endian integer and the
/// ciphertext is written in two's complement, least-significant byte first.
/// The plaintext integer must be smaller than the modulus; larger values are
/// reduced silently and will not decrypt to the input.
pub fn encrypt_bytes(plaintext: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    if public_key.n.is_zero() {
        return Err(Error::InvalidModulus);
    }

    let m = RsaBigInt::from_bytes_le(plaintext);

    // Compute c = m^e mod n
    let c = mod_pow(&m, &public_key.e, &public_key.n);

    Ok(to_twos_complement_le(&c))
}

/// Encrypt a string using RSA public key
pub fn encrypt_string(plaintext: &str, public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    encrypt_bytes(plaintext.as_bytes(), public_key)
}

/// Encrypt a string and base64 the ciphertext for a message envelope
pub fn encrypt_to_base64(plaintext: &str, public_key: &RsaPublicKey) -> Result<String> {
    Ok(STANDARD.encode(encrypt_string(plaintext, public_key)?))
}

impl RsaPublicKey {
    /// Encrypt a message using this public key
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        encrypt_bytes(plaintext, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;

    fn textbook_key() -> RsaPublicKey {
        // p = 61, q = 53
        RsaPublicKey::new(from_u64(17), from_u64(3233))
    }

    #[test]
    fn test_encrypt_textbook() {
        // 65^17 mod 3233 = 2790 = 0x0ae6
        let ciphertext = encrypt_bytes(b"A", &textbook_key()).unwrap();
        assert_eq!(ciphertext, vec![0xe6, 0x0a]);
        assert_eq!(encrypt_to_base64("A", &textbook_key()).unwrap(), "5go=");
    }

    #[test]
    fn test_encrypt_empty() {
        // zero stays zero
        assert_eq!(encrypt_bytes(b"", &textbook_key()).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_encrypt_zero_modulus() {
        let key = RsaPublicKey::new(from_u64(17), from_u64(0));
        assert!(matches!(encrypt_bytes(b"A", &key), Err(Error::InvalidModulus)));
    }

    #[test]
    fn test_ciphertext_is_non_negative() {
        let key = textbook_key();
        for byte in 0u8..=255 {
            let ciphertext = key.encrypt(&[byte]).unwrap();
            if let Some(last) = ciphertext.last() {
                assert_eq!(last & 0x80, 0);
            }
        }
    }
}
