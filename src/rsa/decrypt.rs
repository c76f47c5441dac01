// RSA Decryption Implementation
// Textbook exponentiation with the private key

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_traits::Zero;

use super::bigint::{from_twos_complement_le, mod_pow};
use super::keygen::RsaPrivateKey;
use crate::error::{Error, Result};

/// Decrypt ciphertext bytes using RSA private key
/// Returns plaintext as unsigned little-endian bytes; zero decrypts to no bytes
pub fn decrypt_bytes(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    if private_key.n.is_zero() {
        return Err(Error::InvalidModulus);
    }

    let c = from_twos_complement_le(ciphertext)
        .to_biguint()
        .ok_or(Error::NegativeCiphertext)?;

    // m = c^d mod n
    let m = mod_pow(&c, &private_key.d, &private_key.n);

    if m.is_zero() {
        return Ok(Vec::new());
    }
    Ok(m.to_bytes_le())
}

/// Decrypt ciphertext to a string
pub fn decrypt_to_string(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<String> {
    let plaintext = decrypt_bytes(ciphertext, private_key)?;
    Ok(String::from_utf8(plaintext)?)
}

/// Decrypt the base64 content of a message envelope
pub fn decrypt_from_base64(content: &str, private_key: &RsaPrivateKey) -> Result<String> {
    let ciphertext = STANDARD.decode(content.trim())?;
    decrypt_to_string(&ciphertext, private_key)
}

impl RsaPrivateKey {
    /// Decrypt a ciphertext using this private key
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt_bytes(ciphertext, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::encrypt::encrypt_to_base64;
    use crate::rsa::keygen::{KeyPairBuilder, RsaKeyPair, RsaPublicKey};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Mutex;

    fn textbook_key() -> RsaPrivateKey {
        RsaPrivateKey::new(from_u64(2753), from_u64(3233))
    }

    fn keypair(bits: usize, seed: u64) -> RsaKeyPair {
        let source = Mutex::new(ChaCha8Rng::seed_from_u64(seed));
        KeyPairBuilder::new(bits)
            .with_workers(2)
            .build(&source)
            .unwrap()
    }

    #[test]
    fn test_decrypt_textbook() {
        let plaintext = decrypt_bytes(&[0xe6, 0x0a], &textbook_key()).unwrap();
        assert_eq!(plaintext, b"A");
        assert_eq!(decrypt_from_base64("5go=", &textbook_key()).unwrap(), "A");
    }

    #[test]
    fn test_decrypt_string() {
        let keypair = keypair(256, 3);
        let message = "Hello, RSA!";

        let ciphertext = keypair.public_key.encrypt(message.as_bytes()).unwrap();
        let decrypted = decrypt_to_string(&ciphertext, &keypair.private_key).unwrap();

        assert_eq!(message, decrypted);
    }

    #[test]
    fn test_decrypt_high_final_byte() {
        // UTF-8 text whose last byte has the high bit set
        let keypair = keypair(256, 4);
        let content = encrypt_to_base64("café", &keypair.public_key).unwrap();
        assert_eq!(decrypt_from_base64(&content, &keypair.private_key).unwrap(), "café");
    }

    #[test]
    fn test_decrypt_negative_ciphertext() {
        assert!(matches!(
            decrypt_bytes(&[0xff], &textbook_key()),
            Err(Error::NegativeCiphertext)
        ));
    }

    #[test]
    fn test_decrypt_invalid_utf8() {
        // 0xff is not valid UTF-8; encrypt it with the textbook public key
        let public = RsaPublicKey::new(from_u64(17), from_u64(3233));
        let ciphertext = public.encrypt(&[0xff]).unwrap();
        assert!(matches!(
            decrypt_to_string(&ciphertext, &textbook_key()),
            Err(Error::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_plaintext_not_below_modulus_wraps() {
        let public = RsaPublicKey::new(from_u64(17), from_u64(3233));
        let too_large = from_u64(3233 + 65).to_bytes_le();
        let ciphertext = public.encrypt(&too_large).unwrap();
        assert_eq!(textbook_key().decrypt(&ciphertext).unwrap(), b"A");
    }
}
