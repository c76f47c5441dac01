// RSA Module - Main module file
// Exports all RSA-related functionality

pub mod bigint;
pub mod codec;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod prime;
pub mod random;

pub use codec::{decode_key, decode_key_base64, encode_key, encode_key_base64};
pub use decrypt::{decrypt_bytes, decrypt_from_base64, decrypt_to_string};
pub use encrypt::{encrypt_bytes, encrypt_string, encrypt_to_base64};
pub use keygen::{
    generate_keypair, KeyPairBuilder, RsaKeyPair, RsaPrivateKey, RsaPublicKey, MAX_KEY_BITS,
    MIN_KEY_BITS, PUBLIC_EXPONENT_BITS,
};
pub use prime::{PrimeSearch, WITNESS_ROUNDS};
pub use random::{RandomSource, SystemRandom};
