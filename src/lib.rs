//! Textbook RSA messaging keys.
//!
//! Key pairs are built from primes found by a parallel Miller-Rabin search,
//! with a random 512-bit prime as public exponent. Keys travel as
//! length-prefixed two's-complement blobs in base64, wrapped in JSON
//! envelopes; messages are encrypted by plain modular exponentiation.
//!
//! This is not a production RSA: there is no padding and nothing runs in
//! constant time.
//!
//! ```rust,no_run
//! use rsa_messenger::rsa::{generate_keypair, encrypt_to_base64, decrypt_from_base64};
//!
//! let keypair = generate_keypair(1024)?;
//! let content = encrypt_to_base64("hello", &keypair.public_key)?;
//! assert_eq!(decrypt_from_base64(&content, &keypair.private_key)?, "hello");
//! # Ok::<(), rsa_messenger::Error>(())
//! ```

pub mod error;
pub mod messenger;
pub mod rsa;
pub mod util;

pub use error::{Error, Result};
pub use messenger::Keyring;
