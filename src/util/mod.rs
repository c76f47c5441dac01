// Boundary collaborators: key storage and the JSON envelopes it holds

pub mod envelope;
pub mod file_ops;

pub use envelope::{MessageEnvelope, PrivateKeyEnvelope, PublicKeyEnvelope};
pub use file_ops::{FileKeyStore, KeyStore, MemoryKeyStore};
