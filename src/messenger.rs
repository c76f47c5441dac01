// Keyring
// Local half of the messenger workflow: keys on one side, envelopes on the other.
// Fetching and posting envelopes is left to the caller's transport.

use crate::error::{Error, Result};
use crate::rsa::{
    decrypt_from_base64, encrypt_to_base64, KeyPairBuilder, RandomSource, RsaKeyPair,
    RsaPublicKey, SystemRandom,
};
use crate::util::{KeyStore, MessageEnvelope, PrivateKeyEnvelope, PublicKeyEnvelope};

/// Identifier of the local public key
pub const PUBLIC_KEY_ID: &str = "public";

/// Identifier of the local private key
pub const PRIVATE_KEY_ID: &str = "private";

/// Local keys and imported correspondent keys on top of a [`KeyStore`]
#[derive(Debug)]
pub struct Keyring<S> {
    store: S,
}

impl<S: KeyStore> Keyring<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Generate a fresh key pair and store both halves with no identities
    pub fn generate(&self, key_size: usize) -> Result<RsaKeyPair> {
        self.generate_with(&KeyPairBuilder::new(key_size), &SystemRandom)
    }

    pub fn generate_with<R>(&self, builder: &KeyPairBuilder, source: &R) -> Result<RsaKeyPair>
    where
        R: RandomSource + ?Sized,
    {
        let keypair = builder.build(source)?;

        let public = PublicKeyEnvelope::new(&keypair.public_key)?;
        let private = PrivateKeyEnvelope::new(&keypair.private_key)?;
        self.store.save(PUBLIC_KEY_ID, public.to_json()?.as_bytes())?;
        self.store.save(PRIVATE_KEY_ID, private.to_json()?.as_bytes())?;

        log::info!("stored new {}-bit key pair", keypair.bit_length());
        Ok(keypair)
    }

    pub fn public_envelope(&self) -> Result<PublicKeyEnvelope> {
        PublicKeyEnvelope::from_json(&self.store.load(PUBLIC_KEY_ID)?)
    }

    pub fn private_envelope(&self) -> Result<PrivateKeyEnvelope> {
        PrivateKeyEnvelope::from_json(&self.store.load(PRIVATE_KEY_ID)?)
    }

    /// The local public key tagged with `email`, ready to upload. Nothing is
    /// stored; call [`Keyring::register_identity`] once the upload succeeded.
    pub fn publish(&self, email: &str) -> Result<PublicKeyEnvelope> {
        let mut public = self.public_envelope()?;
        public.email = email.to_string();
        Ok(public)
    }

    /// Remember `email` as an identity of the private key. Returns false if
    /// it was already registered.
    pub fn register_identity(&self, email: &str) -> Result<bool> {
        let mut private = self.private_envelope()?;
        if !private.add_email(email) {
            return Ok(false);
        }
        self.store.save(PRIVATE_KEY_ID, private.to_json()?.as_bytes())?;
        log::info!("registered identity {}", email);
        Ok(true)
    }

    /// Store a correspondent's public key envelope after checking it decodes
    pub fn import_public_key(&self, email: &str, data: &[u8]) -> Result<RsaPublicKey> {
        let envelope = PublicKeyEnvelope::from_json(data)?;
        let key = envelope.public_key()?;
        self.store.save(email, data)?;
        Ok(key)
    }

    /// Encrypt `plaintext` to the imported key of `email`
    pub fn seal_message(&self, email: &str, plaintext: &str) -> Result<MessageEnvelope> {
        let key = PublicKeyEnvelope::from_json(&self.store.load(email)?)?.public_key()?;
        Ok(MessageEnvelope {
            email: email.to_string(),
            content: encrypt_to_base64(plaintext, &key)?,
        })
    }

    /// Decrypt a message addressed to `email`, which must be a registered
    /// identity of the local private key
    pub fn open_message(&self, email: &str, data: &[u8]) -> Result<String> {
        let private = self.private_envelope()?;
        if !private.has_email(email) {
            return Err(Error::UnknownIdentity(email.to_string()));
        }

        let message = MessageEnvelope::from_json(data)?;
        decrypt_from_base64(&message.content, &private.private_key()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::MemoryKeyStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Mutex;

    fn keyring(seed: u64) -> Keyring<MemoryKeyStore> {
        let keyring = Keyring::new(MemoryKeyStore::new());
        let source = Mutex::new(ChaCha8Rng::seed_from_u64(seed));
        keyring
            .generate_with(&KeyPairBuilder::new(256).with_workers(2), &source)
            .unwrap();
        keyring
    }

    #[test]
    fn test_generate_stores_empty_identities() {
        let keyring = keyring(1);
        assert_eq!(keyring.public_envelope().unwrap().email, "");
        assert!(keyring.private_envelope().unwrap().email.is_empty());
    }

    #[test]
    fn test_publish_does_not_register_identity() {
        let keyring = keyring(2);
        let published = keyring.publish("alice@example.com").unwrap();

        assert_eq!(published.email, "alice@example.com");
        assert_eq!(published.key, keyring.public_envelope().unwrap().key);
        assert!(keyring.private_envelope().unwrap().email.is_empty());

        // an unregistered identity cannot open messages even after publish
        let wire = br#"{"email":"alice@example.com","content":"AA=="}"#;
        assert!(matches!(
            keyring.open_message("alice@example.com", wire),
            Err(Error::UnknownIdentity(_))
        ));
    }

    #[test]
    fn test_register_identity_once() {
        let keyring = keyring(7);
        assert!(keyring.register_identity("alice@example.com").unwrap());
        assert!(!keyring.register_identity("alice@example.com").unwrap());
        assert_eq!(
            keyring.private_envelope().unwrap().email,
            vec!["alice@example.com".to_string()]
        );
    }

    #[test]
    fn test_message_exchange() {
        let alice = keyring(3);
        let bob = keyring(4);

        let published = bob.publish("bob@example.com").unwrap();
        bob.register_identity("bob@example.com").unwrap();
        alice
            .import_public_key("bob@example.com", published.to_json().unwrap().as_bytes())
            .unwrap();

        let message = alice.seal_message("bob@example.com", "hi bob").unwrap();
        let wire = message.to_json().unwrap();
        assert_eq!(bob.open_message("bob@example.com", wire.as_bytes()).unwrap(), "hi bob");
    }

    #[test]
    fn test_open_requires_registered_identity() {
        let bob = keyring(5);
        let wire = br#"{"email":"bob@example.com","content":"AA=="}"#;
        assert!(matches!(
            bob.open_message("bob@example.com", wire),
            Err(Error::UnknownIdentity(_))
        ));
    }

    #[test]
    fn test_seal_without_imported_key() {
        let alice = keyring(6);
        assert!(matches!(
            alice.seal_message("carol@example.com", "hello"),
            Err(Error::KeyNotFound(_))
        ));
        assert!(alice
            .import_public_key("carol@example.com", br#"{"key":"!!"}"#)
            .is_err());
    }
}
