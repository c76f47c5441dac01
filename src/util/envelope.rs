// JSON Envelopes
// Wire and storage wrappers around base64 key blobs and ciphertexts

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rsa::{RsaPrivateKey, RsaPublicKey};

/// Public key as published to the key directory: `{"email": .., "key": ..}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyEnvelope {
    #[serde(default)]
    pub email: String,
    pub key: String,
}

/// Private key together with every identity it has been published under
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKeyEnvelope {
    #[serde(default)]
    pub email: Vec<String>,
    pub key: String,
}

/// Encrypted message: `{"email": .., "content": base64 ciphertext}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub email: String,
    pub content: String,
}

impl PublicKeyEnvelope {
    pub fn new(key: &RsaPublicKey) -> Result<Self> {
        Ok(Self {
            email: String::new(),
            key: key.to_base64()?,
        })
    }

    pub fn public_key(&self) -> Result<RsaPublicKey> {
        RsaPublicKey::from_base64(&self.key)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl PrivateKeyEnvelope {
    pub fn new(key: &RsaPrivateKey) -> Result<Self> {
        Ok(Self {
            email: Vec::new(),
            key: key.to_base64()?,
        })
    }

    pub fn private_key(&self) -> Result<RsaPrivateKey> {
        RsaPrivateKey::from_base64(&self.key)
    }

    /// Register an identity; returns false if it was already present
    pub fn add_email(&mut self, email: &str) -> bool {
        if self.has_email(email) {
            return false;
        }
        self.email.push(email.to_string());
        true
    }

    pub fn has_email(&self, email: &str) -> bool {
        self.email.iter().any(|e| e == email)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl MessageEnvelope {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}
