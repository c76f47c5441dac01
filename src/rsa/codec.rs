// RSA Key Blob Encoding
// Length-prefixed layout exchanged with the key server, wrapped in base64
//
//   [u32 BE length][exponent, two's complement, LSB first]
//   [u32 BE length][modulus,  two's complement, LSB first]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_traits::Signed;

use super::bigint::{from_twos_complement_le, to_twos_complement_le, RsaBigInt};
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::error::{Error, Result};

const LENGTH_FIELD: usize = 4;

/// Encode an (exponent, modulus) pair as a key blob
pub fn encode_key(exponent: &RsaBigInt, modulus: &RsaBigInt) -> Result<Vec<u8>> {
    let exponent = to_twos_complement_le(exponent);
    let modulus = to_twos_complement_le(modulus);

    let mut blob = Vec::with_capacity(2 * LENGTH_FIELD + exponent.len() + modulus.len());
    for value in [&exponent, &modulus] {
        let len = u32::try_from(value.len()).map_err(|_| Error::ValueTooLarge(value.len()))?;
        blob.extend_from_slice(&len.to_be_bytes());
        blob.extend_from_slice(value);
    }
    Ok(blob)
}

/// Decode a key blob back into its (exponent, modulus) pair
pub fn decode_key(blob: &[u8]) -> Result<(RsaBigInt, RsaBigInt)> {
    let mut reader = BlobReader { rest: blob };
    let exponent = reader.read_value("exponent")?;
    let modulus = reader.read_value("modulus")?;

    if !reader.rest.is_empty() {
        return Err(Error::TrailingBytes(reader.rest.len()));
    }
    Ok((exponent, modulus))
}

/// Key blob as a standard base64 string
pub fn encode_key_base64(exponent: &RsaBigInt, modulus: &RsaBigInt) -> Result<String> {
    Ok(STANDARD.encode(encode_key(exponent, modulus)?))
}

pub fn decode_key_base64(text: &str) -> Result<(RsaBigInt, RsaBigInt)> {
    decode_key(&STANDARD.decode(text.trim())?)
}

struct BlobReader<'a> {
    rest: &'a [u8],
}

impl<'a> BlobReader<'a> {
    fn take(&mut self, field: &'static str, needed: usize) -> Result<&'a [u8]> {
        if self.rest.len() < needed {
            return Err(Error::Truncated {
                field,
                needed,
                available: self.rest.len(),
            });
        }
        let (head, tail) = self.rest.split_at(needed);
        self.rest = tail;
        Ok(head)
    }

    fn read_value(&mut self, field: &'static str) -> Result<RsaBigInt> {
        let mut len = [0u8; LENGTH_FIELD];
        len.copy_from_slice(self.take(field, LENGTH_FIELD)?);
        let len = u32::from_be_bytes(len) as usize;

        let value = from_twos_complement_le(self.take(field, len)?);
        if value.is_negative() {
            return Err(Error::NegativeComponent(field));
        }
        value.to_biguint().ok_or(Error::NegativeComponent(field))
    }
}

impl RsaPublicKey {
    /// Encode as `(E, N)` key blob
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        encode_key(&self.e, &self.n)
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let (e, n) = decode_key(blob)?;
        Ok(Self::new(e, n))
    }

    pub fn to_base64(&self) -> Result<String> {
        encode_key_base64(&self.e, &self.n)
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        let (e, n) = decode_key_base64(text)?;
        Ok(Self::new(e, n))
    }
}

impl RsaPrivateKey {
    /// Encode as `(D, N)` key blob
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        encode_key(&self.d, &self.n)
    }

    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let (d, n) = decode_key(blob)?;
        Ok(Self::new(d, n))
    }

    pub fn to_base64(&self) -> Result<String> {
        encode_key_base64(&self.d, &self.n)
    }

    pub fn from_base64(text: &str) -> Result<Self> {
        let (d, n) = decode_key_base64(text)?;
        Ok(Self::new(d, n))
    }
}
