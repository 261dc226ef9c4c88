use super::Error;
use sha1::{Digest, Sha1};
use std::fmt;

pub const SHA1_HASH_SIZE: usize = 20;

/// A 20-byte object identifier, rendered as 40 lowercase hex characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sha1Hash([u8; SHA1_HASH_SIZE]);

impl Sha1Hash {
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex_str)
            .map_err(|err| Error::Protocol(format!("bad object id {hex_str:?}: {err}")))?;
        Self::try_from(bytes.as_slice())
    }

    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Sha1Hash {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; SHA1_HASH_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::Protocol(format!("object id must be 20 bytes, got {}", bytes.len())))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; SHA1_HASH_SIZE]> for Sha1Hash {
    fn from(value: [u8; SHA1_HASH_SIZE]) -> Self {
        Self(value)
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}
