//! Peer identity derived from a compressed secp256k1 public key.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Length of a compressed public key.
pub const PEER_IDENTITY_LEN: usize = 33;

/// Errors from [`PeerIdentity`] construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PeerIdentityError {
    #[error("invalid length: expected 33 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid compressed key prefix: {0:#04x}")]
    InvalidPrefix(u8),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Opaque, comparable key for a remote peer.
///
/// Wraps the serialized compressed public key so it can be used directly as a
/// map key. Only the encoding is checked here; curve validity is the
/// transport's concern.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerIdentity([u8; PEER_IDENTITY_LEN]);

impl PeerIdentity {
    pub fn from_bytes(bytes: [u8; PEER_IDENTITY_LEN]) -> Result<Self, PeerIdentityError> {
        match bytes[0] {
            0x02 | 0x03 => Ok(Self(bytes)),
            prefix => Err(PeerIdentityError::InvalidPrefix(prefix)),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PeerIdentityError> {
        let bytes: [u8; PEER_IDENTITY_LEN] = bytes
            .try_into()
            .map_err(|_| PeerIdentityError::InvalidLength(bytes.len()))?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PEER_IDENTITY_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for PeerIdentity {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for PeerIdentity {
    type Error = PeerIdentityError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerIdentity({self})")
    }
}

impl FromStr for PeerIdentity {
    type Err = PeerIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for PeerIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeerIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
