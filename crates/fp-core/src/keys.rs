//! Identifiers: BIP340 public keys and bech32 chain addresses.

use crate::errors::{CoreError, CoreResult};
use bech32::{Bech32, Hrp};
use k256::schnorr::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// BIP340 (x-only Schnorr) public key identifying a finality provider.
///
/// Always holds a valid curve point; construction goes through
/// [`VerifyingKey`] validation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BtcPublicKey([u8; 32]);

impl BtcPublicKey {
    /// Serialized length in bytes.
    pub const LEN: usize = 32;

    /// Parse an x-only public key from its 32-byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let key = VerifyingKey::from_bytes(bytes)
            .map_err(|e| CoreError::invalid_public_key(format!("{}: {e}", hex::encode(bytes))))?;
        Ok(Self::from_verifying_key(&key))
    }

    /// Parse a hex-encoded x-only public key.
    pub fn from_hex(s: &str) -> CoreResult<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| CoreError::invalid_public_key(format!("{s}: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Build from an already validated verifying key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let mut out = [0u8; Self::LEN];
        out.copy_from_slice(&key.to_bytes());
        Self(out)
    }

    /// Verifying key for signature checks.
    pub fn verifying_key(&self) -> CoreResult<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CoreError::invalid_public_key(format!("{self}: {e}")))
    }

    /// Raw 32-byte encoding.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for BtcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BtcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BtcPublicKey({})", self.to_hex())
    }
}

impl FromStr for BtcPublicKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for BtcPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BtcPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Bech32 account address on the consumer chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChainAddress(String);

impl ChainAddress {
    /// Validate and normalize a bech32 address string.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| CoreError::invalid_address(format!("{s}: {e}")))?;
        if data.is_empty() {
            return Err(CoreError::invalid_address(format!("{s}: empty payload")));
        }
        Self::encode(hrp, &data)
    }

    /// Encode raw account bytes under the given human-readable prefix.
    pub fn from_bytes(prefix: &str, bytes: &[u8]) -> CoreResult<Self> {
        let hrp = Hrp::parse(prefix)
            .map_err(|e| CoreError::invalid_address(format!("prefix {prefix}: {e}")))?;
        Self::encode(hrp, bytes)
    }

    fn encode(hrp: Hrp, bytes: &[u8]) -> CoreResult<Self> {
        bech32::encode::<Bech32>(hrp, bytes)
            .map(Self)
            .map_err(|e| CoreError::invalid_address(e.to_string()))
    }

    /// Decoded account bytes; the message a proof-of-possession commits to.
    pub fn canonical_bytes(&self) -> CoreResult<Vec<u8>> {
        bech32::decode(&self.0)
            .map(|(_, data)| data)
            .map_err(|e| CoreError::invalid_address(format!("{}: {e}", self.0)))
    }

    /// Human-readable prefix (e.g. `bbn`).
    pub fn prefix(&self) -> &str {
        self.0.rsplit_once('1').map(|(hrp, _)| hrp).unwrap_or_default()
    }

    /// Address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChainAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ChainAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use k256::schnorr::SigningKey;

    fn test_key() -> BtcPublicKey {
        let sk = SigningKey::from_bytes(&[7u8; 32]).unwrap();
        BtcPublicKey::from_verifying_key(sk.verifying_key())
    }

    #[test]
    fn test_public_key_hex_round_trip() {
        let pk = test_key();
        let parsed: BtcPublicKey = pk.to_hex().parse().unwrap();
        assert_eq!(parsed, pk);
        assert_eq!(pk.to_hex().len(), 64);
    }

    #[test]
    fn test_public_key_rejects_malformed_input() {
        assert_matches!(
            BtcPublicKey::from_hex("not-hex"),
            Err(CoreError::InvalidPublicKey(_))
        );
        assert_matches!(
            BtcPublicKey::from_hex("abcd"),
            Err(CoreError::InvalidPublicKey(_))
        );
    }

    #[test]
    fn test_address_round_trip() {
        let addr = ChainAddress::from_bytes("bbn", &[1u8; 20]).unwrap();
        assert!(addr.as_str().starts_with("bbn1"));
        assert_eq!(addr.prefix(), "bbn");
        assert_eq!(addr.canonical_bytes().unwrap(), vec![1u8; 20]);
        assert_eq!(ChainAddress::parse(addr.as_str()).unwrap(), addr);
    }

    #[test]
    fn test_address_rejects_bad_checksum() {
        let addr = ChainAddress::from_bytes("bbn", &[1u8; 20]).unwrap();
        let mut broken = addr.as_str().to_string();
        let last = broken.pop().unwrap();
        broken.push(if last == 'q' { 'p' } else { 'q' });
        assert_matches!(
            ChainAddress::parse(&broken),
            Err(CoreError::InvalidAddress(_))
        );
    }
}
