//! Proof-of-possession binding a chain account to a BTC key.
//!
//! The signed message is `SHA-256(canonical address bytes)`, where the
//! canonical bytes are the decoded bech32 payload of the account address. The
//! signature is BIP340 Schnorr by the finality provider's BTC key, which is
//! what the staking module checks when the provider registers.

use crate::errors::{CoreError, CoreResult};
use crate::keys::{BtcPublicKey, ChainAddress};
use k256::schnorr::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::schnorr::{Signature, SigningKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Signature scheme used for the BTC side of the proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BtcSigType {
    /// BIP340 Schnorr signature
    Bip340,
}

/// Proof that one entity controls both a chain account and a BTC key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfPossession {
    /// Signature scheme
    pub btc_sig_type: BtcSigType,
    /// Signature bytes
    #[serde(with = "hex_bytes")]
    pub btc_sig: Vec<u8>,
}

impl ProofOfPossession {
    /// Sign the address digest with the BTC private key.
    pub fn create(address: &ChainAddress, key: &SigningKey) -> CoreResult<Self> {
        let digest = message_digest(address)?;
        let signature: Signature = key
            .sign_prehash(&digest)
            .map_err(|e| CoreError::invalid_signature(e.to_string()))?;
        Ok(Self {
            btc_sig_type: BtcSigType::Bip340,
            btc_sig: signature.to_bytes().to_vec(),
        })
    }

    /// Check the proof against an address and the claimed BTC key.
    pub fn verify(&self, address: &ChainAddress, btc_pk: &BtcPublicKey) -> CoreResult<()> {
        let digest = message_digest(address)?;
        let signature = Signature::try_from(self.btc_sig.as_slice())
            .map_err(|e| CoreError::invalid_signature(e.to_string()))?;
        btc_pk
            .verifying_key()?
            .verify_prehash(&digest, &signature)
            .map_err(|e| CoreError::invalid_signature(e.to_string()))
    }

    /// Encoding carried in the registration transaction.
    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn message_digest(address: &ChainAddress) -> CoreResult<[u8; 32]> {
    let canonical = address.canonical_bytes()?;
    Ok(Sha256::digest(&canonical).into())
}

pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fixture() -> (SigningKey, BtcPublicKey, ChainAddress) {
        let sk = SigningKey::from_bytes(&[3u8; 32]).unwrap();
        let pk = BtcPublicKey::from_verifying_key(sk.verifying_key());
        let addr = ChainAddress::from_bytes("bbn", &[9u8; 20]).unwrap();
        (sk, pk, addr)
    }

    #[test]
    fn test_pop_verifies_for_signing_address() {
        let (sk, pk, addr) = fixture();
        let pop = ProofOfPossession::create(&addr, &sk).unwrap();
        assert_eq!(pop.btc_sig.len(), 64);
        pop.verify(&addr, &pk).unwrap();
    }

    #[test]
    fn test_pop_rejects_other_address() {
        let (sk, pk, addr) = fixture();
        let pop = ProofOfPossession::create(&addr, &sk).unwrap();
        let other = ChainAddress::from_bytes("bbn", &[8u8; 20]).unwrap();
        assert_matches!(pop.verify(&other, &pk), Err(CoreError::InvalidSignature(_)));
    }

    #[test]
    fn test_pop_rejects_other_key() {
        let (sk, _, addr) = fixture();
        let pop = ProofOfPossession::create(&addr, &sk).unwrap();
        let other_sk = SigningKey::from_bytes(&[4u8; 32]).unwrap();
        let other_pk = BtcPublicKey::from_verifying_key(other_sk.verifying_key());
        assert!(pop.verify(&addr, &other_pk).is_err());
    }

    #[test]
    fn test_pop_encoding_is_stable() {
        let (sk, _, addr) = fixture();
        let pop = ProofOfPossession::create(&addr, &sk).unwrap();
        let bytes = pop.to_bytes().unwrap();
        let decoded: ProofOfPossession = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, pop);
    }
}
