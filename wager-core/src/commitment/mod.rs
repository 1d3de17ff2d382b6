pub mod scheme;

pub use scheme::CommitmentScheme;

use crate::error::EscrowError;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub const COMMITMENT_LEN: usize = 32;

/// Opaque SHA-256 digest binding a hidden preimage.
///
/// The all-zero value is reserved: it is what an empty or missing commitment
/// decodes to, so it is never accepted as an identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Commitment([u8; COMMITMENT_LEN]);

impl Commitment {
    pub const ZERO: Commitment = Commitment([0u8; COMMITMENT_LEN]);

    pub const fn from_bytes(bytes: [u8; COMMITMENT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; COMMITMENT_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl FromStr for Commitment {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)
            .map_err(|e| EscrowError::InvalidCommitment(format!("not hex: {}", e)))?;
        let bytes: [u8; COMMITMENT_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            EscrowError::InvalidCommitment(format!(
                "expected {} bytes, got {}",
                COMMITMENT_LEN,
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Domain-separated SHA-256 over a sequence of fields.
pub fn digest(domain: &[u8], parts: &[&[u8]]) -> Commitment {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }
    Commitment(hasher.finalize().into())
}

/// Rnd secret for commitment
pub fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl CommitmentScheme for Plain {
        type Preimage = [u8];

        fn commit(preimage: &[u8]) -> Commitment {
            digest(b"TEST", &[preimage])
        }
    }

    #[test]
    fn test_commitment_scheme() {
        let secret = generate_secret();
        let commitment = Plain::commit(&secret);

        assert!(Plain::verify(&commitment, &secret));
        assert!(!Plain::verify(&commitment, b"wrong secret"));
    }

    #[test]
    fn test_domain_separates_digests() {
        assert_ne!(digest(b"A", &[b"x"]), digest(b"B", &[b"x"]));
        assert!(!digest(b"A", &[b"x"]).is_zero());
    }

    #[test]
    fn test_hex_round_trip_and_rejects_bad_input() {
        let c = digest(b"TEST", &[b"secret"]);
        let parsed: Commitment = c.to_hex().parse().unwrap();
        assert_eq!(parsed, c);

        let prefixed: Commitment = format!("0x{}", c).parse().unwrap();
        assert_eq!(prefixed, c);

        assert!("".parse::<Commitment>().is_err());
        assert!("zz".parse::<Commitment>().is_err());
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let c = digest(b"TEST", &[b"secret"]);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{}\"", c.to_hex()));

        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
