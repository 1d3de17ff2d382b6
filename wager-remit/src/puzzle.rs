use serde::{Deserialize, Serialize};
use wager_core::commitment::digest;
use wager_core::{Commitment, CommitmentScheme, Identity};

/// Domain separator for deposit puzzles.
const PUZZLE_DOMAIN: &[u8] = b"WAGER_REMIT_PUZZLE_V1";

/// The recipient a deposit is bound to and the password shared with them
/// out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzlePreimage {
    pub recipient: Identity,
    pub secret: Vec<u8>,
}

impl PuzzlePreimage {
    pub fn new(recipient: impl Into<Identity>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            recipient: recipient.into(),
            secret: secret.into(),
        }
    }

    pub fn puzzle(&self) -> Commitment {
        PuzzleCommitment::commit(self)
    }
}

pub struct PuzzleCommitment;

impl CommitmentScheme for PuzzleCommitment {
    type Preimage = PuzzlePreimage;

    fn commit(preimage: &PuzzlePreimage) -> Commitment {
        create_puzzle(&preimage.recipient, &preimage.secret)
    }
}

/// `SHA256(domain || len(recipient) u32 BE || recipient || secret)`.
///
/// Only `recipient` can later present `secret` to claim the deposit.
pub fn create_puzzle(recipient: &Identity, secret: &[u8]) -> Commitment {
    let recipient = recipient.as_bytes();
    let len = u32::try_from(recipient.len())
        .unwrap_or(u32::MAX)
        .to_be_bytes();
    digest(PUZZLE_DOMAIN, &[len.as_slice(), recipient, secret])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puzzle_binds_recipient() {
        let secret = b"password";
        let puzzle = create_puzzle(&Identity::from("recipient"), secret);

        assert_eq!(puzzle, create_puzzle(&Identity::from("recipient"), secret));
        assert_ne!(puzzle, create_puzzle(&Identity::from("depositor"), secret));
        assert_ne!(puzzle, create_puzzle(&Identity::from("recipient"), b"something"));
    }

    #[test]
    fn test_length_prefix_separates_fields() {
        // "ab" + "c" and "a" + "bc" hash the same bytes without the prefix
        assert_ne!(
            create_puzzle(&Identity::from("ab"), b"c"),
            create_puzzle(&Identity::from("a"), b"bc")
        );
    }

    #[test]
    fn test_verify() {
        let preimage = PuzzlePreimage::new("recipient", b"password".to_vec());
        let puzzle = preimage.puzzle();

        assert!(PuzzleCommitment::verify(&puzzle, &preimage));
        assert!(!PuzzleCommitment::verify(
            &puzzle,
            &PuzzlePreimage::new("someone", b"password".to_vec())
        ));
    }
}
