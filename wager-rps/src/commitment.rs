use crate::moves::Move;
use serde::{Deserialize, Serialize};
use wager_core::commitment::digest;
use wager_core::{Commitment, CommitmentScheme};

/// Domain separator for move commitments.
const MOVE_DOMAIN: &[u8] = b"WAGER_RPS_MOVE_V1";

/// What a creator keeps private until settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePreimage {
    pub mv: Move,
    pub secret: Vec<u8>,
}

impl MovePreimage {
    pub fn new(mv: Move, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            mv,
            secret: secret.into(),
        }
    }

    /// Fresh preimage with a random secret.
    pub fn random(mv: Move) -> Self {
        Self::new(mv, wager_core::generate_secret())
    }

    pub fn commitment(&self) -> Commitment {
        MoveCommitment::commit(self)
    }
}

pub struct MoveCommitment;

impl CommitmentScheme for MoveCommitment {
    type Preimage = MovePreimage;

    fn commit(preimage: &MovePreimage) -> Commitment {
        encode_move(preimage.mv, &preimage.secret)
    }
}

/// `SHA256(domain || move code || secret)`; doubles as the room identifier.
pub fn encode_move(mv: Move, secret: &[u8]) -> Commitment {
    digest(MOVE_DOMAIN, &[&[mv.code()], secret])
}
