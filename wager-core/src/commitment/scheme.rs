use crate::commitment::Commitment;

/// Trait for commitment schemes
pub trait CommitmentScheme {
    type Preimage: ?Sized;

    fn commit(preimage: &Self::Preimage) -> Commitment;

    /// Recomputes the commitment and compares for exact equality.
    fn verify(commitment: &Commitment, preimage: &Self::Preimage) -> bool {
        Self::commit(preimage) == *commitment
    }
}
