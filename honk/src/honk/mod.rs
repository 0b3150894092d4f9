/// Module for the Honk indexer.
pub mod indexer;

/// Module for the Honk prover.
pub mod prover;

/// Module for the Honk verifier.
pub mod verifier;

/// Module for the prover-side witness columns.
pub mod witness;

/// The label both sides initialize the transcript with.
pub const HONK_TRANSCRIPT_LABEL: &[u8] = b"Honk";

/// A Honk proof: the prover's transcript messages, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HonkProof {
    /// The serialized messages.
    pub proof_data: Vec<u8>,
}
