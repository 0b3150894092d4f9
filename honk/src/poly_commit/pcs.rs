use crate::errors::Result;
use crate::poly_commit::claim::{BatchOpeningClaim, OpeningClaim, ProverOpeningClaim};
use crate::polynomials::Polynomial;
use crate::transcript::{HonkTranscript, TranscriptElement};
use honk_algebra::{prelude::*, traits::Domain};

/// Trait for polynomial commitment scheme.
///
/// The key doubles as the verification key: the prover commits and writes opening
/// proofs into the transcript, the verifier reads them back and checks a reduced claim.
pub trait PolyComScheme: Sized {
    /// Type of prime field.
    type Field: Domain + TranscriptElement;

    /// Type of commitment produces.
    type Commitment: Group<ScalarType = Self::Field> + TranscriptElement;

    /// The largest polynomial size (number of coefficients) the key supports.
    fn max_size(&self) -> usize;

    /// Commits to the polynomial.
    fn commit(&self, polynomial: &Polynomial<Self::Field>) -> Result<Self::Commitment>;

    /// The commitment to the constant polynomial one.
    fn one_commitment(&self) -> Self::Commitment;

    /// Write a proof that the claimed polynomial evaluates as claimed.
    fn compute_opening_proof(
        &self,
        claim: ProverOpeningClaim<Self::Field>,
        transcript: &mut HonkTranscript,
    ) -> Result<()>;

    /// Read an opening proof for a batched claim and check it.
    ///
    /// A proof that decodes but does not check returns `Ok(false)`.
    fn reduce_verify_batch_opening_claim(
        &self,
        claim: BatchOpeningClaim<Self::Commitment>,
        transcript: &mut HonkTranscript,
    ) -> Result<bool>;

    /// Read an opening proof for a single claim and check it.
    fn reduce_verify(
        &self,
        claim: &OpeningClaim<Self::Commitment>,
        transcript: &mut HonkTranscript,
    ) -> Result<bool> {
        let batch = BatchOpeningClaim::from_opening_claim(claim, self.one_commitment());
        self.reduce_verify_batch_opening_claim(batch, transcript)
    }
}
