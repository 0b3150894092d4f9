use crate::errors::{HonkError, Result};
use crate::poly_commit::{
    claim::{BatchOpeningClaim, ProverOpeningClaim},
    pcs::PolyComScheme,
};
use crate::polynomials::Polynomial;
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::{
    bn254::{BN254G1, BN254PairingEngine, BN254Scalar},
    prelude::*,
    traits::Pairing,
};

/// KZG commitment scheme about `PairingEngine`.
#[derive(Debug, Serialize, Deserialize)]
pub struct KZGCommitmentScheme<P: Pairing> {
    /// public parameter about G1.
    pub public_parameter_group_1: Vec<P::G1>,
    /// public parameter about G2.
    pub public_parameter_group_2: Vec<P::G2>,
}

/// The two points of a deferred pairing check `e(p0, [1]) * e(p1, [tau]) = 1`.
///
/// A recursive verifier cannot run the pairing itself; it hands these points to an
/// outer aggregator instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingPoints<G1> {
    /// Paired with the G2 generator.
    pub p0: G1,
    /// Paired with `[tau]` in G2.
    pub p1: G1,
}

impl<P: Pairing> KZGCommitmentScheme<P> {
    /// Create a new instance of a KZG polynomial commitment scheme.
    /// `max_degree` - max degree of the polynomial,
    /// `prng` - pseudo-random generator.
    pub fn new<R: CryptoRng + RngCore>(max_degree: usize, prng: &mut R) -> KZGCommitmentScheme<P> {
        let s = P::ScalarField::random(prng);

        let mut public_parameter_group_1: Vec<P::G1> = Vec::with_capacity(max_degree + 1);
        let mut elem_g1 = P::G1::get_base();
        for _ in 0..=max_degree {
            public_parameter_group_1.push(elem_g1);
            elem_g1 = elem_g1.mul(&s);
        }

        let elem_g2 = P::G2::get_base();
        let public_parameter_group_2 = vec![elem_g2, elem_g2.mul(&s)];

        KZGCommitmentScheme {
            public_parameter_group_1,
            public_parameter_group_2,
        }
    }

    /// Serialize the parameters to unchecked bytes.
    pub fn to_unchecked_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![];
        let len_1 = self.public_parameter_group_1.len() as u32;
        let len_2 = self.public_parameter_group_2.len() as u32;
        bytes.extend(len_1.to_le_bytes());
        bytes.extend(len_2.to_le_bytes());

        for i in &self.public_parameter_group_1 {
            bytes.extend(i.to_unchecked_bytes());
        }
        for i in &self.public_parameter_group_2 {
            bytes.extend(i.to_unchecked_bytes());
        }
        Ok(bytes)
    }

    /// Deserialize the parameters from unchecked bytes.
    pub fn from_unchecked_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(HonkError::SetupError);
        }
        let mut len_1_bytes = [0u8; 4];
        let mut len_2_bytes = [0u8; 4];
        len_1_bytes.copy_from_slice(&bytes[0..4]);
        len_2_bytes.copy_from_slice(&bytes[4..8]);
        let len_1 = u32::from_le_bytes(len_1_bytes) as usize;
        let len_2 = u32::from_le_bytes(len_2_bytes) as usize;
        let n_1 = P::G1::unchecked_size();
        let n_2 = P::G2::unchecked_size();
        if bytes.len() != 8 + n_1 * len_1 + n_2 * len_2 {
            return Err(HonkError::SetupError);
        }

        let bytes_1 = &bytes[8..];
        let bytes_2 = &bytes[8 + (n_1 * len_1)..];
        let mut p1 = Vec::with_capacity(len_1);
        let mut p2 = Vec::with_capacity(len_2);

        for i in 0..len_1 {
            p1.push(P::G1::from_unchecked_bytes(
                &bytes_1[n_1 * i..n_1 * (i + 1)],
            )?);
        }

        for i in 0..len_2 {
            p2.push(P::G2::from_unchecked_bytes(
                &bytes_2[n_2 * i..n_2 * (i + 1)],
            )?);
        }

        Ok(Self {
            public_parameter_group_1: p1,
            public_parameter_group_2: p2,
        })
    }

    /// Read the quotient commitment and reduce a batched claim to two pairing points.
    pub fn reduce_verify_batch_opening_claim_to_pairing_points(
        &self,
        claim: BatchOpeningClaim<P::G1>,
        transcript: &mut HonkTranscript,
    ) -> Result<PairingPoints<P::G1>>
    where
        P::G1: crate::transcript::TranscriptElement,
    {
        let quotient_commitment: P::G1 = transcript.receive_from_prover("KZG:W")?;

        // P0 = C + z W, P1 = -W
        let mut commitments = claim.commitments;
        let mut scalars = claim.scalars;
        commitments.push(quotient_commitment);
        scalars.push(claim.evaluation_point);
        let scalars_ref: Vec<&P::ScalarField> = scalars.iter().collect();
        let commitments_ref: Vec<&P::G1> = commitments.iter().collect();
        let p0 = P::G1::multi_exp(&scalars_ref, &commitments_ref);

        Ok(PairingPoints {
            p0,
            p1: quotient_commitment.neg(),
        })
    }

    /// Check `e(p0, [1]) * e(p1, [tau]) = 1`.
    pub fn pairing_check(&self, points: &PairingPoints<P::G1>) -> Result<bool> {
        if self.public_parameter_group_2.len() < 2 {
            return Err(HonkError::SetupError);
        }
        let result = P::product_of_pairings(
            &[points.p0, points.p1],
            &self.public_parameter_group_2[0..2],
        );
        Ok(result == P::Gt::get_identity())
    }
}

/// KZG commitment scheme over the BN254 curve
pub type KZGCommitmentSchemeBN254 = KZGCommitmentScheme<BN254PairingEngine>;

impl PolyComScheme for KZGCommitmentSchemeBN254 {
    type Field = BN254Scalar;
    type Commitment = BN254G1;

    fn max_size(&self) -> usize {
        self.public_parameter_group_1.len()
    }

    fn commit(&self, polynomial: &Polynomial<BN254Scalar>) -> Result<BN254G1> {
        let coefs = polynomial.get_coefs_ref();
        let degree = polynomial.degree();

        if degree + 1 > self.public_parameter_group_1.len() {
            return Err(HonkError::DegreeError);
        }

        let coefs_ref: Vec<&BN254Scalar> = coefs.iter().take(degree + 1).collect();
        let pub_param_group_1_as_ref: Vec<&BN254G1> = self.public_parameter_group_1[0..degree + 1]
            .iter()
            .collect();

        Ok(BN254G1::multi_exp(&coefs_ref[..], &pub_param_group_1_as_ref[..]))
    }

    fn one_commitment(&self) -> BN254G1 {
        self.public_parameter_group_1[0]
    }

    fn compute_opening_proof(
        &self,
        claim: ProverOpeningClaim<BN254Scalar>,
        transcript: &mut HonkTranscript,
    ) -> Result<()> {
        let opening_time = start_timer!(|| "KZG opening proof");
        // (p(X) - v) / (X - x)
        let (quotient, remainder) = claim
            .polynomial
            .div_rem_linear(&claim.opening_pair.challenge);
        if remainder != claim.opening_pair.evaluation {
            return Err(HonkError::ProofError);
        }
        let quotient_commitment = self.commit(&quotient)?;
        transcript.send_to_verifier("KZG:W", &quotient_commitment);
        end_timer!(opening_time);
        Ok(())
    }

    fn reduce_verify_batch_opening_claim(
        &self,
        claim: BatchOpeningClaim<BN254G1>,
        transcript: &mut HonkTranscript,
    ) -> Result<bool> {
        let points = self.reduce_verify_batch_opening_claim_to_pairing_points(claim, transcript)?;
        self.pairing_check(&points)
    }
}
