use crate::errors::{HonkError, Result};
use crate::flavor::{Flavor, NUM_PRECOMPUTED_ENTITIES};
use crate::honk::{indexer::HonkVK, prover::gate_challenge_labels, HonkProof, HONK_TRANSCRIPT_LABEL};
use crate::poly_commit::{
    claim_batcher::{Batch, ClaimBatcher},
    pcs::PolyComScheme,
    shplemini::ShpleminiVerifier,
};
use crate::relations::{compute_subrelation_separators, RelationParameters};
use crate::sumcheck::{SumcheckVerifier, VerificationStatus};
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// Verify a Honk proof against the verification key.
///
/// A proof for a circuit of another size fails with `CircuitSizeMismatch`, a proof
/// that cannot be decoded with `TranscriptError`. A well-formed proof returns `Ok`
/// with the verdict: the sumcheck checks, the small subgroup IPA consistency check
/// (masked flavors) and the commitment scheme check must all pass, and the proof
/// must carry nothing beyond what they read.
pub fn verifier<FL: Flavor>(pcs: &FL::PCS, vk: &HonkVK<FL>, proof: &HonkProof) -> Result<bool> {
    let verifier_timer = start_timer!(|| format!("Honk::Verifier ({})", FL::NAME));
    let expected_size = u32::try_from(vk.log_circuit_size)
        .ok()
        .and_then(|log_n| 1u64.checked_shl(log_n));
    if vk.precomputed_commitments.len() != NUM_PRECOMPUTED_ENTITIES
        || expected_size != Some(vk.circuit_size)
    {
        return Err(HonkError::InvariantViolation(
            "malformed verification key".into(),
        ));
    }
    let mut transcript = HonkTranscript::from_proof(HONK_TRANSCRIPT_LABEL, proof.proof_data.clone());

    let circuit_size: u64 = transcript.receive_from_prover("circuit_size")?;
    if circuit_size != vk.circuit_size {
        return Err(HonkError::CircuitSizeMismatch {
            expected: vk.circuit_size,
            actual: circuit_size,
        });
    }
    let log_n = vk.log_circuit_size;

    let w_l: FL::Commitment = transcript.receive_from_prover("W_L")?;
    let w_r: FL::Commitment = transcript.receive_from_prover("W_R")?;
    let w_o: FL::Commitment = transcript.receive_from_prover("W_O")?;
    let etas: Vec<FL::FF> = transcript.get_challenges(&["eta", "eta_two", "eta_three"]);

    let lookup_read_counts: FL::Commitment = transcript.receive_from_prover("LOOKUP_READ_COUNTS")?;
    let lookup_read_tags: FL::Commitment = transcript.receive_from_prover("LOOKUP_READ_TAGS")?;
    let w_4: FL::Commitment = transcript.receive_from_prover("W_4")?;

    let beta_gamma: Vec<FL::FF> = transcript.get_challenges(&["beta", "gamma"]);
    let relation_parameters = RelationParameters {
        eta: etas[0],
        eta_two: etas[1],
        eta_three: etas[2],
        beta: beta_gamma[0],
        gamma: beta_gamma[1],
        public_input_delta: FL::FF::one(),
    };

    let lookup_inverses: FL::Commitment = transcript.receive_from_prover("LOOKUP_INVERSES")?;
    let z_perm: FL::Commitment = transcript.receive_from_prover("Z_PERM")?;

    let alpha: FL::FF = transcript.get_challenge("alpha");
    let alphas = compute_subrelation_separators(&alpha, FL::NUM_SUBRELATIONS);
    let gate_challenges: Vec<FL::FF> = transcript.get_challenges(&gate_challenge_labels(log_n));

    let mut sumcheck = SumcheckVerifier::<FL>::new(log_n);
    let sumcheck_output = sumcheck.verify(
        &relation_parameters,
        &alphas,
        &gate_challenges,
        &mut transcript,
    )?;

    let libra_commitments = match sumcheck.libra_commitment {
        Some(concatenation) => {
            let grand_sum: FL::Commitment =
                transcript.receive_from_prover("Libra:grand_sum_commitment")?;
            let quotient: FL::Commitment =
                transcript.receive_from_prover("Libra:quotient_commitment")?;
            Some([concatenation, grand_sum, quotient])
        }
        None => None,
    };
    let libra = match (libra_commitments.as_ref(), sumcheck_output.claimed_libra_evaluation) {
        (Some(commitments), Some(evaluation)) => Some((&commitments[..], evaluation)),
        (None, None) => None,
        _ => {
            return Err(HonkError::InvariantViolation(
                "Libra commitments and evaluation must come together".into(),
            ))
        }
    };

    // witness commitments in entity order
    let witness_commitments = vec![
        w_l,
        w_r,
        w_o,
        w_4,
        z_perm,
        lookup_inverses,
        lookup_read_counts,
        lookup_read_tags,
    ];
    let mut unshifted_commitments = vk.precomputed_commitments.clone();
    unshifted_commitments.extend(witness_commitments);
    let to_be_shifted_commitments = vec![w_l, w_r, w_o, w_4, z_perm];

    let evaluations = &sumcheck_output.claimed_evaluations;
    let claim_batcher = ClaimBatcher {
        unshifted: Some(Batch::new(
            unshifted_commitments,
            evaluations.get_unshifted().into_iter().copied().collect(),
        )?),
        shifted: Some(Batch::new(
            to_be_shifted_commitments,
            evaluations.get_shifted().into_iter().copied().collect(),
        )?),
        interleaved: None,
    };

    let (opening_claim, consistency_checked) = ShpleminiVerifier::compute_batch_opening_claim::<
        FL::PCS,
    >(
        claim_batcher,
        &sumcheck_output.challenge,
        pcs.one_commitment(),
        &mut transcript,
        Some(FL::REPEATED_COMMITMENTS),
        libra,
    )?;
    let pcs_verified = pcs.reduce_verify_batch_opening_claim(opening_claim, &mut transcript)?;
    end_timer!(verifier_timer);

    Ok(sumcheck_output.verified == VerificationStatus::Verified
        && consistency_checked
        && pcs_verified
        && transcript.is_consumed())
}
