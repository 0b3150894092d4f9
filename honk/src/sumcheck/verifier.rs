use crate::errors::{HonkError, Result};
use crate::flavor::{AllEntities, Flavor};
use crate::polynomials::GateSeparatorPolynomial;
use crate::relations::RelationParameters;
use crate::sumcheck::{round::SumcheckVerifierRound, SumcheckOutput, VerificationStatus};
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// The sumcheck verifier.
///
/// A failed round does not stop the verifier: it keeps reading the transcript so the
/// proof is consumed exactly as the prover laid it out, and reports `Failed` at the end.
pub struct SumcheckVerifier<FL: Flavor> {
    /// The number of variables.
    pub multivariate_d: usize,
    /// The running round state.
    pub round: SumcheckVerifierRound<FL>,
    /// The Libra concatenation commitment read from a masked proof.
    pub libra_commitment: Option<FL::Commitment>,
}

impl<FL: Flavor> SumcheckVerifier<FL> {
    /// A verifier for `multivariate_d` variables and a zero claimed sum.
    pub fn new(multivariate_d: usize) -> Self {
        Self::new_with_target(multivariate_d, FL::FF::zero())
    }

    /// A verifier for `multivariate_d` variables and an externally supplied claimed sum.
    pub fn new_with_target(multivariate_d: usize, target_sum: FL::FF) -> Self {
        Self {
            multivariate_d,
            round: SumcheckVerifierRound::new(target_sum),
            libra_commitment: None,
        }
    }

    /// Replay the sumcheck transcript.
    ///
    /// Transcript layout errors (a short or malformed proof) are returned as errors; a
    /// proof that decodes but does not check is reported through `verified`.
    pub fn verify(
        &mut self,
        relation_parameters: &RelationParameters<FL::FF>,
        alphas: &[FL::FF],
        gate_challenges: &[FL::FF],
        transcript: &mut HonkTranscript,
    ) -> Result<SumcheckOutput<FL::FF>> {
        let d = self.multivariate_d;
        if alphas.len() + 1 != FL::NUM_SUBRELATIONS || gate_challenges.len() != d {
            return Err(HonkError::InvariantViolation(
                "wrong number of subrelation separators or gate challenges".into(),
            ));
        }

        let verifier_time = start_timer!(|| "Sumcheck verifier");
        let mut libra_challenge = None;
        if FL::HAS_ZK {
            let commitment: FL::Commitment =
                transcript.receive_from_prover("Libra:concatenation_commitment")?;
            self.libra_commitment = Some(commitment);
            let libra_total_sum: FL::FF = transcript.receive_from_prover("Libra:Sum")?;
            let rho: FL::FF = transcript.get_challenge("Libra:Challenge");
            self.round.target_total_sum.add_assign(&libra_total_sum.mul(&rho));
            libra_challenge = Some(rho);
        }

        let mut gate_separators = GateSeparatorPolynomial::new_without_products(gate_challenges.to_vec());
        let mut multivariate_challenge = Vec::with_capacity(d);
        for round_idx in 0..d {
            let round_univariate = transcript.receive_univariate::<FL::FF>(
                &format!("Sumcheck:univariate_{}", round_idx),
                FL::BATCHED_RELATION_PARTIAL_LENGTH,
            )?;
            let round_challenge: FL::FF = transcript.get_challenge(&format!("Sumcheck:u_{}", round_idx));

            self.round.check_sum(&round_univariate);
            self.round
                .compute_next_target_sum(&round_univariate, &round_challenge);
            gate_separators.partially_evaluate(&round_challenge);
            multivariate_challenge.push(round_challenge);
        }

        let evaluations: Vec<FL::FF> = transcript
            .receive_all_from_prover("Sumcheck:evaluations", FL::NUM_ALL_ENTITIES)?;
        let claimed_evaluations = AllEntities::from_vec(evaluations)?;

        let mut full_honk_purported_value =
            SumcheckVerifierRound::<FL>::compute_full_relation_purported_value(
                &claimed_evaluations,
                relation_parameters,
                &gate_separators,
                alphas,
            );

        let mut claimed_libra_evaluation = None;
        if let Some(rho) = libra_challenge {
            let evaluation: FL::FF = transcript.receive_from_prover("Libra:claimed_evaluation")?;
            full_honk_purported_value.add_assign(&evaluation.mul(&rho));
            claimed_libra_evaluation = Some(evaluation);
        }

        let final_check = full_honk_purported_value == self.round.target_total_sum;
        let verified = if final_check && !self.round.round_failed {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Failed
        };
        end_timer!(verifier_time);

        Ok(SumcheckOutput {
            challenge: multivariate_challenge,
            claimed_evaluations,
            claimed_libra_evaluation,
            verified,
        })
    }
}
