use crate::errors::{HonkError, Result};
use crate::flavor::{Flavor, ProverPolynomials};
use crate::polynomials::GateSeparatorPolynomial;
use crate::relations::RelationParameters;
use crate::sumcheck::{
    round::SumcheckProverRound, zk_data::ZKSumcheckData, SumcheckOutput, VerificationStatus,
};
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The sumcheck prover.
///
/// The first round reads the full prover polynomials and folds them into half-size
/// buffers owned by the prover; later rounds fold those buffers in place, with
/// `round.round_size` as the explicit length of the live prefix.
pub struct SumcheckProver<FL: Flavor> {
    /// The circuit size.
    pub multivariate_n: usize,
    /// The number of variables.
    pub multivariate_d: usize,
    /// The state of the current round.
    pub round: SumcheckProverRound<FL>,
    partially_evaluated_polynomials: ProverPolynomials<FL::FF>,
}

impl<FL: Flavor> SumcheckProver<FL> {
    /// Prepare a prover for polynomials of size `multivariate_n`.
    pub fn new(multivariate_n: usize) -> Result<Self> {
        if !multivariate_n.is_power_of_two() {
            return Err(HonkError::InvariantViolation(format!(
                "sumcheck over {} rows, which is not a power of two",
                multivariate_n
            )));
        }
        Ok(Self {
            multivariate_n,
            multivariate_d: multivariate_n.trailing_zeros() as usize,
            round: SumcheckProverRound::new(multivariate_n),
            partially_evaluated_polynomials: ProverPolynomials::default(),
        })
    }

    /// Run all rounds, sending the round univariates and the final evaluations.
    ///
    /// `alphas` are the separators of the subrelations after the first. With a masking
    /// flavor `zk_sumcheck_data` must be supplied, and it must be absent otherwise.
    pub fn prove(
        &mut self,
        full_polynomials: &ProverPolynomials<FL::FF>,
        relation_parameters: &RelationParameters<FL::FF>,
        alphas: &[FL::FF],
        gate_challenges: &[FL::FF],
        transcript: &mut HonkTranscript,
        mut zk_sumcheck_data: Option<&mut ZKSumcheckData<FL::FF>>,
    ) -> Result<SumcheckOutput<FL::FF>> {
        let d = self.multivariate_d;
        if full_polynomials.validate()? != d {
            return Err(HonkError::InvariantViolation(
                "prover polynomials do not match the sumcheck size".into(),
            ));
        }
        if alphas.len() + 1 != FL::NUM_SUBRELATIONS || gate_challenges.len() != d {
            return Err(HonkError::InvariantViolation(
                "wrong number of subrelation separators or gate challenges".into(),
            ));
        }
        if FL::HAS_ZK != zk_sumcheck_data.is_some() {
            return Err(HonkError::InvariantViolation(
                "masking data must be present exactly for masking flavors".into(),
            ));
        }
        if let Some(zk) = zk_sumcheck_data.as_ref() {
            if zk.log_circuit_size != d {
                return Err(HonkError::InvariantViolation(
                    "masking data built for another circuit size".into(),
                ));
            }
        }

        let sumcheck_time = start_timer!(|| "Sumcheck prover");
        let mut gate_separators = GateSeparatorPolynomial::new(gate_challenges.to_vec(), d);
        let mut multivariate_challenge = Vec::with_capacity(d);

        for round_idx in 0..d {
            let source = if round_idx == 0 {
                full_polynomials
            } else {
                &self.partially_evaluated_polynomials
            };
            let mut round_univariate = self.round.compute_univariate(
                source,
                relation_parameters,
                &gate_separators,
                alphas,
            );
            if let Some(zk) = zk_sumcheck_data.as_deref() {
                round_univariate += &zk
                    .compute_libra_univariate(round_idx)
                    .extend_to(FL::BATCHED_RELATION_PARTIAL_LENGTH);
            }

            transcript.send_univariate(&format!("Sumcheck:univariate_{}", round_idx), &round_univariate);
            let round_challenge: FL::FF = transcript.get_challenge(&format!("Sumcheck:u_{}", round_idx));
            multivariate_challenge.push(round_challenge);

            if round_idx == 0 {
                self.partially_evaluated_polynomials =
                    full_polynomials.map(|p| p.partially_evaluate(&round_challenge));
            } else {
                self.partially_evaluate_in_place(&round_challenge);
            }
            if let Some(zk) = zk_sumcheck_data.as_deref_mut() {
                zk.update(&round_challenge, round_idx);
            }
            gate_separators.partially_evaluate(&round_challenge);
            self.round.round_size >>= 1;
        }

        let claimed_evaluations = if d == 0 {
            full_polynomials.row(0)
        } else {
            self.partially_evaluated_polynomials.row(0)
        };
        let evaluations: Vec<FL::FF> = claimed_evaluations.iter().copied().collect();
        transcript.send_all_to_verifier("Sumcheck:evaluations", &evaluations);

        let claimed_libra_evaluation = zk_sumcheck_data.map(|zk| {
            let evaluation = zk.claimed_evaluation();
            transcript.send_to_verifier("Libra:claimed_evaluation", &evaluation);
            evaluation
        });
        end_timer!(sumcheck_time);

        Ok(SumcheckOutput {
            challenge: multivariate_challenge,
            claimed_evaluations,
            claimed_libra_evaluation,
            verified: VerificationStatus::Pending,
        })
    }

    fn partially_evaluate_in_place(&mut self, round_challenge: &FL::FF) {
        let half = self.round.round_size / 2;
        let fold = |poly: &mut crate::polynomials::Polynomial<FL::FF>| {
            for j in 0..half {
                let even = poly.coefs[2 * j];
                let odd = poly.coefs[2 * j + 1];
                poly.coefs[j] = even.add(&round_challenge.mul(&odd.sub(&even)));
            }
        };

        let polys: Vec<_> = self.partially_evaluated_polynomials.iter_mut().collect();
        #[cfg(feature = "parallel")]
        polys.into_par_iter().for_each(fold);
        #[cfg(not(feature = "parallel"))]
        polys.into_iter().for_each(fold);
    }
}
