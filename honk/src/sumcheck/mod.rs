/// Module for the sumcheck prover.
pub mod prover;

/// Module for the per-round prover and verifier work.
pub mod round;

/// Module for the sumcheck verifier.
pub mod verifier;

/// Module for the Libra masking data of a zero-knowledge sumcheck.
pub mod zk_data;

pub use prover::SumcheckProver;
pub use verifier::SumcheckVerifier;
pub use zk_data::ZKSumcheckData;

use crate::flavor::AllEntities;

/// The outcome of a sumcheck verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Produced by the prover; nothing was checked.
    Pending,
    /// Every round check and the final relation check passed.
    Verified,
    /// Some check failed.
    Failed,
}

/// What sumcheck reduces the relation claim to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumcheckOutput<F> {
    /// The round challenges `u_0, ..., u_{d-1}`.
    pub challenge: Vec<F>,
    /// The claimed evaluations of every entity at the challenge point.
    pub claimed_evaluations: AllEntities<F>,
    /// `G(u)` for the Libra masking polynomial, when masking.
    pub claimed_libra_evaluation: Option<F>,
    /// The verifier's verdict.
    pub verified: VerificationStatus,
}

#[cfg(test)]
mod tests {
    use crate::flavor::{Flavor, ProverPolynomials, UltraFlavor, UltraZKFlavor};
    use crate::poly_commit::kzg_poly_com::KZGCommitmentSchemeBN254;
    use crate::polynomials::{GateSeparatorPolynomial, Polynomial};
    use crate::relations::{compute_subrelation_separators, tests::arithmetic_circuit, RelationParameters};
    use crate::sumcheck::{
        round::SumcheckProverRound, SumcheckProver, SumcheckVerifier, VerificationStatus,
        ZKSumcheckData,
    };
    use crate::transcript::HonkTranscript;
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    fn challenges(transcript: &mut HonkTranscript, d: usize) -> (Vec<F>, Vec<F>) {
        let alpha: F = transcript.get_challenge("alpha");
        let labels: Vec<String> = (0..d).map(|i| format!("Sumcheck:gate_challenge_{}", i)).collect();
        let gate_challenges = transcript.get_challenges(&labels);
        (
            compute_subrelation_separators(&alpha, UltraFlavor::NUM_SUBRELATIONS),
            gate_challenges,
        )
    }

    fn prove_and_verify<FL: Flavor<FF = F>>(
        polys: &ProverPolynomials<F>,
        zk_key: Option<&FL::PCS>,
    ) -> (crate::sumcheck::SumcheckOutput<F>, crate::sumcheck::SumcheckOutput<F>) {
        let mut prng = test_rng();
        let params = RelationParameters::default();
        let d = polys.validate().unwrap();

        let mut transcript = HonkTranscript::new(b"sumcheck test");
        let (alphas, gate_challenges) = challenges(&mut transcript, d);
        let mut zk_data = zk_key.map(|key| {
            ZKSumcheckData::new(d, &mut transcript, key, &mut prng).unwrap()
        });
        let mut prover = SumcheckProver::<FL>::new(polys.circuit_size()).unwrap();
        let prover_output = prover
            .prove(
                polys,
                &params,
                &alphas,
                &gate_challenges,
                &mut transcript,
                zk_data.as_mut(),
            )
            .unwrap();

        let mut transcript = HonkTranscript::from_proof(b"sumcheck test", transcript.export_proof());
        let mut verifier = SumcheckVerifier::<FL>::new(d);
        let (alphas, gate_challenges) = challenges(&mut transcript, d);
        let verifier_output = verifier
            .verify(&params, &alphas, &gate_challenges, &mut transcript)
            .unwrap();
        assert!(transcript.is_consumed());
        (prover_output, verifier_output)
    }

    #[test]
    fn honest_prover_is_accepted() {
        let polys = arithmetic_circuit();
        let (prover_output, verifier_output) = prove_and_verify::<UltraFlavor>(&polys, None);
        assert_eq!(prover_output.verified, VerificationStatus::Pending);
        assert_eq!(verifier_output.verified, VerificationStatus::Verified);
        assert_eq!(prover_output.challenge, verifier_output.challenge);
        assert_eq!(
            prover_output.claimed_evaluations,
            verifier_output.claimed_evaluations
        );
        assert!(verifier_output.claimed_libra_evaluation.is_none());
    }

    #[test]
    fn broken_row_is_rejected() {
        let mut polys = arithmetic_circuit();
        polys.w_l.coefs[1] = F::zero();
        polys.set_shifted();
        let (_, verifier_output) = prove_and_verify::<UltraFlavor>(&polys, None);
        assert_eq!(verifier_output.verified, VerificationStatus::Failed);
    }

    #[test]
    fn claimed_evaluations_bind_lowest_variable_first() {
        let mut polys = arithmetic_circuit();
        // widen to eight rows with two more satisfied gates
        polys.iter_mut().for_each(|p| p.coefs.resize(8, F::zero()));
        polys.lagrange_last.coefs[3] = F::zero();
        polys.lagrange_last.coefs[7] = F::one();
        polys.w_l.coefs[5] = F::from(3u32);
        polys.w_r.coefs[5] = F::from(5u32);
        polys.w_o.coefs[5] = F::from(15u32);
        polys.q_m.coefs[5] = F::one();
        polys.q_o.coefs[5] = F::one().neg();
        polys.q_arith.coefs[5] = F::one();
        polys.set_shifted();

        let (output, verified) = prove_and_verify::<UltraFlavor>(&polys, None);
        assert_eq!(verified.verified, VerificationStatus::Verified);
        assert_eq!(output.challenge.len(), 3);
        for (poly, value) in polys.iter().zip(output.claimed_evaluations.iter()) {
            assert_eq!(poly.evaluate_mle(&output.challenge).unwrap(), *value);
        }

        // the same fold by hand through the lagrange basis of the hypercube
        let u = &output.challenge;
        let mut expected = F::zero();
        for (i, c) in polys.w_o.coefs.iter().enumerate() {
            let mut weight = F::one();
            for (k, uk) in u.iter().enumerate() {
                weight.mul_assign(&if (i >> k) & 1 == 1 { *uk } else { F::one().sub(uk) });
            }
            expected.add_assign(&weight.mul(c));
        }
        assert_eq!(expected, output.claimed_evaluations.w_o);
    }

    #[test]
    fn externally_supplied_target_sum() {
        // row 2 no longer satisfies its gate, so the rows sum to a nonzero target
        let mut polys = arithmetic_circuit();
        polys.q_c.coefs[2] = F::one();
        let params = RelationParameters::default();
        let d = polys.validate().unwrap();

        let mut transcript = HonkTranscript::new(b"sumcheck test");
        let (alphas, gate_challenges) = challenges(&mut transcript, d);
        let gate_separators = GateSeparatorPolynomial::new(gate_challenges.clone(), d);
        let target = SumcheckProverRound::<UltraFlavor>::new(polys.circuit_size())
            .compute_univariate(&polys, &params, &gate_separators, &alphas)
            .sum_at_zero_and_one();
        assert!(!target.is_zero());

        let mut prover = SumcheckProver::<UltraFlavor>::new(polys.circuit_size()).unwrap();
        prover
            .prove(&polys, &params, &alphas, &gate_challenges, &mut transcript, None)
            .unwrap();
        let proof = transcript.export_proof();

        let verify = |target_sum: F| {
            let mut transcript = HonkTranscript::from_proof(b"sumcheck test", proof.clone());
            let (alphas, gate_challenges) = challenges(&mut transcript, d);
            let mut verifier = SumcheckVerifier::<UltraFlavor>::new_with_target(d, target_sum);
            let output = verifier
                .verify(&params, &alphas, &gate_challenges, &mut transcript)
                .unwrap();
            assert!(transcript.is_consumed());
            output.verified
        };
        assert_eq!(verify(target), VerificationStatus::Verified);
        assert_eq!(verify(target.add(&F::one())), VerificationStatus::Failed);
        assert_eq!(verify(F::zero()), VerificationStatus::Failed);
    }

    #[test]
    fn round_univariates_are_consistent() {
        let mut prng = test_rng();
        let polys = arithmetic_circuit();
        let params = RelationParameters::default();
        let alphas: Vec<F> = (0..10).map(|_| F::random(&mut prng)).collect();
        let betas: Vec<F> = (0..2).map(|_| F::random(&mut prng)).collect();
        let gate_separators = GateSeparatorPolynomial::new(betas, 2);

        let round = SumcheckProverRound::<UltraFlavor>::new(4);
        let univariate = round.compute_univariate(&polys, &params, &gate_separators, &alphas);
        assert_eq!(univariate.len(), UltraFlavor::BATCHED_RELATION_PARTIAL_LENGTH);
        assert_eq!(univariate.sum_at_zero_and_one(), F::zero());

        let mut broken = polys;
        broken.q_c.coefs[2] = F::one();
        let univariate = round.compute_univariate(&broken, &params, &gate_separators, &alphas);
        assert_ne!(univariate.sum_at_zero_and_one(), F::zero());
    }

    #[test]
    fn single_row_circuit() {
        let mut polys = ProverPolynomials::<F>::default();
        polys.iter_mut().for_each(|p| *p = Polynomial::zero(1));
        let (prover_output, verifier_output) = prove_and_verify::<UltraFlavor>(&polys, None);
        assert!(prover_output.challenge.is_empty());
        assert_eq!(verifier_output.verified, VerificationStatus::Verified);
    }

    #[test]
    fn masked_sumcheck() {
        let mut prng = test_rng();
        let key = KZGCommitmentSchemeBN254::new(300, &mut prng);
        let polys = arithmetic_circuit();
        let (prover_output, verifier_output) =
            prove_and_verify::<UltraZKFlavor>(&polys, Some(&key));
        assert_eq!(verifier_output.verified, VerificationStatus::Verified);
        assert_eq!(
            prover_output.claimed_libra_evaluation,
            verifier_output.claimed_libra_evaluation
        );
        assert!(verifier_output.claimed_libra_evaluation.is_some());

        // the masked prover must be handed its data
        let mut transcript = HonkTranscript::new(b"sumcheck test");
        let mut prover = SumcheckProver::<UltraZKFlavor>::new(4).unwrap();
        let alphas = vec![F::one(); 10];
        let betas = vec![F::one(); 2];
        assert!(prover
            .prove(
                &polys,
                &RelationParameters::default(),
                &alphas,
                &betas,
                &mut transcript,
                None
            )
            .is_err());
    }
}
