use crate::errors::{HonkError, Result};
use crate::flavor::RepeatedCommitmentsData;
use crate::poly_commit::{
    claim::{BatchOpeningClaim, ProverOpeningClaim},
    claim_batcher::ClaimBatcher,
    gemini::{GeminiProver, GeminiVerifier, PolynomialBatcher},
    pcs::PolyComScheme,
    shplonk::{ShplonkProver, ShplonkVerifier, NUM_INTERLEAVING_CLAIMS},
    small_subgroup_ipa::{
        evaluation_points, SmallSubgroupIPAProver, SmallSubgroupIPAVerifier, NUM_LIBRA_COMMITMENTS,
        NUM_SMALL_IPA_EVALUATIONS, SUBGROUP_SIZE,
    },
};
use crate::polynomials::Polynomial;
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::{prelude::*, traits::Domain};

const LIBRA_EVALUATION_LABELS: [&str; NUM_SMALL_IPA_EVALUATIONS] = [
    "Libra:concatenation_eval",
    "Libra:shifted_grand_sum_eval",
    "Libra:grand_sum_eval",
    "Libra:quotient_eval",
];

/// Gemini followed by Shplonk: reduces the multilinear claims at the sumcheck point
/// to a single univariate claim for the commitment scheme.
pub struct ShpleminiProver;

impl ShpleminiProver {
    /// Run both reductions. With `libra`, the Gemini batch is masked and the small
    /// subgroup IPA witnesses are opened alongside at the Gemini challenge.
    pub fn prove<PCS, R>(
        multilinear_challenge: &[PCS::Field],
        batcher: &PolynomialBatcher<'_, PCS::Field>,
        commitment_key: &PCS,
        transcript: &mut HonkTranscript,
        libra: Option<&SmallSubgroupIPAProver<PCS::Field>>,
        prng: &mut R,
    ) -> Result<ProverOpeningClaim<PCS::Field>>
    where
        PCS: PolyComScheme,
        R: CryptoRng + RngCore,
    {
        let log_n = multilinear_challenge.len();
        let gemini_claims = GeminiProver::prove(
            log_n,
            multilinear_challenge,
            batcher,
            commitment_key,
            transcript,
            libra.is_some(),
            prng,
        )?;

        let mut libra_claims = vec![];
        if let Some(libra) = libra {
            let gemini_r = gemini_claims[0].opening_pair.challenge;
            libra_claims = libra.compute_opening_claims(&gemini_r);
            for (label, claim) in LIBRA_EVALUATION_LABELS.iter().zip(libra_claims.iter()) {
                transcript.send_to_verifier(label, &claim.opening_pair.evaluation);
            }
        }

        ShplonkProver::prove(
            commitment_key,
            log_n,
            &gemini_claims,
            &libra_claims,
            transcript,
        )
    }
}

/// The verifier side of Shplemini.
///
/// Everything is gathered into one batched claim `sum_i s_i C_i` at the Shplonk
/// point `z`, so that a single commitment-scheme check covers the sumcheck
/// evaluations, the Gemini folds and the Libra openings.
pub struct ShpleminiVerifier;

impl ShpleminiVerifier {
    /// Read the Gemini and Shplonk messages and build the batched claim.
    ///
    /// `libra` carries the concatenation, grand sum and quotient commitments with the
    /// claimed Libra evaluation when the sumcheck was masked. The returned flag is the
    /// small subgroup IPA consistency check, `true` when there is none.
    pub fn compute_batch_opening_claim<PCS: PolyComScheme>(
        mut claim_batcher: ClaimBatcher<PCS::Commitment>,
        multilinear_challenge: &[PCS::Field],
        one_commitment: PCS::Commitment,
        transcript: &mut HonkTranscript,
        repeated_commitments: Option<RepeatedCommitmentsData>,
        libra: Option<(&[PCS::Commitment], PCS::Field)>,
    ) -> Result<(BatchOpeningClaim<PCS::Commitment>, bool)> {
        let shplemini_time = start_timer!(|| "Shplemini verifier");
        let log_n = multilinear_challenge.len();
        if log_n == 0 {
            return Err(HonkError::InvariantViolation(
                "Gemini needs at least one variable".into(),
            ));
        }
        let has_zk = libra.is_some();

        if has_zk {
            let masking_commitment: PCS::Commitment =
                transcript.receive_from_prover("Gemini:masking_poly_comm")?;
            let masking_evaluation: PCS::Field =
                transcript.receive_from_prover("Gemini:masking_poly_eval")?;
            claim_batcher.prepend_unshifted(masking_commitment, masking_evaluation);
        }

        let rho: PCS::Field = transcript.get_challenge("rho");
        let mut fold_commitments: Vec<PCS::Commitment> = Vec::with_capacity(log_n - 1);
        for l in 1..log_n {
            fold_commitments.push(transcript.receive_from_prover(&format!("Gemini:FOLD_{}", l))?);
        }

        let gemini_r: PCS::Field = transcript.get_challenge("Gemini:r");
        if has_zk && gemini_r.pow(&[SUBGROUP_SIZE as u64]) == PCS::Field::one() {
            return Err(HonkError::ChallengeInSubgroup);
        }

        let mut fold_neg_evals: Vec<PCS::Field> = Vec::with_capacity(log_n);
        for l in 1..=log_n {
            fold_neg_evals.push(transcript.receive_from_prover(&format!("Gemini:a_{}", l))?);
        }

        let (p_pos, p_neg) = if claim_batcher.interleaved.is_some() {
            (
                transcript.receive_from_prover::<PCS::Field>("Gemini:P_pos")?,
                transcript.receive_from_prover::<PCS::Field>("Gemini:P_neg")?,
            )
        } else {
            (PCS::Field::zero(), PCS::Field::zero())
        };

        let mut libra_evaluations = vec![];
        if has_zk {
            for label in LIBRA_EVALUATION_LABELS.iter() {
                libra_evaluations.push(transcript.receive_from_prover::<PCS::Field>(label)?);
            }
        }

        let nu: PCS::Field = transcript.get_challenge("Shplonk:nu");
        let quotient_commitment: PCS::Commitment = transcript.receive_from_prover("Shplonk:Q")?;
        let z: PCS::Field = transcript.get_challenge("Shplonk:z");

        let r_squares = GeminiVerifier::powers_of_evaluation_challenge(&gemini_r, log_n);
        let inverse_vanishing_evals =
            ShplonkVerifier::compute_inverted_gemini_denominators(&z, &r_squares)?;
        claim_batcher.compute_scalars_for_each_batch(&inverse_vanishing_evals, &nu, &gemini_r, &z)?;

        let nu_powers = powers(&nu, 2 * log_n + NUM_INTERLEAVING_CLAIMS + NUM_SMALL_IPA_EVALUATIONS);
        let mut commitments = vec![quotient_commitment];
        let mut scalars = vec![PCS::Field::one()];
        let mut batched_evaluation = PCS::Field::zero();
        claim_batcher.update_batch_mul_inputs_and_batched_evaluation(
            &mut commitments,
            &mut scalars,
            &mut batched_evaluation,
            &rho,
            &nu_powers[2 * log_n],
            &nu_powers[2 * log_n + 1],
        );

        let mut constant_term = PCS::Field::zero();
        if let Some(interleaved) = claim_batcher.interleaved.as_ref() {
            constant_term.add_assign(
                &interleaved.shplonk_denominator.mul(
                    &p_pos
                        .mul(&nu_powers[2 * log_n])
                        .add(&p_neg.mul(&nu_powers[2 * log_n + 1])),
                ),
            );
        }

        let fold_pos_evals = GeminiVerifier::compute_fold_pos_evaluations(
            &batched_evaluation,
            multilinear_challenge,
            &r_squares,
            &fold_neg_evals,
            &p_neg,
        )?;

        Self::batch_gemini_claims_received_from_prover(
            &fold_commitments,
            &fold_neg_evals,
            &fold_pos_evals,
            &nu_powers,
            &inverse_vanishing_evals,
            &mut commitments,
            &mut scalars,
            &mut constant_term,
        );

        // A_0+(r) and A_0-(-r), with the interleaved part P+(r^s) removed
        constant_term.add_assign(&fold_pos_evals[0].sub(&p_pos).mul(&inverse_vanishing_evals[0]));
        constant_term.add_assign(
            &fold_neg_evals[0]
                .mul(&nu_powers[1])
                .mul(&inverse_vanishing_evals[1]),
        );

        if let Some(repeated) = repeated_commitments {
            let offset = if has_zk { 2 } else { 1 };
            Self::remove_repeated_commitments(
                &mut commitments,
                &mut scalars,
                repeated.with_offset(offset),
            )?;
        }

        let mut consistency_checked = true;
        if let Some((libra_commitments, libra_univariate_evaluation)) = libra {
            consistency_checked = Self::add_zk_data(
                libra_commitments,
                &libra_evaluations,
                &libra_univariate_evaluation,
                &gemini_r,
                &z,
                &nu_powers[2 * log_n + NUM_INTERLEAVING_CLAIMS..],
                multilinear_challenge,
                &mut commitments,
                &mut scalars,
                &mut constant_term,
            )?;
        }

        commitments.push(one_commitment);
        scalars.push(constant_term);
        end_timer!(shplemini_time);

        Ok((
            BatchOpeningClaim {
                commitments,
                scalars,
                evaluation_point: z,
            },
            consistency_checked,
        ))
    }

    /// Add the fold commitments `A_1, ..., A_{d-1}`, each opened at `r^{2^j}` with
    /// `nu^{2j}` and at `-r^{2^j}` with `nu^{2j+1}`.
    fn batch_gemini_claims_received_from_prover<G: Group>(
        fold_commitments: &[G],
        fold_neg_evals: &[G::ScalarType],
        fold_pos_evals: &[G::ScalarType],
        nu_powers: &[G::ScalarType],
        inverse_vanishing_evals: &[G::ScalarType],
        commitments: &mut Vec<G>,
        scalars: &mut Vec<G::ScalarType>,
        constant_term: &mut G::ScalarType,
    ) {
        for (j, commitment) in fold_commitments.iter().enumerate().map(|(i, c)| (i + 1, c)) {
            let scaling_factor_pos = nu_powers[2 * j].mul(&inverse_vanishing_evals[2 * j]);
            let scaling_factor_neg = nu_powers[2 * j + 1].mul(&inverse_vanishing_evals[2 * j + 1]);
            constant_term.add_assign(&fold_neg_evals[j].mul(&scaling_factor_neg));
            constant_term.add_assign(&fold_pos_evals[j].mul(&scaling_factor_pos));
            commitments.push(*commitment);
            scalars.push(scaling_factor_pos.add(&scaling_factor_neg).neg());
        }
    }

    /// Fold the scalars of commitments that appear twice into their first occurrence
    /// and drop the duplicates.
    pub fn remove_repeated_commitments<G: Group>(
        commitments: &mut Vec<G>,
        scalars: &mut Vec<G::ScalarType>,
        repeated: RepeatedCommitmentsData,
    ) -> Result<()> {
        let RepeatedCommitmentsData {
            original_start,
            duplicate_start,
            count,
        } = repeated;
        if count == 0 {
            return Ok(());
        }
        if original_start + count > duplicate_start || duplicate_start + count > commitments.len() {
            return Err(HonkError::InvariantViolation(
                "repeated commitment ranges are out of bounds".into(),
            ));
        }
        for i in 0..count {
            let duplicate = scalars[duplicate_start + i];
            scalars[original_start + i].add_assign(&duplicate);
        }
        commitments.drain(duplicate_start..duplicate_start + count);
        scalars.drain(duplicate_start..duplicate_start + count);
        Ok(())
    }

    /// Add the Libra concatenation, grand sum and quotient openings and run the
    /// small subgroup IPA check.
    fn add_zk_data<G: Group>(
        libra_commitments: &[G],
        libra_evaluations: &[G::ScalarType],
        libra_univariate_evaluation: &G::ScalarType,
        gemini_r: &G::ScalarType,
        z: &G::ScalarType,
        nu_powers: &[G::ScalarType],
        multilinear_challenge: &[G::ScalarType],
        commitments: &mut Vec<G>,
        scalars: &mut Vec<G::ScalarType>,
        constant_term: &mut G::ScalarType,
    ) -> Result<bool>
    where
        G::ScalarType: Domain,
    {
        if libra_commitments.len() != NUM_LIBRA_COMMITMENTS {
            return Err(HonkError::InvariantViolation(format!(
                "expected {} Libra commitments",
                NUM_LIBRA_COMMITMENTS
            )));
        }
        let generator = Polynomial::<G::ScalarType>::subgroup_generator(SUBGROUP_SIZE)?;
        let points = evaluation_points(gemini_r, &generator);
        let mut denominators: Vec<G::ScalarType> = points.iter().map(|p| z.sub(p)).collect();
        if denominators.iter().any(|d| d.is_zero()) {
            return Err(HonkError::DivisionByZero);
        }
        batch_inversion(&mut denominators);
        let scaling: Vec<G::ScalarType> = denominators
            .iter()
            .zip(nu_powers.iter())
            .map(|(d, nu)| nu.mul(d))
            .collect();

        commitments.push(libra_commitments[0]);
        scalars.push(scaling[0].neg());
        commitments.push(libra_commitments[1]);
        scalars.push(scaling[1].add(&scaling[2]).neg());
        commitments.push(libra_commitments[2]);
        scalars.push(scaling[3].neg());

        for (s, evaluation) in scaling.iter().zip(libra_evaluations.iter()) {
            constant_term.add_assign(&s.mul(evaluation));
        }

        SmallSubgroupIPAVerifier::check_libra_evaluations_consistency(
            libra_evaluations,
            gemini_r,
            multilinear_challenge,
            libra_univariate_evaluation,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::flavor::RepeatedCommitmentsData;
    use crate::poly_commit::{
        claim_batcher::{Batch, ClaimBatcher, InterleavedBatch},
        gemini::PolynomialBatcher,
        ipa::IPACommitmentScheme,
        kzg_poly_com::KZGCommitmentSchemeBN254,
        pcs::PolyComScheme,
        shplemini::{ShpleminiProver, ShpleminiVerifier},
        small_subgroup_ipa::SmallSubgroupIPAProver,
    };
    use crate::polynomials::Polynomial;
    use crate::sumcheck::ZKSumcheckData;
    use crate::transcript::HonkTranscript;
    use honk_algebra::{
        bn254::{BN254Scalar, BN254G1},
        prelude::*,
    };

    const LOG_N: usize = 4;
    const N: usize = 1 << LOG_N;

    struct Instance<F> {
        unshifted: Vec<Polynomial<F>>,
        to_be_shifted: Vec<Polynomial<F>>,
        groups: Vec<Vec<Polynomial<F>>>,
        challenge: Vec<F>,
    }

    impl<F: Scalar> Instance<F> {
        fn new<R: CryptoRng + RngCore>(
            prng: &mut R,
            num_unshifted: usize,
            num_shifted: usize,
            num_groups: usize,
        ) -> Self {
            Self {
                unshifted: (0..num_unshifted).map(|_| Polynomial::random(prng, N)).collect(),
                to_be_shifted: (0..num_shifted)
                    .map(|_| Polynomial::random_shiftable(prng, N))
                    .collect(),
                groups: (0..num_groups)
                    .map(|_| (0..2).map(|_| Polynomial::random(prng, N / 2)).collect())
                    .collect(),
                challenge: (0..LOG_N).map(|_| F::random(prng)).collect(),
            }
        }

        fn batcher(&self) -> PolynomialBatcher<'_, F> {
            let mut batcher = PolynomialBatcher::new(N);
            batcher.set_unshifted(self.unshifted.iter().collect());
            batcher.set_to_be_shifted(self.to_be_shifted.iter().collect());
            batcher.set_interleaved(self.groups.iter().map(|g| g.iter().collect()).collect());
            batcher
        }

        fn claim_batcher<PCS: PolyComScheme<Field = F>>(&self, pcs: &PCS) -> ClaimBatcher<PCS::Commitment> {
            let commit = |p: &Polynomial<F>| pcs.commit(p).unwrap();
            let mut claim_batcher = ClaimBatcher::default();
            if !self.unshifted.is_empty() {
                claim_batcher.unshifted = Some(
                    Batch::new(
                        self.unshifted.iter().map(commit).collect(),
                        self.unshifted
                            .iter()
                            .map(|p| p.evaluate_mle(&self.challenge).unwrap())
                            .collect(),
                    )
                    .unwrap(),
                );
            }
            if !self.to_be_shifted.is_empty() {
                claim_batcher.shifted = Some(
                    Batch::new(
                        self.to_be_shifted.iter().map(commit).collect(),
                        self.to_be_shifted
                            .iter()
                            .map(|p| p.shifted().evaluate_mle(&self.challenge).unwrap())
                            .collect(),
                    )
                    .unwrap(),
                );
            }
            if !self.groups.is_empty() {
                claim_batcher.interleaved = Some(
                    InterleavedBatch::new(
                        self.groups
                            .iter()
                            .map(|g| g.iter().map(commit).collect())
                            .collect(),
                        self.groups
                            .iter()
                            .map(|g| {
                                let refs: Vec<&Polynomial<F>> = g.iter().collect();
                                Polynomial::interleave(&refs)
                                    .unwrap()
                                    .evaluate_mle(&self.challenge)
                                    .unwrap()
                            })
                            .collect(),
                    )
                    .unwrap(),
                );
            }
            claim_batcher
        }
    }

    fn prove_and_verify<PCS: PolyComScheme>(
        pcs: &PCS,
        instance: &Instance<PCS::Field>,
        tamper: bool,
    ) -> bool {
        let mut prng = test_rng();
        let mut transcript = HonkTranscript::new(b"shplemini");
        let batcher = instance.batcher();
        let claim = ShpleminiProver::prove(
            &instance.challenge,
            &batcher,
            pcs,
            &mut transcript,
            None,
            &mut prng,
        )
        .unwrap();
        pcs.compute_opening_proof(claim, &mut transcript).unwrap();
        let proof = transcript.export_proof();

        let mut claim_batcher = instance.claim_batcher(pcs);
        if tamper {
            if let Some(batch) = claim_batcher.unshifted.as_mut() {
                batch.evaluations[0].add_assign(&PCS::Field::one());
            }
        }
        let mut transcript = HonkTranscript::from_proof(b"shplemini", proof);
        let (batch, consistent) = ShpleminiVerifier::compute_batch_opening_claim::<PCS>(
            claim_batcher,
            &instance.challenge,
            pcs.one_commitment(),
            &mut transcript,
            None,
            None,
        )
        .unwrap();
        assert!(consistent);
        pcs.reduce_verify_batch_opening_claim(batch, &mut transcript)
            .unwrap()
    }

    #[test]
    fn shplemini_with_kzg() {
        let mut prng = test_rng();
        let pcs = KZGCommitmentSchemeBN254::new(N, &mut prng);
        let instance = Instance::<BN254Scalar>::new(&mut prng, 2, 1, 0);
        assert!(prove_and_verify(&pcs, &instance, false));
        assert!(!prove_and_verify(&pcs, &instance, true));
    }

    #[test]
    fn shplemini_with_ipa() {
        let mut prng = test_rng();
        let pcs = IPACommitmentScheme::<BN254G1>::new(N, &mut prng);
        let instance = Instance::<BN254Scalar>::new(&mut prng, 2, 1, 0);
        assert!(prove_and_verify(&pcs, &instance, false));
        assert!(!prove_and_verify(&pcs, &instance, true));
    }

    #[test]
    fn empty_categories() {
        let mut prng = test_rng();
        let pcs = KZGCommitmentSchemeBN254::new(N, &mut prng);
        let only_unshifted = Instance::<BN254Scalar>::new(&mut prng, 3, 0, 0);
        assert!(prove_and_verify(&pcs, &only_unshifted, false));
        let only_shifted = Instance::<BN254Scalar>::new(&mut prng, 0, 2, 0);
        assert!(prove_and_verify(&pcs, &only_shifted, false));
    }

    #[test]
    fn interleaved_groups() {
        let mut prng = test_rng();
        let pcs = KZGCommitmentSchemeBN254::new(N, &mut prng);
        let instance = Instance::<BN254Scalar>::new(&mut prng, 1, 1, 2);
        assert!(prove_and_verify(&pcs, &instance, false));
        assert!(!prove_and_verify(&pcs, &instance, true));
    }

    #[test]
    fn repeated_commitments_are_merged() {
        let mut prng = test_rng();
        let pcs = KZGCommitmentSchemeBN254::new(N, &mut prng);
        // the shifted polynomial is also opened unshifted
        let mut instance = Instance::<BN254Scalar>::new(&mut prng, 1, 1, 0);
        instance.unshifted.push(instance.to_be_shifted[0].clone());

        let mut transcript = HonkTranscript::new(b"shplemini");
        let batcher = instance.batcher();
        let claim = ShpleminiProver::prove(
            &instance.challenge,
            &batcher,
            &pcs,
            &mut transcript,
            None,
            &mut prng,
        )
        .unwrap();
        pcs.compute_opening_proof(claim, &mut transcript).unwrap();

        let mut transcript = HonkTranscript::from_proof(b"shplemini", transcript.export_proof());
        let (batch, _) = ShpleminiVerifier::compute_batch_opening_claim::<KZGCommitmentSchemeBN254>(
            instance.claim_batcher(&pcs),
            &instance.challenge,
            pcs.one_commitment(),
            &mut transcript,
            Some(RepeatedCommitmentsData::new(1, 2, 1)),
            None,
        )
        .unwrap();
        // Q, two unshifted, three folds and the constant
        assert_eq!(batch.commitments.len(), 1 + 2 + (LOG_N - 1) + 1);
        assert!(pcs.reduce_verify_batch_opening_claim(batch, &mut transcript).unwrap());
    }

    #[test]
    fn masked_shplemini() {
        let mut prng = test_rng();
        let pcs = KZGCommitmentSchemeBN254::new(300, &mut prng);
        let instance = Instance::<BN254Scalar>::new(&mut prng, 2, 1, 0);

        let mut transcript = HonkTranscript::new(b"masked shplemini");
        let mut zk_data =
            ZKSumcheckData::new(LOG_N, &mut transcript, &pcs, &mut prng).unwrap();
        for (i, u) in instance.challenge.iter().enumerate() {
            zk_data.update(u, i);
        }
        let libra_evaluation = zk_data.claimed_evaluation();
        let libra_prover =
            SmallSubgroupIPAProver::new(&zk_data, &instance.challenge, libra_evaluation, &mut prng)
                .unwrap();
        libra_prover.prove(&pcs, &mut transcript).unwrap();

        let batcher = instance.batcher();
        let claim = ShpleminiProver::prove(
            &instance.challenge,
            &batcher,
            &pcs,
            &mut transcript,
            Some(&libra_prover),
            &mut prng,
        )
        .unwrap();
        pcs.compute_opening_proof(claim, &mut transcript).unwrap();
        let proof = transcript.export_proof();

        let verify = |claimed: BN254Scalar| -> (bool, bool) {
            let mut transcript = HonkTranscript::from_proof(b"masked shplemini", proof.clone());
            let concatenation: BN254G1 = transcript
                .receive_from_prover("Libra:concatenation_commitment")
                .unwrap();
            let _: BN254Scalar = transcript.receive_from_prover("Libra:Sum").unwrap();
            let _: BN254Scalar = transcript.get_challenge("Libra:Challenge");
            let grand_sum: BN254G1 = transcript
                .receive_from_prover("Libra:grand_sum_commitment")
                .unwrap();
            let quotient: BN254G1 = transcript
                .receive_from_prover("Libra:quotient_commitment")
                .unwrap();
            let libra_commitments = [concatenation, grand_sum, quotient];
            let (batch, consistent) =
                ShpleminiVerifier::compute_batch_opening_claim::<KZGCommitmentSchemeBN254>(
                    instance.claim_batcher(&pcs),
                    &instance.challenge,
                    pcs.one_commitment(),
                    &mut transcript,
                    None,
                    Some((&libra_commitments[..], claimed)),
                )
                .unwrap();
            let opened = pcs.reduce_verify_batch_opening_claim(batch, &mut transcript).unwrap();
            (consistent, opened)
        };

        assert_eq!(verify(libra_evaluation), (true, true));
        assert_eq!(verify(libra_evaluation.add(&BN254Scalar::one())), (false, true));
    }
}
