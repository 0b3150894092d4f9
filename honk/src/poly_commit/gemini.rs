use crate::errors::{HonkError, Result};
use crate::poly_commit::{claim::ProverOpeningClaim, pcs::PolyComScheme, small_subgroup_ipa::SUBGROUP_SIZE};
use crate::polynomials::Polynomial;
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// The polynomials the prover opens at the sumcheck point, grouped by category.
///
/// The order within each category, and of the categories themselves, fixes the powers
/// of `rho` they are batched with; the verifier's `ClaimBatcher` must list the
/// commitments in the same order.
pub struct PolynomialBatcher<'a, F> {
    /// The size `2^d` of the full hypercube.
    pub full_batched_size: usize,
    /// Polynomials opened as they are.
    pub unshifted: Vec<&'a Polynomial<F>>,
    /// Polynomials whose shifts are opened.
    pub to_be_shifted: Vec<&'a Polynomial<F>>,
    /// Groups of `s` polynomials of size `2^d / s`, each opened through its interleaving.
    pub groups_to_be_interleaved: Vec<Vec<&'a Polynomial<F>>>,
}

impl<'a, F: Scalar> PolynomialBatcher<'a, F> {
    /// An empty batcher over `full_batched_size` rows.
    pub fn new(full_batched_size: usize) -> Self {
        Self {
            full_batched_size,
            unshifted: vec![],
            to_be_shifted: vec![],
            groups_to_be_interleaved: vec![],
        }
    }

    /// Set the unshifted polynomials.
    pub fn set_unshifted(&mut self, polynomials: Vec<&'a Polynomial<F>>) {
        self.unshifted = polynomials;
    }

    /// Set the polynomials whose shifts are opened.
    pub fn set_to_be_shifted(&mut self, polynomials: Vec<&'a Polynomial<F>>) {
        self.to_be_shifted = polynomials;
    }

    /// Set the groups to interleave.
    pub fn set_interleaved(&mut self, groups: Vec<Vec<&'a Polynomial<F>>>) {
        self.groups_to_be_interleaved = groups;
    }

    fn check_sizes(&self) -> Result<()> {
        let n = self.full_batched_size;
        if self
            .unshifted
            .iter()
            .chain(self.to_be_shifted.iter())
            .any(|p| p.size() > n)
        {
            return Err(HonkError::InvariantViolation(
                "a batched polynomial exceeds the circuit size".into(),
            ));
        }
        if self.to_be_shifted.iter().any(|p| !p.coefs.first().map_or(true, |c| c.is_zero())) {
            return Err(HonkError::InvariantViolation(
                "a to-be-shifted polynomial does not vanish at row 0".into(),
            ));
        }
        if let Some(first) = self.groups_to_be_interleaved.first() {
            let s = first.len();
            if s < 2
                || !s.is_power_of_two()
                || self.groups_to_be_interleaved.iter().any(|group| {
                    group.len() != s || group.iter().any(|p| p.size() * s > n)
                })
            {
                return Err(HonkError::InvariantViolation(
                    "interleaved groups must be of one power-of-two size and fit the circuit size".into(),
                ));
            }
        }
        Ok(())
    }
}

/// The Gemini prover.
///
/// The multilinear claims at `u` are batched with powers of `rho` into
/// `A_0 = F + G/X + P`, where `F` batches the unshifted polynomials, `G` the
/// to-be-shifted ones and `P` the interleaved ones. Its folds
/// `A_{l+1}(X) = (1 - u_l) A_l^even(X) + u_l A_l^odd(X)` are committed, and every `A_l`
/// is opened at `-r^{2^l}`; the verifier recovers the values at `r^{2^l}` itself.
pub struct GeminiProver;

impl GeminiProver {
    /// Run Gemini, returning the univariate claims for Shplonk.
    ///
    /// With `has_zk`, a random masking polynomial is committed and batched first.
    pub fn prove<PCS, R>(
        log_n: usize,
        multilinear_challenge: &[PCS::Field],
        batcher: &PolynomialBatcher<'_, PCS::Field>,
        commitment_key: &PCS,
        transcript: &mut HonkTranscript,
        has_zk: bool,
        prng: &mut R,
    ) -> Result<Vec<ProverOpeningClaim<PCS::Field>>>
    where
        PCS: PolyComScheme,
        R: CryptoRng + RngCore,
    {
        let n = 1usize << log_n;
        if log_n == 0 || multilinear_challenge.len() != log_n || batcher.full_batched_size != n {
            return Err(HonkError::InvariantViolation(
                "Gemini needs at least one variable and a matching challenge".into(),
            ));
        }
        batcher.check_sizes()?;
        let gemini_time = start_timer!(|| "Gemini prover");

        let mut batched_unshifted = Polynomial::zero(n);
        if has_zk {
            batched_unshifted = Polynomial::random(prng, n);
            let masking_commitment = commitment_key.commit(&batched_unshifted)?;
            transcript.send_to_verifier("Gemini:masking_poly_comm", &masking_commitment);
            let masking_evaluation = batched_unshifted.evaluate_mle(multilinear_challenge)?;
            transcript.send_to_verifier("Gemini:masking_poly_eval", &masking_evaluation);
        }

        let rho: PCS::Field = transcript.get_challenge("rho");
        let mut running_scalar = PCS::Field::one();
        if has_zk {
            // rho^0 belongs to the masking polynomial
            running_scalar = rho;
        }
        for poly in batcher.unshifted.iter() {
            batched_unshifted.add_scaled(poly, &running_scalar);
            running_scalar.mul_assign(&rho);
        }
        let mut batched_to_be_shifted = Polynomial::zero(n);
        for poly in batcher.to_be_shifted.iter() {
            batched_to_be_shifted.add_scaled(poly, &running_scalar);
            running_scalar.mul_assign(&rho);
        }
        let mut batched_group: Vec<Polynomial<PCS::Field>> = vec![];
        if let Some(first) = batcher.groups_to_be_interleaved.first() {
            let group_size = n / first.len();
            batched_group = vec![Polynomial::zero(group_size); first.len()];
            for group in batcher.groups_to_be_interleaved.iter() {
                for (batched, poly) in batched_group.iter_mut().zip(group.iter()) {
                    batched.add_scaled(poly, &running_scalar);
                }
                running_scalar.mul_assign(&rho);
            }
        }

        // A_0 = F + G/X + P
        let mut a_0 = batched_unshifted.clone();
        a_0.add_assign(&batched_to_be_shifted.shifted());
        if !batched_group.is_empty() {
            let group_refs: Vec<&Polynomial<PCS::Field>> = batched_group.iter().collect();
            a_0.add_assign(&Polynomial::interleave(&group_refs)?);
        }

        let fold_polynomials = Self::compute_fold_polynomials(log_n, multilinear_challenge, a_0);
        for (l, fold) in fold_polynomials.iter().enumerate() {
            let commitment = commitment_key.commit(fold)?;
            transcript.send_to_verifier(&format!("Gemini:FOLD_{}", l + 1), &commitment);
        }

        let r_challenge: PCS::Field = transcript.get_challenge("Gemini:r");
        if has_zk && r_challenge.pow(&[SUBGROUP_SIZE as u64]) == PCS::Field::one() {
            return Err(HonkError::ChallengeInSubgroup);
        }

        let (a_0_pos, a_0_neg) = Self::compute_partially_evaluated_batch_polynomials(
            batched_unshifted,
            batched_to_be_shifted,
            &r_challenge,
        )?;
        let mut claims = Self::construct_univariate_opening_claims(
            log_n,
            a_0_pos,
            a_0_neg,
            fold_polynomials,
            &r_challenge,
        );
        for (l, claim) in claims.iter().skip(1).enumerate() {
            transcript.send_to_verifier(
                &format!("Gemini:a_{}", l + 1),
                &claim.opening_pair.evaluation,
            );
        }

        if !batched_group.is_empty() {
            let (p_pos, p_neg) =
                Self::compute_partially_evaluated_interleaved_polynomial(&batched_group, &r_challenge);
            let r_pow = r_challenge.pow(&[batched_group.len() as u64]);
            let pos_claim = ProverOpeningClaim::new(p_pos, r_pow);
            let neg_claim = ProverOpeningClaim::new(p_neg, r_pow);
            transcript.send_to_verifier("Gemini:P_pos", &pos_claim.opening_pair.evaluation);
            transcript.send_to_verifier("Gemini:P_neg", &neg_claim.opening_pair.evaluation);
            claims.push(pos_claim);
            claims.push(neg_claim);
        }
        end_timer!(gemini_time);
        Ok(claims)
    }

    /// The `d - 1` folds `A_1, ..., A_{d-1}` of `A_0`, binding `u_0` first.
    pub fn compute_fold_polynomials<F: Scalar>(
        log_n: usize,
        multilinear_challenge: &[F],
        a_0: Polynomial<F>,
    ) -> Vec<Polynomial<F>> {
        let mut fold_polynomials: Vec<Polynomial<F>> = Vec::with_capacity(log_n.saturating_sub(1));
        let mut a_l = a_0;
        for u_l in multilinear_challenge.iter().take(log_n.saturating_sub(1)) {
            let folded = a_l.partially_evaluate(u_l);
            fold_polynomials.push(folded.clone());
            a_l = folded;
        }
        fold_polynomials
    }

    /// `A_0+ = F + G/r` and `A_0- = F - G/r`.
    pub fn compute_partially_evaluated_batch_polynomials<F: Scalar>(
        batched_f: Polynomial<F>,
        batched_g: Polynomial<F>,
        r_challenge: &F,
    ) -> Result<(Polynomial<F>, Polynomial<F>)> {
        let r_inv = r_challenge.inv().map_err(|_| HonkError::DivisionByZero)?;
        let scaled_g = batched_g.mul_scalar(&r_inv);
        let mut a_0_pos = batched_f.clone();
        a_0_pos.add_assign(&scaled_g);
        let mut a_0_neg = batched_f;
        a_0_neg.sub_assign(&scaled_g);
        Ok((a_0_pos, a_0_neg))
    }

    /// `P+ = sum_i r^i P_i` and `P- = sum_i (-r)^i P_i`.
    pub fn compute_partially_evaluated_interleaved_polynomial<F: Scalar>(
        batched_group: &[Polynomial<F>],
        r_challenge: &F,
    ) -> (Polynomial<F>, Polynomial<F>) {
        let mut p_pos = Polynomial::zero(batched_group[0].size());
        let mut p_neg = Polynomial::zero(batched_group[0].size());
        let mut shift_pos = F::one();
        let mut shift_neg = F::one();
        for poly in batched_group.iter() {
            p_pos.add_scaled(poly, &shift_pos);
            p_neg.add_scaled(poly, &shift_neg);
            shift_pos.mul_assign(r_challenge);
            shift_neg.mul_assign(&r_challenge.neg());
        }
        (p_pos, p_neg)
    }

    /// The claims `A_0+(r)`, `A_0-(-r)` and `A_l(-r^{2^l})` for `l = 1, ..., d - 1`.
    pub fn construct_univariate_opening_claims<F: Scalar>(
        log_n: usize,
        a_0_pos: Polynomial<F>,
        a_0_neg: Polynomial<F>,
        fold_polynomials: Vec<Polynomial<F>>,
        r_challenge: &F,
    ) -> Vec<ProverOpeningClaim<F>> {
        let mut claims = Vec::with_capacity(log_n + 1);
        claims.push(ProverOpeningClaim::new(a_0_pos, *r_challenge));
        claims.push(ProverOpeningClaim::new(a_0_neg, r_challenge.neg()));

        let r_squares = GeminiVerifier::powers_of_evaluation_challenge(r_challenge, log_n);
        for (r_square, fold) in r_squares.into_iter().skip(1).zip(fold_polynomials) {
            let mut claim = ProverOpeningClaim::new(fold, r_square.neg());
            claim.gemini_fold = true;
            claims.push(claim);
        }
        claims
    }
}

/// The Gemini verifier helpers.
pub struct GeminiVerifier;

impl GeminiVerifier {
    /// `r, r^2, r^4, ..., r^{2^{d-1}}`.
    pub fn powers_of_evaluation_challenge<F: Scalar>(r: &F, num_squares: usize) -> Vec<F> {
        let mut squares = Vec::with_capacity(num_squares);
        let mut current = *r;
        for _ in 0..num_squares {
            squares.push(current);
            current = current.square();
        }
        squares
    }

    /// Recover `A_l(r^{2^l})` for `l = 0, ..., d - 1` from the negative evaluations.
    ///
    /// Starting from `A_d = batched_evaluation`, each step solves
    /// `A_{l-1}(r_l) = (2 r_l A_l(r_l^2) - A_{l-1}(-r_l) ((1 - u) r_l - u)) / ((1 - u) r_l + u)`
    /// with `r_l = r^{2^{l-1}}` and `u = u_{l-1}`. `p_neg` completes `A_0(-r)` when
    /// interleaved claims are present.
    pub fn compute_fold_pos_evaluations<F: Scalar>(
        batched_evaluation: &F,
        multilinear_challenge: &[F],
        r_squares: &[F],
        fold_neg_evals: &[F],
        p_neg: &F,
    ) -> Result<Vec<F>> {
        let log_n = multilinear_challenge.len();
        if r_squares.len() != log_n || fold_neg_evals.len() != log_n {
            return Err(HonkError::InvariantViolation(
                "Gemini evaluations do not match the number of variables".into(),
            ));
        }
        let two = F::from(2u32);
        let mut eval_pos_prev = *batched_evaluation;
        let mut fold_pos_evaluations = Vec::with_capacity(log_n);
        for l in (1..=log_n).rev() {
            let challenge_power = r_squares[l - 1];
            let u = multilinear_challenge[l - 1];
            let mut eval_neg = fold_neg_evals[l - 1];
            if l == 1 {
                eval_neg.add_assign(p_neg);
            }
            let challenge_by_one_minus_u = challenge_power.mul(&F::one().sub(&u));

            let numerator = two
                .mul(&challenge_power)
                .mul(&eval_pos_prev)
                .sub(&eval_neg.mul(&challenge_by_one_minus_u.sub(&u)));
            let denominator = challenge_by_one_minus_u
                .add(&u)
                .inv()
                .map_err(|_| HonkError::DivisionByZero)?;
            eval_pos_prev = numerator.mul(&denominator);
            fold_pos_evaluations.push(eval_pos_prev);
        }
        fold_pos_evaluations.reverse();
        Ok(fold_pos_evaluations)
    }
}

#[cfg(test)]
mod tests {
    use crate::poly_commit::gemini::{GeminiProver, GeminiVerifier, PolynomialBatcher};
    use crate::polynomials::Polynomial;
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    #[test]
    fn positive_evaluations_are_recovered() {
        let mut prng = test_rng();
        let log_n = 4;
        let a_0 = Polynomial::<F>::random(&mut prng, 1 << log_n);
        let u: Vec<F> = (0..log_n).map(|_| F::random(&mut prng)).collect();
        let r = F::random(&mut prng);

        let folds = GeminiProver::compute_fold_polynomials(log_n, &u, a_0.clone());
        assert_eq!(folds.len(), log_n - 1);
        assert_eq!(folds[0].size(), 8);

        let mut all = vec![a_0.clone()];
        all.extend(folds);
        let r_squares = GeminiVerifier::powers_of_evaluation_challenge(&r, log_n);
        let neg: Vec<F> = all
            .iter()
            .zip(r_squares.iter())
            .map(|(p, x)| p.eval(&x.neg()))
            .collect();
        let batched_evaluation = a_0.evaluate_mle(&u).unwrap();

        let pos = GeminiVerifier::compute_fold_pos_evaluations(
            &batched_evaluation,
            &u,
            &r_squares,
            &neg,
            &F::zero(),
        )
        .unwrap();
        for ((p, x), v) in all.iter().zip(r_squares.iter()).zip(pos.iter()) {
            assert_eq!(p.eval(x), *v);
        }
    }

    #[test]
    fn interleaved_groups_must_be_a_power_of_two() {
        let mut prng = test_rng();
        let polys: Vec<Polynomial<F>> = (0..6).map(|_| Polynomial::random(&mut prng, 4)).collect();

        let mut batcher = PolynomialBatcher::new(24);
        batcher.set_interleaved(vec![polys.iter().collect()]);
        assert!(batcher.check_sizes().is_err());

        let mut batcher = PolynomialBatcher::new(16);
        batcher.set_interleaved(vec![polys[..4].iter().collect()]);
        assert!(batcher.check_sizes().is_ok());
    }

    #[test]
    fn partially_evaluated_batch() {
        let mut prng = test_rng();
        let f = Polynomial::<F>::random(&mut prng, 8);
        let g = Polynomial::<F>::random_shiftable(&mut prng, 8);
        let r = F::random(&mut prng);
        let (pos, neg) =
            GeminiProver::compute_partially_evaluated_batch_polynomials(f.clone(), g.clone(), &r)
                .unwrap();

        // A_0 = F + G/X agrees with A_0+ at r and with A_0- at -r
        let mut a_0 = f;
        a_0.add_assign(&g.shifted());
        assert_eq!(pos.eval(&r), a_0.eval(&r));
        assert_eq!(neg.eval(&r.neg()), a_0.eval(&r.neg()));
    }
}
