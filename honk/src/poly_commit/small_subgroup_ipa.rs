use crate::errors::{HonkError, Result};
use crate::poly_commit::{claim::ProverOpeningClaim, pcs::PolyComScheme};
use crate::polynomials::Polynomial;
use crate::sumcheck::{zk_data::LIBRA_UNIVARIATES_LENGTH, ZKSumcheckData};
use crate::transcript::{HonkTranscript, TranscriptElement};
use ark_std::{end_timer, start_timer};
use honk_algebra::{prelude::*, traits::Domain};

/// The order of the multiplicative subgroup holding the Libra coefficients.
pub const SUBGROUP_SIZE: usize = 256;

/// Commitments the zero-knowledge verifier reads: the concatenation, the grand sum and
/// the quotient.
pub const NUM_LIBRA_COMMITMENTS: usize = 3;

/// Evaluations opened for the inner product argument.
pub const NUM_SMALL_IPA_EVALUATIONS: usize = 4;

/// The Lagrange values of the challenge polynomial over the subgroup:
/// `1`, then `(1, u_i, u_i^2, ...)` for every round, padded with zeros.
///
/// Its inner product with the Libra concatenation is `c + sum_i g_i(u_i)`.
pub fn compute_challenge_lagrange_values<F: Scalar>(multivariate_challenge: &[F]) -> Result<Vec<F>> {
    // the last subgroup slot must stay zero for the grand sum to close
    if 1 + multivariate_challenge.len() * LIBRA_UNIVARIATES_LENGTH >= SUBGROUP_SIZE {
        return Err(HonkError::InvariantViolation(
            "too many sumcheck rounds for the subgroup".into(),
        ));
    }
    let mut values = Vec::with_capacity(SUBGROUP_SIZE);
    values.push(F::one());
    for u in multivariate_challenge.iter() {
        values.extend(powers(u, LIBRA_UNIVARIATES_LENGTH));
    }
    values.resize(SUBGROUP_SIZE, F::zero());
    Ok(values)
}

/// The prover side of the small-subgroup inner product argument.
///
/// With `F` the challenge polynomial and `G` the Libra concatenation over the subgroup
/// `H = <g>`, the prover commits to the grand sum `A`, where `A(g^0) = 0` and
/// `A(g^{i+1}) = A(g^i) + F(g^i) G(g^i)`, and to the quotient `Q` of
/// `L_1 A + (X - g^{-1}) (A(gX) - A - F G) + L_n (A - s)` by `Z_H = X^n - 1`.
/// The identity holds iff `<F, G> = s`.
pub struct SmallSubgroupIPAProver<F> {
    /// The subgroup generator `g`.
    pub interpolation_domain_generator: F,
    /// The masked concatenation `G`.
    pub concatenated_polynomial: Polynomial<F>,
    /// The values of `G` over the subgroup.
    pub concatenated_lagrange_form: Vec<F>,
    /// The challenge polynomial `F`.
    pub challenge_polynomial: Polynomial<F>,
    /// The values of `F` over the subgroup.
    pub challenge_polynomial_lagrange: Vec<F>,
    /// The masked grand sum `A`.
    pub grand_sum_polynomial: Polynomial<F>,
    /// The quotient `Q`.
    pub grand_sum_identity_quotient: Polynomial<F>,
    /// The claimed inner product `s`.
    pub claimed_inner_product: F,
}

impl<F: Domain + TranscriptElement> SmallSubgroupIPAProver<F> {
    /// Build the witness polynomials for the Libra masking data bound at
    /// `multivariate_challenge`.
    pub fn new<R: CryptoRng + RngCore>(
        zk_sumcheck_data: &ZKSumcheckData<F>,
        multivariate_challenge: &[F],
        claimed_inner_product: F,
        prng: &mut R,
    ) -> Result<Self> {
        let ipa_time = start_timer!(|| "Small subgroup IPA witness");
        let generator = Polynomial::<F>::subgroup_generator(SUBGROUP_SIZE)?;
        let concatenated_lagrange_form = zk_sumcheck_data.libra_concatenated_lagrange_form.clone();
        let concatenated_polynomial = zk_sumcheck_data.libra_concatenated_monomial_form.clone();

        let challenge_polynomial_lagrange = compute_challenge_lagrange_values(multivariate_challenge)?;
        let challenge_polynomial =
            Polynomial::from_subgroup_evaluations(&challenge_polynomial_lagrange)?;

        let mut grand_sum_lagrange = Vec::with_capacity(SUBGROUP_SIZE);
        let mut running = F::zero();
        for (f, g) in challenge_polynomial_lagrange
            .iter()
            .zip(concatenated_lagrange_form.iter())
        {
            grand_sum_lagrange.push(running);
            running.add_assign(&f.mul(g));
        }
        if running != claimed_inner_product {
            return Err(HonkError::InvariantViolation(
                "the Libra inner product does not match the claimed evaluation".into(),
            ));
        }

        // A + Z_H (a_0 + a_1 X + a_2 X^2)
        let mut grand_sum_polynomial = Polynomial::from_subgroup_evaluations(&grand_sum_lagrange)?;
        for k in 0..3 {
            let mask = F::random(prng);
            grand_sum_polynomial.add_coef_assign(&mask.neg(), k);
            grand_sum_polynomial.add_coef_assign(&mask, SUBGROUP_SIZE + k);
        }

        let grand_sum_identity_quotient = Self::compute_grand_sum_identity_quotient(
            &generator,
            &challenge_polynomial,
            &concatenated_polynomial,
            &grand_sum_polynomial,
            &claimed_inner_product,
        )?;
        end_timer!(ipa_time);

        Ok(Self {
            interpolation_domain_generator: generator,
            concatenated_polynomial,
            concatenated_lagrange_form,
            challenge_polynomial,
            challenge_polynomial_lagrange,
            grand_sum_polynomial,
            grand_sum_identity_quotient,
            claimed_inner_product,
        })
    }

    fn compute_grand_sum_identity_quotient(
        generator: &F,
        challenge_polynomial: &Polynomial<F>,
        concatenated_polynomial: &Polynomial<F>,
        grand_sum_polynomial: &Polynomial<F>,
        claimed_inner_product: &F,
    ) -> Result<Polynomial<F>> {
        let n_inv = F::from(SUBGROUP_SIZE as u64).inv()?;
        let generator_inv = generator.inv()?;
        // L_1 = (1/n) sum_k X^k and L_n = (1/n) sum_k (gX)^k
        let lagrange_first = Polynomial::new(vec![n_inv; SUBGROUP_SIZE]);
        let lagrange_last = lagrange_first.mul_var(generator);

        let mut numerator = lagrange_first.mul(grand_sum_polynomial);

        let mut difference = grand_sum_polynomial.mul_var(generator);
        difference.sub_assign(grand_sum_polynomial);
        difference.sub_assign(&challenge_polynomial.mul(concatenated_polynomial));
        let x_minus_last = Polynomial::new(vec![generator_inv.neg(), F::one()]);
        numerator.add_assign(&x_minus_last.mul(&difference));

        let mut shifted_sum = grand_sum_polynomial.clone();
        shifted_sum.add_coef_assign(&claimed_inner_product.neg(), 0);
        numerator.add_assign(&lagrange_last.mul(&shifted_sum));

        numerator.divide_by_vanishing(SUBGROUP_SIZE).map_err(|_| {
            HonkError::InvariantViolation("the grand sum identity does not hold".into())
        })
    }

    /// Commit to the grand sum and the quotient.
    pub fn prove<PCS: PolyComScheme<Field = F>>(
        &self,
        commitment_key: &PCS,
        transcript: &mut HonkTranscript,
    ) -> Result<()> {
        let grand_sum_commitment = commitment_key.commit(&self.grand_sum_polynomial)?;
        transcript.send_to_verifier("Libra:grand_sum_commitment", &grand_sum_commitment);
        let quotient_commitment = commitment_key.commit(&self.grand_sum_identity_quotient)?;
        transcript.send_to_verifier("Libra:quotient_commitment", &quotient_commitment);
        Ok(())
    }

    /// The polynomials to open, in the order `G, A, A, Q`.
    pub fn get_witness_polynomials(&self) -> [&Polynomial<F>; NUM_SMALL_IPA_EVALUATIONS] {
        [
            &self.concatenated_polynomial,
            &self.grand_sum_polynomial,
            &self.grand_sum_polynomial,
            &self.grand_sum_identity_quotient,
        ]
    }

    /// The opening claims at `r, g r, r, r` for the Gemini challenge `r`.
    pub fn compute_opening_claims(&self, gemini_challenge: &F) -> Vec<ProverOpeningClaim<F>> {
        let points = evaluation_points(gemini_challenge, &self.interpolation_domain_generator);
        self.get_witness_polynomials()
            .iter()
            .zip(points.iter())
            .map(|(poly, point)| ProverOpeningClaim::new((*poly).clone(), *point))
            .collect()
    }
}

/// The points `r, g r, r, r` the witness polynomials are opened at.
pub fn evaluation_points<F: Scalar>(gemini_challenge: &F, generator: &F) -> [F; NUM_SMALL_IPA_EVALUATIONS] {
    [
        *gemini_challenge,
        gemini_challenge.mul(generator),
        *gemini_challenge,
        *gemini_challenge,
    ]
}

/// The verifier side of the small-subgroup inner product argument.
pub struct SmallSubgroupIPAVerifier;

impl SmallSubgroupIPAVerifier {
    /// Check the grand sum identity at `r` from the opened values `G(r), A(g r), A(r), Q(r)`.
    ///
    /// `F(r)` is computed from the challenges by barycentric evaluation. Fails when `r`
    /// lies in the subgroup, where the identity says nothing.
    pub fn check_libra_evaluations_consistency<F: Domain>(
        libra_evaluations: &[F],
        gemini_evaluation_challenge: &F,
        multilinear_challenge: &[F],
        inner_product_eval_claim: &F,
    ) -> Result<bool> {
        if libra_evaluations.len() != NUM_SMALL_IPA_EVALUATIONS {
            return Err(HonkError::InvariantViolation(format!(
                "expected {} Libra evaluations",
                NUM_SMALL_IPA_EVALUATIONS
            )));
        }
        let r = *gemini_evaluation_challenge;
        let vanishing_poly_eval = r.pow(&[SUBGROUP_SIZE as u64]).sub(&F::one());
        if vanishing_poly_eval.is_zero() {
            return Err(HonkError::ChallengeInSubgroup);
        }
        let generator = Polynomial::<F>::subgroup_generator(SUBGROUP_SIZE)?;
        let generator_inv = generator.inv()?;
        let n = F::from(SUBGROUP_SIZE as u64);

        // F(r) = (r^n - 1) / n * sum_i F_i g^i / (r - g^i)
        let challenge_values = compute_challenge_lagrange_values(multilinear_challenge)?;
        let domain_points = powers(&generator, SUBGROUP_SIZE);
        let mut denominators: Vec<F> = domain_points.iter().map(|p| r.sub(p)).collect();
        batch_inversion(&mut denominators);
        let mut challenge_poly_eval = F::zero();
        for ((value, point), denominator) in challenge_values
            .iter()
            .zip(domain_points.iter())
            .zip(denominators.iter())
        {
            if !value.is_zero() {
                challenge_poly_eval.add_assign(&value.mul(point).mul(denominator));
            }
        }
        let n_inv = n.inv()?;
        challenge_poly_eval.mul_assign(&vanishing_poly_eval.mul(&n_inv));

        let lagrange_first = vanishing_poly_eval.mul(&n.mul(&r.sub(&F::one())).inv()?);
        let lagrange_last =
            vanishing_poly_eval.mul(&n.mul(&generator.mul(&r).sub(&F::one())).inv()?);

        let concatenated_at_r = libra_evaluations[0];
        let grand_sum_shifted_eval = libra_evaluations[1];
        let grand_sum_eval = libra_evaluations[2];
        let quotient_eval = libra_evaluations[3];

        let mut diff = lagrange_first.mul(&grand_sum_eval);
        diff.add_assign(
            &r.sub(&generator_inv).mul(
                &grand_sum_shifted_eval
                    .sub(&grand_sum_eval)
                    .sub(&concatenated_at_r.mul(&challenge_poly_eval)),
            ),
        );
        diff.add_assign(&lagrange_last.mul(&grand_sum_eval.sub(inner_product_eval_claim)));
        diff.sub_assign(&vanishing_poly_eval.mul(&quotient_eval));
        Ok(diff.is_zero())
    }
}
