use crate::errors::{HonkError, Result};
use crate::poly_commit::{pcs::PolyComScheme, small_subgroup_ipa::SUBGROUP_SIZE};
use crate::polynomials::{Polynomial, Univariate};
use crate::transcript::{HonkTranscript, TranscriptElement};
use honk_algebra::{prelude::*, traits::Domain};

/// The number of evaluations of each Libra univariate.
pub const LIBRA_UNIVARIATES_LENGTH: usize = 9;

/// The masking data of a zero-knowledge sumcheck.
///
/// The masking polynomial is `G(X_0, ..., X_{d-1}) = c + sum_i g_i(X_i)` with random
/// univariates `g_i` of degree `LIBRA_UNIVARIATES_LENGTH - 1`. The prover commits to the
/// concatenation `[c, coefs(g_0), coefs(g_1), ...]` interpolated over the small subgroup,
/// sends the hypercube sum of `G`, and adds `rho * G` to the sumcheck claim. The
/// round univariates then leak nothing about the witness beyond the claimed sum.
#[derive(Clone, Debug)]
pub struct ZKSumcheckData<F> {
    /// The number of sumcheck variables.
    pub log_circuit_size: usize,
    /// The constant term `c`.
    pub constant_term: F,
    /// Monomial coefficients of each `g_i`.
    pub libra_univariates_monomial: Vec<Vec<F>>,
    /// Evaluations of each `g_i` at `0, ..., LIBRA_UNIVARIATES_LENGTH - 1`.
    pub libra_univariates: Vec<Univariate<F>>,
    /// The concatenated coefficients, as values over the small subgroup.
    pub libra_concatenated_lagrange_form: Vec<F>,
    /// The masked interpolation of the concatenated coefficients.
    pub libra_concatenated_monomial_form: Polynomial<F>,
    /// `sum_{x in {0,1}^d} G(x)`.
    pub libra_total_sum: F,
    /// The challenge `rho` scaling `G` into the claim.
    pub libra_challenge: F,
    /// `c + sum_{j < i} g_j(u_j)`.
    libra_running_sum: F,
    /// `sum_{j > i} (g_j(0) + g_j(1))`.
    libra_remaining_sum: F,
}

impl<F: Domain + TranscriptElement> ZKSumcheckData<F> {
    /// The largest number of variables the small subgroup can hold.
    pub const MAX_LOG_CIRCUIT_SIZE: usize = (SUBGROUP_SIZE - 2) / LIBRA_UNIVARIATES_LENGTH;

    /// Sample the masking polynomial, commit to it and derive the Libra challenge.
    pub fn new<PCS, R>(
        log_circuit_size: usize,
        transcript: &mut HonkTranscript,
        commitment_key: &PCS,
        prng: &mut R,
    ) -> Result<Self>
    where
        PCS: PolyComScheme<Field = F>,
        R: CryptoRng + RngCore,
    {
        if log_circuit_size > Self::MAX_LOG_CIRCUIT_SIZE {
            return Err(HonkError::InvariantViolation(format!(
                "{} sumcheck variables do not fit in the masking subgroup",
                log_circuit_size
            )));
        }

        let constant_term = F::random(prng);
        let libra_univariates_monomial: Vec<Vec<F>> = (0..log_circuit_size)
            .map(|_| (0..LIBRA_UNIVARIATES_LENGTH).map(|_| F::random(prng)).collect())
            .collect();
        let libra_univariates: Vec<Univariate<F>> = libra_univariates_monomial
            .iter()
            .map(|coefs| {
                let poly = Polynomial::new(coefs.clone());
                Univariate::new(
                    (0..LIBRA_UNIVARIATES_LENGTH)
                        .map(|x| poly.eval(&F::from(x as u64)))
                        .collect(),
                )
            })
            .collect();

        let mut libra_concatenated_lagrange_form = vec![F::zero(); SUBGROUP_SIZE];
        libra_concatenated_lagrange_form[0] = constant_term;
        for (i, coefs) in libra_univariates_monomial.iter().enumerate() {
            let start = 1 + i * LIBRA_UNIVARIATES_LENGTH;
            libra_concatenated_lagrange_form[start..start + LIBRA_UNIVARIATES_LENGTH]
                .copy_from_slice(coefs);
        }

        // mask with Z_H(X) (r_0 + r_1 X), which vanishes on the subgroup
        let mut libra_concatenated_monomial_form =
            Polynomial::from_subgroup_evaluations(&libra_concatenated_lagrange_form)?;
        let r0 = F::random(prng);
        let r1 = F::random(prng);
        libra_concatenated_monomial_form.add_coef_assign(&r0.neg(), 0);
        libra_concatenated_monomial_form.add_coef_assign(&r1.neg(), 1);
        libra_concatenated_monomial_form.add_coef_assign(&r0, SUBGROUP_SIZE);
        libra_concatenated_monomial_form.add_coef_assign(&r1, SUBGROUP_SIZE + 1);

        let commitment = commitment_key.commit(&libra_concatenated_monomial_form)?;
        transcript.send_to_verifier("Libra:concatenation_commitment", &commitment);

        let libra_total_sum = Self::compute_total_sum(
            &constant_term,
            &libra_univariates,
            log_circuit_size,
        );
        transcript.send_to_verifier("Libra:Sum", &libra_total_sum);
        let libra_challenge: F = transcript.get_challenge("Libra:Challenge");

        let libra_remaining_sum = libra_univariates
            .iter()
            .skip(1)
            .fold(F::zero(), |acc, g| acc.add(&g.sum_at_zero_and_one()));

        Ok(Self {
            log_circuit_size,
            constant_term,
            libra_univariates_monomial,
            libra_univariates,
            libra_concatenated_lagrange_form,
            libra_concatenated_monomial_form,
            libra_total_sum,
            libra_challenge,
            libra_running_sum: constant_term,
            libra_remaining_sum,
        })
    }

    fn power_of_two(exp: usize) -> F {
        F::from(1u64 << exp)
    }

    fn compute_total_sum(constant_term: &F, libra_univariates: &[Univariate<F>], d: usize) -> F {
        let mut total = constant_term.mul(&Self::power_of_two(d));
        if d > 0 {
            let scale = Self::power_of_two(d - 1);
            for g in libra_univariates.iter() {
                total.add_assign(&g.sum_at_zero_and_one().mul(&scale));
            }
        }
        total
    }

    /// `rho` times the sum of `G` over the variables after `round_idx`, with the
    /// earlier variables bound to their challenges.
    pub fn compute_libra_univariate(&self, round_idx: usize) -> Univariate<F> {
        let d = self.log_circuit_size;
        let scale = Self::power_of_two(d - 1 - round_idx);
        let tail = if round_idx + 1 < d {
            self.libra_remaining_sum
                .mul(&Self::power_of_two(d - 2 - round_idx))
        } else {
            F::zero()
        };
        let evaluations = self.libra_univariates[round_idx]
            .evaluations
            .iter()
            .map(|g| {
                self.libra_running_sum
                    .add(g)
                    .mul(&scale)
                    .add(&tail)
                    .mul(&self.libra_challenge)
            })
            .collect();
        Univariate::new(evaluations)
    }

    /// Bind the variable of `round_idx` to `round_challenge`.
    pub fn update(&mut self, round_challenge: &F, round_idx: usize) {
        let bound = self.libra_univariates[round_idx].evaluate(round_challenge);
        self.libra_running_sum.add_assign(&bound);
        if let Some(next) = self.libra_univariates.get(round_idx + 1) {
            self.libra_remaining_sum.sub_assign(&next.sum_at_zero_and_one());
        }
    }

    /// `G(u) = c + sum_i g_i(u_i)` once every round is bound.
    pub fn claimed_evaluation(&self) -> F {
        self.libra_running_sum
    }
}
