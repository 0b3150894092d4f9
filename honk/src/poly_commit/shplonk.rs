use crate::errors::{HonkError, Result};
use crate::poly_commit::{
    claim::{BatchOpeningClaim, OpeningClaim, OpeningPair, ProverOpeningClaim},
    pcs::PolyComScheme,
};
use crate::polynomials::Polynomial;
use crate::transcript::HonkTranscript;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// Shplonk powers reserved for the two interleaving claims, present or not.
pub const NUM_INTERLEAVING_CLAIMS: usize = 2;

/// A claim with the power of `nu` that batches it.
struct IndexedClaim<'a, F> {
    polynomial: &'a Polynomial<F>,
    challenge: F,
    evaluation: F,
    nu_index: usize,
}

/// The Shplonk prover: batches many univariate claims at different points into one
/// claim at a fresh point `z`.
pub struct ShplonkProver;

impl ShplonkProver {
    /// Assign the powers of `nu`.
    ///
    /// Gemini fold claims are opened at `x` and at `-x`, taking two powers each. Libra
    /// claims start after the `2d` Gemini powers and the interleaving ones.
    fn index_claims<'a, F: Scalar>(
        log_n: usize,
        gemini_claims: &'a [ProverOpeningClaim<F>],
        libra_claims: &'a [ProverOpeningClaim<F>],
    ) -> Vec<IndexedClaim<'a, F>> {
        let mut indexed = vec![];
        let mut nu_index = 0;
        for claim in gemini_claims.iter() {
            if claim.gemini_fold {
                let positive = claim.opening_pair.challenge.neg();
                indexed.push(IndexedClaim {
                    polynomial: &claim.polynomial,
                    challenge: positive,
                    evaluation: claim.polynomial.eval(&positive),
                    nu_index,
                });
                nu_index += 1;
            }
            indexed.push(IndexedClaim {
                polynomial: &claim.polynomial,
                challenge: claim.opening_pair.challenge,
                evaluation: claim.opening_pair.evaluation,
                nu_index,
            });
            nu_index += 1;
        }
        let libra_start = if gemini_claims.is_empty() {
            0
        } else {
            2 * log_n + NUM_INTERLEAVING_CLAIMS
        };
        for (i, claim) in libra_claims.iter().enumerate() {
            indexed.push(IndexedClaim {
                polynomial: &claim.polynomial,
                challenge: claim.opening_pair.challenge,
                evaluation: claim.opening_pair.evaluation,
                nu_index: libra_start + i,
            });
        }
        indexed
    }

    /// `Q(X) = sum_j nu^j (p_j(X) - v_j) / (X - x_j)`.
    fn compute_batched_quotient<F: Scalar>(claims: &[IndexedClaim<'_, F>], nu: &F) -> Polynomial<F> {
        let max_size = claims.iter().map(|c| c.polynomial.size()).max().unwrap_or(0);
        let nu_powers = powers(nu, claims.iter().map(|c| c.nu_index + 1).max().unwrap_or(0));
        let mut quotient = Polynomial::zero(max_size);
        for claim in claims.iter() {
            let (q, _) = claim.polynomial.div_rem_linear(&claim.challenge);
            quotient.add_scaled(&q, &nu_powers[claim.nu_index]);
        }
        quotient
    }

    /// `G(X) = Q(X) - sum_j nu^j / (z - x_j) (p_j(X) - v_j)`, which vanishes at `z`.
    fn compute_partially_evaluated_batched_quotient<F: Scalar>(
        claims: &[IndexedClaim<'_, F>],
        batched_quotient: Polynomial<F>,
        nu: &F,
        z: &F,
    ) -> Result<Polynomial<F>> {
        let mut inverse_vanishing_evals: Vec<F> = claims.iter().map(|c| z.sub(&c.challenge)).collect();
        if inverse_vanishing_evals.iter().any(|d| d.is_zero()) {
            return Err(HonkError::DivisionByZero);
        }
        batch_inversion(&mut inverse_vanishing_evals);

        let nu_powers = powers(nu, claims.iter().map(|c| c.nu_index + 1).max().unwrap_or(0));
        let mut g = batched_quotient;
        let mut constant = F::zero();
        for (claim, inverse) in claims.iter().zip(inverse_vanishing_evals.iter()) {
            let scaling = nu_powers[claim.nu_index].mul(inverse);
            g.add_scaled(claim.polynomial, &scaling.neg());
            constant.add_assign(&scaling.mul(&claim.evaluation));
        }
        g.add_coef_assign(&constant, 0);
        Ok(g)
    }

    /// Commit to the batched quotient and return the single claim `G(z) = 0`.
    pub fn prove<PCS: PolyComScheme>(
        commitment_key: &PCS,
        log_n: usize,
        gemini_claims: &[ProverOpeningClaim<PCS::Field>],
        libra_claims: &[ProverOpeningClaim<PCS::Field>],
        transcript: &mut HonkTranscript,
    ) -> Result<ProverOpeningClaim<PCS::Field>> {
        let shplonk_time = start_timer!(|| "Shplonk prover");
        let claims = Self::index_claims(log_n, gemini_claims, libra_claims);
        if claims.is_empty() {
            return Err(HonkError::InvariantViolation("nothing to batch".into()));
        }

        let nu: PCS::Field = transcript.get_challenge("Shplonk:nu");
        let batched_quotient = Self::compute_batched_quotient(&claims, &nu);
        let quotient_commitment = commitment_key.commit(&batched_quotient)?;
        transcript.send_to_verifier("Shplonk:Q", &quotient_commitment);

        let z: PCS::Field = transcript.get_challenge("Shplonk:z");
        let polynomial =
            Self::compute_partially_evaluated_batched_quotient(&claims, batched_quotient, &nu, &z)?;
        end_timer!(shplonk_time);
        Ok(ProverOpeningClaim {
            polynomial,
            opening_pair: OpeningPair {
                challenge: z,
                evaluation: PCS::Field::zero(),
            },
            gemini_fold: false,
        })
    }
}

/// The Shplonk verifier.
pub struct ShplonkVerifier;

impl ShplonkVerifier {
    /// `1/(z - r^{2^l})` and `1/(z + r^{2^l})` for every power, interleaved.
    pub fn compute_inverted_gemini_denominators<F: Scalar>(
        shplonk_eval_challenge: &F,
        gemini_eval_challenge_powers: &[F],
    ) -> Result<Vec<F>> {
        let mut denominators = Vec::with_capacity(2 * gemini_eval_challenge_powers.len());
        for r_pow in gemini_eval_challenge_powers.iter() {
            denominators.push(shplonk_eval_challenge.sub(r_pow));
            denominators.push(shplonk_eval_challenge.add(r_pow));
        }
        if denominators.iter().any(|d| d.is_zero()) {
            return Err(HonkError::DivisionByZero);
        }
        batch_inversion(&mut denominators);
        Ok(denominators)
    }

    /// Reduce claims about committed polynomials to one batched claim at `z`,
    /// batching the `j`-th claim with `nu^j`.
    pub fn reduce_verification<PCS: PolyComScheme>(
        one_commitment: PCS::Commitment,
        claims: &[OpeningClaim<PCS::Commitment>],
        transcript: &mut HonkTranscript,
    ) -> Result<BatchOpeningClaim<PCS::Commitment>> {
        let nu: PCS::Field = transcript.get_challenge("Shplonk:nu");
        let quotient_commitment: PCS::Commitment = transcript.receive_from_prover("Shplonk:Q")?;
        let z: PCS::Field = transcript.get_challenge("Shplonk:z");

        let mut inverse_vanishing_evals: Vec<PCS::Field> = claims
            .iter()
            .map(|c| z.sub(&c.opening_pair.challenge))
            .collect();
        if inverse_vanishing_evals.iter().any(|d| d.is_zero()) {
            return Err(HonkError::DivisionByZero);
        }
        batch_inversion(&mut inverse_vanishing_evals);

        let mut commitments = vec![quotient_commitment];
        let mut scalars = vec![PCS::Field::one()];
        let mut constant = PCS::Field::zero();
        let mut nu_power = PCS::Field::one();
        for (claim, inverse) in claims.iter().zip(inverse_vanishing_evals.iter()) {
            let scaling = nu_power.mul(inverse);
            commitments.push(claim.commitment);
            scalars.push(scaling.neg());
            constant.add_assign(&scaling.mul(&claim.opening_pair.evaluation));
            nu_power.mul_assign(&nu);
        }
        commitments.push(one_commitment);
        scalars.push(constant);

        Ok(BatchOpeningClaim {
            commitments,
            scalars,
            evaluation_point: z,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::poly_commit::{
        claim::{OpeningClaim, ProverOpeningClaim},
        ipa::IPACommitmentScheme,
        kzg_poly_com::KZGCommitmentSchemeBN254,
        pcs::PolyComScheme,
        shplonk::{ShplonkProver, ShplonkVerifier},
    };
    use crate::polynomials::Polynomial;
    use crate::transcript::HonkTranscript;
    use honk_algebra::{
        bn254::{BN254Scalar, BN254G1},
        prelude::*,
    };

    fn batch_and_open<PCS: PolyComScheme, R: CryptoRng + RngCore>(pcs: &PCS, prng: &mut R) {
        let sizes = [16usize, 9, 5];
        let polys: Vec<Polynomial<PCS::Field>> =
            sizes.iter().map(|n| Polynomial::random(prng, *n)).collect();
        let commitments: Vec<PCS::Commitment> =
            polys.iter().map(|p| pcs.commit(p).unwrap()).collect();
        let prover_claims: Vec<ProverOpeningClaim<PCS::Field>> = polys
            .iter()
            .map(|p| ProverOpeningClaim::new(p.clone(), PCS::Field::random(prng)))
            .collect();

        let mut transcript = HonkTranscript::new(b"shplonk");
        let claim = ShplonkProver::prove(pcs, 0, &[], &prover_claims, &mut transcript).unwrap();
        assert!(claim.polynomial.eval(&claim.opening_pair.challenge).is_zero());
        pcs.compute_opening_proof(claim, &mut transcript).unwrap();
        let proof = transcript.export_proof();

        let verifier_claims: Vec<OpeningClaim<PCS::Commitment>> = prover_claims
            .iter()
            .zip(commitments.iter())
            .map(|(c, commitment)| OpeningClaim {
                opening_pair: c.opening_pair,
                commitment: *commitment,
            })
            .collect();

        let mut transcript = HonkTranscript::from_proof(b"shplonk", proof.clone());
        let batch = ShplonkVerifier::reduce_verification::<PCS>(
            pcs.one_commitment(),
            &verifier_claims,
            &mut transcript,
        )
        .unwrap();
        assert!(pcs.reduce_verify_batch_opening_claim(batch, &mut transcript).unwrap());

        let mut wrong_claims = verifier_claims;
        wrong_claims[1].opening_pair.evaluation.add_assign(&PCS::Field::one());
        let mut transcript = HonkTranscript::from_proof(b"shplonk", proof);
        let batch = ShplonkVerifier::reduce_verification::<PCS>(
            pcs.one_commitment(),
            &wrong_claims,
            &mut transcript,
        )
        .unwrap();
        assert!(!pcs.reduce_verify_batch_opening_claim(batch, &mut transcript).unwrap());
    }

    #[test]
    fn shplonk_with_kzg() {
        let mut prng = test_rng();
        let pcs = KZGCommitmentSchemeBN254::new(32, &mut prng);
        batch_and_open(&pcs, &mut prng);
    }

    #[test]
    fn shplonk_with_ipa() {
        let mut prng = test_rng();
        let pcs = IPACommitmentScheme::<BN254G1>::new(16, &mut prng);
        batch_and_open(&pcs, &mut prng);
    }

    #[test]
    fn inverted_denominators() {
        let mut prng = test_rng();
        let z = BN254Scalar::random(&mut prng);
        let r = BN254Scalar::random(&mut prng);
        let inverses = ShplonkVerifier::compute_inverted_gemini_denominators(&z, &[r, r.square()]).unwrap();
        assert_eq!(inverses.len(), 4);
        assert_eq!(inverses[1].mul(&z.add(&r)), BN254Scalar::one());
        assert_eq!(inverses[2].mul(&z.sub(&r.square())), BN254Scalar::one());
        assert!(ShplonkVerifier::compute_inverted_gemini_denominators(&z, &[z]).is_err());
    }
}
