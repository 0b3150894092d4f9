use crate::errors::{HonkError, Result};
use crate::poly_commit::{
    claim::{BatchOpeningClaim, ProverOpeningClaim},
    pcs::PolyComScheme,
};
use crate::polynomials::Polynomial;
use crate::transcript::{HonkTranscript, TranscriptElement};
use ark_std::{end_timer, start_timer};
use honk_algebra::{prelude::*, traits::Domain};

/// Inner product argument commitment scheme over a group without pairings.
///
/// A commitment is the Pedersen vector commitment `sum_i p_i G_i` of the monomial
/// coefficients. An opening proof at `z` is the logarithmic-size argument that
/// `<p, (1, z, z^2, ...)>` equals the claimed value, bound to the commitment through the
/// auxiliary generator `U`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct IPACommitmentScheme<G: Group> {
    /// The Pedersen generators, a power of two of them.
    pub generators: Vec<G>,
    /// The generator binding the inner product.
    pub aux_generator: G,
}

fn inner_product<F: Scalar>(a: &[F], b: &[F]) -> F {
    a.iter().zip(b.iter()).fold(F::zero(), |acc, (x, y)| acc.add(&x.mul(y)))
}

fn msm<G: Group>(scalars: &[G::ScalarType], points: &[G]) -> G {
    let scalars: Vec<&G::ScalarType> = scalars.iter().collect();
    let points: Vec<&G> = points.iter().collect();
    G::multi_exp(&scalars, &points)
}

impl<G: Group> IPACommitmentScheme<G> {
    /// Sample `max_size` generators, rounded up to a power of two, and the auxiliary generator.
    pub fn new<R: CryptoRng + RngCore>(max_size: usize, prng: &mut R) -> Self {
        let size = max_size.max(1).next_power_of_two();
        let generators = (0..size).map(|_| G::random(prng)).collect();
        Self {
            generators,
            aux_generator: G::random(prng),
        }
    }
}

impl<G> PolyComScheme for IPACommitmentScheme<G>
where
    G: Group + TranscriptElement,
    G::ScalarType: Domain + TranscriptElement,
{
    type Field = G::ScalarType;
    type Commitment = G;

    fn max_size(&self) -> usize {
        self.generators.len()
    }

    fn commit(&self, polynomial: &Polynomial<G::ScalarType>) -> Result<G> {
        let degree = polynomial.degree();
        if degree + 1 > self.generators.len() {
            return Err(HonkError::DegreeError);
        }
        let coefs = &polynomial.get_coefs_ref()[..(degree + 1).min(polynomial.size())];
        Ok(msm(coefs, &self.generators[..coefs.len()]))
    }

    fn one_commitment(&self) -> G {
        self.generators[0]
    }

    fn compute_opening_proof(
        &self,
        claim: ProverOpeningClaim<G::ScalarType>,
        transcript: &mut HonkTranscript,
    ) -> Result<()> {
        let opening_time = start_timer!(|| "IPA opening proof");
        let poly_length = claim.polynomial.size().max(1).next_power_of_two();
        if poly_length > self.generators.len() {
            return Err(HonkError::DegreeError);
        }
        let point = claim.opening_pair.challenge;
        if claim.polynomial.eval(&point) != claim.opening_pair.evaluation {
            return Err(HonkError::ProofError);
        }

        transcript.send_to_verifier("IPA:poly_degree_plus_1", &(poly_length as u64));
        let generator_challenge: G::ScalarType = transcript.get_challenge("IPA:generator_challenge");
        if generator_challenge.is_zero() {
            return Err(HonkError::ProofError);
        }
        let aux_generator = self.aux_generator.mul(&generator_challenge);

        // open p(X) - v, which the verifier's batched commitment `C - v [1]` commits to
        let mut a = claim.polynomial.coefs;
        a.resize(poly_length, G::ScalarType::zero());
        a[0].sub_assign(&claim.opening_pair.evaluation);
        let mut b = powers(&point, poly_length);
        let mut g = self.generators[..poly_length].to_vec();

        let log_length = poly_length.trailing_zeros() as usize;
        for i in 0..log_length {
            let half = a.len() / 2;
            let (a_lo, a_hi) = a.split_at(half);
            let (b_lo, b_hi) = b.split_at(half);
            let (g_lo, g_hi) = g.split_at(half);

            let l = msm(a_lo, g_hi).add(&aux_generator.mul(&inner_product(a_lo, b_hi)));
            let r = msm(a_hi, g_lo).add(&aux_generator.mul(&inner_product(a_hi, b_lo)));
            transcript.send_to_verifier(&format!("IPA:L_{}", i), &l);
            transcript.send_to_verifier(&format!("IPA:R_{}", i), &r);

            let x: G::ScalarType = transcript.get_challenge(&format!("IPA:round_challenge_{}", i));
            let x_inv = x.inv()?;

            let next_a: Vec<_> = (0..half)
                .map(|j| a_lo[j].mul(&x).add(&a_hi[j].mul(&x_inv)))
                .collect();
            let next_b: Vec<_> = (0..half)
                .map(|j| b_lo[j].mul(&x_inv).add(&b_hi[j].mul(&x)))
                .collect();
            let next_g: Vec<_> = (0..half)
                .map(|j| g_lo[j].mul(&x_inv).add(&g_hi[j].mul(&x)))
                .collect();
            a = next_a;
            b = next_b;
            g = next_g;
        }

        transcript.send_to_verifier("IPA:a_0", &a[0]);
        end_timer!(opening_time);
        Ok(())
    }

    fn reduce_verify_batch_opening_claim(
        &self,
        claim: BatchOpeningClaim<G>,
        transcript: &mut HonkTranscript,
    ) -> Result<bool> {
        let verify_time = start_timer!(|| "IPA verifier");
        let commitment = claim.batch_mul();
        let point = claim.evaluation_point;

        let poly_length = transcript.receive_from_prover::<u64>("IPA:poly_degree_plus_1")? as usize;
        if !poly_length.is_power_of_two() || poly_length > self.generators.len() {
            return Ok(false);
        }
        let generator_challenge: G::ScalarType = transcript.get_challenge("IPA:generator_challenge");
        if generator_challenge.is_zero() {
            return Ok(false);
        }
        let aux_generator = self.aux_generator.mul(&generator_challenge);

        let log_length = poly_length.trailing_zeros() as usize;
        let mut round_points = Vec::with_capacity(2 * log_length + 1);
        let mut round_scalars = Vec::with_capacity(2 * log_length + 1);
        let mut challenges = Vec::with_capacity(log_length);
        let mut challenges_inv = Vec::with_capacity(log_length);
        for i in 0..log_length {
            let l: G = transcript.receive_from_prover(&format!("IPA:L_{}", i))?;
            let r: G = transcript.receive_from_prover(&format!("IPA:R_{}", i))?;
            let x: G::ScalarType = transcript.get_challenge(&format!("IPA:round_challenge_{}", i));
            let x_inv = x.inv()?;
            round_points.push(l);
            round_scalars.push(x.square());
            round_points.push(r);
            round_scalars.push(x_inv.square());
            challenges.push(x);
            challenges_inv.push(x_inv);
        }
        let a_0: G::ScalarType = transcript.receive_from_prover("IPA:a_0")?;

        // C' + sum_i (x_i^2 L_i + x_i^{-2} R_i), with the claimed value zero
        round_points.push(commitment);
        round_scalars.push(G::ScalarType::one());
        let lhs = msm(&round_scalars, &round_points);

        // s_j is the product of x_i or x_i^{-1} by the bits of j, round 0 on the top bit
        let mut s = vec![G::ScalarType::one()];
        for i in (0..log_length).rev() {
            let low: Vec<_> = s.iter().map(|v| v.mul(&challenges_inv[i])).collect();
            let high: Vec<_> = s.iter().map(|v| v.mul(&challenges[i])).collect();
            s = low;
            s.extend(high);
        }
        let g_0 = msm(&s, &self.generators[..poly_length]);

        let mut b_0 = G::ScalarType::one();
        let mut point_power = point;
        for i in (0..log_length).rev() {
            b_0.mul_assign(&challenges_inv[i].add(&challenges[i].mul(&point_power)));
            point_power = point_power.square();
        }

        let rhs = g_0.mul(&a_0).add(&aux_generator.mul(&a_0.mul(&b_0)));
        end_timer!(verify_time);
        Ok(lhs == rhs)
    }
}

#[cfg(test)]
mod tests {
    use crate::poly_commit::{
        claim::{OpeningClaim, OpeningPair, ProverOpeningClaim},
        ipa::IPACommitmentScheme,
        pcs::PolyComScheme,
    };
    use crate::polynomials::Polynomial;
    use crate::transcript::HonkTranscript;
    use honk_algebra::{
        bn254::{BN254Scalar, BN254G1},
        prelude::*,
    };

    type F = BN254Scalar;

    fn open_and_verify(size: usize) {
        let mut prng = test_rng();
        let pcs = IPACommitmentScheme::<BN254G1>::new(32, &mut prng);
        let poly = Polynomial::<F>::random(&mut prng, size);
        let commitment = pcs.commit(&poly).unwrap();
        let point = F::random(&mut prng);

        let claim = ProverOpeningClaim::new(poly, point);
        let opening_pair = claim.opening_pair;
        let mut transcript = HonkTranscript::new(b"ipa");
        pcs.compute_opening_proof(claim, &mut transcript).unwrap();
        let proof = transcript.export_proof();

        let mut transcript = HonkTranscript::from_proof(b"ipa", proof.clone());
        let claim = OpeningClaim {
            opening_pair,
            commitment,
        };
        assert!(pcs.reduce_verify(&claim, &mut transcript).unwrap());
        assert!(transcript.is_consumed());

        let mut transcript = HonkTranscript::from_proof(b"ipa", proof);
        let wrong = OpeningClaim {
            opening_pair: OpeningPair {
                challenge: point,
                evaluation: opening_pair.evaluation.add(&F::one()),
            },
            commitment,
        };
        assert!(!pcs.reduce_verify(&wrong, &mut transcript).unwrap());
    }

    #[test]
    fn open_power_of_two() {
        open_and_verify(16);
    }

    #[test]
    fn open_padded() {
        open_and_verify(11);
        open_and_verify(1);
    }

    #[test]
    fn commitment_is_linear() {
        let mut prng = test_rng();
        let pcs = IPACommitmentScheme::<BN254G1>::new(8, &mut prng);
        let a = Polynomial::<F>::random(&mut prng, 8);
        let s = F::random(&mut prng);
        let ca = pcs.commit(&a).unwrap();
        assert_eq!(pcs.commit(&a.mul_scalar(&s)).unwrap(), ca.mul(&s));
        assert!(pcs.commit(&Polynomial::random(&mut prng, 9)).is_err());
    }

    #[test]
    fn generators_serialization() {
        let mut prng = test_rng();
        let pcs = IPACommitmentScheme::<BN254G1>::new(8, &mut prng);
        let bytes = bincode::serialize(&pcs).unwrap();
        let recovered: IPACommitmentScheme<BN254G1> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(recovered.generators, pcs.generators);
        assert_eq!(recovered.aux_generator, pcs.aux_generator);

        let poly = Polynomial::<F>::random(&mut prng, 8);
        assert_eq!(recovered.commit(&poly).unwrap(), pcs.commit(&poly).unwrap());
    }
}
