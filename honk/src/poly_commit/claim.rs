use crate::polynomials::Polynomial;
use honk_algebra::prelude::*;

/// A point and the value claimed there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningPair<F> {
    /// The evaluation point.
    pub challenge: F,
    /// The claimed value.
    pub evaluation: F,
}

/// An opening claim held by the prover, with the polynomial itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverOpeningClaim<F> {
    /// The polynomial to open.
    pub polynomial: Polynomial<F>,
    /// Where it is opened and to what.
    pub opening_pair: OpeningPair<F>,
    /// A Gemini fold polynomial, opened at `-x` as stored and also at `x`.
    pub gemini_fold: bool,
}

impl<F: Scalar> ProverOpeningClaim<F> {
    /// Open `polynomial` at `challenge`, computing the evaluation.
    pub fn new(polynomial: Polynomial<F>, challenge: F) -> Self {
        let evaluation = polynomial.eval(&challenge);
        Self {
            polynomial,
            opening_pair: OpeningPair {
                challenge,
                evaluation,
            },
            gemini_fold: false,
        }
    }
}

/// An opening claim held by the verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct OpeningClaim<G: Group> {
    /// Where the committed polynomial is opened and to what.
    pub opening_pair: OpeningPair<G::ScalarType>,
    /// The commitment.
    pub commitment: G,
}

/// The reduced claim handed to a commitment scheme: the committed polynomial
/// `sum_i scalars[i] * commitments[i]` evaluates to zero at `evaluation_point`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct BatchOpeningClaim<G: Group> {
    /// The commitments of the linear combination.
    pub commitments: Vec<G>,
    /// Their coefficients.
    pub scalars: Vec<G::ScalarType>,
    /// The opening point.
    pub evaluation_point: G::ScalarType,
}

impl<G: Group> BatchOpeningClaim<G> {
    /// Rewrite a single opening claim as `C - v [1]` opened to zero.
    pub fn from_opening_claim(claim: &OpeningClaim<G>, one_commitment: G) -> Self {
        Self {
            commitments: vec![claim.commitment, one_commitment],
            scalars: vec![G::ScalarType::one(), claim.opening_pair.evaluation.neg()],
            evaluation_point: claim.opening_pair.challenge,
        }
    }

    /// Compute the combined commitment.
    pub fn batch_mul(&self) -> G {
        let scalars: Vec<&G::ScalarType> = self.scalars.iter().collect();
        let points: Vec<&G> = self.commitments.iter().collect();
        G::multi_exp(&scalars, &points)
    }
}
