use crate::errors::{HonkError, Result};
use honk_algebra::prelude::*;

/// A univariate given by its evaluations at the consecutive points `0, 1, ..., len - 1`.
///
/// Sumcheck round messages and the per-edge relation inputs are univariates. The
/// length is a runtime quantity so one type serves every flavor; the prover and the
/// verifier agree on it through the flavor constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Univariate<F> {
    /// Evaluations at `0, 1, ..., len - 1`.
    pub evaluations: Vec<F>,
}

impl<F: Scalar> Univariate<F> {
    /// Build from evaluations at `0, 1, ..., len - 1`.
    pub fn new(evaluations: Vec<F>) -> Self {
        Self { evaluations }
    }

    /// The zero univariate with `length` evaluations.
    pub fn zero(length: usize) -> Self {
        Self {
            evaluations: vec![F::zero(); length],
        }
    }

    /// The constant univariate with `length` evaluations.
    pub fn constant(value: F, length: usize) -> Self {
        Self {
            evaluations: vec![value; length],
        }
    }

    /// The line through `(0, v0)` and `(1, v1)`, sampled at `length` points.
    pub fn from_edge(v0: &F, v1: &F, length: usize) -> Self {
        let delta = v1.sub(v0);
        let mut evaluations = Vec::with_capacity(length);
        let mut cur = *v0;
        for _ in 0..length {
            evaluations.push(cur);
            cur.add_assign(&delta);
        }
        Self { evaluations }
    }

    /// Sample a random univariate with `length` evaluations.
    pub fn random<R: CryptoRng + RngCore>(prng: &mut R, length: usize) -> Self {
        Self {
            evaluations: (0..length).map(|_| F::random(prng)).collect(),
        }
    }

    /// The number of evaluations.
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    /// Whether the univariate has no evaluations.
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// The evaluation at the point `i`.
    pub fn value_at(&self, i: usize) -> F {
        self.evaluations[i]
    }

    /// Whether every evaluation is zero.
    pub fn is_zero(&self) -> bool {
        self.evaluations.iter().all(|e| e.is_zero())
    }

    /// `S(0) + S(1)`, the quantity checked by the sumcheck verifier.
    pub fn sum_at_zero_and_one(&self) -> F {
        self.evaluations[0].add(&self.evaluations[1])
    }

    /// The barycentric weights `1 / prod_{j != i} (i - j)` of the domain `0..n`.
    fn barycentric_weights(n: usize) -> Vec<F> {
        let mut weights = Vec::with_capacity(n);
        for i in 0..n {
            let mut denominator = F::one();
            for j in 0..n {
                if i == j {
                    continue;
                }
                let diff = if i > j {
                    F::from((i - j) as u64)
                } else {
                    F::from((j - i) as u64).neg()
                };
                denominator.mul_assign(&diff);
            }
            weights.push(denominator);
        }
        batch_inversion(&mut weights);
        weights
    }

    /// Evaluate at an arbitrary field point by barycentric interpolation over `0..len`.
    pub fn evaluate(&self, u: &F) -> F {
        let n = self.evaluations.len();
        if n == 0 {
            return F::zero();
        }

        let mut differences: Vec<F> = (0..n).map(|i| u.sub(&F::from(i as u64))).collect();
        if let Some(i) = differences.iter().position(|d| d.is_zero()) {
            return self.evaluations[i];
        }

        let full_numerator = differences.iter().fold(F::one(), |acc, d| acc.mul(d));
        let weights = Self::barycentric_weights(n);
        batch_inversion(&mut differences);

        let mut result = F::zero();
        for ((y, w), d_inv) in self
            .evaluations
            .iter()
            .zip(weights.iter())
            .zip(differences.iter())
        {
            result.add_assign(&y.mul(w).mul(d_inv));
        }
        result.mul(&full_numerator)
    }

    /// Extend the univariate to `length` evaluations. The current evaluations determine
    /// a polynomial of degree below `self.len()`, which is sampled at the new points.
    pub fn extend_to(&self, length: usize) -> Self {
        let n = self.evaluations.len();
        if length <= n {
            return Self::new(self.evaluations[..length].to_vec());
        }
        if n == 1 {
            return Self::constant(self.evaluations[0], length);
        }

        let weights = Self::barycentric_weights(n);
        let mut evaluations = self.evaluations.clone();
        for k in n..length {
            let x = F::from(k as u64);
            let mut differences: Vec<F> = (0..n).map(|i| x.sub(&F::from(i as u64))).collect();
            let full_numerator = differences.iter().fold(F::one(), |acc, d| acc.mul(d));
            batch_inversion(&mut differences);
            let mut value = F::zero();
            for i in 0..n {
                value.add_assign(
                    &self.evaluations[i]
                        .mul(&weights[i])
                        .mul(&differences[i]),
                );
            }
            evaluations.push(value.mul(&full_numerator));
        }
        Self::new(evaluations)
    }

    /// Recover the monomial coefficients, lowest degree first.
    pub fn to_monomial(&self) -> Result<Vec<F>> {
        let n = self.evaluations.len();
        // Newton divided differences over the integer nodes 0..n.
        let mut table = self.evaluations.clone();
        for level in 1..n {
            let inv = F::from(level as u64)
                .inv()
                .map_err(|_| HonkError::DivisionByZero)?;
            for i in (level..n).rev() {
                table[i] = table[i].sub(&table[i - 1]).mul(&inv);
            }
        }
        let mut coefs = vec![F::zero(); n];
        for level in (0..n).rev() {
            // coefs = coefs * (X - level) + table[level]
            let node = F::from(level as u64);
            let mut next = vec![F::zero(); n];
            for i in 0..n {
                if i + 1 < n {
                    next[i + 1].add_assign(&coefs[i]);
                }
                next[i].sub_assign(&coefs[i].mul(&node));
            }
            next[0].add_assign(&table[level]);
            coefs = next;
        }
        Ok(coefs)
    }

    /// Add `scalar` to every evaluation.
    pub fn add_scalar(mut self, scalar: &F) -> Self {
        self.evaluations.iter_mut().for_each(|e| e.add_assign(scalar));
        self
    }

    /// Multiply every evaluation by `scalar`.
    pub fn mul_scalar(mut self, scalar: &F) -> Self {
        self.evaluations.iter_mut().for_each(|e| e.mul_assign(scalar));
        self
    }

    fn zip_assign(&mut self, other: &Self, f: impl Fn(&mut F, &F)) {
        assert_eq!(
            self.evaluations.len(),
            other.evaluations.len(),
            "univariate lengths differ"
        );
        self.evaluations
            .iter_mut()
            .zip(other.evaluations.iter())
            .for_each(|(a, b)| f(a, b));
    }
}

impl<'a, F: Scalar> AddAssign<&'a Univariate<F>> for Univariate<F> {
    fn add_assign(&mut self, rhs: &'a Univariate<F>) {
        self.zip_assign(rhs, |a, b| a.add_assign(b));
    }
}

impl<'a, F: Scalar> SubAssign<&'a Univariate<F>> for Univariate<F> {
    fn sub_assign(&mut self, rhs: &'a Univariate<F>) {
        self.zip_assign(rhs, |a, b| a.sub_assign(b));
    }
}

impl<'a, F: Scalar> MulAssign<&'a Univariate<F>> for Univariate<F> {
    fn mul_assign(&mut self, rhs: &'a Univariate<F>) {
        self.zip_assign(rhs, |a, b| a.mul_assign(b));
    }
}

impl<'a, F: Scalar> Add<&'a Univariate<F>> for Univariate<F> {
    type Output = Univariate<F>;

    fn add(mut self, rhs: &'a Univariate<F>) -> Self::Output {
        self.add_assign(rhs);
        self
    }
}

impl<'a, F: Scalar> Sub<&'a Univariate<F>> for Univariate<F> {
    type Output = Univariate<F>;

    fn sub(mut self, rhs: &'a Univariate<F>) -> Self::Output {
        self.sub_assign(rhs);
        self
    }
}

impl<'a, F: Scalar> Mul<&'a Univariate<F>> for Univariate<F> {
    type Output = Univariate<F>;

    fn mul(mut self, rhs: &'a Univariate<F>) -> Self::Output {
        self.mul_assign(rhs);
        self
    }
}

impl<F: Scalar> Add for Univariate<F> {
    type Output = Univariate<F>;

    fn add(self, rhs: Self) -> Self::Output {
        self.add(&rhs)
    }
}

impl<F: Scalar> Sub for Univariate<F> {
    type Output = Univariate<F>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.sub(&rhs)
    }
}

impl<F: Scalar> Mul for Univariate<F> {
    type Output = Univariate<F>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.mul(&rhs)
    }
}

impl<F: Scalar> Neg for Univariate<F> {
    type Output = Univariate<F>;

    fn neg(mut self) -> Self::Output {
        self.evaluations.iter_mut().for_each(|e| *e = e.neg());
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::polynomials::univariate::Univariate;
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    fn eval_monomial(coefs: &[F], x: &F) -> F {
        coefs.iter().rev().fold(F::zero(), |acc, c| acc.mul(x).add(c))
    }

    #[test]
    fn extend_matches_the_underlying_polynomial() {
        let mut prng = test_rng();
        // degree 3
        let coefs: Vec<F> = (0..4).map(|_| F::random(&mut prng)).collect();
        let evals: Vec<F> = (0..4u64).map(|i| eval_monomial(&coefs, &F::from(i))).collect();
        let extended = Univariate::new(evals).extend_to(9);
        for i in 0..9u64 {
            assert_eq!(extended.value_at(i as usize), eval_monomial(&coefs, &F::from(i)));
        }

        let u = F::random(&mut prng);
        assert_eq!(extended.evaluate(&u), eval_monomial(&coefs, &u));
        assert_eq!(extended.evaluate(&F::from(5u32)), extended.value_at(5));
    }

    #[test]
    fn edges_are_lines() {
        let v0 = F::from(7u32);
        let v1 = F::from(3u32);
        let edge = Univariate::from_edge(&v0, &v1, 5);
        assert_eq!(edge.value_at(0), v0);
        assert_eq!(edge.value_at(1), v1);
        assert_eq!(edge.value_at(4), F::from(7u32) - F::from(16u32));
        assert_eq!(edge.sum_at_zero_and_one(), F::from(10u32));
    }

    #[test]
    fn monomial_form_round_trips() {
        let mut prng = test_rng();
        let coefs: Vec<F> = (0..9).map(|_| F::random(&mut prng)).collect();
        let evals: Vec<F> = (0..9u64).map(|i| eval_monomial(&coefs, &F::from(i))).collect();
        assert_eq!(Univariate::new(evals).to_monomial().unwrap(), coefs);
    }

    #[test]
    fn arithmetic_is_pointwise() {
        let a = Univariate::new(vec![F::from(1u32), F::from(2u32), F::from(3u32)]);
        let b = Univariate::new(vec![F::from(4u32), F::from(5u32), F::from(6u32)]);
        let c = a.clone() * &b + &a;
        assert_eq!(
            c.evaluations,
            vec![F::from(5u32), F::from(12u32), F::from(21u32)]
        );
        assert!((a.clone() - &a).is_zero());
        assert_eq!(
            a.add_scalar(&F::one()).mul_scalar(&F::from(2u32)).evaluations,
            vec![F::from(4u32), F::from(6u32), F::from(8u32)]
        );
    }
}
