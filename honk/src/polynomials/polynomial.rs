use crate::errors::{HonkError, Result};
use ark_poly::{EvaluationDomain, Radix2EvaluationDomain};
use honk_algebra::{prelude::*, traits::Domain};

/// A dense polynomial over `F`.
///
/// The same coefficient vector is read two ways: as the monomial coefficients of a
/// univariate (commitments, Gemini, Shplonk), and as the table of a multilinear
/// polynomial over the Boolean hypercube, with the row index's lowest bit being the
/// first variable. Coefficients are never trimmed, so the size of a hypercube
/// polynomial stays a power of two.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polynomial<F> {
    /// Coefficients (or hypercube evaluations) of the polynomial, low order first.
    pub coefs: Vec<F>,
}

impl<F: Scalar> Polynomial<F> {
    /// Build a polynomial from its coefficients, low order first.
    pub fn new(coefs: Vec<F>) -> Self {
        Self { coefs }
    }

    /// The zero polynomial with `size` coefficients.
    pub fn zero(size: usize) -> Self {
        Self {
            coefs: vec![F::zero(); size],
        }
    }

    /// Return a polynomial of `size` uniformly random coefficients.
    pub fn random<R: CryptoRng + RngCore>(prng: &mut R, size: usize) -> Self {
        Self {
            coefs: (0..size).map(|_| F::random(prng)).collect(),
        }
    }

    /// Return a random polynomial whose constant coefficient is zero, so it can be shifted.
    pub fn random_shiftable<R: CryptoRng + RngCore>(prng: &mut R, size: usize) -> Self {
        let mut poly = Self::random(prng, size);
        if let Some(first) = poly.coefs.first_mut() {
            *first = F::zero();
        }
        poly
    }

    /// Build a polynomial from its zeroes/roots.
    pub fn from_zeroes(zeroes: &[F]) -> Self {
        let mut r = Self::new(vec![F::one()]);
        for root in zeroes.iter() {
            let mut p = r.clone();
            r.coefs.insert(0, F::zero()); // multiply by X
            p.mul_scalar_assign(root);
            p.coefs.push(F::zero());
            r.sub_assign(&p); // r = r * (X - root)
        }
        r
    }

    /// Return the polynomial coefs reference.
    pub fn get_coefs_ref(&self) -> &[F] {
        self.coefs.as_slice()
    }

    /// The number of coefficients.
    pub fn size(&self) -> usize {
        self.coefs.len()
    }

    /// The number of variables of a hypercube polynomial.
    pub fn log_size(&self) -> usize {
        self.coefs.len().trailing_zeros() as usize
    }

    /// Return the degree of the polynomial, the index of the highest nonzero coefficient.
    pub fn degree(&self) -> usize {
        self.coefs
            .iter()
            .rposition(|c| !c.is_zero())
            .unwrap_or(0)
    }

    /// Test if polynomial is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coefs.iter().all(|c| c.is_zero())
    }

    /// Evaluate the univariate on a point.
    pub fn eval(&self, point: &F) -> F {
        self.coefs
            .iter()
            .rev()
            .fold(F::zero(), |acc, coef| acc.mul(point).add(coef))
    }

    /// Bind the first hypercube variable to `u`: `p'[j] = p[2j] + u (p[2j+1] - p[2j])`.
    pub fn partially_evaluate(&self, u: &F) -> Self {
        let half = self.coefs.len() / 2;
        let coefs = (0..half)
            .map(|j| {
                let even = self.coefs[2 * j];
                even.add(&u.mul(&self.coefs[2 * j + 1].sub(&even)))
            })
            .collect();
        Self { coefs }
    }

    /// Evaluate the multilinear extension at `point`, binding `point[0]` first.
    pub fn evaluate_mle(&self, point: &[F]) -> Result<F> {
        if !self.coefs.len().is_power_of_two() || self.log_size() != point.len() {
            return Err(HonkError::InvariantViolation(format!(
                "cannot evaluate a table of size {} at a point of dimension {}",
                self.coefs.len(),
                point.len()
            )));
        }
        let mut table = self.coefs.clone();
        let mut len = table.len();
        for u in point.iter() {
            len /= 2;
            for j in 0..len {
                let even = table[2 * j];
                table[j] = even.add(&u.mul(&table[2 * j + 1].sub(&even)));
            }
        }
        Ok(table[0])
    }

    /// The left shift by one: `shifted[i] = self[i + 1]`, and the last entry is zero.
    /// As a univariate, this is `(p(X) - p(0)) / X`.
    pub fn shifted(&self) -> Self {
        let mut coefs = Vec::with_capacity(self.coefs.len());
        coefs.extend_from_slice(self.coefs.get(1..).unwrap_or(&[]));
        if !self.coefs.is_empty() {
            coefs.push(F::zero());
        }
        Self { coefs }
    }

    /// `self += scalar * other`, growing `self` when `other` is longer.
    pub fn add_scaled(&mut self, other: &Self, scalar: &F) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (a, b) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            a.add_assign(&b.mul(scalar));
        }
    }

    /// Add another polynomial to self.
    pub fn add_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (a, b) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            a.add_assign(b);
        }
    }

    /// Subtracts another polynomial from self.
    pub fn sub_assign(&mut self, other: &Self) {
        if self.coefs.len() < other.coefs.len() {
            self.coefs.resize(other.coefs.len(), F::zero());
        }
        for (a, b) in self.coefs.iter_mut().zip(other.coefs.iter()) {
            a.sub_assign(b);
        }
    }

    /// Add `coef` to the coefficient of order `order`.
    pub fn add_coef_assign(&mut self, coef: &F, order: usize) {
        if self.coefs.len() <= order {
            self.coefs.resize(order + 1, F::zero());
        }
        self.coefs[order].add_assign(coef);
    }

    /// Multiply polynomial by a constant scalar.
    pub fn mul_scalar_assign(&mut self, scalar: &F) {
        for coef in self.coefs.iter_mut() {
            coef.mul_assign(scalar)
        }
    }

    /// Multiply polynomial by a constant scalar into a new polynomial.
    pub fn mul_scalar(&self, scalar: &F) -> Self {
        let mut new = self.clone();
        new.mul_scalar_assign(scalar);
        new
    }

    /// Return `p(k X)`.
    pub fn mul_var(&self, k: &F) -> Self {
        let mut power = F::one();
        let coefs = self
            .coefs
            .iter()
            .map(|c| {
                let r = c.mul(&power);
                power.mul_assign(k);
                r
            })
            .collect();
        Self { coefs }
    }

    /// Schoolbook product of two polynomials.
    pub fn mul(&self, other: &Self) -> Self {
        if self.coefs.is_empty() || other.coefs.is_empty() {
            return Self::new(vec![]);
        }
        let mut coefs = vec![F::zero(); self.coefs.len() + other.coefs.len() - 1];
        for (i, a) in self.coefs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coefs.iter().enumerate() {
                coefs[i + j].add_assign(&a.mul(b));
            }
        }
        Self { coefs }
    }

    /// Divide by `X - root`, returning the quotient and the remainder `p(root)`.
    pub fn div_rem_linear(&self, root: &F) -> (Self, F) {
        let n = self.coefs.len();
        if n == 0 {
            return (Self::new(vec![]), F::zero());
        }
        let mut quotient = vec![F::zero(); n - 1];
        let mut carry = F::zero();
        for i in (0..n).rev() {
            let value = self.coefs[i].add(&carry.mul(root));
            if i == 0 {
                return (Self { coefs: quotient }, value);
            }
            quotient[i - 1] = value;
            carry = value;
        }
        // the loop returns at i == 0
        (Self { coefs: quotient }, carry)
    }

    /// Divide by the vanishing polynomial `X^n - 1` of a subgroup of order `n`.
    /// Fails when the division leaves a remainder.
    pub fn divide_by_vanishing(&self, n: usize) -> Result<Self> {
        let mut rem = self.coefs.clone();
        if rem.len() <= n {
            return if rem.iter().all(|c| c.is_zero()) {
                Ok(Self::zero(1))
            } else {
                Err(HonkError::DivisionByZero)
            };
        }
        let mut quotient = vec![F::zero(); rem.len() - n];
        for i in (n..rem.len()).rev() {
            let q = rem[i];
            quotient[i - n] = q;
            rem[i] = F::zero();
            rem[i - n].add_assign(&q);
        }
        if rem.iter().any(|c| !c.is_zero()) {
            return Err(HonkError::DivisionByZero);
        }
        Ok(Self { coefs: quotient })
    }

    /// Interleave a group of equally sized polynomials: `result[k * s + i] = group[i][k]`.
    pub fn interleave(group: &[&Self]) -> Result<Self> {
        let s = group.len();
        let size = group.first().map(|p| p.size()).unwrap_or(0);
        if group.iter().any(|p| p.size() != size) {
            return Err(HonkError::InvariantViolation(
                "interleaved polynomials differ in size".into(),
            ));
        }
        let mut coefs = vec![F::zero(); s * size];
        for (i, poly) in group.iter().enumerate() {
            for (k, c) in poly.coefs.iter().enumerate() {
                coefs[k * s + i] = *c;
            }
        }
        Ok(Self { coefs })
    }
}

impl<F: Domain> Polynomial<F> {
    fn subgroup_domain(n: usize) -> Result<Radix2EvaluationDomain<F::Field>> {
        match Radix2EvaluationDomain::<F::Field>::new(n) {
            Some(domain) if domain.size() == n => Ok(domain),
            _ => Err(HonkError::SetupError),
        }
    }

    /// The generator of the multiplicative subgroup of order `n`.
    pub fn subgroup_generator(n: usize) -> Result<F> {
        Ok(F::from_field(Self::subgroup_domain(n)?.group_gen()))
    }

    /// Interpolate the values `values[i] = p(g^i)` over the subgroup of order `values.len()`.
    pub fn from_subgroup_evaluations(values: &[F]) -> Result<Self> {
        let domain = Self::subgroup_domain(values.len())?;
        let evals: Vec<F::Field> = values.iter().map(|v| v.get_field()).collect();
        let coefs = domain.ifft(&evals).into_iter().map(F::from_field).collect();
        Ok(Self { coefs })
    }

    /// Evaluate on the subgroup of order `n`, `n` at least the size of the polynomial.
    pub fn subgroup_evaluations(&self, n: usize) -> Result<Vec<F>> {
        if self.coefs.len() > n {
            return Err(HonkError::DegreeError);
        }
        let domain = Self::subgroup_domain(n)?;
        let coefs: Vec<F::Field> = self.coefs.iter().map(|c| c.get_field()).collect();
        Ok(domain.fft(&coefs).into_iter().map(F::from_field).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::polynomials::polynomial::Polynomial;
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    #[test]
    fn from_zeroes() {
        let mut prng = test_rng();
        let zeroes: Vec<F> = (0..10).map(|_| F::random(&mut prng)).collect();
        let poly = Polynomial::from_zeroes(&zeroes);
        assert_eq!(poly.degree(), 10);
        for root in zeroes.iter() {
            assert_eq!(poly.eval(root), F::zero());
        }
    }

    #[test]
    fn mle_binds_the_lowest_bit_first() {
        let mut prng = test_rng();
        let poly = Polynomial::<F>::random(&mut prng, 8);
        let u: Vec<F> = (0..3).map(|_| F::random(&mut prng)).collect();

        // sum_i p[i] prod_k (bit_k(i) ? u_k : 1 - u_k)
        let mut expected = F::zero();
        for (i, c) in poly.coefs.iter().enumerate() {
            let mut basis = F::one();
            for (k, u_k) in u.iter().enumerate() {
                if (i >> k) & 1 == 1 {
                    basis.mul_assign(u_k);
                } else {
                    basis.mul_assign(&F::one().sub(u_k));
                }
            }
            expected.add_assign(&basis.mul(c));
        }
        assert_eq!(poly.evaluate_mle(&u).unwrap(), expected);

        let folded = poly
            .partially_evaluate(&u[0])
            .partially_evaluate(&u[1])
            .partially_evaluate(&u[2]);
        assert_eq!(folded.coefs, vec![expected]);

        assert!(poly.evaluate_mle(&u[..2]).is_err());
    }

    #[test]
    fn shift_divides_by_x() {
        let mut prng = test_rng();
        let poly = Polynomial::<F>::random_shiftable(&mut prng, 16);
        let shifted = poly.shifted();
        assert_eq!(shifted.size(), 16);
        assert_eq!(shifted.coefs[15], F::zero());
        let x = F::random(&mut prng);
        assert_eq!(shifted.eval(&x).mul(&x), poly.eval(&x));
    }

    #[test]
    fn linear_division() {
        let mut prng = test_rng();
        let poly = Polynomial::<F>::random(&mut prng, 12);
        let root = F::random(&mut prng);
        let (q, rem) = poly.div_rem_linear(&root);
        assert_eq!(rem, poly.eval(&root));
        let x = F::random(&mut prng);
        assert_eq!(
            q.eval(&x).mul(&x.sub(&root)).add(&rem),
            poly.eval(&x)
        );
    }

    #[test]
    fn subgroup_interpolation_and_vanishing_division() {
        let mut prng = test_rng();
        let values: Vec<F> = (0..16).map(|_| F::random(&mut prng)).collect();
        let poly = Polynomial::from_subgroup_evaluations(&values).unwrap();
        let g = Polynomial::<F>::subgroup_generator(16).unwrap();
        let mut point = F::one();
        for v in values.iter() {
            assert_eq!(poly.eval(&point), *v);
            point.mul_assign(&g);
        }
        assert_eq!(poly.subgroup_evaluations(16).unwrap(), values);

        let mut z_h = Polynomial::zero(17);
        z_h.coefs[0] = F::one().neg();
        z_h.coefs[16] = F::one();
        let multiple = poly.mul(&z_h);
        assert_eq!(multiple.divide_by_vanishing(16).unwrap(), poly);
        assert!(poly.divide_by_vanishing(8).is_err());
    }

    #[test]
    fn interleaving() {
        let a = Polynomial::new(vec![F::from(1u32), F::from(2u32)]);
        let b = Polynomial::new(vec![F::from(3u32), F::from(4u32)]);
        let p = Polynomial::interleave(&[&a, &b]).unwrap();
        assert_eq!(
            p.coefs,
            vec![F::from(1u32), F::from(3u32), F::from(2u32), F::from(4u32)]
        );
        let x = F::from(5u32);
        let x_sq = x.mul(&x);
        assert_eq!(p.eval(&x), a.eval(&x_sq).add(&x.mul(&b.eval(&x_sq))));
    }
}
