use honk_algebra::prelude::*;

/// The gate separator polynomial `pow_beta(X) = prod_i (1 - X_i + X_i beta_i)`.
///
/// Multiplying the relations by it turns "every row satisfies the relations" into a
/// single sum over the hypercube. During sumcheck it is evaluated lazily: rounds that
/// are already bound contribute `partial_evaluation_result`, the current round
/// contributes the linear factor in `X_i`, and the remaining variables are read from
/// `beta_products` by edge index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateSeparatorPolynomial<F> {
    /// The gate challenges, one per variable.
    pub betas: Vec<F>,
    /// `beta_products[k] = prod_{i in bits(k)} beta_i` over the full hypercube.
    pub beta_products: Vec<F>,
    /// The index of the variable bound in the current round.
    pub current_element_idx: usize,
    /// Stride of `beta_products` between consecutive edges of the current round.
    pub periodicity: usize,
    /// The product of the linear factors of the rounds already bound.
    pub partial_evaluation_result: F,
}

impl<F: Scalar> GateSeparatorPolynomial<F> {
    /// Build the prover's view, with the products over `2^log_num_monomials` rows.
    pub fn new(betas: Vec<F>, log_num_monomials: usize) -> Self {
        let beta_products = Self::compute_beta_products(&betas, log_num_monomials);
        Self {
            betas,
            beta_products,
            current_element_idx: 0,
            periodicity: 2,
            partial_evaluation_result: F::one(),
        }
    }

    /// Build the verifier's view, which never reads `beta_products`.
    pub fn new_without_products(betas: Vec<F>) -> Self {
        Self {
            betas,
            beta_products: vec![],
            current_element_idx: 0,
            periodicity: 2,
            partial_evaluation_result: F::one(),
        }
    }

    /// The gate challenge of the current round.
    pub fn current_element(&self) -> F {
        self.betas[self.current_element_idx]
    }

    /// `1 + challenge (beta_i - 1)`, the current linear factor at `challenge`.
    pub fn univariate_eval(&self, challenge: &F) -> F {
        F::one().add(&challenge.mul(&self.current_element().sub(&F::one())))
    }

    /// The contribution of the unbound variables to the edge starting at row `edge_idx`.
    pub fn at(&self, edge_idx: usize) -> F {
        self.beta_products[(edge_idx >> 1) * self.periodicity]
    }

    /// Bind the current variable to `challenge` and move to the next round.
    pub fn partially_evaluate(&mut self, challenge: &F) {
        let factor = self.univariate_eval(challenge);
        self.partial_evaluation_result.mul_assign(&factor);
        self.current_element_idx += 1;
        self.periodicity *= 2;
    }

    fn compute_beta_products(betas: &[F], log_num_monomials: usize) -> Vec<F> {
        let n = 1usize << log_num_monomials;
        let mut products = Vec::with_capacity(n);
        products.push(F::one());
        for k in 1..n {
            // drop the lowest set bit
            let prev = products[k & (k - 1)];
            products.push(prev.mul(&betas[k.trailing_zeros() as usize]));
        }
        products
    }
}
