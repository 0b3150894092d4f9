/// Module for the gate separator ("pow") polynomial.
pub mod gate_separator;

/// Module for dense polynomials in coefficient or hypercube-evaluation form.
pub mod polynomial;

/// Module for univariates in evaluation form.
pub mod univariate;

pub use gate_separator::GateSeparatorPolynomial;
pub use polynomial::Polynomial;
pub use univariate::Univariate;
