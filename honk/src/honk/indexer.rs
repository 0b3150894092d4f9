use crate::errors::{HonkError, Result};
use crate::flavor::{Flavor, ProverPolynomials, NUM_PRECOMPUTED_ENTITIES};
use crate::poly_commit::pcs::PolyComScheme;
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// Honk prover parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvingKey<F> {
    /// The number of rows, a power of two.
    pub circuit_size: usize,
    /// `log2(circuit_size)`.
    pub log_circuit_size: usize,
    /// The precomputed polynomials and the wires. The lookup inverses and the
    /// grand product are filled in by the prover.
    pub polynomials: ProverPolynomials<F>,
}

/// Honk verifier parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKey<C> {
    /// The number of rows.
    pub circuit_size: u64,
    /// `log2(circuit_size)`.
    pub log_circuit_size: usize,
    /// The commitments of the precomputed polynomials, in entity order.
    pub precomputed_commitments: Vec<C>,
}

/// Prover parameters over a particular flavor.
pub type HonkPK<FL> = ProvingKey<<FL as Flavor>::FF>;

/// Verifier parameters over a particular flavor.
pub type HonkVK<FL> = VerificationKey<<FL as Flavor>::Commitment>;

impl<F> ProvingKey<F> {
    /// The circuit size as written into the proof.
    pub fn circuit_size_u64(&self) -> u64 {
        self.circuit_size as u64
    }
}

/// Run the Honk indexer: check the shape of the circuit and commit to its
/// precomputed polynomials.
///
/// The circuit must have at least two rows, a power of two of them.
pub fn indexer<FL: Flavor>(
    mut polynomials: ProverPolynomials<FL::FF>,
    pcs: &FL::PCS,
) -> Result<(HonkPK<FL>, HonkVK<FL>)> {
    let indexer_time = start_timer!(|| "Honk::Indexer");
    let circuit_size = polynomials.circuit_size();
    if circuit_size < 2 || !circuit_size.is_power_of_two() {
        return Err(HonkError::InvariantViolation(format!(
            "circuit size {} is not a power of two of at least 2",
            circuit_size
        )));
    }
    polynomials.set_shifted();
    for (label, poly) in ProverPolynomials::<FL::FF>::labels()
        .into_iter()
        .zip(polynomials.iter())
    {
        if poly.size() != circuit_size {
            return Err(HonkError::InvariantViolation(format!(
                "{} has size {}, expected {}",
                label,
                poly.size(),
                circuit_size
            )));
        }
    }
    for poly in polynomials.get_to_be_shifted() {
        if !poly.coefs[0].is_zero() {
            return Err(HonkError::InvariantViolation(
                "shifted wires must vanish at row 0".into(),
            ));
        }
    }

    let precomputed_commitments = polynomials
        .get_precomputed()
        .into_iter()
        .map(|p| pcs.commit(p))
        .collect::<Result<Vec<_>>>()?;
    debug_assert_eq!(precomputed_commitments.len(), NUM_PRECOMPUTED_ENTITIES);

    let log_circuit_size = circuit_size.trailing_zeros() as usize;
    end_timer!(indexer_time);
    Ok((
        ProvingKey {
            circuit_size,
            log_circuit_size,
            polynomials,
        },
        VerificationKey {
            circuit_size: circuit_size as u64,
            log_circuit_size,
            precomputed_commitments,
        },
    ))
}
