use crate::errors::{HonkError, Result};
use crate::flavor::ProverPolynomials;
use crate::relations::{LogDerivLookupRelation, PermutationRelation, RelationParameters};
use ark_std::{end_timer, start_timer};
use honk_algebra::prelude::*;

/// Fill `lookup_inverses` with `1 / (read * write)` on every row that is a lookup gate
/// or a read table entry, and zero elsewhere.
///
/// The shifted wires must be up to date, as lookup gates read them.
pub fn compute_logderivative_inverses<F: Scalar>(
    polynomials: &mut ProverPolynomials<F>,
    params: &RelationParameters<F>,
) -> Result<()> {
    let inverses_time = start_timer!(|| "Log-derivative inverses");
    let n = polynomials.circuit_size();
    let mut inverses = vec![F::zero(); n];
    for (i, inverse) in inverses.iter_mut().enumerate() {
        if polynomials.q_lookup.coefs[i].is_zero() && polynomials.lookup_read_tags.coefs[i].is_zero()
        {
            continue;
        }
        let row = polynomials.row(i);
        let read = LogDerivLookupRelation::compute_read_term(&row, params);
        let write = LogDerivLookupRelation::compute_write_term(&row, params);
        *inverse = read.mul(&write);
        if inverse.is_zero() {
            return Err(HonkError::DivisionByZero);
        }
    }
    batch_inversion(&mut inverses);
    polynomials.lookup_inverses.coefs = inverses;
    end_timer!(inverses_time);
    Ok(())
}

/// Fill `z_perm` with the permutation grand product and refresh its shift.
///
/// `z_perm[0] = 0` so that it can be shifted; the `lagrange_first` term of the relation
/// stands in for the initial one. For `i >= 1`,
/// `z_perm[i] = prod_{j < i} numerator_j / denominator_j`.
pub fn compute_grand_product<F: Scalar>(
    polynomials: &mut ProverPolynomials<F>,
    params: &RelationParameters<F>,
) -> Result<()> {
    let grand_product_time = start_timer!(|| "Permutation grand product");
    let n = polynomials.circuit_size();
    let mut numerators = Vec::with_capacity(n);
    let mut denominators = Vec::with_capacity(n);
    for i in 0..n.saturating_sub(1) {
        let row = polynomials.row(i);
        numerators.push(PermutationRelation::compute_grand_product_numerator(&row, params));
        denominators.push(PermutationRelation::compute_grand_product_denominator(&row, params));
    }
    if denominators.iter().any(|d| d.is_zero()) {
        return Err(HonkError::DivisionByZero);
    }
    batch_inversion(&mut denominators);

    let mut z_perm = vec![F::zero(); n];
    let mut running = F::one();
    for (i, (numerator, denominator_inv)) in numerators.iter().zip(denominators.iter()).enumerate() {
        running.mul_assign(&numerator.mul(denominator_inv));
        z_perm[i + 1] = running;
    }
    polynomials.z_perm.coefs = z_perm;
    polynomials.z_perm_shift = polynomials.z_perm.shifted();
    end_timer!(grand_product_time);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::honk::{tests::ultra_circuit, witness::*};
    use crate::relations::{check_circuit_relations, RelationParameters, UltraRelations};
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    fn random_params() -> RelationParameters<F> {
        let mut prng = test_rng();
        RelationParameters {
            eta: F::random(&mut prng),
            eta_two: F::random(&mut prng),
            eta_three: F::random(&mut prng),
            beta: F::random(&mut prng),
            gamma: F::random(&mut prng),
            public_input_delta: F::one(),
        }
    }

    #[test]
    fn witness_completion_satisfies_the_relations() {
        let params = random_params();
        let mut polys = ultra_circuit();
        compute_logderivative_inverses(&mut polys, &params).unwrap();
        compute_grand_product(&mut polys, &params).unwrap();
        assert!(polys.z_perm.coefs[0].is_zero());
        check_circuit_relations::<F, UltraRelations>(&polys, &params).unwrap();
    }

    #[test]
    fn broken_copy_constraint_breaks_the_grand_product() {
        let params = random_params();
        let mut polys = ultra_circuit();
        // w_l[2] is wired to w_o[1]; change both sides of the gate consistently
        polys.w_l.coefs[2] = F::from(3u32);
        polys.w_o.coefs[2] = F::from(6u32);
        polys.set_shifted();
        compute_logderivative_inverses(&mut polys, &params).unwrap();
        compute_grand_product(&mut polys, &params).unwrap();
        assert!(check_circuit_relations::<F, UltraRelations>(&polys, &params).is_err());
    }

    #[test]
    fn unmatched_lookup_breaks_the_sum() {
        let params = random_params();
        let mut polys = ultra_circuit();
        polys.w_o.coefs[3] = F::from(16u32);
        polys.set_shifted();
        compute_logderivative_inverses(&mut polys, &params).unwrap();
        compute_grand_product(&mut polys, &params).unwrap();
        assert!(check_circuit_relations::<F, UltraRelations>(&polys, &params).is_err());
    }
}
