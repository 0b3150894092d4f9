use crate::flavor::AllEntities;
use crate::relations::{Relation, RelationParameters, RelationValue};
use honk_algebra::prelude::*;

/// The copy-constraint relation over the grand product `z_perm`.
///
/// Row by row, `(z_perm + L_first) * prod_k (w_k + beta id_k + gamma)` must equal
/// `(z_perm_shift + L_last delta) * prod_k (w_k + beta sigma_k + gamma)`, and the
/// grand product must end in zero past the last row.
pub struct PermutationRelation;

impl PermutationRelation {
    /// `prod_k (w_k + beta id_k + gamma)`.
    pub fn compute_grand_product_numerator<F: Scalar, E: RelationValue<F>>(
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
    ) -> E {
        let term = |w: &E, id: &E| w.clone() + &id.clone().mul_scalar(&params.beta).add_scalar(&params.gamma);
        term(&row.w_l, &row.id_1)
            * &term(&row.w_r, &row.id_2)
            * &term(&row.w_o, &row.id_3)
            * &term(&row.w_4, &row.id_4)
    }

    /// `prod_k (w_k + beta sigma_k + gamma)`.
    pub fn compute_grand_product_denominator<F: Scalar, E: RelationValue<F>>(
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
    ) -> E {
        let term = |w: &E, sigma: &E| {
            w.clone() + &sigma.clone().mul_scalar(&params.beta).add_scalar(&params.gamma)
        };
        term(&row.w_l, &row.sigma_1)
            * &term(&row.w_r, &row.sigma_2)
            * &term(&row.w_o, &row.sigma_3)
            * &term(&row.w_4, &row.sigma_4)
    }
}

impl<F: Scalar> Relation<F> for PermutationRelation {
    const NAME: &'static str = "Permutation";
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize] = &[6, 3];
    const SUBRELATION_LINEARLY_INDEPENDENT: &'static [bool] = &[true, true];

    fn accumulate<E: RelationValue<F>>(
        evals: &mut [E],
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
        scaling_factor: &F,
    ) {
        let numerator = Self::compute_grand_product_numerator(row, params);
        let denominator = Self::compute_grand_product_denominator(row, params);

        let lhs = (row.z_perm.clone() + &row.lagrange_first) * &numerator;
        let rhs = (row.z_perm_shift.clone()
            + &row.lagrange_last.clone().mul_scalar(&params.public_input_delta))
            * &denominator;
        evals[0] += &(lhs - &rhs).mul_scalar(scaling_factor);

        let tmp = row.lagrange_last.clone() * &row.z_perm_shift;
        evals[1] += &tmp.mul_scalar(scaling_factor);
    }
}
