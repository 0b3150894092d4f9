use crate::flavor::AllEntities;
use crate::relations::{Relation, RelationParameters, RelationValue};
use honk_algebra::prelude::*;

/// Sorted-range steps: consecutive wire values may differ by 0, 1, 2 or 3.
///
/// The four differences are `w_r - w_l`, `w_o - w_r`, `w_4 - w_o` and `w_l_shift - w_4`.
pub struct DeltaRangeConstraintRelation;

impl<F: Scalar> Relation<F> for DeltaRangeConstraintRelation {
    const NAME: &'static str = "DeltaRangeConstraint";
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize] = &[6, 6, 6, 6];
    const SUBRELATION_LINEARLY_INDEPENDENT: &'static [bool] = &[true, true, true, true];

    fn skip<E: RelationValue<F>>(row: &AllEntities<E>) -> bool {
        row.q_delta_range.is_zero()
    }

    fn accumulate<E: RelationValue<F>>(
        evals: &mut [E],
        row: &AllEntities<E>,
        _params: &RelationParameters<F>,
        scaling_factor: &F,
    ) {
        let minus_one = F::one().neg();
        let minus_two = F::from(2u32).neg();
        let minus_three = F::from(3u32).neg();
        let selector = row.q_delta_range.clone().mul_scalar(scaling_factor);

        let deltas = [
            row.w_r.clone() - &row.w_l,
            row.w_o.clone() - &row.w_r,
            row.w_4.clone() - &row.w_o,
            row.w_l_shift.clone() - &row.w_4,
        ];

        for (eval, delta) in evals.iter_mut().zip(deltas.into_iter()) {
            let tmp = delta.clone()
                * &delta.clone().add_scalar(&minus_one)
                * &delta.clone().add_scalar(&minus_two)
                * &delta.add_scalar(&minus_three);
            *eval += &(tmp * &selector);
        }
    }
}
