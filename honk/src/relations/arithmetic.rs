use crate::flavor::AllEntities;
use crate::relations::{Relation, RelationParameters, RelationValue};
use honk_algebra::prelude::*;

/// The arithmetic gate.
///
/// With `q_arith = 1` a row enforces
/// `q_m w_l w_r + q_l w_l + q_r w_r + q_o w_o + q_4 w_4 + q_c = 0`. Larger values of
/// `q_arith` switch on the extra terms that link a row to the next one:
/// `q_arith = 2` adds `w_4_shift`, and `q_arith = 3` additionally enables the second
/// subrelation `w_l + w_4 - w_l_shift + q_m = 0`.
pub struct ArithmeticRelation;

impl<F: Scalar> Relation<F> for ArithmeticRelation {
    const NAME: &'static str = "Arithmetic";
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize] = &[6, 5];
    const SUBRELATION_LINEARLY_INDEPENDENT: &'static [bool] = &[true, true];

    fn skip<E: RelationValue<F>>(row: &AllEntities<E>) -> bool {
        row.q_arith.is_zero()
    }

    fn accumulate<E: RelationValue<F>>(
        evals: &mut [E],
        row: &AllEntities<E>,
        _params: &RelationParameters<F>,
        scaling_factor: &F,
    ) {
        // safe unwrap
        let neg_half = F::from(2u32).inv().unwrap().neg();
        let q_arith = row.q_arith.clone();

        let mut tmp = q_arith.clone().add_scalar(&F::from(3u32).neg()) * &row.q_m;
        tmp = tmp * &row.w_r * &row.w_l;
        tmp = tmp.mul_scalar(&neg_half);
        tmp += &(row.q_l.clone() * &row.w_l);
        tmp += &(row.q_r.clone() * &row.w_r);
        tmp += &(row.q_o.clone() * &row.w_o);
        tmp += &(row.q_4.clone() * &row.w_4);
        tmp += &row.q_c;
        tmp += &(q_arith.clone().add_scalar(&F::one().neg()) * &row.w_4_shift);
        tmp = tmp * &q_arith;
        evals[0] += &tmp.mul_scalar(scaling_factor);

        let mut tmp = row.w_l.clone() + &row.w_4 - &row.w_l_shift + &row.q_m;
        tmp = tmp * &q_arith.clone().add_scalar(&F::from(2u32).neg());
        tmp = tmp * &q_arith.clone().add_scalar(&F::one().neg());
        tmp = tmp * &q_arith;
        evals[1] += &tmp.mul_scalar(scaling_factor);
    }
}

#[cfg(test)]
mod tests {
    use crate::flavor::AllEntities;
    use crate::relations::{ArithmeticRelation, Relation, RelationParameters};
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    #[test]
    fn linked_rows() {
        let mut row = AllEntities::<F>::default();
        // q_arith = 3 switches on w_l + w_4 - w_l_shift + q_m = 0 and doubles the
        // w_4_shift term of the main gate
        row.q_arith = F::from(3u32);
        row.w_l = F::from(5u32);
        row.w_4 = F::from(7u32);
        row.w_l_shift = F::from(12u32);
        row.q_l = F::one();
        row.w_4_shift = F::from(5u32).neg().mul(&F::from(2u32).inv().unwrap());

        let mut evals = vec![F::zero(); 2];
        ArithmeticRelation::accumulate(&mut evals, &row, &RelationParameters::default(), &F::one());
        assert_eq!(evals, vec![F::zero(), F::zero()]);

        row.w_l_shift = F::from(11u32);
        let mut evals = vec![F::zero(); 2];
        ArithmeticRelation::accumulate(&mut evals, &row, &RelationParameters::default(), &F::one());
        assert!(!evals[1].is_zero());
        assert!(!<ArithmeticRelation as Relation<F>>::skip(&row));
        assert!(<ArithmeticRelation as Relation<F>>::skip(&AllEntities::<F>::default()));
    }
}
