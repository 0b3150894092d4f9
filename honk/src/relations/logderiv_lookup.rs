use crate::flavor::AllEntities;
use crate::relations::{Relation, RelationParameters, RelationValue};
use honk_algebra::prelude::*;

/// The log-derivative lookup argument.
///
/// A lookup gate reads the tuple
/// `(w_l + q_r w_l_shift, w_r + q_m w_r_shift, w_o + q_c w_o_shift, q_o)` and the
/// table columns hold the admissible tuples. With the inverse column
/// `I = 1 / (read * write)` on rows that read or are read, the argument is the sum
/// `sum_rows q_lookup / read - read_counts / write = 0`.
pub struct LogDerivLookupRelation;

impl LogDerivLookupRelation {
    /// Whether row `i` needs an inverse: it is a lookup gate or a table entry that is read.
    pub fn compute_inverse_exists<F: Scalar, E: RelationValue<F>>(row: &AllEntities<E>) -> E {
        let q = row.q_lookup.clone();
        let tags = row.lookup_read_tags.clone();
        q.clone() + &tags - &(q * &tags)
    }

    /// The batched tuple a lookup gate reads.
    pub fn compute_read_term<F: Scalar, E: RelationValue<F>>(
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
    ) -> E {
        let first = row.w_l.clone() + &(row.q_r.clone() * &row.w_l_shift);
        let second = row.w_r.clone() + &(row.q_m.clone() * &row.w_r_shift);
        let third = row.w_o.clone() + &(row.q_c.clone() * &row.w_o_shift);

        first.add_scalar(&params.gamma)
            + &second.mul_scalar(&params.eta)
            + &third.mul_scalar(&params.eta_two)
            + &row.q_o.clone().mul_scalar(&params.eta_three)
    }

    /// The batched table entry of the row.
    pub fn compute_write_term<F: Scalar, E: RelationValue<F>>(
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
    ) -> E {
        row.table_1.clone().add_scalar(&params.gamma)
            + &row.table_2.clone().mul_scalar(&params.eta)
            + &row.table_3.clone().mul_scalar(&params.eta_two)
            + &row.table_4.clone().mul_scalar(&params.eta_three)
    }
}

impl<F: Scalar> Relation<F> for LogDerivLookupRelation {
    const NAME: &'static str = "LogDerivLookup";
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize] = &[5, 5, 3];
    const SUBRELATION_LINEARLY_INDEPENDENT: &'static [bool] = &[true, false, true];

    fn skip<E: RelationValue<F>>(row: &AllEntities<E>) -> bool {
        row.q_lookup.is_zero()
            && row.lookup_read_counts.is_zero()
            && row.lookup_read_tags.is_zero()
            && row.lookup_inverses.is_zero()
    }

    fn accumulate<E: RelationValue<F>>(
        evals: &mut [E],
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
        scaling_factor: &F,
    ) {
        let inverses = row.lookup_inverses.clone();
        let read_term = Self::compute_read_term(row, params);
        let write_term = Self::compute_write_term(row, params);
        let inverse_exists = Self::compute_inverse_exists::<F, E>(row);

        // I is the inverse of read * write wherever an inverse exists
        let tmp = read_term.clone() * &write_term * &inverses - &inverse_exists;
        evals[0] += &tmp.mul_scalar(scaling_factor);

        // I * write = 1 / read and I * read = 1 / write
        let read_inverse = inverses.clone() * &write_term;
        let write_inverse = inverses * &read_term;
        let tmp = row.q_lookup.clone() * &read_inverse
            - &(row.lookup_read_counts.clone() * &write_inverse);
        evals[1] += &tmp;

        let tags = row.lookup_read_tags.clone();
        let tmp = tags.clone() * &tags - &tags;
        evals[2] += &tmp.mul_scalar(scaling_factor);
    }
}
