use crate::errors::{HonkError, Result};
use crate::flavor::{AllEntities, ProverPolynomials};
use crate::polynomials::univariate::Univariate;
use honk_algebra::prelude::*;

/// Module for the arithmetic gate relation.
pub mod arithmetic;

/// Module for the delta range constraint relation.
pub mod delta_range;

/// Module for the log-derivative lookup relation.
pub mod logderiv_lookup;

/// Module for the copy-constraint (permutation) relation.
pub mod permutation;

pub use arithmetic::ArithmeticRelation;
pub use delta_range::DeltaRangeConstraintRelation;
pub use logderiv_lookup::LogDerivLookupRelation;
pub use permutation::PermutationRelation;

/// The value type a relation is evaluated over.
///
/// The prover evaluates relations on univariates (one per hypercube edge, so the
/// relation arithmetic directly produces the round polynomial), the verifier on plain
/// field elements at the sumcheck challenge point.
pub trait RelationValue<F: Scalar>:
    Clone
    + Sized
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + for<'a> Add<&'a Self, Output = Self>
    + for<'a> Sub<&'a Self, Output = Self>
    + for<'a> Mul<&'a Self, Output = Self>
    + for<'a> AddAssign<&'a Self>
{
    /// Add a field constant.
    fn add_scalar(self, scalar: &F) -> Self;

    /// Multiply by a field constant.
    fn mul_scalar(self, scalar: &F) -> Self;

    /// Whether the value is identically zero.
    fn is_zero(&self) -> bool;
}

impl<F: Scalar> RelationValue<F> for F {
    #[inline]
    fn add_scalar(self, scalar: &F) -> Self {
        self.add(scalar)
    }

    #[inline]
    fn mul_scalar(self, scalar: &F) -> Self {
        self.mul(scalar)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        Zero::is_zero(self)
    }
}

impl<F: Scalar> RelationValue<F> for Univariate<F> {
    #[inline]
    fn add_scalar(self, scalar: &F) -> Self {
        Univariate::add_scalar(self, scalar)
    }

    #[inline]
    fn mul_scalar(self, scalar: &F) -> Self {
        Univariate::mul_scalar(self, scalar)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        Univariate::is_zero(self)
    }
}

/// Fiat-Shamir derived scalars shared by every relation evaluation of one proof.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationParameters<F> {
    /// Lookup column batching challenge.
    pub eta: F,
    /// `eta^2` in spirit; drawn independently.
    pub eta_two: F,
    /// `eta^3` in spirit; drawn independently.
    pub eta_three: F,
    /// Permutation and lookup challenge.
    pub beta: F,
    /// Permutation and lookup challenge.
    pub gamma: F,
    /// The public input correction to the permutation grand product.
    pub public_input_delta: F,
}

/// A polynomial identity made of subrelations that must vanish on every valid row.
pub trait Relation<F: Scalar> {
    /// The name used in debug reports.
    const NAME: &'static str;

    /// One more than the degree of each subrelation.
    const SUBRELATION_PARTIAL_LENGTHS: &'static [usize];

    /// Whether each subrelation must hold row by row. Linearly dependent subrelations
    /// only need to vanish summed over the hypercube and skip the gate separator.
    const SUBRELATION_LINEARLY_INDEPENDENT: &'static [bool];

    /// Returns true when every subrelation is trivially zero on `row`.
    fn skip<E: RelationValue<F>>(_row: &AllEntities<E>) -> bool {
        false
    }

    /// Add the contribution of `row`, scaled by `scaling_factor`, into `evals`, one
    /// accumulator per subrelation.
    fn accumulate<E: RelationValue<F>>(
        evals: &mut [E],
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
        scaling_factor: &F,
    );
}

/// An ordered pack of relations, resolved at compile time.
pub trait RelationSet<F: Scalar> {
    /// The total number of subrelations.
    const NUM_SUBRELATIONS: usize;

    /// The largest subrelation partial length.
    const MAX_PARTIAL_RELATION_LENGTH: usize;

    /// Per-subrelation partial lengths, in pack order.
    fn subrelation_partial_lengths() -> Vec<usize>;

    /// Per-subrelation independence flags, in pack order.
    fn subrelation_linearly_independent() -> Vec<bool>;

    /// Accumulate every relation of the pack into `evals`. With `check_skip`, relations
    /// whose `skip` predicate holds on `row` are left out.
    fn accumulate_relation_evaluations<E: RelationValue<F>>(
        evals: &mut [E],
        row: &AllEntities<E>,
        params: &RelationParameters<F>,
        scaling_factor: &F,
        check_skip: bool,
    );

    /// Name and subrelation index of every relation of the pack, in pack order.
    fn relation_names() -> Vec<(&'static str, usize)>;
}

const fn max_len(acc: usize, lengths: &[usize]) -> usize {
    let mut max = acc;
    let mut i = 0;
    while i < lengths.len() {
        if lengths[i] > max {
            max = lengths[i];
        }
        i += 1;
    }
    max
}

macro_rules! impl_relation_set {
    ($($r:ident),+) => {
        impl<F: Scalar, $($r: Relation<F>),+> RelationSet<F> for ($($r,)+) {
            const NUM_SUBRELATIONS: usize =
                0 $(+ <$r as Relation<F>>::SUBRELATION_PARTIAL_LENGTHS.len())+;

            const MAX_PARTIAL_RELATION_LENGTH: usize = {
                let max = 0;
                $(let max = max_len(max, <$r as Relation<F>>::SUBRELATION_PARTIAL_LENGTHS);)+
                max
            };

            fn subrelation_partial_lengths() -> Vec<usize> {
                let mut lengths = vec![];
                $(lengths.extend_from_slice(<$r as Relation<F>>::SUBRELATION_PARTIAL_LENGTHS);)+
                lengths
            }

            fn subrelation_linearly_independent() -> Vec<bool> {
                let mut flags = vec![];
                $(flags.extend_from_slice(<$r as Relation<F>>::SUBRELATION_LINEARLY_INDEPENDENT);)+
                flags
            }

            fn accumulate_relation_evaluations<E: RelationValue<F>>(
                evals: &mut [E],
                row: &AllEntities<E>,
                params: &RelationParameters<F>,
                scaling_factor: &F,
                check_skip: bool,
            ) {
                let mut offset = 0;
                $(
                    let len = <$r as Relation<F>>::SUBRELATION_PARTIAL_LENGTHS.len();
                    if !(check_skip && <$r as Relation<F>>::skip(row)) {
                        <$r as Relation<F>>::accumulate(
                            &mut evals[offset..offset + len],
                            row,
                            params,
                            scaling_factor,
                        );
                    }
                    offset += len;
                )+
                debug_assert_eq!(offset, evals.len());
            }

            fn relation_names() -> Vec<(&'static str, usize)> {
                let mut names = vec![];
                $(
                    for i in 0..<$r as Relation<F>>::SUBRELATION_PARTIAL_LENGTHS.len() {
                        names.push((<$r as Relation<F>>::NAME, i));
                    }
                )+
                names
            }
        }
    };
}

impl_relation_set!(R0);
impl_relation_set!(R0, R1);
impl_relation_set!(R0, R1, R2);
impl_relation_set!(R0, R1, R2, R3);
impl_relation_set!(R0, R1, R2, R3, R4);

/// The relations of the Ultra flavors.
pub type UltraRelations = (
    ArithmeticRelation,
    PermutationRelation,
    LogDerivLookupRelation,
    DeltaRangeConstraintRelation,
);

/// The separators `alpha, alpha^2, ...` of the subrelations after the first.
pub fn compute_subrelation_separators<F: Scalar>(alpha: &F, num_subrelations: usize) -> Vec<F> {
    let mut separators = powers(alpha, num_subrelations);
    separators.remove(0);
    separators
}

/// `evals[0] + sum_{k > 0} separators[k - 1] * evals[k]`.
pub fn scale_and_batch_subrelations<F: Scalar>(evals: &[F], separators: &[F]) -> F {
    let mut result = evals.first().copied().unwrap_or_else(F::zero);
    for (e, a) in evals.iter().skip(1).zip(separators.iter()) {
        result.add_assign(&e.mul(a));
    }
    result
}

/// Evaluate every subrelation on every row of `polynomials`.
///
/// Linearly independent subrelations must vanish row by row; the others only summed
/// over all rows. The first failure is reported with its relation, subrelation and row.
pub fn check_circuit_relations<F: Scalar, R: RelationSet<F>>(
    polynomials: &ProverPolynomials<F>,
    params: &RelationParameters<F>,
) -> Result<()> {
    let independent = R::subrelation_linearly_independent();
    let names = R::relation_names();
    let mut dependent_sums = vec![F::zero(); R::NUM_SUBRELATIONS];
    for i in 0..polynomials.circuit_size() {
        let row = polynomials.row(i);
        let mut evals = vec![F::zero(); R::NUM_SUBRELATIONS];
        R::accumulate_relation_evaluations(&mut evals, &row, params, &F::one(), false);
        for (k, eval) in evals.iter().enumerate() {
            if independent[k] {
                if !Zero::is_zero(eval) {
                    return Err(HonkError::InvariantViolation(format!(
                        "{} subrelation {} fails at row {}",
                        names[k].0, names[k].1, i
                    )));
                }
            } else {
                dependent_sums[k].add_assign(eval);
            }
        }
    }
    for (k, sum) in dependent_sums.iter().enumerate() {
        if !Zero::is_zero(sum) {
            return Err(HonkError::InvariantViolation(format!(
                "{} subrelation {} does not sum to zero",
                names[k].0, names[k].1
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::errors::HonkError;
    use crate::flavor::{AllEntities, ProverPolynomials};
    use crate::polynomials::Polynomial;
    use crate::relations::*;
    use honk_algebra::{bn254::BN254Scalar, prelude::*};

    type F = BN254Scalar;

    /// The four-row arithmetic circuit `1 + 1 = 2` and `2 * 2 = 4`, with trivial
    /// copy constraints and no lookups.
    pub(crate) fn arithmetic_circuit() -> ProverPolynomials<F> {
        let col = |v: [i64; 4]| {
            Polynomial::new(
                v.iter()
                    .map(|x| {
                        if *x < 0 {
                            F::from((-*x) as u64).neg()
                        } else {
                            F::from(*x as u64)
                        }
                    })
                    .collect(),
            )
        };
        let mut polys = AllEntities::<Polynomial<F>>::default();
        polys.iter_mut().for_each(|p| *p = Polynomial::zero(4));
        polys.w_l = col([0, 1, 2, 0]);
        polys.w_r = col([0, 1, 2, 0]);
        polys.w_o = col([0, 2, 4, 0]);
        polys.q_m = col([0, 0, 1, 0]);
        polys.q_l = col([0, 1, 0, 0]);
        polys.q_r = col([0, 1, 0, 0]);
        polys.q_o = col([0, -1, -1, 0]);
        polys.q_arith = col([0, 1, 1, 0]);
        polys.lagrange_first = col([1, 0, 0, 0]);
        polys.lagrange_last = col([0, 0, 0, 1]);
        polys.set_shifted();
        polys
    }

    #[test]
    fn pack_constants() {
        assert_eq!(<UltraRelations as RelationSet<F>>::NUM_SUBRELATIONS, 11);
        assert_eq!(<UltraRelations as RelationSet<F>>::MAX_PARTIAL_RELATION_LENGTH, 6);
        let lengths = <UltraRelations as RelationSet<F>>::subrelation_partial_lengths();
        assert_eq!(lengths, vec![6, 5, 6, 3, 5, 5, 3, 6, 6, 6, 6]);
        let independent = <UltraRelations as RelationSet<F>>::subrelation_linearly_independent();
        assert_eq!(independent.iter().filter(|b| !**b).count(), 1);
        assert!(!independent[5]);
    }

    #[test]
    fn arithmetic_rows_vanish() {
        let polys = arithmetic_circuit();
        let params = RelationParameters::<F>::default();
        for i in 0..4 {
            let row = polys.row(i);
            let mut evals = vec![F::zero(); 2];
            ArithmeticRelation::accumulate(&mut evals, &row, &params, &F::one());
            assert!(evals.iter().all(|e| Zero::is_zero(e)), "row {}", i);
        }

        let mut bad = polys;
        bad.w_l.coefs[1] = F::zero();
        let row = bad.row(1);
        let mut evals = vec![F::zero(); 2];
        ArithmeticRelation::accumulate(&mut evals, &row, &params, &F::one());
        assert_eq!(evals[0], F::one().neg());
    }

    #[test]
    fn separators_batch() {
        let alpha = F::from(3u32);
        let separators = compute_subrelation_separators(&alpha, 3);
        assert_eq!(separators, vec![F::from(3u32), F::from(9u32)]);
        let evals = [F::from(1u32), F::from(1u32), F::from(2u32)];
        assert_eq!(
            scale_and_batch_subrelations(&evals, &separators),
            F::from(22u32)
        );
    }

    #[test]
    fn circuit_check_reports_the_failing_row() {
        let params = RelationParameters::<F>::default();
        let polys = arithmetic_circuit();
        assert!(check_circuit_relations::<F, UltraRelations>(&polys, &params).is_ok());

        let mut bad = polys;
        bad.w_o.coefs[2] = F::from(5u32);
        let err = check_circuit_relations::<F, UltraRelations>(&bad, &params).unwrap_err();
        assert_eq!(
            err,
            HonkError::InvariantViolation("Arithmetic subrelation 0 fails at row 2".into())
        );
    }
}
