use crate::flavor::{AllEntities, Flavor, ProverPolynomials};
use crate::polynomials::{GateSeparatorPolynomial, Univariate};
use crate::relations::{scale_and_batch_subrelations, RelationParameters, RelationSet};
use honk_algebra::prelude::*;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The prover's work for one sumcheck round.
///
/// Every edge `(2j, 2j + 1)` of the current table is lifted to univariates of the
/// maximal relation length, the relations are accumulated on them, and the per-subrelation
/// sums are batched into the round univariate.
pub struct SumcheckProverRound<FL: Flavor> {
    /// The number of rows of the table this round reads.
    pub round_size: usize,
    _flavor: PhantomData<FL>,
}

impl<FL: Flavor> SumcheckProverRound<FL> {
    /// Start with the full circuit size.
    pub fn new(initial_round_size: usize) -> Self {
        Self {
            round_size: initial_round_size,
            _flavor: PhantomData,
        }
    }

    fn zero_accumulators() -> Vec<Univariate<FL::FF>> {
        vec![Univariate::zero(FL::MAX_PARTIAL_RELATION_LENGTH); FL::NUM_SUBRELATIONS]
    }

    fn extend_edges(
        polynomials: &ProverPolynomials<FL::FF>,
        edge_idx: usize,
    ) -> AllEntities<Univariate<FL::FF>> {
        polynomials.map(|p| {
            Univariate::from_edge(
                &p.coefs[edge_idx],
                &p.coefs[edge_idx + 1],
                FL::MAX_PARTIAL_RELATION_LENGTH,
            )
        })
    }

    fn accumulate_edge(
        accumulators: &mut [Univariate<FL::FF>],
        polynomials: &ProverPolynomials<FL::FF>,
        edge_idx: usize,
        relation_parameters: &RelationParameters<FL::FF>,
        gate_separators: &GateSeparatorPolynomial<FL::FF>,
    ) {
        let extended_edges = Self::extend_edges(polynomials, edge_idx);
        let scaling_factor = gate_separators.at(edge_idx);
        <FL::Relations as RelationSet<FL::FF>>::accumulate_relation_evaluations(
            accumulators,
            &extended_edges,
            relation_parameters,
            &scaling_factor,
            true,
        );
    }

    /// Compute the round univariate over the first `round_size` rows of `polynomials`.
    pub fn compute_univariate(
        &self,
        polynomials: &ProverPolynomials<FL::FF>,
        relation_parameters: &RelationParameters<FL::FF>,
        gate_separators: &GateSeparatorPolynomial<FL::FF>,
        alphas: &[FL::FF],
    ) -> Univariate<FL::FF> {
        let num_edges = self.round_size / 2;

        #[cfg(feature = "parallel")]
        let accumulators = (0..num_edges)
            .into_par_iter()
            .fold(Self::zero_accumulators, |mut acc, j| {
                Self::accumulate_edge(
                    &mut acc,
                    polynomials,
                    2 * j,
                    relation_parameters,
                    gate_separators,
                );
                acc
            })
            .reduce(Self::zero_accumulators, |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(x, y)| *x += y);
                a
            });

        #[cfg(not(feature = "parallel"))]
        let accumulators = (0..num_edges).fold(Self::zero_accumulators(), |mut acc, j| {
            Self::accumulate_edge(
                &mut acc,
                polynomials,
                2 * j,
                relation_parameters,
                gate_separators,
            );
            acc
        });

        Self::batch_over_relations(accumulators, alphas, gate_separators)
    }

    /// Combine the subrelation accumulators into the round univariate.
    ///
    /// Each accumulator is cut to its subrelation length and extended to the batched
    /// length. Independent subrelations are multiplied by the gate separator factor of
    /// this round, `partial_evaluation_result * (1 + X (beta_i - 1))`; dependent ones are not.
    pub fn batch_over_relations(
        accumulators: Vec<Univariate<FL::FF>>,
        alphas: &[FL::FF],
        gate_separators: &GateSeparatorPolynomial<FL::FF>,
    ) -> Univariate<FL::FF> {
        let length = FL::BATCHED_RELATION_PARTIAL_LENGTH;
        let lengths = <FL::Relations as RelationSet<FL::FF>>::subrelation_partial_lengths();
        let independent = <FL::Relations as RelationSet<FL::FF>>::subrelation_linearly_independent();

        let mut independent_sum = Univariate::zero(length);
        let mut dependent_sum = Univariate::zero(length);
        for (k, acc) in accumulators.into_iter().enumerate() {
            let mut truncated = acc.evaluations;
            truncated.truncate(lengths[k]);
            let mut extended = Univariate::new(truncated).extend_to(length);
            if k > 0 {
                extended = extended.mul_scalar(&alphas[k - 1]);
            }
            if independent[k] {
                independent_sum += &extended;
            } else {
                dependent_sum += &extended;
            }
        }

        let pow_factor = Univariate::from_edge(
            &FL::FF::one(),
            &gate_separators.current_element(),
            length,
        )
        .mul_scalar(&gate_separators.partial_evaluation_result);

        independent_sum * &pow_factor + &dependent_sum
    }
}

/// The verifier's running state across rounds.
pub struct SumcheckVerifierRound<FL: Flavor> {
    /// The value the next round univariate must sum to over `{0, 1}`.
    pub target_total_sum: FL::FF,
    /// Whether any round check failed so far.
    pub round_failed: bool,
}

impl<FL: Flavor> SumcheckVerifierRound<FL> {
    /// Start from the claimed total sum.
    pub fn new(target_total_sum: FL::FF) -> Self {
        Self {
            target_total_sum,
            round_failed: false,
        }
    }

    /// Check `S(0) + S(1)` against the target; a failure is sticky.
    pub fn check_sum(&mut self, univariate: &Univariate<FL::FF>) -> bool {
        let passed = univariate.len() >= 2
            && univariate.sum_at_zero_and_one() == self.target_total_sum;
        self.round_failed = self.round_failed || !passed;
        passed
    }

    /// Move the target to `S(u)`.
    pub fn compute_next_target_sum(&mut self, univariate: &Univariate<FL::FF>, round_challenge: &FL::FF) {
        self.target_total_sum = univariate.evaluate(round_challenge);
    }

    /// The batched relation value at the claimed evaluations, with the independent
    /// subrelations scaled by the fully evaluated gate separator.
    pub fn compute_full_relation_purported_value(
        purported_evaluations: &AllEntities<FL::FF>,
        relation_parameters: &RelationParameters<FL::FF>,
        gate_separators: &GateSeparatorPolynomial<FL::FF>,
        alphas: &[FL::FF],
    ) -> FL::FF {
        let mut evals = vec![FL::FF::zero(); FL::NUM_SUBRELATIONS];
        <FL::Relations as RelationSet<FL::FF>>::accumulate_relation_evaluations(
            &mut evals,
            purported_evaluations,
            relation_parameters,
            &gate_separators.partial_evaluation_result,
            false,
        );
        scale_and_batch_subrelations(&evals, alphas)
    }
}
