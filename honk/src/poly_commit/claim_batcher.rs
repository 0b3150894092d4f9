use crate::errors::{HonkError, Result};
use honk_algebra::prelude::*;

/// Commitments of one claim category with their claimed multilinear evaluations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch<G: Group> {
    /// The commitments.
    pub commitments: Vec<G>,
    /// The claimed evaluations at the sumcheck point, one per commitment.
    pub evaluations: Vec<G::ScalarType>,
    /// The Shplonk coefficient shared by the whole category.
    pub scalar: G::ScalarType,
}

impl<G: Group> Batch<G> {
    /// Pair commitments with their evaluations.
    pub fn new(commitments: Vec<G>, evaluations: Vec<G::ScalarType>) -> Result<Self> {
        if commitments.len() != evaluations.len() {
            return Err(HonkError::InvariantViolation(format!(
                "{} commitments but {} evaluations",
                commitments.len(),
                evaluations.len()
            )));
        }
        Ok(Self {
            commitments,
            evaluations,
            scalar: G::ScalarType::zero(),
        })
    }
}

/// Groups of commitments whose polynomials are interleaved into one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterleavedBatch<G: Group> {
    /// One group of `s` commitments per interleaved polynomial.
    pub commitments_groups: Vec<Vec<G>>,
    /// The claimed evaluations of the interleaved polynomials.
    pub evaluations: Vec<G::ScalarType>,
    /// `r^i` for the `i`-th member of a group.
    pub scalars_pos: Vec<G::ScalarType>,
    /// `(-r)^i` for the `i`-th member of a group.
    pub scalars_neg: Vec<G::ScalarType>,
    /// `1 / (z - r^s)`.
    pub shplonk_denominator: G::ScalarType,
}

impl<G: Group> InterleavedBatch<G> {
    /// Pair groups with the evaluations of their interleavings.
    pub fn new(commitments_groups: Vec<Vec<G>>, evaluations: Vec<G::ScalarType>) -> Result<Self> {
        let group_size = commitments_groups.first().map(|g| g.len()).unwrap_or(0);
        if commitments_groups.len() != evaluations.len()
            || group_size < 2
            || !group_size.is_power_of_two()
            || commitments_groups.iter().any(|g| g.len() != group_size)
        {
            return Err(HonkError::InvariantViolation(
                "interleaved groups must be of one power-of-two size with one evaluation each".into(),
            ));
        }
        Ok(Self {
            commitments_groups,
            evaluations,
            scalars_pos: vec![],
            scalars_neg: vec![],
            shplonk_denominator: G::ScalarType::zero(),
        })
    }

    /// The number of polynomials per group.
    pub fn group_size(&self) -> usize {
        self.commitments_groups[0].len()
    }
}

/// The verifier's claims, grouped by how each category is opened in Gemini.
///
/// Unshifted polynomials enter `A_0` as they are, to-be-shifted ones through their
/// shift, interleaved groups through their interleaving. Categories that are absent
/// contribute nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimBatcher<G: Group> {
    /// Claims about unshifted polynomials.
    pub unshifted: Option<Batch<G>>,
    /// Claims about shifts: the commitments are those of the to-be-shifted polynomials.
    pub shifted: Option<Batch<G>>,
    /// Claims about interleaved polynomials.
    pub interleaved: Option<InterleavedBatch<G>>,
}

impl<G: Group> Default for ClaimBatcher<G> {
    fn default() -> Self {
        Self {
            unshifted: None,
            shifted: None,
            interleaved: None,
        }
    }
}

impl<G: Group> ClaimBatcher<G> {
    /// Prepend a claim to the unshifted category, creating it when absent.
    pub fn prepend_unshifted(&mut self, commitment: G, evaluation: G::ScalarType) {
        match self.unshifted.as_mut() {
            Some(batch) => {
                batch.commitments.insert(0, commitment);
                batch.evaluations.insert(0, evaluation);
            }
            None => {
                self.unshifted = Some(Batch {
                    commitments: vec![commitment],
                    evaluations: vec![evaluation],
                    scalar: G::ScalarType::zero(),
                })
            }
        }
    }

    /// Set the Shplonk coefficient of every category.
    ///
    /// With `1/(z - r)` and `1/(z + r)` first in `inverse_vanishing_evals`, an unshifted
    /// polynomial is opened through `A_0+` at `r` and `A_0-` at `-r`:
    /// `1/(z - r) + nu/(z + r)`. A shifted one enters both with a factor `1/r` and
    /// opposite signs: `(1/(z - r) - nu/(z + r)) / r`.
    pub fn compute_scalars_for_each_batch(
        &mut self,
        inverse_vanishing_evals: &[G::ScalarType],
        nu: &G::ScalarType,
        r: &G::ScalarType,
        z: &G::ScalarType,
    ) -> Result<()> {
        let inverse_vanishing_pos = inverse_vanishing_evals[0];
        let scaled_inverse_vanishing_neg = nu.mul(&inverse_vanishing_evals[1]);

        if let Some(batch) = self.unshifted.as_mut() {
            batch.scalar = inverse_vanishing_pos.add(&scaled_inverse_vanishing_neg);
        }
        if let Some(batch) = self.shifted.as_mut() {
            let r_inv = r.inv()?;
            batch.scalar = r_inv.mul(&inverse_vanishing_pos.sub(&scaled_inverse_vanishing_neg));
        }
        if let Some(batch) = self.interleaved.as_mut() {
            let s = batch.group_size();
            batch.scalars_pos = powers(r, s);
            batch.scalars_neg = powers(&r.neg(), s);
            let r_pow = r.pow(&[s as u64]);
            batch.shplonk_denominator = z.sub(&r_pow).inv()?;
        }
        Ok(())
    }

    /// Append every commitment with its coefficient, and batch the evaluations with
    /// consecutive powers of `rho` across the categories.
    ///
    /// `nu_pos` and `nu_neg` are the Shplonk powers of the interleaving claims.
    pub fn update_batch_mul_inputs_and_batched_evaluation(
        &self,
        commitments: &mut Vec<G>,
        scalars: &mut Vec<G::ScalarType>,
        batched_evaluation: &mut G::ScalarType,
        rho: &G::ScalarType,
        nu_pos: &G::ScalarType,
        nu_neg: &G::ScalarType,
    ) {
        let mut rho_power = G::ScalarType::one();
        for batch in [self.unshifted.as_ref(), self.shifted.as_ref()].into_iter().flatten() {
            for (commitment, evaluation) in batch.commitments.iter().zip(batch.evaluations.iter()) {
                commitments.push(*commitment);
                scalars.push(batch.scalar.mul(&rho_power).neg());
                batched_evaluation.add_assign(&evaluation.mul(&rho_power));
                rho_power.mul_assign(rho);
            }
        }

        if let Some(batch) = self.interleaved.as_ref() {
            for (group, evaluation) in batch.commitments_groups.iter().zip(batch.evaluations.iter()) {
                for (i, commitment) in group.iter().enumerate() {
                    let scalar = nu_pos
                        .mul(&batch.scalars_pos[i])
                        .add(&nu_neg.mul(&batch.scalars_neg[i]))
                        .mul(&batch.shplonk_denominator)
                        .mul(&rho_power);
                    commitments.push(*commitment);
                    scalars.push(scalar.neg());
                }
                batched_evaluation.add_assign(&evaluation.mul(&rho_power));
                rho_power.mul_assign(rho);
            }
        }
    }
}
