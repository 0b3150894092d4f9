use crate::errors::{HonkError, Result};
use crate::poly_commit::{
    ipa::IPACommitmentScheme, kzg_poly_com::KZGCommitmentSchemeBN254, pcs::PolyComScheme,
};
use crate::polynomials::Polynomial;
use crate::relations::{RelationSet, UltraRelations};
use crate::sumcheck::zk_data::LIBRA_UNIVARIATES_LENGTH;
use crate::transcript::TranscriptElement;
use honk_algebra::{
    bn254::{BN254Scalar, BN254G1},
    prelude::*,
    traits::Domain,
};

/// The number of selectors, permutation columns, tables and Lagrange columns.
pub const NUM_PRECOMPUTED_ENTITIES: usize = 23;

/// The number of committed witness columns.
pub const NUM_WITNESS_ENTITIES: usize = 8;

/// The number of shifted views of witness columns.
pub const NUM_SHIFTED_ENTITIES: usize = 5;

/// The total number of entities the relations read.
pub const NUM_ALL_ENTITIES: usize =
    NUM_PRECOMPUTED_ENTITIES + NUM_WITNESS_ENTITIES + NUM_SHIFTED_ENTITIES;

macro_rules! define_all_entities {
    (
        precomputed: [$($p:ident),* $(,)?],
        witness: [$($w:ident),* $(,)?],
        shifted: [$($s:ident => $t:ident),* $(,)?]
    ) => {
        /// One value per entity: a polynomial, a univariate, a field element or a
        /// commitment, depending on where it is used.
        #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct AllEntities<T> {
            $(#[allow(missing_docs)] pub $p: T,)*
            $(#[allow(missing_docs)] pub $w: T,)*
            $(#[allow(missing_docs)] pub $s: T,)*
        }

        impl<T> AllEntities<T> {
            /// Entity names in canonical order.
            pub fn labels() -> Vec<&'static str> {
                vec![$(stringify!($p),)* $(stringify!($w),)* $(stringify!($s),)*]
            }

            /// The precomputed entities, fixed by the circuit.
            pub fn get_precomputed(&self) -> Vec<&T> {
                vec![$(&self.$p,)*]
            }

            /// The committed witness entities.
            pub fn get_witness(&self) -> Vec<&T> {
                vec![$(&self.$w,)*]
            }

            /// The precomputed followed by the witness entities.
            pub fn get_unshifted(&self) -> Vec<&T> {
                vec![$(&self.$p,)* $(&self.$w,)*]
            }

            /// The entities whose shifts are also read, in the order of `get_shifted`.
            pub fn get_to_be_shifted(&self) -> Vec<&T> {
                vec![$(&self.$t,)*]
            }

            /// The shifted views.
            pub fn get_shifted(&self) -> Vec<&T> {
                vec![$(&self.$s,)*]
            }

            /// All entities in canonical order.
            pub fn iter(&self) -> impl Iterator<Item = &T> {
                [$(&self.$p,)* $(&self.$w,)* $(&self.$s,)*].into_iter()
            }

            /// All entities in canonical order, mutably.
            pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
                [$(&mut self.$p,)* $(&mut self.$w,)* $(&mut self.$s,)*].into_iter()
            }

            /// Apply `f` to every entity.
            pub fn map<U, M: FnMut(&T) -> U>(&self, mut f: M) -> AllEntities<U> {
                AllEntities {
                    $($p: f(&self.$p),)*
                    $($w: f(&self.$w),)*
                    $($s: f(&self.$s),)*
                }
            }

            /// Rebuild from `NUM_ALL_ENTITIES` values in canonical order.
            pub fn from_vec(values: Vec<T>) -> Result<Self> {
                if values.len() != NUM_ALL_ENTITIES {
                    return Err(HonkError::InvariantViolation(format!(
                        "expected {} entities, got {}",
                        NUM_ALL_ENTITIES,
                        values.len()
                    )));
                }
                let mut values = values.into_iter();
                let mut next = || {
                    values
                        .next()
                        .ok_or_else(|| HonkError::InvariantViolation("missing entity".into()))
                };
                Ok(Self {
                    $($p: next()?,)*
                    $($w: next()?,)*
                    $($s: next()?,)*
                })
            }
        }

        impl<F: Scalar> AllEntities<Polynomial<F>> {
            /// Recompute every shifted view from its to-be-shifted entity.
            pub fn set_shifted(&mut self) {
                $(self.$s = self.$t.shifted();)*
            }

            /// Check the shapes and the shift relation; returns the number of variables.
            pub fn validate(&self) -> Result<usize> {
                let size = self.w_l.size();
                if !size.is_power_of_two() {
                    return Err(HonkError::InvariantViolation(format!(
                        "circuit size {} is not a power of two",
                        size
                    )));
                }
                for (label, poly) in Self::labels().into_iter().zip(self.iter()) {
                    if poly.size() != size {
                        return Err(HonkError::InvariantViolation(format!(
                            "{} has size {}, expected {}",
                            label,
                            poly.size(),
                            size
                        )));
                    }
                }
                $(
                    if !self.$t.coefs[0].is_zero() {
                        return Err(HonkError::InvariantViolation(format!(
                            "{} must vanish at row 0 to be shifted",
                            stringify!($t)
                        )));
                    }
                    if self.$s != self.$t.shifted() {
                        return Err(HonkError::InvariantViolation(format!(
                            "{} is not the shift of {}",
                            stringify!($s),
                            stringify!($t)
                        )));
                    }
                )*
                Ok(size.trailing_zeros() as usize)
            }
        }
    };
}

define_all_entities!(
    precomputed: [
        q_m, q_c, q_l, q_r, q_o, q_4, q_lookup, q_arith, q_delta_range,
        sigma_1, sigma_2, sigma_3, sigma_4,
        id_1, id_2, id_3, id_4,
        table_1, table_2, table_3, table_4,
        lagrange_first, lagrange_last,
    ],
    witness: [
        w_l, w_r, w_o, w_4, z_perm,
        lookup_inverses, lookup_read_counts, lookup_read_tags,
    ],
    shifted: [
        w_l_shift => w_l,
        w_r_shift => w_r,
        w_o_shift => w_o,
        w_4_shift => w_4,
        z_perm_shift => z_perm,
    ]
);

/// The polynomials the prover runs sumcheck over.
pub type ProverPolynomials<F> = AllEntities<Polynomial<F>>;

impl<F: Scalar> AllEntities<Polynomial<F>> {
    /// The values of every entity at row `i`.
    pub fn row(&self, i: usize) -> AllEntities<F> {
        self.map(|p| p.coefs[i])
    }

    /// The common size of the polynomials.
    pub fn circuit_size(&self) -> usize {
        self.w_l.size()
    }
}

/// Which commitments of the unshifted list reappear as shifted ones.
///
/// Both ranges index the commitment list handed to the batch opening, so the verifier
/// can fold the scalars of the shifted copies into the originals and drop the copies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepeatedCommitmentsData {
    /// Index of the first to-be-shifted commitment.
    pub original_start: usize,
    /// Index of the first shifted commitment.
    pub duplicate_start: usize,
    /// The number of repeated commitments.
    pub count: usize,
}

impl RepeatedCommitmentsData {
    /// Record a run of `count` commitments at `duplicate_start` repeating those at `original_start`.
    pub const fn new(original_start: usize, duplicate_start: usize, count: usize) -> Self {
        Self {
            original_start,
            duplicate_start,
            count,
        }
    }

    /// Move both ranges by `offset` leading commitments.
    pub const fn with_offset(self, offset: usize) -> Self {
        Self::new(
            self.original_start + offset,
            self.duplicate_start + offset,
            self.count,
        )
    }
}

/// The sumcheck round univariate length: the relation length plus the gate separator
/// factor, and at least the Libra univariate length when masking.
pub const fn batched_relation_partial_length(max_partial_relation_length: usize, has_zk: bool) -> usize {
    let length = max_partial_relation_length + 1;
    if has_zk && LIBRA_UNIVARIATES_LENGTH > length {
        LIBRA_UNIVARIATES_LENGTH
    } else {
        length
    }
}

/// A proving system configuration: field, commitment scheme, relations and masking.
pub trait Flavor: Sized + 'static {
    /// The scalar field.
    type FF: Domain + TranscriptElement;

    /// The commitment group.
    type Commitment: Group<ScalarType = Self::FF> + TranscriptElement;

    /// The polynomial commitment scheme.
    type PCS: PolyComScheme<Field = Self::FF, Commitment = Self::Commitment>;

    /// The relation pack.
    type Relations: RelationSet<Self::FF>;

    /// The name used in transcripts and benchmarks.
    const NAME: &'static str;

    /// Whether sumcheck and Gemini messages are masked.
    const HAS_ZK: bool;

    /// The total number of subrelations.
    const NUM_SUBRELATIONS: usize = <Self::Relations as RelationSet<Self::FF>>::NUM_SUBRELATIONS;

    /// The largest subrelation length.
    const MAX_PARTIAL_RELATION_LENGTH: usize =
        <Self::Relations as RelationSet<Self::FF>>::MAX_PARTIAL_RELATION_LENGTH;

    /// The length of each sumcheck round univariate.
    const BATCHED_RELATION_PARTIAL_LENGTH: usize =
        batched_relation_partial_length(Self::MAX_PARTIAL_RELATION_LENGTH, Self::HAS_ZK);

    /// The number of entities.
    const NUM_ALL_ENTITIES: usize = NUM_ALL_ENTITIES;

    /// The to-be-shifted and shifted runs, relative to the entity list.
    const REPEATED_COMMITMENTS: RepeatedCommitmentsData = RepeatedCommitmentsData::new(
        NUM_PRECOMPUTED_ENTITIES,
        NUM_PRECOMPUTED_ENTITIES + NUM_WITNESS_ENTITIES,
        NUM_SHIFTED_ENTITIES,
    );
}

/// Ultra over BN254 with KZG.
pub struct UltraFlavor;

impl Flavor for UltraFlavor {
    type FF = BN254Scalar;
    type Commitment = BN254G1;
    type PCS = KZGCommitmentSchemeBN254;
    type Relations = UltraRelations;
    const NAME: &'static str = "Ultra";
    const HAS_ZK: bool = false;
}

/// Ultra over BN254 with KZG and masked sumcheck and Gemini messages.
pub struct UltraZKFlavor;

impl Flavor for UltraZKFlavor {
    type FF = BN254Scalar;
    type Commitment = BN254G1;
    type PCS = KZGCommitmentSchemeBN254;
    type Relations = UltraRelations;
    const NAME: &'static str = "UltraZK";
    const HAS_ZK: bool = true;
}

/// Ultra with the inner product argument over BN254 G1.
pub struct UltraIpaFlavor;

impl Flavor for UltraIpaFlavor {
    type FF = BN254Scalar;
    type Commitment = BN254G1;
    type PCS = IPACommitmentScheme<BN254G1>;
    type Relations = UltraRelations;
    const NAME: &'static str = "UltraIpa";
    const HAS_ZK: bool = false;
}

#[cfg(test)]
mod tests {
    use crate::flavor::*;
    use crate::relations::tests::arithmetic_circuit;

    type F = BN254Scalar;

    #[test]
    fn entity_layout() {
        assert_eq!(AllEntities::<F>::labels().len(), NUM_ALL_ENTITIES);
        let mut values = AllEntities::<usize>::default();
        values.iter_mut().enumerate().for_each(|(i, v)| *v = i);
        assert_eq!(*values.get_to_be_shifted()[0], 23);
        assert_eq!(*values.get_shifted()[0], 31);
        assert_eq!(*values.get_to_be_shifted()[4], 27);
        assert_eq!(values.get_unshifted().len(), 31);
        assert_eq!(values.lagrange_last, 22);
        assert_eq!(values.z_perm_shift, 35);

        let rebuilt = AllEntities::from_vec(values.iter().copied().collect()).unwrap();
        assert_eq!(rebuilt, values);
        assert!(AllEntities::<usize>::from_vec(vec![0; 3]).is_err());
    }

    #[test]
    fn flavor_constants() {
        assert_eq!(UltraFlavor::BATCHED_RELATION_PARTIAL_LENGTH, 7);
        assert_eq!(UltraZKFlavor::BATCHED_RELATION_PARTIAL_LENGTH, 9);
        assert_eq!(UltraIpaFlavor::NUM_SUBRELATIONS, 11);
        assert_eq!(
            UltraFlavor::REPEATED_COMMITMENTS.with_offset(1),
            RepeatedCommitmentsData::new(24, 32, 5)
        );
    }

    #[test]
    fn prover_polynomials_validation() {
        let mut polys = arithmetic_circuit();
        assert_eq!(polys.validate().unwrap(), 2);

        polys.w_o_shift.coefs[0] = F::one();
        assert!(polys.validate().is_err());
        polys.set_shifted();

        polys.z_perm.coefs[0] = F::one();
        polys.set_shifted();
        assert!(polys.validate().is_err());
        polys.z_perm.coefs[0] = F::zero();
        polys.set_shifted();

        polys.q_c = Polynomial::zero(8);
        assert!(polys.validate().is_err());
    }
}
