/// Module for opening claims.
pub mod claim;

/// Module for grouping verifier claims by category.
pub mod claim_batcher;

/// Module for Gemini folding.
pub mod gemini;

/// Module for the inner product argument commitment scheme.
pub mod ipa;

/// Module for the KZG polynomial commitment scheme.
pub mod kzg_poly_com;

/// Module for the polynomial commitment scheme trait.
pub mod pcs;

/// Module for Gemini and Shplonk combined.
pub mod shplemini;

/// Module for Shplonk batching.
pub mod shplonk;

/// Module for the small-subgroup inner product argument of zero-knowledge sumcheck.
pub mod small_subgroup_ipa;
