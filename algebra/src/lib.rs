//! The algebra layer used by the Honk proving system: the BN254 scalar field,
//! its groups, the pairing, and the serialization helpers shared by the
//! protocol crates.
#![allow(clippy::upper_case_acronyms)]

/// Module for the BN254 curve
pub mod bn254;

/// Module for error handling
pub mod errors;

/// Module for the prelude
pub mod prelude;

/// Module for test rng
pub mod rand_helper;

/// Module for serialization of scalars and group elements
pub mod serialization;

/// Module for traits
pub mod traits;

/// Module for utils
pub mod utils;

#[doc(hidden)]
pub use ark_std::{
    borrow, cfg_into_iter, cfg_iter, cfg_iter_mut, fmt, iter, marker, ops, rand, One,
    UniformRand, Zero,
};
