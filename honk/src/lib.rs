//! The Honk proving core: the sumcheck protocol engine, the Gemini/Shplonk
//! ("Shplemini") batched opening protocol, the commitment schemes they reduce
//! to, and a decider-level prover and verifier tying them together.
#![allow(clippy::needless_borrow)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]

#[macro_use]
extern crate serde_derive;

/// Module for error handling.
pub mod errors;

/// Module for proving-system flavors and their entity sets.
pub mod flavor;

/// Module for the decider prover and verifier.
pub mod honk;

/// Module for polynomial commitment schemes and opening-claim reductions.
pub mod poly_commit;

/// Module for univariate and multilinear polynomials.
pub mod polynomials;

/// Module for the relation pack.
pub mod relations;

/// Module for the sumcheck protocol.
pub mod sumcheck;

/// Module for the Fiat-Shamir transcript.
pub mod transcript;
