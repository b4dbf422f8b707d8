#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate, clippy::comparison_chain)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unreadable_literal, clippy::range_plus_one, clippy::similar_names)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

//! Short-range pairwise interactions between point particles.
//!
//! The [`NeighborList`] finds all pairs of particles closer than a cutoff
//! using one of several interchangeable backends, and stores them as a "half"
//! neighbor list in a compressed (CSR-like) layout. The functions in
//! [`interactions`] then walk this list and evaluate a [`PairPotential`] to
//! accumulate forces or sum the interaction energy.

mod errors;
pub use self::errors::Error;

pub mod grid;
pub use self::grid::Grid;

pub mod neighbors;
pub use self::neighbors::{NeighborList, NeighborSearch};
pub use self::neighbors::{GrowableList, LinearList};

pub mod potentials;
pub use self::potentials::{PairPotential, Potential, LennardJones};

pub mod interactions;
pub use self::interactions::{compute_forces, compute_interaction_energy, Masses};

mod lattice;
pub use self::lattice::cubic_lattice;

#[cfg(test)]
pub(crate) mod test_utils;
