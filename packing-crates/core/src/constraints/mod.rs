//! Defines the constraints which can be added to the [`State`].
//!
//! A constraint is a relation over variables, enforced in the [`State`] by a propagator. The
//! builders in this module validate their arguments, bring them in the form the propagator
//! expects, install the propagator, and run the propagation at the root.
//!
//! # Example
//! ```
//! # use packing_core::constraints;
//! # use packing_core::state::State;
//! let mut state = State::default();
//!
//! let items = (0..4)
//!     .map(|_| state.new_interval_variable(0, 1))
//!     .collect::<Vec<_>>();
//! let loads = (0..2)
//!     .map(|_| state.new_interval_variable(0, 10))
//!     .collect::<Vec<_>>();
//!
//! let handle = constraints::bin_packing(&mut state, items, vec![2, 7, 4, 3], loads)
//!     .expect("the items fit at the root");
//!
//! let propagator = state.get_propagator(handle).expect("the propagator was just added");
//! assert_eq!(10, propagator.free_space(state.get_domains(), 0));
//! ```
mod bin_packing;

pub use bin_packing::*;

#[cfg(doc)]
use crate::state::State;
