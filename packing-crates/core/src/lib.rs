//! # Packing
//! Packing is an incremental propagation library for bin-packing constraints, as they appear in
//! the placement of virtual machines onto nodes. Items with constant resource demands are assigned
//! to bins with limited capacity; the propagators prune the bins each item may still be placed in
//! and tighten the bounds on the load of every bin.
//!
//! The library contains a small propagation engine (the [`state::State`]) which hosts the
//! propagators: it owns the integer domains and the trailed bookkeeping of the propagators, and
//! restores both when a depth-first search backtracks. Deciding which item to place next is left
//! to the caller.
//!
//! # Usage
//! Variables are created through the [`state::State`], after which a constraint is added using
//! the builders in [`constraints`]:
//! ```rust
//! # use packing_core::state::State;
//! # use packing_core::constraints;
//! # use packing_core::predicate;
//! let mut state = State::default();
//!
//! // Three items which should be placed in one of two bins.
//! let items = (0..3)
//!     .map(|_| state.new_interval_variable(0, 1))
//!     .collect::<Vec<_>>();
//! // Each bin has a capacity of 7.
//! let loads = (0..2)
//!     .map(|_| state.new_interval_variable(0, 7))
//!     .collect::<Vec<_>>();
//!
//! let _ = constraints::bin_packing(&mut state, items.clone(), vec![5, 4, 3], loads.clone())
//!     .expect("the constraint is consistent at the root");
//!
//! // Once the largest item is in bin 0, neither of the others fits next to it.
//! state.new_checkpoint();
//! let _ = state.post(predicate![items[0] == 0]).expect("bin 0 is in the domain");
//! assert!(state.propagate_to_fixed_point().is_ok());
//!
//! assert_eq!(Some(1), state.fixed_value(items[1]));
//! assert_eq!(Some(1), state.fixed_value(items[2]));
//! assert_eq!(Some(5), state.fixed_value(loads[0]));
//! assert_eq!(Some(7), state.fixed_value(loads[1]));
//! ```
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub(crate) mod packing_asserts;
pub mod propagators;

pub mod constraints;
pub mod propagation;
pub mod statistics;

pub use convert_case;

pub use crate::basic_types::ConstraintOperationError;

pub mod predicates {
    //! Containing structures and traits related to predicates, the atomic constraints
    //! through which propagators change domains.
    pub use crate::engine::predicates::Predicate;
    pub use crate::engine::predicates::PredicateConstructor;
    pub use crate::engine::predicates::PredicateType;
}

pub mod variables {
    //! Contains the integer variables of the [`crate::state::State`].
    pub use crate::engine::variables::DomainId;
}

pub mod state {
    //! Contains the [`State`], the container of variables and propagators.
    pub use crate::engine::Conflict;
    pub use crate::engine::EmptyDomain;
    pub use crate::engine::EmptyDomainConflict;
    pub use crate::engine::State;
    pub use crate::propagation::PropagatorHandle;
    pub use crate::propagation::PropagatorId;
}
