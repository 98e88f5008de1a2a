//! Contains the main building blocks for propagators.
//!
//! A propagator is created by a [`PropagatorConstructor`], which subscribes the propagator to
//! the [`DomainEvents`] of its variables through the [`PropagatorConstructorContext`]. During
//! search the propagator is notified of events through [`Propagator::notify`], and changes
//! domains through [`PropagationContext::post`] when [`Propagator::propagate`] is called.
//! Bookkeeping which has to be restored on backtracking is kept in [`TrailedInteger`]s.

mod constructor;
mod contexts;
mod domains;
mod local_id;
mod propagator;

pub(crate) mod propagator_id;
pub(crate) mod store;

pub use constructor::*;
pub use contexts::*;
pub use domains::*;
pub use local_id::*;
pub use propagator::*;
pub use propagator_id::PropagatorHandle;
pub use propagator_id::PropagatorId;
pub(crate) use propagator_id::PropagatorVarId;

pub use crate::basic_types::Inconsistency;
pub use crate::basic_types::PropagationStatusCP;
pub use crate::basic_types::PropagatorConflict;
pub use crate::engine::notifications::DomainEvent;
pub use crate::engine::notifications::DomainEvents;
pub use crate::engine::TrailedBitSet;
pub use crate::engine::TrailedInteger;
