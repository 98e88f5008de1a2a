//! Contains the propagators for the bin-packing constraint.
//!
//! Every item is placed in exactly one bin, and the load of a bin equals the total size of the
//! items placed in it. The [`BinPackingPropagator`] handles a single resource, and the
//! [`VectorBinPackingPropagator`] handles several resources (for example cpu and memory) which
//! are packed at the same time.
//!
//! Both propagators maintain, per bin, the items which are placed in it and the items which may
//! still be placed in it. From these they derive:
//! - the load of a bin is at least the size of its placed items, and at most that plus the sizes
//!   of the items which may still go there;
//! - the loads of all bins add up to the total size of the items;
//! - an item is removed from a bin when it does not fit next to the placed items;
//! - an item is placed in a bin when the bin cannot reach its minimum load without it.
//!
//! The bookkeeping is updated incrementally: on every event only the changed items and bins are
//! revisited, and all of it is restored when the [`crate::state::State`] backtracks.
//!
//! The propagators expect the items to be ordered by non-increasing size (in the first
//! dimension); the builders in [`crate::constraints`] sort them before creating the propagator.
mod big_items;
mod bin_packing_propagator;
mod from_scratch;
mod global_load;
mod knapsack;
mod options;
mod packing_state;
mod vector_bin_packing_propagator;

pub use bin_packing_propagator::*;
pub use options::*;
pub use vector_bin_packing_propagator::*;
