use thiserror::Error;

#[cfg(doc)]
use crate::state::State;

/// Errors related to adding constraints to the [`State`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// The number of items differs from the number of sizes given for a dimension.
    #[error("expected {expected} sizes but {actual} were given")]
    MismatchedLengths { expected: usize, actual: usize },
    /// An item was given a negative size.
    #[error("item {item} has negative size {size}")]
    NegativeSize { item: usize, size: i32 },
    /// A vector bin-packing constraint was created without any dimension.
    #[error("at least one dimension is required")]
    NoDimensions,
    /// The sum of the item sizes does not fit in the load variables.
    #[error("the total item size overflows")]
    SizeOverflow,
    /// Error which indicates that a constraint was attempted to be added below the root.
    #[error("constraints can only be added at the root checkpoint")]
    NotAtRoot,
    /// Error which indicate that adding a propagator led to infeasibility at the root.
    #[error("Adding the constraint failed because it is infeasible at the root")]
    InfeasiblePropagator,
}
