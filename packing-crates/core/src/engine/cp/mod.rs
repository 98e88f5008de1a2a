mod assignments;
mod propagator_queue;
pub(crate) mod trailed;

pub use assignments::Assignments;
pub use assignments::EmptyDomain;
pub(crate) use propagator_queue::PropagatorQueue;
pub use trailed::*;
