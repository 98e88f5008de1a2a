pub(crate) mod cp;
pub(crate) mod notifications;
pub(crate) mod predicates;
mod state;
pub(crate) mod variables;

pub use cp::*;
pub use state::*;
