use thiserror::Error;

use crate::engine::EmptyDomain;
use crate::propagation::PropagatorId;

/// The result of invoking a propagator; `Err` signals that the current domains admit no
/// solution.
pub type PropagationStatusCP = Result<(), Inconsistency>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    #[error("a domain became empty")]
    EmptyDomain,
    #[error(transparent)]
    Conflict(#[from] PropagatorConflict),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

/// A conflict which a propagator detected without emptying a domain.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{propagator_id} detected a conflict: {description}")]
pub struct PropagatorConflict {
    pub(crate) propagator_id: PropagatorId,
    pub(crate) description: &'static str,
}

impl PropagatorConflict {
    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}
