use crate::basic_types::PropagatorConflict;
use crate::engine::notifications::NotificationEngine;
use crate::engine::Assignments;
use crate::engine::EmptyDomain;
use crate::engine::TrailedValues;
use crate::predicates::Predicate;
use crate::propagation::Domains;
use crate::propagation::HasAssignments;
use crate::propagation::HasTrailedValues;
#[cfg(doc)]
use crate::propagation::Propagator;
use crate::propagation::PropagatorId;

/// Provided to the propagator when it is notified of a domain event.
///
/// The propagator can read the domains and update its trailed bookkeeping, but it cannot change
/// any domain.
#[derive(Debug)]
pub struct NotificationContext<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a Assignments,
}

impl<'a> NotificationContext<'a> {
    pub(crate) fn new(trailed_values: &'a mut TrailedValues, assignments: &'a Assignments) -> Self {
        Self {
            trailed_values,
            assignments,
        }
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.assignments, self.trailed_values)
    }
}

impl HasAssignments for NotificationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

impl HasTrailedValues for NotificationContext<'_> {
    fn trailed_values_mut(&mut self) -> &mut TrailedValues {
        self.trailed_values
    }
}

/// The context given to [`Propagator::propagate`]; all domain changes go through
/// [`PropagationContext::post`].
#[derive(Debug)]
pub struct PropagationContext<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) propagator_id: PropagatorId,
    pub(crate) notification_engine: &'a mut NotificationEngine,
}

impl HasAssignments for PropagationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

impl HasTrailedValues for PropagationContext<'_> {
    fn trailed_values_mut(&mut self) -> &mut TrailedValues {
        self.trailed_values
    }
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(
        trailed_values: &'a mut TrailedValues,
        assignments: &'a mut Assignments,
        notification_engine: &'a mut NotificationEngine,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagationContext {
            trailed_values,
            assignments,
            propagator_id,
            notification_engine,
        }
    }

    /// Apply the given [`Predicate`] to the domains.
    ///
    /// Posting a predicate which already holds has no effect.
    pub fn post(&mut self, predicate: Predicate) -> Result<(), EmptyDomain> {
        let _ = self
            .assignments
            .post_predicate(predicate, self.notification_engine)?;
        Ok(())
    }

    /// Creates a conflict attributed to the propagator which is running.
    pub fn conflict(&self, description: &'static str) -> PropagatorConflict {
        PropagatorConflict {
            propagator_id: self.propagator_id,
            description,
        }
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.assignments, self.trailed_values)
    }

    pub fn reborrow(&mut self) -> PropagationContext<'_> {
        PropagationContext {
            trailed_values: self.trailed_values,
            assignments: self.assignments,
            propagator_id: self.propagator_id,
            notification_engine: self.notification_engine,
        }
    }
}
