use std::collections::HashSet;

use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::engine::notifications::NotificationEngine;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateType;
use crate::engine::variables::DomainId;
use crate::packing_asserts::packing_assert_moderate;
use crate::packing_asserts::packing_assert_simple;

/// Signals that a domain became empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// The integer domains of all variables, together with the history needed to restore them.
#[derive(Clone, Debug, Default)]
pub struct Assignments {
    trail: Trail<AssignmentsTrailEntry>,
    domains: KeyedVec<DomainId, IntegerDomain>,
}

#[derive(Clone, Copy, Debug)]
struct AssignmentsTrailEntry {
    domain_id: DomainId,
    old_lower_bound: i32,
    old_upper_bound: i32,
    /// The value which was removed from the interior of the domain, if any.
    removed_value: Option<i32>,
}

impl Assignments {
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        packing_assert_simple!(
            lower_bound <= upper_bound,
            "cannot create an empty domain [{lower_bound}, {upper_bound}]"
        );
        self.domains.push(IntegerDomain {
            lower_bound,
            upper_bound,
            holes: HashSet::new(),
        })
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint()
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub(crate) fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn get_lower_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].lower_bound
    }

    pub(crate) fn get_upper_bound(&self, domain_id: DomainId) -> i32 {
        self.domains[domain_id].upper_bound
    }

    pub(crate) fn is_value_in_domain(&self, domain_id: DomainId, value: i32) -> bool {
        self.domains[domain_id].contains(value)
    }

    pub(crate) fn is_domain_assigned(&self, domain_id: DomainId) -> bool {
        self.get_lower_bound(domain_id) == self.get_upper_bound(domain_id)
    }

    pub(crate) fn get_assigned_value(&self, domain_id: DomainId) -> Option<i32> {
        self.is_domain_assigned(domain_id)
            .then(|| self.get_lower_bound(domain_id))
    }

    pub(crate) fn get_domain_iterator(
        &self,
        domain_id: DomainId,
    ) -> impl Iterator<Item = i32> + '_ {
        let domain = &self.domains[domain_id];
        (domain.lower_bound..=domain.upper_bound).filter(|value| !domain.holes.contains(value))
    }

    /// Returns whether the [`Predicate`] holds, is falsified, or neither.
    pub(crate) fn evaluate_predicate(&self, predicate: Predicate) -> Option<bool> {
        let domain_id = predicate.get_domain();
        let value = predicate.get_right_hand_side();
        let lower_bound = self.get_lower_bound(domain_id);
        let upper_bound = self.get_upper_bound(domain_id);

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => {
                if lower_bound >= value {
                    Some(true)
                } else if upper_bound < value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::UpperBound => {
                if upper_bound <= value {
                    Some(true)
                } else if lower_bound > value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::NotEqual => {
                if !self.is_value_in_domain(domain_id, value) {
                    Some(true)
                } else if lower_bound == value && upper_bound == value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::Equal => {
                if !self.is_value_in_domain(domain_id, value) {
                    Some(false)
                } else if lower_bound == value && upper_bound == value {
                    Some(true)
                } else {
                    None
                }
            }
        }
    }

    /// Apply the given [`Predicate`] to the integer domains.
    ///
    /// If the [`Predicate`] already holds this does nothing and returns `false`; otherwise the
    /// domain is narrowed, the resulting events are handed to the [`NotificationEngine`], and
    /// `true` is returned. If the domain becomes empty, [`EmptyDomain`] is returned; the change
    /// is still on the trail and is undone on backtracking.
    pub(crate) fn post_predicate(
        &mut self,
        predicate: Predicate,
        notification_engine: &mut NotificationEngine,
    ) -> Result<bool, EmptyDomain> {
        let domain_id = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        let domain = &self.domains[domain_id];
        let old_lower_bound = domain.lower_bound;
        let old_upper_bound = domain.upper_bound;

        let already_holds = match predicate.get_predicate_type() {
            PredicateType::LowerBound => value <= old_lower_bound,
            PredicateType::UpperBound => value >= old_upper_bound,
            PredicateType::Equal => old_lower_bound == value && old_upper_bound == value,
            PredicateType::NotEqual => !domain.contains(value),
        };
        if already_holds {
            return Ok(false);
        }

        let removed_value = (predicate.is_not_equal_predicate()
            && value != old_lower_bound
            && value != old_upper_bound)
            .then_some(value);
        self.trail.push(AssignmentsTrailEntry {
            domain_id,
            old_lower_bound,
            old_upper_bound,
            removed_value,
        });

        let domain = &mut self.domains[domain_id];
        match predicate.get_predicate_type() {
            PredicateType::LowerBound => domain.lower_bound = value,
            PredicateType::UpperBound => domain.upper_bound = value,
            PredicateType::Equal => {
                if domain.contains(value) {
                    domain.lower_bound = value;
                    domain.upper_bound = value;
                } else {
                    domain.lower_bound = domain.upper_bound + 1;
                }
            }
            PredicateType::NotEqual => {
                if value == old_lower_bound {
                    domain.lower_bound += 1;
                } else if value == old_upper_bound {
                    domain.upper_bound -= 1;
                } else {
                    let _ = domain.holes.insert(value);
                }
            }
        }
        domain.skip_holes();

        if domain.lower_bound > domain.upper_bound {
            return Err(EmptyDomain);
        }

        notification_engine.event_occurred(
            old_lower_bound,
            old_upper_bound,
            domain.lower_bound,
            domain.upper_bound,
            predicate.is_not_equal_predicate(),
            domain_id,
        );

        Ok(true)
    }

    /// Restores all domains to the state they had when `new_checkpoint` was created.
    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) {
        packing_assert_simple!(
            new_checkpoint < self.trail.get_checkpoint(),
            "Expected the new checkpoint {new_checkpoint} to be smaller than the current checkpoint {}",
            self.trail.get_checkpoint(),
        );

        for entry in self.trail.synchronise(new_checkpoint) {
            let domain = &mut self.domains[entry.domain_id];
            domain.lower_bound = entry.old_lower_bound;
            domain.upper_bound = entry.old_upper_bound;
            if let Some(removed_value) = entry.removed_value {
                let _ = domain.holes.remove(&removed_value);
            }
        }

        packing_assert_moderate!(self
            .domains
            .iter()
            .all(|domain| domain.lower_bound <= domain.upper_bound));
    }
}

#[derive(Clone, Debug)]
struct IntegerDomain {
    lower_bound: i32,
    upper_bound: i32,
    /// Values strictly inside the bounds which have been removed. Entries outside the bounds are
    /// stale and ignored.
    holes: HashSet<i32>,
}

impl IntegerDomain {
    fn contains(&self, value: i32) -> bool {
        self.lower_bound <= value && value <= self.upper_bound && !self.holes.contains(&value)
    }

    /// Moves the bounds inwards until both lie on values of the domain.
    fn skip_holes(&mut self) {
        while self.lower_bound <= self.upper_bound && self.holes.contains(&self.lower_bound) {
            self.lower_bound += 1;
        }
        while self.lower_bound <= self.upper_bound && self.holes.contains(&self.upper_bound) {
            self.upper_bound -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    fn setup(lower_bound: i32, upper_bound: i32) -> (Assignments, NotificationEngine, DomainId) {
        let mut assignments = Assignments::default();
        let mut notification_engine = NotificationEngine::default();
        let domain_id = assignments.grow(lower_bound, upper_bound);
        notification_engine.grow();
        (assignments, notification_engine, domain_id)
    }

    #[test]
    fn removing_interior_value_keeps_bounds() {
        let (mut assignments, mut notification_engine, x) = setup(0, 5);

        let changed = assignments.post_predicate(predicate!(x != 3), &mut notification_engine);

        assert_eq!(Ok(true), changed);
        assert!(!assignments.is_value_in_domain(x, 3));
        assert_eq!(0, assignments.get_lower_bound(x));
        assert_eq!(5, assignments.get_upper_bound(x));
        assert_eq!(
            vec![0, 1, 2, 4, 5],
            assignments.get_domain_iterator(x).collect::<Vec<_>>()
        );
    }

    #[test]
    fn bounds_skip_over_holes() {
        let (mut assignments, mut notification_engine, x) = setup(0, 5);

        let _ = assignments.post_predicate(predicate!(x != 1), &mut notification_engine);
        let _ = assignments.post_predicate(predicate!(x != 0), &mut notification_engine);

        assert_eq!(2, assignments.get_lower_bound(x));
    }

    #[test]
    fn posting_a_satisfied_predicate_is_a_no_op() {
        let (mut assignments, mut notification_engine, x) = setup(2, 5);

        assert_eq!(
            Ok(false),
            assignments.post_predicate(predicate!(x >= 1), &mut notification_engine)
        );
        assert_eq!(
            Ok(false),
            assignments.post_predicate(predicate!(x != 7), &mut notification_engine)
        );
        assert_eq!(0, assignments.num_trail_entries());
    }

    #[test]
    fn emptying_a_domain_is_reported_and_undone() {
        let (mut assignments, mut notification_engine, x) = setup(0, 3);

        assignments.new_checkpoint();
        let _ = assignments.post_predicate(predicate!(x != 1), &mut notification_engine);
        assert_eq!(
            Err(EmptyDomain),
            assignments.post_predicate(predicate!(x == 1), &mut notification_engine)
        );

        assignments.synchronise(0);
        assert_eq!(
            vec![0, 1, 2, 3],
            assignments.get_domain_iterator(x).collect::<Vec<_>>()
        );
    }

    #[test]
    fn synchronise_restores_holes_and_bounds() {
        let (mut assignments, mut notification_engine, x) = setup(0, 9);

        assignments.new_checkpoint();
        let _ = assignments.post_predicate(predicate!(x != 4), &mut notification_engine);
        assignments.new_checkpoint();
        let _ = assignments.post_predicate(predicate!(x >= 4), &mut notification_engine);
        let _ = assignments.post_predicate(predicate!(x <= 6), &mut notification_engine);
        assert_eq!(5, assignments.get_lower_bound(x));

        assignments.synchronise(1);
        assert_eq!(0, assignments.get_lower_bound(x));
        assert!(!assignments.is_value_in_domain(x, 4));

        assignments.synchronise(0);
        assert!(assignments.is_value_in_domain(x, 4));
    }

    #[test]
    fn evaluating_predicates() {
        let (mut assignments, mut notification_engine, x) = setup(0, 4);
        let _ = assignments.post_predicate(predicate!(x != 2), &mut notification_engine);

        assert_eq!(Some(true), assignments.evaluate_predicate(predicate!(x != 2)));
        assert_eq!(Some(false), assignments.evaluate_predicate(predicate!(x == 2)));
        assert_eq!(None, assignments.evaluate_predicate(predicate!(x >= 1)));
        assert_eq!(Some(true), assignments.evaluate_predicate(predicate!(x <= 4)));
    }
}
