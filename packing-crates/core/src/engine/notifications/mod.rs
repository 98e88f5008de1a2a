mod domain_events;
mod event_sink;

pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
use enumset::EnumSet;
use event_sink::EventSink;

use crate::containers::KeyedVec;
use crate::engine::cp::Assignments;
use crate::engine::cp::PropagatorQueue;
use crate::engine::cp::TrailedValues;
use crate::engine::variables::DomainId;
use crate::propagation::store::PropagatorStore;
use crate::propagation::EnqueueDecision;
use crate::propagation::NotificationContext;
use crate::propagation::PropagatorVarId;

/// Keeps track of which propagators watch which domain events, and collects the events which
/// occur while propagating until the watchers are notified.
#[derive(Debug, Default)]
pub(crate) struct NotificationEngine {
    watchers: KeyedVec<DomainId, Watcher>,
    events: EventSink,
}

#[derive(Debug, Default)]
struct Watcher {
    lower_bound_watchers: Vec<PropagatorVarId>,
    upper_bound_watchers: Vec<PropagatorVarId>,
    assign_watchers: Vec<PropagatorVarId>,
    removal_watchers: Vec<PropagatorVarId>,
}

impl Watcher {
    fn for_event(&self, event: DomainEvent) -> &[PropagatorVarId] {
        match event {
            DomainEvent::Assign => &self.assign_watchers,
            DomainEvent::LowerBound => &self.lower_bound_watchers,
            DomainEvent::UpperBound => &self.upper_bound_watchers,
            DomainEvent::Removal => &self.removal_watchers,
        }
    }

    fn for_event_mut(&mut self, event: DomainEvent) -> &mut Vec<PropagatorVarId> {
        match event {
            DomainEvent::Assign => &mut self.assign_watchers,
            DomainEvent::LowerBound => &mut self.lower_bound_watchers,
            DomainEvent::UpperBound => &mut self.upper_bound_watchers,
            DomainEvent::Removal => &mut self.removal_watchers,
        }
    }
}

impl NotificationEngine {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(Watcher::default());
        self.events.grow();
    }

    pub(crate) fn watch_all(
        &mut self,
        domain: DomainId,
        events: EnumSet<DomainEvent>,
        propagator_var: PropagatorVarId,
    ) {
        let watcher = &mut self.watchers[domain];

        for event in events {
            let watchers = watcher.for_event_mut(event);
            if !watchers.contains(&propagator_var) {
                watchers.push(propagator_var);
            }
        }
    }

    pub(crate) fn event_occurred(
        &mut self,
        lower_bound_before: i32,
        upper_bound_before: i32,
        new_lower_bound: i32,
        new_upper_bound: i32,
        removal_took_place: bool,
        domain_id: DomainId,
    ) {
        if lower_bound_before != new_lower_bound {
            self.events
                .event_occurred(DomainEvent::LowerBound, domain_id);
        }

        if upper_bound_before != new_upper_bound {
            self.events
                .event_occurred(DomainEvent::UpperBound, domain_id);
        }

        if lower_bound_before != upper_bound_before && new_lower_bound == new_upper_bound {
            self.events.event_occurred(DomainEvent::Assign, domain_id);
        }

        if removal_took_place {
            self.events.event_occurred(DomainEvent::Removal, domain_id);
        }
    }

    pub(crate) fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub(crate) fn clear_events(&mut self) {
        let _ = self.events.drain().count();
    }

    /// Process the stored domain events. Propagators are notified about the events they watch
    /// and enqueued if they ask for it.
    pub(crate) fn notify_propagators_about_domain_events(
        &mut self,
        assignments: &Assignments,
        trailed_values: &mut TrailedValues,
        propagators: &mut PropagatorStore,
        propagator_queue: &mut PropagatorQueue,
    ) {
        // Collect so that the watch lists can be read within the loop
        for (event, domain) in self.events.drain().collect::<Vec<_>>() {
            for &propagator_var in self.watchers[domain].for_event(event) {
                let propagator_id = propagator_var.propagator;
                let propagator = &mut propagators[propagator_id];

                let context = NotificationContext::new(trailed_values, assignments);
                let enqueue_decision = propagator.notify(context, propagator_var.variable, event);

                if enqueue_decision == EnqueueDecision::Enqueue {
                    propagator_queue.enqueue_propagator(propagator_id, propagator.priority());
                }
            }
        }
    }
}
