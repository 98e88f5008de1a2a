use enumset::EnumSet;

use super::DomainEvent;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;

/// While a propagator runs, the changes it makes are captured as events in the event sink.
/// When the propagator finishes, the event sink is drained to notify all the propagators that
/// subscribe to those events.
///
/// The event sink ensures duplicate events are ignored.
#[derive(Default, Debug, Clone)]
pub(crate) struct EventSink {
    present: KeyedVec<DomainId, EnumSet<DomainEvent>>,
    events: Vec<(DomainEvent, DomainId)>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn event_occurred(&mut self, event: DomainEvent, domain: DomainId) {
        let elem = &mut self.present[domain];

        if elem.insert(event) {
            self.events.push((event, domain));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (DomainEvent, DomainId)> + '_ {
        self.events.drain(..).inspect(|&(event, domain)| {
            let _ = self.present[domain].remove(event);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::StorageKey;

    #[test]
    fn the_default_sink_is_empty() {
        let mut sink = EventSink::default();

        assert!(sink.is_empty());
        assert_eq!(0, sink.drain().count());
    }

    #[test]
    fn duplicate_events_are_captured_once() {
        let mut sink = EventSink::default();
        sink.grow();
        sink.grow();

        sink.event_occurred(DomainEvent::LowerBound, DomainId::create_from_index(0));
        sink.event_occurred(DomainEvent::LowerBound, DomainId::create_from_index(0));
        sink.event_occurred(DomainEvent::UpperBound, DomainId::create_from_index(1));

        let events = sink.drain().collect::<Vec<_>>();

        assert_eq!(
            vec![
                (DomainEvent::LowerBound, DomainId::create_from_index(0)),
                (DomainEvent::UpperBound, DomainId::create_from_index(1)),
            ],
            events
        );
    }

    #[test]
    fn after_draining_events_can_be_captured_again() {
        let mut sink = EventSink::default();
        sink.grow();

        sink.event_occurred(DomainEvent::Assign, DomainId::create_from_index(0));
        let _ = sink.drain().collect::<Vec<_>>();
        sink.event_occurred(DomainEvent::Assign, DomainId::create_from_index(0));

        assert_eq!(1, sink.drain().count());
    }
}
