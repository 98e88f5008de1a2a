use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A description of the kinds of events that can happen on a domain variable.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// Event where a variable domain collapses to a single value.
    Assign,
    /// Event where a variable domain tightens the lower bound.
    LowerBound,
    /// Event where a variable domain tightens the upper bound.
    UpperBound,
    /// Event where a value is removed through a disequality.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::LowerBound => write!(f, "[Event:LB]"),
            DomainEvent::UpperBound => write!(f, "[Event:UB]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

/// The set of events a propagator subscribes to for one of its variables.
#[derive(Debug, Copy, Clone)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// DomainEvents with both lower and upper bound tightening (but not other value removal).
    pub const BOUNDS: DomainEvents =
        DomainEvents::new(enum_set!(DomainEvent::LowerBound | DomainEvent::UpperBound));
    /// DomainEvents with lower and upper bound tightening, assigning to a single value, and
    /// single value removal.
    pub const ANY_INT: DomainEvents = DomainEvents::new(enum_set!(
        DomainEvent::Assign | DomainEvent::LowerBound | DomainEvent::UpperBound | DomainEvent::Removal
    ));
    /// DomainEvents with only assigning to a single value.
    pub const ASSIGN: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::Assign));

    pub const fn new(events: EnumSet<DomainEvent>) -> DomainEvents {
        DomainEvents { events }
    }

    pub fn get_events(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}
