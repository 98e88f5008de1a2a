use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::contexts::NotificationContext;
use super::Domains;
use super::PropagationContext;
use crate::basic_types::PropagationStatusCP;
#[cfg(doc)]
use crate::create_statistics_struct;
use crate::engine::notifications::DomainEvent;
#[cfg(doc)]
use crate::packing_asserts::PACKING_ASSERT_EXTREME;
#[cfg(doc)]
use crate::propagation::PropagatorConstructor;
use crate::propagation::LocalId;
#[cfg(doc)]
use crate::state::State;
use crate::statistics::StatisticLogger;

// We need to use this to cast from `Box<dyn Propagator>` to the concrete propagator; rust
// inherently does not allow downcasting from the trait definition to its concrete type.
impl_downcast!(Propagator);

/// All propagators implement the [`Propagator`] trait.
///
/// Propagators are created by a [`PropagatorConstructor`], which registers the variables of the
/// propagator and allocates its trailed state. Afterwards the [`State`] calls
/// [`Propagator::notify`] for every event the propagator subscribed to, and
/// [`Propagator::propagate`] whenever the propagator is enqueued.
pub trait Propagator: Downcast {
    /// Return the name of the propagator.
    ///
    /// This is a convenience method that is used for printing.
    fn name(&self) -> &str;

    /// A propagation method that is used to help debugging.
    ///
    /// This method propagates without relying on any internal data structures, hence the
    /// immutable &self parameter. It is usually best to implement this propagation method in
    /// the simplest but correct way. When the assert level is set to
    /// [`PACKING_ASSERT_EXTREME`] this method is used to check that the incremental
    /// propagation did not miss anything at a fixpoint.
    fn propagate_from_scratch(&self, context: PropagationContext) -> PropagationStatusCP;

    /// Propagate method that will be called during search.
    ///
    /// The propagator performs its changes through [`PropagationContext::post`] and returns an
    /// error if it detects that the current domains admit no solution. It is the responsibility
    /// of the [`State`] to restore the domains after a conflict.
    ///
    /// By default this method calls [`Propagator::propagate_from_scratch`].
    fn propagate(&mut self, context: PropagationContext) -> PropagationStatusCP {
        self.propagate_from_scratch(context)
    }

    /// Called when an event happens to one of the variables the propagator is subscribed to. It
    /// indicates whether the provided event should cause the propagator to be enqueued.
    ///
    /// This can be used to incrementally maintain data structures or perform propagations, and
    /// should only be used for computationally cheap logic. Expensive computation should be
    /// performed in [`Propagator::propagate`].
    ///
    /// By default the propagator is always enqueued for every event it subscribed to.
    fn notify(
        &mut self,
        _context: NotificationContext,
        _local_id: LocalId,
        _event: DomainEvent,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    /// Called each time the [`State`] backtracks; the propagator can then discard any
    /// non-trailed scratch data. Trailed values have already been restored at this point.
    fn synchronise(&mut self, _domains: Domains) {}

    /// Returns the priority of the propagator represented as an enum. Lower priorities are
    /// propagated first.
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }

    /// Logs statistics of the propagator using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro!
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// Indicator of what to do when a propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}

/// The priority of a propagator, used for determining the order in which propagators will be
/// called.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}
