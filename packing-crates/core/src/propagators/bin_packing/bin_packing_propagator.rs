use super::packing_state::PackingState;
use super::BinPackingOptions;
use crate::basic_types::PropagationStatusCP;
use crate::engine::variables::DomainId;
use crate::propagation::DomainEvent;
use crate::propagation::Domains;
use crate::propagation::EnqueueDecision;
use crate::propagation::LocalId;
use crate::propagation::NotificationContext;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::Priority;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The [`PropagatorConstructor`] for the [`BinPackingPropagator`].
///
/// The items should be ordered by non-increasing size; the builders in
/// [`crate::constraints`] take care of this.
#[derive(Clone, Debug)]
pub struct BinPackingConstructor {
    items: Box<[DomainId]>,
    sizes: Box<[i32]>,
    loads: Box<[DomainId]>,
    options: BinPackingOptions,
}

impl BinPackingConstructor {
    pub fn new(
        items: impl Into<Box<[DomainId]>>,
        sizes: impl Into<Box<[i32]>>,
        loads: impl Into<Box<[DomainId]>>,
        options: BinPackingOptions,
    ) -> Self {
        BinPackingConstructor {
            items: items.into(),
            sizes: sizes.into(),
            loads: loads.into(),
            options,
        }
    }
}

impl PropagatorConstructor for BinPackingConstructor {
    type PropagatorImpl = BinPackingPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let sizes = self.sizes.iter().map(|&size| size as i64).collect();

        BinPackingPropagator {
            packing: PackingState::new(
                &mut context,
                self.items,
                Box::new([sizes]),
                Box::new([self.loads]),
                self.options.big_items,
            ),
        }
    }
}

/// Propagator for the bin-packing constraint: every item `i` is placed in the bin given by
/// `items[i]`, and the load of every bin `b` equals the total size of the items placed in it.
///
/// Besides pruning the bins an item may be placed in, the propagator bounds the loads using the
/// items which are already placed and those which may still be placed in a bin. Candidates which
/// cannot share a bin with each other are counted once (see
/// [`super::BigItemsPolicy`]).
#[derive(Debug)]
pub struct BinPackingPropagator {
    packing: PackingState,
}

impl BinPackingPropagator {
    /// The remaining capacity of `bin`: the upper bound of its load minus the sizes of the items
    /// placed in it.
    pub fn free_space(&self, domains: Domains, bin: usize) -> i64 {
        self.packing.free_space(&domains, 0, bin)
    }

    /// The total size of the items placed in `bin`.
    pub fn required_load(&self, domains: Domains, bin: usize) -> i64 {
        self.packing.required_load(&domains, 0, bin)
    }

    /// An upper bound on the load `bin` can still reach.
    pub fn total_load(&self, domains: Domains, bin: usize) -> i64 {
        self.packing.total_load(&domains, 0, bin)
    }

    /// The items which may still be placed in `bin` but are not yet placed in it, from large to
    /// small.
    pub fn candidates<'a>(
        &'a self,
        domains: Domains<'a>,
        bin: usize,
    ) -> impl Iterator<Item = DomainId> + 'a {
        self.packing.candidates(&domains, bin)
    }

    /// Whether any item may still be placed in `bin`.
    pub fn is_available(&self, domains: Domains, bin: usize) -> bool {
        self.packing.is_available(&domains, bin)
    }
}

impl Propagator for BinPackingPropagator {
    fn name(&self) -> &str {
        "BinPacking"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn notify(
        &mut self,
        context: NotificationContext,
        local_id: LocalId,
        _event: DomainEvent,
    ) -> EnqueueDecision {
        self.packing.notify(context, local_id)
    }

    fn synchronise(&mut self, _domains: Domains) {
        self.packing.synchronise();
    }

    fn propagate(&mut self, context: PropagationContext) -> PropagationStatusCP {
        self.packing.propagate(context)
    }

    fn propagate_from_scratch(&self, context: PropagationContext) -> PropagationStatusCP {
        self.packing.propagate_from_scratch(context)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.packing.statistics.log(statistic_logger);
    }
}
