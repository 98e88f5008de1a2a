use super::packing_state::PackingState;
use super::BigItemsPolicy;
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

/// The [`PropagatorConstructor`] for the [`VectorBinPackingPropagator`].
///
/// Sizes are given per dimension as `sizes[dimension][item]`, and loads as
/// `loads[dimension][bin]`. The items should be ordered by non-increasing size in the first
/// dimension.
#[derive(Clone, Debug)]
pub struct VectorBinPackingConstructor {
    items: Box<[DomainId]>,
    sizes: Box<[Box<[i32]>]>,
    loads: Box<[Box<[DomainId]>]>,
}

impl VectorBinPackingConstructor {
    pub fn new(
        items: impl Into<Box<[DomainId]>>,
        sizes: impl IntoIterator<Item = Vec<i32>>,
        loads: impl IntoIterator<Item = Vec<DomainId>>,
    ) -> Self {
        VectorBinPackingConstructor {
            items: items.into(),
            sizes: sizes.into_iter().map(Vec::into_boxed_slice).collect(),
            loads: loads.into_iter().map(Vec::into_boxed_slice).collect(),
        }
    }
}

impl PropagatorConstructor for VectorBinPackingConstructor {
    type PropagatorImpl = VectorBinPackingPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let sizes = self
            .sizes
            .iter()
            .map(|sizes| sizes.iter().map(|&size| size as i64).collect())
            .collect();

        VectorBinPackingPropagator {
            packing: PackingState::new(
                &mut context,
                self.items,
                sizes,
                self.loads,
                BigItemsPolicy::Disabled,
            ),
        }
    }
}

/// Propagator for bin-packing over several resource dimensions at once: in every dimension the
/// load of a bin equals the total size of the items placed in it.
///
/// An item is removed from a bin when it does not fit in any one dimension. It is placed in a bin
/// only when the bin falls short of its minimum load without it in every dimension.
#[derive(Debug)]
pub struct VectorBinPackingPropagator {
    packing: PackingState,
}

impl VectorBinPackingPropagator {
    pub fn free_space(&self, domains: Domains, dimension: usize, bin: usize) -> i64 {
        self.packing.free_space(&domains, dimension, bin)
    }

    pub fn required_load(&self, domains: Domains, dimension: usize, bin: usize) -> i64 {
        self.packing.required_load(&domains, dimension, bin)
    }

    pub fn total_load(&self, domains: Domains, dimension: usize, bin: usize) -> i64 {
        self.packing.total_load(&domains, dimension, bin)
    }

    pub fn candidates<'a>(
        &'a self,
        domains: Domains<'a>,
        bin: usize,
    ) -> impl Iterator<Item = DomainId> + 'a {
        self.packing.candidates(&domains, bin)
    }

    pub fn is_available(&self, domains: Domains, bin: usize) -> bool {
        self.packing.is_available(&domains, bin)
    }
}

impl Propagator for VectorBinPackingPropagator {
    fn name(&self) -> &str {
        "VectorBinPacking"
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

#[cfg(test)]
mod tests {
    use crate::constraints;
    use crate::predicate;
    use crate::state::State;

    #[test]
    fn item_is_rejected_when_one_dimension_overflows() {
        let mut state = State::default();
        let items = (0..2)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let cpu = vec![
            state.new_interval_variable(0, 8),
            state.new_interval_variable(0, 8),
        ];
        let memory = vec![
            state.new_interval_variable(0, 4),
            state.new_interval_variable(0, 16),
        ];

        let _ = constraints::vector_bin_packing(
            &mut state,
            items.clone(),
            vec![vec![2, 1], vec![8, 2]],
            vec![cpu, memory.clone()],
        )
        .expect("consistent at the root");

        // The first item has little cpu demand, but its memory only fits in bin 1.
        assert_eq!(Some(1), state.fixed_value(items[0]));
        assert!(state.contains(items[1], 0));
        assert!(state.lower_bound(memory[1]) >= 8);
        assert!(state.debug_fixed_point_propagation());
    }

    #[test]
    fn loads_follow_the_placed_items_in_every_dimension() {
        let mut state = State::default();
        let items = (0..3)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let cpu = (0..2)
            .map(|_| state.new_interval_variable(0, 10))
            .collect::<Vec<_>>();
        let memory = (0..2)
            .map(|_| state.new_interval_variable(0, 10))
            .collect::<Vec<_>>();

        let handle = constraints::vector_bin_packing(
            &mut state,
            items.clone(),
            vec![vec![4, 3, 1], vec![1, 5, 2]],
            vec![cpu.clone(), memory.clone()],
        )
        .expect("consistent at the root");

        state.new_checkpoint();
        for &item in &items {
            let _ = state
                .post(predicate![item == 0])
                .expect("bin 0 is in the domain");
        }
        assert!(state.propagate_to_fixed_point().is_ok());

        assert_eq!(Some(8), state.fixed_value(cpu[0]));
        assert_eq!(Some(8), state.fixed_value(memory[0]));
        assert_eq!(Some(0), state.fixed_value(cpu[1]));

        let propagator = state.get_propagator(handle).expect("the handle is valid");
        let domains = state.get_domains();
        assert_eq!(0, propagator.free_space(domains, 1, 0));
        assert!(!propagator.is_available(domains, 1));

        state.restore_to(0);
        let propagator = state.get_propagator(handle).expect("the handle is valid");
        assert_eq!(0, propagator.required_load(state.get_domains(), 1, 0));
        assert_eq!(8, propagator.total_load(state.get_domains(), 1, 0));
    }
}
