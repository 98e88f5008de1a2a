use super::packing_state::PackingState;
use super::BigItemsPolicy;
use crate::basic_types::Inconsistency;
use crate::engine::EmptyDomain;
use crate::engine::TrailedValues;
use crate::propagation::HasAssignments;
use crate::propagation::HasTrailedValues;
use crate::propagation::ManipulateTrailedValues;
use crate::propagation::PropagationContext;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;
use crate::propagation::TrailedInteger;

/// Per bin, a prefix of the item order in which no two candidates fit in the bin together.
///
/// The candidates of a bin with an index below `first_small` are its big items. At most one of
/// them ends up in the bin, so only the largest big candidate counts towards the total load. Once
/// a big item is placed in the bin, the remaining big candidates do not count at all.
///
/// The prefix only grows while the search descends: the free space of a bin can only shrink, so
/// two items which did not fit together keep not fitting together.
#[derive(Debug)]
pub(super) struct BigItems {
    pub(super) policy: BigItemsPolicy,
    first_small: Box<[TrailedInteger]>,
    /// Set to 1 while a big item is placed in the bin and big candidates remain.
    big_item_required: Box<[TrailedInteger]>,
}

impl BigItems {
    pub(super) fn new(
        context: &mut PropagatorConstructorContext,
        num_bins: usize,
        policy: BigItemsPolicy,
    ) -> BigItems {
        BigItems {
            policy,
            first_small: (0..num_bins)
                .map(|_| context.new_trailed_integer(0))
                .collect(),
            big_item_required: (0..num_bins)
                .map(|_| context.new_trailed_integer(0))
                .collect(),
        }
    }
}

impl PackingState {
    fn first_small(&self, trailed_values: &TrailedValues, bin: usize) -> usize {
        self.big_items.as_ref().map_or(0, |big_items| {
            trailed_values.read(big_items.first_small[bin]) as usize
        })
    }

    pub(super) fn is_big(&self, trailed_values: &TrailedValues, item: usize, bin: usize) -> bool {
        item < self.first_small(trailed_values, bin)
    }

    fn is_big_item_required(&self, trailed_values: &TrailedValues, bin: usize) -> bool {
        self.big_items.as_ref().is_some_and(|big_items| {
            trailed_values.read(big_items.big_item_required[bin]) != 0
        })
    }

    /// The largest big candidate of `bin`.
    fn first_big_candidate(&self, trailed_values: &TrailedValues, bin: usize) -> Option<usize> {
        self.candidates[bin]
            .first(trailed_values)
            .filter(|&item| self.is_big(trailed_values, item, bin))
    }

    /// The change of the total load of `bin` in `dimension` when `item` stops being one of its
    /// candidates without being placed in it.
    pub(super) fn removal_delta(
        &self,
        trailed_values: &TrailedValues,
        dimension: usize,
        item: usize,
        bin: usize,
    ) -> i64 {
        let size = self.size(dimension, item);
        if dimension != 0 || !self.is_big(trailed_values, item, bin) {
            return -size;
        }
        if self.is_big_item_required(trailed_values, bin)
            || self.first_big_candidate(trailed_values, bin) != Some(item)
        {
            return 0;
        }

        // The next big candidate takes over as the largest one.
        let next_size = self.candidates[bin]
            .next_after(trailed_values, item)
            .filter(|&next| self.is_big(trailed_values, next, bin))
            .map_or(0, |next| self.size(0, next));
        next_size - size
    }

    /// The change of the total load of `bin` in the first dimension when `item` is placed in it.
    ///
    /// Placing a big item in a bin which already holds one is a conflict.
    pub(super) fn assignment_delta(
        &self,
        context: &PropagationContext,
        item: usize,
        bin: usize,
    ) -> Result<i64, Inconsistency> {
        let trailed_values = context.trailed_values();
        if !self.is_big(trailed_values, item, bin) {
            return Ok(0);
        }
        if self.is_big_item_required(trailed_values, bin) {
            return Err(context
                .conflict("two mutually exclusive items are placed in the same bin")
                .into());
        }

        let largest_size = self
            .first_big_candidate(trailed_values, bin)
            .map_or(0, |largest| self.size(0, largest));
        Ok(self.size(0, item) - largest_size)
    }

    pub(super) fn after_assignment(
        &self,
        context: &mut impl HasTrailedValues,
        item: usize,
        bin: usize,
    ) {
        let Some(big_items) = &self.big_items else {
            return;
        };

        if self.is_big(context.trailed_values(), item, bin) {
            context.assign(big_items.big_item_required[bin], 1);
        }
        self.after_removal(context, bin);
    }

    pub(super) fn after_removal(&self, context: &mut impl HasTrailedValues, bin: usize) {
        let Some(big_items) = &self.big_items else {
            return;
        };

        let trailed_values = context.trailed_values();
        if self.is_big_item_required(trailed_values, bin)
            && self.first_big_candidate(trailed_values, bin).is_none()
        {
            context.assign(big_items.big_item_required[bin], 0);
        }
    }

    /// Extends the big items of `bin` with the candidates which do not fit next to the smallest
    /// big item, and returns by how much the total load decreased.
    ///
    /// Nothing changes while a big item is placed in the bin and big candidates remain.
    pub(super) fn extend_big_items(&self, context: &mut impl HasTrailedValues, bin: usize) -> i64 {
        let Some(big_items) = &self.big_items else {
            return 0;
        };

        if self.is_big_item_required(context.trailed_values(), bin) {
            if self
                .first_big_candidate(context.trailed_values(), bin)
                .is_some()
            {
                return 0;
            }
            context.assign(big_items.big_item_required[bin], 0);
        }

        let free_space = context.upper_bound(self.loads[0][bin]) as i64
            - context.value(self.required_load[0][bin]);
        let first_small = self.first_small(context.trailed_values(), bin);
        let candidates = &self.candidates[bin];

        let Some(mut anchor) = candidates
            .last_before(context.trailed_values(), first_small)
            .or_else(|| candidates.first(context.trailed_values()))
        else {
            return 0;
        };

        let mut decrease = 0;
        while let Some(candidate) = candidates.next_after(context.trailed_values(), anchor) {
            if self.size(0, anchor) + self.size(0, candidate) <= free_space {
                break;
            }

            context.assign(big_items.first_small[bin], candidate as i64 + 1);
            context.add_assign(self.total_load[0][bin], -self.size(0, candidate));
            decrease += self.size(0, candidate);
            anchor = candidate;
        }

        decrease
    }

    /// Extends the big items of `bin` and lowers the upper bound of its load to the decreased
    /// total load; returns whether the bound changed.
    pub(super) fn propagate_big_items(
        &mut self,
        context: &mut PropagationContext,
        bin: usize,
    ) -> Result<bool, EmptyDomain> {
        self.statistics.num_big_item_extensions += 1;
        if self.extend_big_items(context, bin) == 0 {
            return Ok(false);
        }

        let total_load = context.value(self.total_load[0][bin]);
        self.tighten_upper_bound(context, 0, bin, total_load)
    }
}

#[cfg(test)]
mod tests {
    use crate::constraints;
    use crate::predicate;
    use crate::propagators::bin_packing::BigItemsPolicy;
    use crate::propagators::bin_packing::BinPackingOptions;
    use crate::state::State;

    #[test]
    fn large_items_count_once_towards_the_total_load() {
        let mut state = State::default();
        let items = (0..3)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let loads = (0..2)
            .map(|_| state.new_interval_variable(0, 10))
            .collect::<Vec<_>>();

        let handle = constraints::bin_packing_with_options(
            &mut state,
            items.clone(),
            vec![8, 7, 1],
            loads.clone(),
            BinPackingOptions::new(BigItemsPolicy::Static),
        )
        .expect("consistent at the root");

        // Items of size 8 and 7 never share a bin, so a bin holds at most 8 + 1.
        let propagator = state.get_propagator(handle).expect("the handle is valid");
        let domains = state.get_domains();
        assert_eq!(9, propagator.total_load(domains, 0));
        assert_eq!(9, state.upper_bound(loads[0]));
        assert_eq!(9, state.upper_bound(loads[1]));
    }

    #[test]
    fn placing_a_big_item_excludes_the_other_big_items() {
        let mut state = State::default();
        let items = (0..3)
            .map(|_| state.new_interval_variable(0, 2))
            .collect::<Vec<_>>();
        let loads = (0..3)
            .map(|_| state.new_interval_variable(0, 10))
            .collect::<Vec<_>>();

        let _ = constraints::bin_packing_with_options(
            &mut state,
            items.clone(),
            vec![6, 6, 2],
            loads.clone(),
            BinPackingOptions::new(BigItemsPolicy::Dynamic),
        )
        .expect("consistent at the root");

        state.new_checkpoint();
        let _ = state
            .post(predicate![items[0] == 0])
            .expect("bin 0 is in the domain");
        assert!(state.propagate_to_fixed_point().is_ok());

        assert!(!state.contains(items[1], 0));
        assert!(state.contains(items[2], 0));
        assert_eq!(8, state.upper_bound(loads[0]));
        assert!(state.debug_fixed_point_propagation());
    }

    #[test]
    fn dynamic_policy_grows_the_big_items_when_space_shrinks() {
        let mut state = State::default();
        let items = (0..3)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let loads = (0..2)
            .map(|_| state.new_interval_variable(0, 12))
            .collect::<Vec<_>>();

        let handle = constraints::bin_packing_with_options(
            &mut state,
            items.clone(),
            vec![5, 4, 3],
            loads.clone(),
            BinPackingOptions::new(BigItemsPolicy::Dynamic),
        )
        .expect("consistent at the root");
        assert_eq!(12, state.upper_bound(loads[0]));

        state.new_checkpoint();
        let _ = state
            .post(predicate![loads[0] <= 8])
            .expect("the bound is consistent");
        assert!(state.propagate_to_fixed_point().is_ok());

        // With room for 8, items 5 and 4 exclude each other in bin 0; the bin can hold at most
        // 5 + 3.
        let propagator = state.get_propagator(handle).expect("the handle is valid");
        assert_eq!(8, propagator.total_load(state.get_domains(), 0));

        state.restore_to(0);
        let propagator = state.get_propagator(handle).expect("the handle is valid");
        assert_eq!(12, propagator.total_load(state.get_domains(), 0));
    }

    #[test]
    fn static_policy_keeps_the_installation_partition() {
        let mut state = State::default();
        let items = (0..3)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let loads = (0..2)
            .map(|_| state.new_interval_variable(0, 12))
            .collect::<Vec<_>>();

        let handle = constraints::bin_packing_with_options(
            &mut state,
            items.clone(),
            vec![5, 4, 3],
            loads.clone(),
            BinPackingOptions::new(BigItemsPolicy::Static),
        )
        .expect("consistent at the root");

        state.new_checkpoint();
        let _ = state
            .post(predicate![loads[0] <= 8])
            .expect("the bound is consistent");
        assert!(state.propagate_to_fixed_point().is_ok());

        let propagator = state.get_propagator(handle).expect("the handle is valid");
        assert_eq!(12, propagator.total_load(state.get_domains(), 0));
        assert!(state.debug_fixed_point_propagation());
    }
}
