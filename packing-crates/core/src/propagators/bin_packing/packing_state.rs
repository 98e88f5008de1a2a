use fixedbitset::FixedBitSet;
use log::trace;

use super::big_items::BigItems;
use super::BigItemsPolicy;
use crate::basic_types::PropagationStatusCP;
use crate::create_statistics_struct;
use crate::engine::variables::DomainId;
use crate::engine::EmptyDomain;
use crate::packing_asserts::packing_assert_moderate;
use crate::packing_asserts::packing_assert_simple;
use crate::predicate;
use crate::propagation::Domains;
use crate::propagation::DomainEvents;
use crate::propagation::EnqueueDecision;
use crate::propagation::HasAssignments;
use crate::propagation::HasTrailedValues;
use crate::propagation::LocalId;
use crate::propagation::ManipulateTrailedValues;
use crate::propagation::NotificationContext;
use crate::propagation::PropagationContext;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;
use crate::propagation::TrailedBitSet;
use crate::propagation::TrailedInteger;

create_statistics_struct!(
    /// Statistics which are logged for every bin-packing propagator.
    BinPackingStatistics {
    /// The number of times the propagator was called.
    num_calls: usize,
    /// The number of bins removed from the domain of an item because the item does not fit.
    num_removals: usize,
    /// The number of items assigned to a bin because the bin cannot reach its minimum load
    /// without them.
    num_forced_assignments: usize,
    num_bound_tightenings: usize,
    /// The number of times the big items of a bin were extended after its free space shrank.
    num_big_item_extensions: usize,
    num_conflicts: usize,
});

/// The incremental bookkeeping of a bin-packing constraint over one or more dimensions.
///
/// Items are indexed in non-increasing order of their size in the first dimension. Per bin the
/// state tracks the candidate items (those which may still be placed in the bin but are not
/// fixed to it), the required load (the sizes of the items fixed to it), and the total load (the
/// required load plus the candidates, possibly sharpened by [`BigItems`]). All of it lives in
/// trailed storage and is restored when the state backtracks.
///
/// The running sums of the load bounds are only updated by the writes of the propagator itself;
/// a load bound which moves for any other reason marks the sums as stale, after which they are
/// recomputed on the next call.
#[derive(Debug)]
pub(crate) struct PackingState {
    pub(super) items: Box<[DomainId]>,
    /// The size of every item per dimension, indexed as `sizes[dimension][item]`.
    pub(super) sizes: Box<[Box<[i64]>]>,
    /// The load variable of every bin per dimension, indexed as `loads[dimension][bin]`.
    pub(super) loads: Box<[Box<[DomainId]>]>,
    pub(super) total_item_size: Box<[i64]>,

    pub(super) candidates: Box<[TrailedBitSet]>,
    /// The bins with at least one candidate.
    pub(super) available_bins: TrailedBitSet,
    pub(super) required_load: Box<[Box<[TrailedInteger]>]>,
    pub(super) total_load: Box<[Box<[TrailedInteger]>]>,

    /// The load bounds as they were last observed by the propagator.
    recorded_lower_bounds: Box<[Box<[TrailedInteger]>]>,
    recorded_upper_bounds: Box<[Box<[TrailedInteger]>]>,
    pub(super) sum_lower_bounds: Box<[TrailedInteger]>,
    pub(super) sum_upper_bounds: Box<[TrailedInteger]>,

    pub(super) big_items: Option<BigItems>,
    /// The bins whose big items may be extended; only used with [`BigItemsPolicy::Dynamic`].
    pub(super) bins_to_extend: FixedBitSet,

    pending_items: Vec<usize>,
    is_pending: FixedBitSet,
    load_bounds_changed: bool,
    requires_initial_sync: bool,

    pub(super) statistics: BinPackingStatistics,
}

impl PackingState {
    pub(super) fn new(
        context: &mut PropagatorConstructorContext,
        items: Box<[DomainId]>,
        sizes: Box<[Box<[i64]>]>,
        loads: Box<[Box<[DomainId]>]>,
        big_items_policy: BigItemsPolicy,
    ) -> PackingState {
        packing_assert_simple!(
            context.get_checkpoint() == 0,
            "bin-packing propagators can only be installed at the root"
        );
        packing_assert_simple!(!sizes.is_empty() && sizes.len() == loads.len());

        let num_items = items.len();
        let num_bins = loads[0].len();
        let num_dimensions = sizes.len();

        packing_assert_simple!(sizes.iter().all(|sizes| sizes.len() == num_items));
        packing_assert_simple!(loads.iter().all(|loads| loads.len() == num_bins));
        packing_assert_simple!(sizes.iter().flat_map(|sizes| sizes.iter()).all(|&size| size >= 0));
        packing_assert_simple!(
            sizes[0].windows(2).all(|pair| pair[0] >= pair[1]),
            "items should be sorted by non-increasing size"
        );
        packing_assert_simple!(
            num_dimensions == 1 || big_items_policy == BigItemsPolicy::Disabled,
            "big items are only supported with a single dimension"
        );

        for (index, &item) in items.iter().enumerate() {
            context.register(item, DomainEvents::ANY_INT, LocalId::from(index as u32));
        }
        for (dimension, loads) in loads.iter().enumerate() {
            for (bin, &load) in loads.iter().enumerate() {
                context.register(
                    load,
                    DomainEvents::BOUNDS,
                    load_local_id(num_items, num_bins, dimension, bin),
                );
            }
        }

        let candidates = (0..num_bins)
            .map(|_| context.new_trailed_bit_set(num_items))
            .collect::<Box<[_]>>();
        let available_bins = context.new_trailed_bit_set(num_bins);

        let mut required_load = vec![vec![0_i64; num_bins]; num_dimensions];
        let mut total_load = vec![vec![0_i64; num_bins]; num_dimensions];
        for (index, &item) in items.iter().enumerate() {
            let bins = context
                .iterate_domain(item)
                .filter_map(|value| usize::try_from(value).ok())
                .filter(|&bin| bin < num_bins)
                .collect::<Vec<_>>();
            let is_fixed = context.is_fixed(item);

            for bin in bins {
                for dimension in 0..num_dimensions {
                    total_load[dimension][bin] += sizes[dimension][index];
                    if is_fixed {
                        required_load[dimension][bin] += sizes[dimension][index];
                    }
                }
                if !is_fixed {
                    let _ = candidates[bin].insert(context.trailed_values_mut(), index);
                }
            }
        }
        for (bin, candidates) in candidates.iter().enumerate() {
            if !candidates.is_empty(context.trailed_values()) {
                let _ = available_bins.insert(context.trailed_values_mut(), bin);
            }
        }

        let required_load = allocate_matrix(context, &required_load);
        let total_load = allocate_matrix(context, &total_load);

        let lower_bounds = loads
            .iter()
            .map(|loads| {
                loads
                    .iter()
                    .map(|&load| context.lower_bound(load) as i64)
                    .collect()
            })
            .collect::<Vec<Vec<_>>>();
        let upper_bounds = loads
            .iter()
            .map(|loads| {
                loads
                    .iter()
                    .map(|&load| context.upper_bound(load) as i64)
                    .collect()
            })
            .collect::<Vec<Vec<_>>>();
        let sum_lower_bounds = lower_bounds
            .iter()
            .map(|bounds| context.new_trailed_integer(bounds.iter().sum()))
            .collect();
        let sum_upper_bounds = upper_bounds
            .iter()
            .map(|bounds| context.new_trailed_integer(bounds.iter().sum()))
            .collect();
        let recorded_lower_bounds = allocate_matrix(context, &lower_bounds);
        let recorded_upper_bounds = allocate_matrix(context, &upper_bounds);

        let big_items = match big_items_policy {
            BigItemsPolicy::Disabled => None,
            BigItemsPolicy::Static | BigItemsPolicy::Dynamic => {
                Some(BigItems::new(context, num_bins, big_items_policy))
            }
        };

        let total_item_size = sizes.iter().map(|sizes| sizes.iter().sum()).collect();

        let state = PackingState {
            items,
            sizes,
            loads,
            total_item_size,
            candidates,
            available_bins,
            required_load,
            total_load,
            recorded_lower_bounds,
            recorded_upper_bounds,
            sum_lower_bounds,
            sum_upper_bounds,
            big_items,
            bins_to_extend: FixedBitSet::with_capacity(num_bins),
            pending_items: Vec::new(),
            is_pending: FixedBitSet::with_capacity(num_items),
            load_bounds_changed: false,
            requires_initial_sync: true,
            statistics: BinPackingStatistics::default(),
        };

        // Both policies start from the partition at installation; only the dynamic one extends it
        // afterwards.
        for bin in 0..num_bins {
            let _ = state.extend_big_items(context, bin);
        }

        state
    }

    pub(super) fn num_items(&self) -> usize {
        self.items.len()
    }

    pub(super) fn num_bins(&self) -> usize {
        self.loads[0].len()
    }

    pub(super) fn num_dimensions(&self) -> usize {
        self.sizes.len()
    }

    pub(super) fn size(&self, dimension: usize, item: usize) -> i64 {
        self.sizes[dimension][item]
    }

    fn extends_big_items(&self) -> bool {
        self.big_items
            .as_ref()
            .is_some_and(|big_items| big_items.policy == BigItemsPolicy::Dynamic)
    }

    /// Marks `bin` for a new walk over its big items, since its free space or its candidates
    /// changed.
    fn mark_for_extension(&mut self, bin: usize) {
        if self.extends_big_items() {
            self.bins_to_extend.insert(bin);
        }
    }
}

/// Operations which keep the bookkeeping in line with the domains.
impl PackingState {
    /// Moves `item` from the candidates of `bin` into its required load, and raises the lower
    /// bounds of the loads of `bin` to the new required load.
    ///
    /// Does nothing if `item` is not a candidate of `bin`.
    pub(super) fn assign_item(
        &mut self,
        context: &mut PropagationContext,
        item: usize,
        bin: usize,
    ) -> PropagationStatusCP {
        if !self.candidates[bin].contains(context.trailed_values(), item) {
            return Ok(());
        }

        let total_load_delta = self.assignment_delta(context, item, bin)?;

        let _ = self.candidates[bin].remove(context.trailed_values_mut(), item);
        for dimension in 0..self.num_dimensions() {
            context.add_assign(
                self.required_load[dimension][bin],
                self.size(dimension, item),
            );
        }
        context.add_assign(self.total_load[0][bin], total_load_delta);
        self.after_assignment(context, item, bin);
        self.leave_if_without_candidates(context, bin);
        self.mark_for_extension(bin);

        for dimension in 0..self.num_dimensions() {
            let required_load = context.value(self.required_load[dimension][bin]);
            let _ = self.tighten_lower_bound(context, dimension, bin, required_load)?;
            let total_load = context.value(self.total_load[dimension][bin]);
            let _ = self.tighten_upper_bound(context, dimension, bin, total_load)?;
        }

        Ok(())
    }

    /// Removes `item` from the candidates of `bin`, and lowers the upper bounds of the loads of
    /// `bin` to the new total load.
    ///
    /// Does nothing if `item` is not a candidate of `bin`.
    pub(super) fn remove_item(
        &mut self,
        context: &mut PropagationContext,
        item: usize,
        bin: usize,
    ) -> Result<(), EmptyDomain> {
        if !self.candidates[bin].contains(context.trailed_values(), item) {
            return Ok(());
        }

        for dimension in 0..self.num_dimensions() {
            let delta = self.removal_delta(context.trailed_values(), dimension, item, bin);
            context.add_assign(self.total_load[dimension][bin], delta);
        }
        let _ = self.candidates[bin].remove(context.trailed_values_mut(), item);
        self.after_removal(context, bin);
        self.leave_if_without_candidates(context, bin);
        self.mark_for_extension(bin);

        for dimension in 0..self.num_dimensions() {
            let total_load = context.value(self.total_load[dimension][bin]);
            let _ = self.tighten_upper_bound(context, dimension, bin, total_load)?;
        }

        Ok(())
    }

    fn leave_if_without_candidates(&self, context: &mut PropagationContext, bin: usize) {
        if self.candidates[bin].is_empty(context.trailed_values()) {
            let _ = self
                .available_bins
                .remove(context.trailed_values_mut(), bin);
        }
    }

    /// Brings the bookkeeping of `item` in line with its domain.
    pub(super) fn synchronise_item(
        &mut self,
        context: &mut PropagationContext,
        item: usize,
    ) -> PropagationStatusCP {
        let variable = self.items[item];

        for bin in 0..self.num_bins() {
            if self.candidates[bin].contains(context.trailed_values(), item)
                && !context.contains(variable, bin as i32)
            {
                self.remove_item(context, item, bin)?;
            }
        }

        if let Some(bin) = context
            .fixed_value(variable)
            .and_then(|value| usize::try_from(value).ok())
            .filter(|&bin| bin < self.num_bins())
        {
            self.assign_item(context, item, bin)?;
        }

        Ok(())
    }

    /// Whether the bookkeeping of `item` already reflects its domain.
    fn is_item_synchronised(&self, domains: &impl ReadDomains, item: usize) -> bool {
        let variable = self.items[item];
        let fixed_value = domains.fixed_value(variable);

        (0..self.num_bins()).all(|bin| {
            !self.candidates[bin].contains(domains.trailed_values(), item)
                || (domains.contains(variable, bin as i32) && fixed_value != Some(bin as i32))
        })
    }

    /// Raises the lower bound of the load of `bin` in `dimension` to `bound`; returns whether
    /// the bound changed.
    pub(super) fn tighten_lower_bound(
        &mut self,
        context: &mut PropagationContext,
        dimension: usize,
        bin: usize,
        bound: i64,
    ) -> Result<bool, EmptyDomain> {
        let load = self.loads[dimension][bin];
        if bound <= context.lower_bound(load) as i64 {
            return Ok(false);
        }
        if bound > context.upper_bound(load) as i64 {
            return Err(EmptyDomain);
        }

        trace!("Raising the load of bin {bin} in dimension {dimension} to at least {bound}");
        context.post(predicate![load >= bound as i32])?;
        self.record_load_bounds(context, dimension, bin);
        self.statistics.num_bound_tightenings += 1;

        Ok(true)
    }

    /// Lowers the upper bound of the load of `bin` in `dimension` to `bound`; returns whether
    /// the bound changed.
    pub(super) fn tighten_upper_bound(
        &mut self,
        context: &mut PropagationContext,
        dimension: usize,
        bin: usize,
        bound: i64,
    ) -> Result<bool, EmptyDomain> {
        let load = self.loads[dimension][bin];
        if bound >= context.upper_bound(load) as i64 {
            return Ok(false);
        }
        if bound < context.lower_bound(load) as i64 {
            return Err(EmptyDomain);
        }

        trace!("Lowering the load of bin {bin} in dimension {dimension} to at most {bound}");
        context.post(predicate![load <= bound as i32])?;
        self.record_load_bounds(context, dimension, bin);
        self.statistics.num_bound_tightenings += 1;
        if dimension == 0 {
            self.mark_for_extension(bin);
        }

        Ok(true)
    }

    /// Stores the current bounds of the load of `bin` in `dimension`, and updates the running
    /// sums with the difference to the previously recorded bounds.
    fn record_load_bounds(&self, context: &mut impl HasTrailedValues, dimension: usize, bin: usize) {
        let load = self.loads[dimension][bin];

        let lower_bound = context.lower_bound(load) as i64;
        let recorded_lower_bound = self.recorded_lower_bounds[dimension][bin];
        let difference = lower_bound - context.value(recorded_lower_bound);
        context.add_assign(self.sum_lower_bounds[dimension], difference);
        context.assign(recorded_lower_bound, lower_bound);

        let upper_bound = context.upper_bound(load) as i64;
        let recorded_upper_bound = self.recorded_upper_bounds[dimension][bin];
        let difference = upper_bound - context.value(recorded_upper_bound);
        context.add_assign(self.sum_upper_bounds[dimension], difference);
        context.assign(recorded_upper_bound, upper_bound);
    }

    /// Whether the running sums equal the sums of the recorded load bounds.
    pub(super) fn debug_are_load_sums_consistent(&self, domains: &impl ReadDomains) -> bool {
        (0..self.num_dimensions()).all(|dimension| {
            let recorded_lower_bounds = self.recorded_lower_bounds[dimension]
                .iter()
                .map(|&bound| domains.value(bound))
                .sum::<i64>();
            let recorded_upper_bounds = self.recorded_upper_bounds[dimension]
                .iter()
                .map(|&bound| domains.value(bound))
                .sum::<i64>();

            domains.value(self.sum_lower_bounds[dimension]) == recorded_lower_bounds
                && domains.value(self.sum_upper_bounds[dimension]) == recorded_upper_bounds
        })
    }

    fn is_load_bound_recorded(&self, domains: &impl ReadDomains, dimension: usize, bin: usize) -> bool {
        let load = self.loads[dimension][bin];
        domains.lower_bound(load) as i64
            == domains.value(self.recorded_lower_bounds[dimension][bin])
            && domains.upper_bound(load) as i64
                == domains.value(self.recorded_upper_bounds[dimension][bin])
    }
}

/// The interaction with the [`crate::state::State`].
impl PackingState {
    pub(super) fn notify(
        &mut self,
        context: NotificationContext,
        local_id: LocalId,
    ) -> EnqueueDecision {
        let index = local_id.unpack() as usize;

        if index < self.num_items() {
            if self.is_item_synchronised(&context, index) {
                return EnqueueDecision::Skip;
            }
            if !self.is_pending.put(index) {
                self.pending_items.push(index);
            }
            return EnqueueDecision::Enqueue;
        }

        let offset = index - self.num_items();
        let dimension = offset / self.num_bins();
        let bin = offset % self.num_bins();
        if self.is_load_bound_recorded(&context, dimension, bin) {
            EnqueueDecision::Skip
        } else {
            self.load_bounds_changed = true;
            if dimension == 0 {
                self.mark_for_extension(bin);
            }
            EnqueueDecision::Enqueue
        }
    }

    /// Discards the scratch data; the trailed bookkeeping has already been restored.
    ///
    /// Checkpoints are only created at a fixed point, so the restored big items need no walk.
    pub(super) fn synchronise(&mut self) {
        self.pending_items.clear();
        self.is_pending.clear();
        self.bins_to_extend.clear();
        self.load_bounds_changed = false;
    }

    pub(super) fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatusCP {
        self.statistics.num_calls += 1;

        let result = self.propagate_to_fixed_point(&mut context);
        if result.is_err() {
            self.statistics.num_conflicts += 1;
        }

        result
    }

    fn propagate_to_fixed_point(&mut self, context: &mut PropagationContext) -> PropagationStatusCP {
        if self.load_bounds_changed {
            self.recompute_load_sums(context);
            self.load_bounds_changed = false;
        }

        if self.requires_initial_sync {
            self.initial_sync(context)?;
            self.requires_initial_sync = false;
        }

        while let Some(item) = self.pending_items.pop() {
            self.is_pending.set(item, false);
            self.synchronise_item(context, item)?;
        }

        loop {
            self.propagate_global_load(context)?;
            if !self.propagate_knapsack(context)? {
                break;
            }
        }

        packing_assert_moderate!(self.debug_is_bookkeeping_consistent(&context.domains()));

        Ok(())
    }

    /// Restricts every item to the range of bins and writes the initial load bounds.
    fn initial_sync(&mut self, context: &mut PropagationContext) -> PropagationStatusCP {
        for bin in 0..self.num_bins() {
            self.mark_for_extension(bin);
        }

        let last_bin = self.num_bins() as i32 - 1;
        for item in 0..self.num_items() {
            let variable = self.items[item];
            context.post(predicate![variable >= 0])?;
            context.post(predicate![variable <= last_bin])?;
            self.synchronise_item(context, item)?;
        }

        for bin in 0..self.num_bins() {
            for dimension in 0..self.num_dimensions() {
                let required_load = context.value(self.required_load[dimension][bin]);
                let _ = self.tighten_lower_bound(context, dimension, bin, required_load)?;
                let total_load = context.value(self.total_load[dimension][bin]);
                let _ = self.tighten_upper_bound(context, dimension, bin, total_load)?;
            }
        }

        Ok(())
    }

    fn recompute_load_sums(&self, context: &mut PropagationContext) {
        trace!("Recomputing the load sums after an external bound change");
        for dimension in 0..self.num_dimensions() {
            for bin in 0..self.num_bins() {
                self.record_load_bounds(context, dimension, bin);
            }
        }
    }
}

/// Queries on the current bookkeeping.
impl PackingState {
    pub(super) fn required_load(&self, domains: &Domains, dimension: usize, bin: usize) -> i64 {
        domains.value(self.required_load[dimension][bin])
    }

    pub(super) fn total_load(&self, domains: &Domains, dimension: usize, bin: usize) -> i64 {
        domains.value(self.total_load[dimension][bin])
    }

    pub(super) fn free_space(&self, domains: &Domains, dimension: usize, bin: usize) -> i64 {
        domains.upper_bound(self.loads[dimension][bin]) as i64
            - self.required_load(domains, dimension, bin)
    }

    pub(super) fn candidates<'a>(
        &'a self,
        domains: &Domains<'a>,
        bin: usize,
    ) -> impl Iterator<Item = DomainId> + 'a {
        self.candidates[bin]
            .iter(domains.trailed_values)
            .map(|item| self.items[item])
    }

    pub(super) fn is_available(&self, domains: &Domains, bin: usize) -> bool {
        self.available_bins.contains(domains.trailed_values, bin)
    }

    /// Recomputes the bookkeeping from the domains and compares it to the incremental one.
    pub(super) fn debug_is_bookkeeping_consistent(&self, domains: &Domains) -> bool {
        let mut candidates = vec![FixedBitSet::with_capacity(self.num_items()); self.num_bins()];
        let mut required_load = vec![vec![0_i64; self.num_bins()]; self.num_dimensions()];

        for (item, &variable) in self.items.iter().enumerate() {
            let bins = domains
                .iterate_domain(variable)
                .filter_map(|value| usize::try_from(value).ok())
                .filter(|&bin| bin < self.num_bins());

            if domains.is_fixed(variable) {
                for bin in bins {
                    for (dimension, required_load) in required_load.iter_mut().enumerate() {
                        required_load[bin] += self.size(dimension, item);
                    }
                }
            } else {
                for bin in bins {
                    candidates[bin].insert(item);
                }
            }
        }

        (0..self.num_bins()).all(|bin| {
            let same_candidates = self.candidates[bin]
                .iter(domains.trailed_values)
                .eq(candidates[bin].ones());
            let same_availability = self.is_available(domains, bin) == !candidates[bin].is_clear();

            same_candidates
                && same_availability
                && (0..self.num_dimensions()).all(|dimension| {
                    let load = self.loads[dimension][bin];
                    let naive_total_load = required_load[dimension][bin]
                        + candidates[bin]
                            .ones()
                            .map(|item| self.size(dimension, item))
                            .sum::<i64>();
                    let total_load = self.total_load(domains, dimension, bin);

                    self.required_load(domains, dimension, bin) == required_load[dimension][bin]
                        && required_load[dimension][bin] <= domains.lower_bound(load) as i64
                        && domains.upper_bound(load) as i64 <= total_load
                        && total_load <= naive_total_load
                })
        })
    }
}

fn load_local_id(num_items: usize, num_bins: usize, dimension: usize, bin: usize) -> LocalId {
    LocalId::from((num_items + dimension * num_bins + bin) as u32)
}

fn allocate_matrix(
    context: &mut PropagatorConstructorContext,
    values: &[Vec<i64>],
) -> Box<[Box<[TrailedInteger]>]> {
    values
        .iter()
        .map(|row| {
            row.iter()
                .map(|&value| context.new_trailed_integer(value))
                .collect()
        })
        .collect()
}
