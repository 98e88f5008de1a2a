use log::trace;

use super::packing_state::PackingState;
use crate::basic_types::Inconsistency;
use crate::predicate;
use crate::propagation::HasAssignments;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

impl PackingState {
    /// Runs the per-bin reasoning on every available bin; returns whether any domain changed.
    ///
    /// The big items of a bin which is marked for extension are extended before its candidates
    /// are inspected.
    pub(super) fn propagate_knapsack(
        &mut self,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let mut changed = false;

        let bins = self
            .available_bins
            .iter(context.trailed_values())
            .collect::<Vec<_>>();
        for bin in bins {
            if !self.available_bins.contains(context.trailed_values(), bin) {
                continue;
            }

            if self.bins_to_extend.contains(bin) {
                self.bins_to_extend.set(bin, false);
                changed |= self.propagate_big_items(context, bin)?;
            }
            changed |= self.propagate_bin(context, bin)?;
        }

        Ok(changed)
    }

    /// Removes `bin` from the candidates which no longer fit in it, and places the candidates
    /// without which the bin cannot reach its minimum load.
    ///
    /// Candidates are visited from large to small. With a single dimension, the scan stops at the
    /// first small candidate which triggers neither rule, since the smaller ones cannot trigger a
    /// rule either. The order says nothing about the other dimensions, so with several dimensions
    /// every candidate is visited.
    fn propagate_bin(
        &mut self,
        context: &mut PropagationContext,
        bin: usize,
    ) -> Result<bool, Inconsistency> {
        let mut changed = false;

        let candidates = self.candidates[bin]
            .iter(context.trailed_values())
            .collect::<Vec<_>>();
        for item in candidates {
            if !self.candidates[bin].contains(context.trailed_values(), item) {
                continue;
            }
            let variable = self.items[item];

            if !self.fits(context, item, bin) {
                trace!("Item {item} does not fit in bin {bin}");
                context.post(predicate![variable != bin as i32])?;
                self.statistics.num_removals += 1;
                self.synchronise_item(context, item)?;
                changed = true;
            } else if self.is_required_for_minimum_load(context, item, bin) {
                trace!("Item {item} is required for the minimum load of bin {bin}");
                context.post(predicate![variable == bin as i32])?;
                self.statistics.num_forced_assignments += 1;
                self.synchronise_item(context, item)?;
                changed = true;
            } else if self.num_dimensions() == 1
                && !self.is_big(context.trailed_values(), item, bin)
            {
                break;
            }
        }

        Ok(changed)
    }

    /// Whether `item` fits next to the required load of `bin` in every dimension.
    fn fits(&self, context: &PropagationContext, item: usize, bin: usize) -> bool {
        (0..self.num_dimensions()).all(|dimension| {
            context.value(self.required_load[dimension][bin]) + self.size(dimension, item)
                <= context.upper_bound(self.loads[dimension][bin]) as i64
        })
    }

    /// Whether `bin` falls short of its minimum load in every dimension when `item` is not
    /// placed in it.
    fn is_required_for_minimum_load(
        &self,
        context: &PropagationContext,
        item: usize,
        bin: usize,
    ) -> bool {
        (0..self.num_dimensions()).all(|dimension| {
            let without_item = context.value(self.total_load[dimension][bin])
                + self.removal_delta(context.trailed_values(), dimension, item, bin);
            without_item < context.lower_bound(self.loads[dimension][bin]) as i64
        })
    }
}
