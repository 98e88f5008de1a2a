use fixedbitset::FixedBitSet;

use super::packing_state::PackingState;
use crate::basic_types::PropagationStatusCP;
use crate::engine::variables::DomainId;
use crate::engine::EmptyDomain;
use crate::predicate;
use crate::predicates::Predicate;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The load bookkeeping of a bin, derived from the domains without any trailed state.
struct NaiveBin {
    candidates: FixedBitSet,
    required_load: Box<[i64]>,
    total_load: Box<[i64]>,
}

impl PackingState {
    /// Applies the same rules as the incremental propagation, but derives the bookkeeping from
    /// the domains on every round and counts every candidate in full.
    pub(super) fn propagate_from_scratch(&self, mut context: PropagationContext) -> PropagationStatusCP {
        let last_bin = self.num_bins() as i32 - 1;
        for &item in self.items.iter() {
            context.post(predicate![item >= 0])?;
            context.post(predicate![item <= last_bin])?;
        }

        loop {
            let bins = self.derive_bins(&context);
            let mut changed = false;

            for (bin, naive_bin) in bins.iter().enumerate() {
                for dimension in 0..self.num_dimensions() {
                    let load = self.loads[dimension][bin];
                    changed |=
                        raise_lower_bound(&mut context, load, naive_bin.required_load[dimension])?;
                    changed |=
                        lower_upper_bound(&mut context, load, naive_bin.total_load[dimension])?;
                }
            }

            for dimension in 0..self.num_dimensions() {
                let total_item_size = self.total_item_size[dimension];
                let sum_lower_bounds = self.loads[dimension]
                    .iter()
                    .map(|&load| context.lower_bound(load) as i64)
                    .sum::<i64>();
                let sum_upper_bounds = self.loads[dimension]
                    .iter()
                    .map(|&load| context.upper_bound(load) as i64)
                    .sum::<i64>();

                if total_item_size > sum_upper_bounds || total_item_size < sum_lower_bounds {
                    return Err(context
                        .conflict("the loads cannot add up to the total size of the items")
                        .into());
                }

                for (bin, naive_bin) in bins.iter().enumerate() {
                    if naive_bin.candidates.is_clear() {
                        continue;
                    }

                    let load = self.loads[dimension][bin];
                    let lower_bound = naive_bin.required_load[dimension].max(
                        total_item_size - (sum_upper_bounds - context.upper_bound(load) as i64),
                    );
                    let upper_bound = naive_bin.total_load[dimension].min(
                        total_item_size - (sum_lower_bounds - context.lower_bound(load) as i64),
                    );
                    changed |= raise_lower_bound(&mut context, load, lower_bound)?;
                    changed |= lower_upper_bound(&mut context, load, upper_bound)?;
                }
            }

            for (bin, naive_bin) in bins.iter().enumerate() {
                for item in naive_bin.candidates.ones() {
                    let variable = self.items[item];

                    let fits = (0..self.num_dimensions()).all(|dimension| {
                        naive_bin.required_load[dimension] + self.size(dimension, item)
                            <= context.upper_bound(self.loads[dimension][bin]) as i64
                    });
                    let is_required = (0..self.num_dimensions()).all(|dimension| {
                        naive_bin.total_load[dimension] - self.size(dimension, item)
                            < context.lower_bound(self.loads[dimension][bin]) as i64
                    });

                    if !fits {
                        changed |=
                            post_if_changed(&mut context, predicate![variable != bin as i32])?;
                    } else if is_required {
                        changed |=
                            post_if_changed(&mut context, predicate![variable == bin as i32])?;
                    } else if self.num_dimensions() == 1 {
                        break;
                    }
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }

    fn derive_bins(&self, context: &PropagationContext) -> Vec<NaiveBin> {
        let mut bins = (0..self.num_bins())
            .map(|_| NaiveBin {
                candidates: FixedBitSet::with_capacity(self.num_items()),
                required_load: vec![0; self.num_dimensions()].into_boxed_slice(),
                total_load: vec![0; self.num_dimensions()].into_boxed_slice(),
            })
            .collect::<Vec<_>>();

        for (item, &variable) in self.items.iter().enumerate() {
            let is_fixed = context.is_fixed(variable);

            for value in context.iterate_domain(variable) {
                let naive_bin = &mut bins[value as usize];
                if !is_fixed {
                    naive_bin.candidates.insert(item);
                }
                for dimension in 0..self.num_dimensions() {
                    naive_bin.total_load[dimension] += self.size(dimension, item);
                    if is_fixed {
                        naive_bin.required_load[dimension] += self.size(dimension, item);
                    }
                }
            }
        }

        bins
    }
}

fn raise_lower_bound(
    context: &mut PropagationContext,
    load: DomainId,
    bound: i64,
) -> Result<bool, EmptyDomain> {
    if bound <= context.lower_bound(load) as i64 {
        return Ok(false);
    }
    if bound > context.upper_bound(load) as i64 {
        return Err(EmptyDomain);
    }

    context.post(predicate![load >= bound as i32])?;
    Ok(true)
}

fn lower_upper_bound(
    context: &mut PropagationContext,
    load: DomainId,
    bound: i64,
) -> Result<bool, EmptyDomain> {
    if bound >= context.upper_bound(load) as i64 {
        return Ok(false);
    }
    if bound < context.lower_bound(load) as i64 {
        return Err(EmptyDomain);
    }

    context.post(predicate![load <= bound as i32])?;
    Ok(true)
}

fn post_if_changed(
    context: &mut PropagationContext,
    predicate: Predicate,
) -> Result<bool, EmptyDomain> {
    if context.is_predicate_satisfied(predicate) {
        return Ok(false);
    }

    context.post(predicate)?;
    Ok(true)
}
