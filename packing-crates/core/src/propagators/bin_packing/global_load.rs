use super::packing_state::PackingState;
use crate::basic_types::PropagationStatusCP;
use crate::packing_asserts::packing_assert_advanced;
use crate::propagation::HasAssignments;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

impl PackingState {
    /// Tightens the loads of the available bins using that, in every dimension, the loads sum up
    /// to the total size of the items. Repeats until no bound changes.
    ///
    /// A bin has to take whatever the other bins cannot, and can take at most what the other
    /// bins do not need.
    pub(super) fn propagate_global_load(
        &mut self,
        context: &mut PropagationContext,
    ) -> PropagationStatusCP {
        loop {
            self.check_total_load(context)?;

            let mut changed = false;
            let bins = self
                .available_bins
                .iter(context.trailed_values())
                .collect::<Vec<_>>();

            for bin in bins {
                for dimension in 0..self.num_dimensions() {
                    let load = self.loads[dimension][bin];
                    let total_item_size = self.total_item_size[dimension];

                    let others_upper_bound = context.value(self.sum_upper_bounds[dimension])
                        - context.upper_bound(load) as i64;
                    let lower_bound = context
                        .value(self.required_load[dimension][bin])
                        .max(total_item_size - others_upper_bound);
                    changed |= self.tighten_lower_bound(context, dimension, bin, lower_bound)?;

                    let others_lower_bound = context.value(self.sum_lower_bounds[dimension])
                        - context.lower_bound(load) as i64;
                    let upper_bound = context
                        .value(self.total_load[dimension][bin])
                        .min(total_item_size - others_lower_bound);
                    changed |= self.tighten_upper_bound(context, dimension, bin, upper_bound)?;
                }
            }

            if !changed {
                packing_assert_advanced!(self.debug_are_load_sums_consistent(&*context));
                return Ok(());
            }
        }
    }

    fn check_total_load(&self, context: &PropagationContext) -> PropagationStatusCP {
        for dimension in 0..self.num_dimensions() {
            let total_item_size = self.total_item_size[dimension];

            if total_item_size > context.value(self.sum_upper_bounds[dimension]) {
                return Err(context
                    .conflict("the bins cannot hold the total size of the items")
                    .into());
            }
            if total_item_size < context.value(self.sum_lower_bounds[dimension]) {
                return Err(context
                    .conflict("the bins require more than the total size of the items")
                    .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::constraints;
    use crate::predicate;
    use crate::ConstraintOperationError;
    use crate::state::Conflict;
    use crate::state::State;

    #[test]
    fn loads_are_bounded_by_the_other_bins() {
        let mut state = State::default();
        let items = (0..3)
            .map(|_| state.new_interval_variable(0, 2))
            .collect::<Vec<_>>();
        let loads = [
            state.new_interval_variable(0, 4),
            state.new_interval_variable(0, 4),
            state.new_interval_variable(0, 100),
        ];

        let _ = constraints::bin_packing(&mut state, items, vec![3, 3, 3], loads.to_vec())
            .expect("consistent at the root");

        // The first two bins hold one item each at most, so the last bin takes at least one.
        assert_eq!(3, state.upper_bound(loads[0]));
        assert_eq!(3, state.lower_bound(loads[2]));
        assert_eq!(9, state.upper_bound(loads[2]));
        assert!(state.debug_fixed_point_propagation());
    }

    #[test]
    fn minimum_loads_exceeding_the_item_sizes_are_a_conflict() {
        let mut state = State::default();
        let items = (0..2)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let loads = (0..2)
            .map(|_| state.new_interval_variable(0, 10))
            .collect::<Vec<_>>();

        let _ = constraints::bin_packing(&mut state, items, vec![4, 3], loads.clone())
            .expect("consistent at the root");

        state.new_checkpoint();
        let _ = state
            .post(predicate![loads[0] >= 5])
            .expect("the bound is consistent");
        let _ = state
            .post(predicate![loads[1] >= 5])
            .expect("the bound is consistent");

        let result = state.propagate_to_fixed_point();
        assert!(matches!(
            result,
            Err(Conflict::Propagator(_)) | Err(Conflict::EmptyDomain(_))
        ));

        state.restore_to(0);
        assert_eq!(0, state.lower_bound(loads[0]));
        assert!(state.propagate_to_fixed_point().is_ok());
    }

    #[test]
    fn total_capacity_below_the_item_sizes_is_a_conflict() {
        let mut state = State::default();
        let items = (0..2)
            .map(|_| state.new_interval_variable(0, 1))
            .collect::<Vec<_>>();
        let loads = (0..2)
            .map(|_| state.new_interval_variable(0, 3))
            .collect::<Vec<_>>();

        let result = constraints::bin_packing(&mut state, items, vec![4, 3], loads);
        assert_eq!(Err(ConstraintOperationError::InfeasiblePropagator), result.map(|_| ()));
    }
}
