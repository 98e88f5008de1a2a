use std::cmp::Reverse;

use itertools::Itertools;
use log::debug;

use crate::propagation::PropagatorConstructor;
use crate::propagators::bin_packing::BinPackingConstructor;
use crate::propagators::bin_packing::BinPackingOptions;
use crate::propagators::bin_packing::BinPackingPropagator;
use crate::propagators::bin_packing::VectorBinPackingConstructor;
use crate::propagators::bin_packing::VectorBinPackingPropagator;
use crate::state::PropagatorHandle;
use crate::state::State;
use crate::variables::DomainId;
use crate::ConstraintOperationError;

/// Creates the [Bin-Packing](https://sofdem.github.io/gccat/gccat/Cbin_packing_capa.html)
/// constraint with the default [`BinPackingOptions`].
///
/// Item `i` of size `sizes[i]` is placed in the bin given by the value of `items[i]`, and the
/// load of every bin `b` equals the total size of the items placed in it. Bins are numbered
/// `0..loads.len()`; values of `items` outside of this range are removed.
///
/// The constraint can only be added at the root. The returned handle gives access to the
/// propagator, for example to query the free space of a bin.
pub fn bin_packing(
    state: &mut State,
    items: Vec<DomainId>,
    sizes: Vec<i32>,
    loads: Vec<DomainId>,
) -> Result<PropagatorHandle<BinPackingPropagator>, ConstraintOperationError> {
    bin_packing_with_options(state, items, sizes, loads, BinPackingOptions::default())
}

/// Creates the bin-packing constraint (see [`bin_packing`]) with the given options.
pub fn bin_packing_with_options(
    state: &mut State,
    items: Vec<DomainId>,
    sizes: Vec<i32>,
    loads: Vec<DomainId>,
    options: BinPackingOptions,
) -> Result<PropagatorHandle<BinPackingPropagator>, ConstraintOperationError> {
    check_sizes(&items, &sizes)?;

    let order = non_increasing_order(&sizes);
    let items = order.iter().map(|&index| items[index]).collect_vec();
    let sizes = order.iter().map(|&index| sizes[index]).collect_vec();

    install(
        state,
        BinPackingConstructor::new(items, sizes, loads, options),
    )
}

/// Creates the bin-packing constraint over several resources at once.
///
/// The sizes are given per resource as `sizes[dimension][item]`, and the loads as
/// `loads[dimension][bin]`. Every dimension should have the same number of bins.
///
/// # Example
/// ```
/// # use packing_core::constraints;
/// # use packing_core::state::State;
/// let mut state = State::default();
///
/// let vms = (0..2)
///     .map(|_| state.new_interval_variable(0, 1))
///     .collect::<Vec<_>>();
/// let cpu = (0..2)
///     .map(|_| state.new_interval_variable(0, 4))
///     .collect::<Vec<_>>();
/// let memory = vec![
///     state.new_interval_variable(0, 2),
///     state.new_interval_variable(0, 16),
/// ];
///
/// let _ = constraints::vector_bin_packing(
///     &mut state,
///     vms.clone(),
///     vec![vec![1, 2], vec![8, 1]],
///     vec![cpu, memory],
/// )
/// .expect("the machines fit at the root");
///
/// // The memory of the first machine only fits on the second node.
/// assert_eq!(Some(1), state.fixed_value(vms[0]));
/// ```
pub fn vector_bin_packing(
    state: &mut State,
    items: Vec<DomainId>,
    sizes: Vec<Vec<i32>>,
    loads: Vec<Vec<DomainId>>,
) -> Result<PropagatorHandle<VectorBinPackingPropagator>, ConstraintOperationError> {
    if sizes.is_empty() {
        return Err(ConstraintOperationError::NoDimensions);
    }
    if loads.len() != sizes.len() {
        return Err(ConstraintOperationError::MismatchedLengths {
            expected: sizes.len(),
            actual: loads.len(),
        });
    }
    for sizes in sizes.iter() {
        check_sizes(&items, sizes)?;
    }
    let num_bins = loads[0].len();
    if let Some(loads) = loads.iter().find(|loads| loads.len() != num_bins) {
        return Err(ConstraintOperationError::MismatchedLengths {
            expected: num_bins,
            actual: loads.len(),
        });
    }

    let order = non_increasing_order(&sizes[0]);
    let items = order.iter().map(|&index| items[index]).collect_vec();
    let sizes = sizes
        .iter()
        .map(|sizes| order.iter().map(|&index| sizes[index]).collect_vec())
        .collect_vec();

    install(state, VectorBinPackingConstructor::new(items, sizes, loads))
}

fn check_sizes(items: &[DomainId], sizes: &[i32]) -> Result<(), ConstraintOperationError> {
    if items.len() != sizes.len() {
        return Err(ConstraintOperationError::MismatchedLengths {
            expected: items.len(),
            actual: sizes.len(),
        });
    }

    if let Some((item, &size)) = sizes.iter().find_position(|&&size| size < 0) {
        return Err(ConstraintOperationError::NegativeSize { item, size });
    }

    let total_size = sizes.iter().map(|&size| size as i64).sum::<i64>();
    if total_size > i32::MAX as i64 {
        return Err(ConstraintOperationError::SizeOverflow);
    }

    Ok(())
}

/// The indices of `sizes` ordered by non-increasing size; equal sizes keep their order.
fn non_increasing_order(sizes: &[i32]) -> Vec<usize> {
    (0..sizes.len())
        .sorted_by_key(|&index| Reverse(sizes[index]))
        .collect()
}

fn install<Constructor>(
    state: &mut State,
    constructor: Constructor,
) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, ConstraintOperationError>
where
    Constructor: PropagatorConstructor,
    Constructor::PropagatorImpl: 'static,
{
    if state.get_checkpoint() != 0 {
        return Err(ConstraintOperationError::NotAtRoot);
    }

    let handle = state.add_propagator(constructor);
    state.propagate_to_fixed_point().map_err(|conflict| {
        debug!("The constraint is infeasible at the root: {conflict:?}");
        ConstraintOperationError::InfeasiblePropagator
    })?;

    Ok(handle)
}
