use packing_core::predicate;
use packing_core::propagators::bin_packing::BigItemsPolicy;
use packing_core::propagators::bin_packing::BinPackingPropagator;
use packing_core::propagators::bin_packing::VectorBinPackingPropagator;
use packing_core::state::PropagatorHandle;
use packing_core::state::State;
use packing_core::variables::DomainId;

/// The bin-packing propagator under test, queried at every node of the search.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Packing {
    Single(PropagatorHandle<BinPackingPropagator>, BigItemsPolicy),
    Vector(PropagatorHandle<VectorBinPackingPropagator>),
}

/// The bookkeeping of one bin in one dimension, as reported by the propagator.
#[derive(Debug)]
struct BinView {
    required_load: i64,
    total_load: i64,
    candidates: Vec<DomainId>,
    is_available: bool,
}

impl Packing {
    fn view(self, state: &State, dimension: usize, bin: usize) -> BinView {
        let domains = state.get_domains();
        match self {
            Packing::Single(handle, _) => {
                let propagator = state.get_propagator(handle).expect("the handle is valid");
                BinView {
                    required_load: propagator.required_load(domains, bin),
                    total_load: propagator.total_load(domains, bin),
                    candidates: propagator.candidates(domains, bin).collect(),
                    is_available: propagator.is_available(domains, bin),
                }
            }
            Packing::Vector(handle) => {
                let propagator = state.get_propagator(handle).expect("the handle is valid");
                BinView {
                    required_load: propagator.required_load(domains, dimension, bin),
                    total_load: propagator.total_load(domains, dimension, bin),
                    candidates: propagator.candidates(domains, bin).collect(),
                    is_available: propagator.is_available(domains, bin),
                }
            }
        }
    }

    /// Whether the total load of a bin in `dimension` counts every candidate in full.
    fn counts_every_candidate(self, dimension: usize) -> bool {
        match self {
            Packing::Single(_, policy) => policy == BigItemsPolicy::Disabled || dimension > 0,
            Packing::Vector(_) => true,
        }
    }
}

/// Collects the values of `items` in every solution below the current checkpoint, using a
/// depth-first search which fixes the items in order.
///
/// Every node is checked against the bookkeeping of `packing`, and at every leaf the loads should
/// be fixed to the total size of the items placed in their bin.
pub(crate) fn enumerate_solutions(
    state: &mut State,
    packing: Packing,
    items: &[DomainId],
    sizes: &[Vec<i32>],
    loads: &[Vec<DomainId>],
) -> Vec<Vec<i32>> {
    let mut solutions = Vec::new();
    search(state, packing, items, sizes, loads, &mut solutions);
    solutions.sort();
    solutions
}

fn search(
    state: &mut State,
    packing: Packing,
    items: &[DomainId],
    sizes: &[Vec<i32>],
    loads: &[Vec<DomainId>],
    solutions: &mut Vec<Vec<i32>>,
) {
    check_node(state, packing, items, sizes, loads);

    let Some(&item) = items
        .iter()
        .find(|&&item| state.fixed_value(item).is_none())
    else {
        let solution = items
            .iter()
            .map(|&item| state.fixed_value(item).expect("every item is fixed"))
            .collect::<Vec<_>>();
        check_loads(state, &solution, sizes, loads);
        solutions.push(solution);
        return;
    };

    let bounds_before = snapshot_bounds(state, items, loads);
    let values = state.iterate_domain(item).collect::<Vec<_>>();
    for value in values {
        let checkpoint = state.get_checkpoint();
        state.new_checkpoint();

        let _ = state
            .post(predicate![item == value])
            .expect("the value is in the domain");
        if state.propagate_to_fixed_point().is_ok() {
            assert_narrowed(&bounds_before, &snapshot_bounds(state, items, loads));
            search(state, packing, items, sizes, loads, solutions);
        }

        state.restore_to(checkpoint);
        assert_eq!(bounds_before, snapshot_bounds(state, items, loads));
    }
}

/// Checks the bookkeeping of every bin against the domains at a fixed point.
fn check_node(
    state: &State,
    packing: Packing,
    items: &[DomainId],
    sizes: &[Vec<i32>],
    loads: &[Vec<DomainId>],
) {
    let size_of = |dimension: usize, variable: DomainId| {
        let index = items
            .iter()
            .position(|&item| item == variable)
            .expect("candidates are items");
        sizes[dimension][index] as i64
    };

    for (dimension, loads) in loads.iter().enumerate() {
        for (bin, &load) in loads.iter().enumerate() {
            let view = packing.view(state, dimension, bin);
            let lower_bound = state.lower_bound(load) as i64;
            let upper_bound = state.upper_bound(load) as i64;

            let placed = items
                .iter()
                .enumerate()
                .filter(|&(_, &item)| state.fixed_value(item) == Some(bin as i32))
                .map(|(index, _)| sizes[dimension][index] as i64)
                .sum::<i64>();
            assert_eq!(placed, view.required_load);

            let mut expected_candidates = items
                .iter()
                .copied()
                .filter(|&item| {
                    state.fixed_value(item).is_none() && state.contains(item, bin as i32)
                })
                .collect::<Vec<_>>();
            let mut candidates = view.candidates.clone();
            expected_candidates.sort();
            candidates.sort();
            assert_eq!(expected_candidates, candidates);
            assert_eq!(!candidates.is_empty(), view.is_available);

            assert!(
                view.required_load <= lower_bound
                    && lower_bound <= upper_bound
                    && upper_bound <= view.total_load,
                "bin {bin} in dimension {dimension}: {view:?} with load [{lower_bound}, {upper_bound}]"
            );

            let candidate_sizes = candidates
                .iter()
                .map(|&item| size_of(dimension, item))
                .sum::<i64>();
            if packing.counts_every_candidate(dimension) {
                assert_eq!(view.required_load + candidate_sizes, view.total_load);
            } else {
                assert!(view.total_load <= view.required_load + candidate_sizes);
            }
        }
    }

    // No candidate, large or small, is left for which a rule applies.
    let num_bins = loads[0].len();
    for bin in 0..num_bins {
        let views = (0..loads.len())
            .map(|dimension| packing.view(state, dimension, bin))
            .collect::<Vec<_>>();
        for &item in views[0].candidates.iter() {
            let fits = views.iter().zip(loads).enumerate().all(|(dimension, (view, loads))| {
                view.required_load + size_of(dimension, item)
                    <= state.upper_bound(loads[bin]) as i64
            });
            assert!(fits, "{item} does not fit in bin {bin} but keeps it");

            if (0..loads.len()).all(|dimension| packing.counts_every_candidate(dimension)) {
                let is_required = views.iter().zip(loads).enumerate().all(
                    |(dimension, (view, loads))| {
                        view.total_load - size_of(dimension, item)
                            < state.lower_bound(loads[bin]) as i64
                    },
                );
                assert!(!is_required, "{item} is needed in bin {bin} but is not placed");
            }
        }
    }
}

fn check_loads(state: &State, solution: &[i32], sizes: &[Vec<i32>], loads: &[Vec<DomainId>]) {
    for (dimension, loads) in loads.iter().enumerate() {
        for (bin, &load) in loads.iter().enumerate() {
            let expected = solution
                .iter()
                .zip(&sizes[dimension])
                .filter(|&(&value, _)| value == bin as i32)
                .map(|(_, &size)| size)
                .sum::<i32>();
            assert_eq!(Some(expected), state.fixed_value(load));
        }
    }
}

fn snapshot_bounds(state: &State, items: &[DomainId], loads: &[Vec<DomainId>]) -> Vec<(i32, i32)> {
    items
        .iter()
        .chain(loads.iter().flatten())
        .map(|&variable| (state.lower_bound(variable), state.upper_bound(variable)))
        .collect()
}

fn assert_narrowed(before: &[(i32, i32)], after: &[(i32, i32)]) {
    for (&(lower_before, upper_before), &(lower_after, upper_after)) in before.iter().zip(after) {
        assert!(lower_before <= lower_after && upper_after <= upper_before);
    }
}
