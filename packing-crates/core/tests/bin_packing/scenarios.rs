use packing_core::constraints;
use packing_core::predicate;
use packing_core::propagators::bin_packing::BigItemsPolicy;
use packing_core::propagators::bin_packing::BinPackingOptions;
use packing_core::state::State;

#[test]
fn two_large_items_exclude_each_other_in_a_small_bin() {
    let mut state = State::default();
    let items = (0..3)
        .map(|_| state.new_interval_variable(0, 1))
        .collect::<Vec<_>>();
    let loads = vec![
        state.new_interval_variable(0, 6),
        state.new_interval_variable(0, 20),
    ];

    let handle = constraints::bin_packing_with_options(
        &mut state,
        items.clone(),
        vec![5, 4, 3],
        loads.clone(),
        BinPackingOptions::new(BigItemsPolicy::Dynamic),
    )
    .expect("consistent at the root");

    // No two of the items fit in bin 0 together, so it holds at most the largest one.
    let propagator = state.get_propagator(handle).expect("the handle is valid");
    assert_eq!(5, propagator.total_load(state.get_domains(), 0));
    assert_eq!(5, state.upper_bound(loads[0]));

    state.new_checkpoint();
    let _ = state
        .post(predicate![items[0] == 0])
        .expect("bin 0 is in the domain");
    assert!(state.propagate_to_fixed_point().is_ok());

    assert_eq!(Some(1), state.fixed_value(items[1]));
    assert_eq!(Some(1), state.fixed_value(items[2]));
    assert_eq!(Some(5), state.fixed_value(loads[0]));
    assert_eq!(Some(7), state.fixed_value(loads[1]));
}

#[test]
fn removing_a_candidate_forces_the_rest_into_the_bin() {
    let mut state = State::default();
    let items = (0..3)
        .map(|_| state.new_interval_variable(0, 1))
        .collect::<Vec<_>>();
    let loads = vec![
        state.new_interval_variable(8, 20),
        state.new_interval_variable(0, 20),
    ];

    let _ = constraints::bin_packing_with_options(
        &mut state,
        items.clone(),
        vec![5, 4, 3],
        loads.clone(),
        BinPackingOptions::new(BigItemsPolicy::Disabled),
    )
    .expect("consistent at the root");

    // Without the item of size 5 the bin reaches at most 7.
    assert_eq!(Some(0), state.fixed_value(items[0]));
    assert!(state.contains(items[1], 0));
    assert!(state.contains(items[2], 0));

    state.new_checkpoint();
    let _ = state
        .post(predicate![items[2] != 0])
        .expect("bin 1 remains");
    assert!(state.propagate_to_fixed_point().is_ok());
    assert!(state.lower_bound(loads[0]) <= 9);
    state.restore_to(0);

    state.new_checkpoint();
    let _ = state
        .post(predicate![items[1] != 0])
        .expect("bin 1 remains");
    assert!(state.propagate_to_fixed_point().is_ok());
    assert_eq!(Some(0), state.fixed_value(items[2]));
    assert_eq!(Some(8), state.fixed_value(loads[0]));
    assert_eq!(Some(4), state.fixed_value(loads[1]));
}

#[test]
fn bins_without_candidates_become_unavailable() {
    let mut state = State::default();
    let items = (0..2)
        .map(|_| state.new_interval_variable(0, 2))
        .collect::<Vec<_>>();
    let loads = (0..3)
        .map(|_| state.new_interval_variable(0, 10))
        .collect::<Vec<_>>();

    let handle = constraints::bin_packing(&mut state, items.clone(), vec![3, 2], loads.clone())
        .expect("consistent at the root");
    {
        let propagator = state.get_propagator(handle).expect("the handle is valid");
        assert!(propagator.is_available(state.get_domains(), 2));
    }

    state.new_checkpoint();
    for &item in &items {
        let _ = state.post(predicate![item != 2]).expect("bins remain");
    }
    assert!(state.propagate_to_fixed_point().is_ok());

    let propagator = state.get_propagator(handle).expect("the handle is valid");
    let domains = state.get_domains();
    assert!(!propagator.is_available(domains, 2));
    assert_eq!(0, propagator.candidates(domains, 2).count());
    assert_eq!(Some(0), state.fixed_value(loads[2]));

    state.restore_to(0);
    let propagator = state.get_propagator(handle).expect("the handle is valid");
    assert!(propagator.is_available(state.get_domains(), 2));
}

#[test]
fn a_single_dimension_rejects_an_item() {
    let mut state = State::default();
    let items = (0..2)
        .map(|_| state.new_interval_variable(0, 1))
        .collect::<Vec<_>>();
    let cpu = (0..2)
        .map(|_| state.new_interval_variable(0, 10))
        .collect::<Vec<_>>();
    let memory = vec![
        state.new_interval_variable(0, 1),
        state.new_interval_variable(0, 10),
    ];

    let handle = constraints::vector_bin_packing(
        &mut state,
        items.clone(),
        vec![vec![2, 2], vec![4, 1]],
        vec![cpu.clone(), memory.clone()],
    )
    .expect("consistent at the root");

    // The first item fits in bin 0 in terms of cpu, but not in terms of memory.
    assert!(!state.contains(items[0], 0));
    assert!(state.contains(items[1], 0));

    // The rejection also takes the cpu of the first item out of the total load of bin 0, while
    // cpu alone would still have admitted it.
    let propagator = state.get_propagator(handle).expect("the handle is valid");
    let domains = state.get_domains();
    assert_eq!(0, propagator.required_load(domains, 0, 0));
    assert_eq!(2, propagator.total_load(domains, 0, 0));
    assert_eq!(2, propagator.free_space(domains, 0, 0));
    assert!(2 <= propagator.free_space(domains, 0, 0));
    assert_eq!(1, propagator.total_load(domains, 1, 0));
    assert_eq!(Some(1), state.fixed_value(items[0]));
}
