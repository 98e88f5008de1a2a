use itertools::Itertools;
use packing_core::constraints;
use packing_core::predicate;
use packing_core::propagators::bin_packing::BigItemsPolicy;
use packing_core::propagators::bin_packing::BinPackingOptions;
use packing_core::state::State;
use packing_core::variables::DomainId;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::search::enumerate_solutions;
use crate::search::Packing;

const NUM_INSTANCES: u64 = 200;

/// A small bin-packing instance which can be solved by enumerating every assignment.
#[derive(Debug)]
struct Instance {
    /// The bins each item may be placed in, in increasing order.
    allowed_bins: Vec<Vec<i32>>,
    /// Indexed as `sizes[dimension][item]`.
    sizes: Vec<Vec<i32>>,
    /// The initial load bounds, indexed as `capacities[dimension][bin]`.
    capacities: Vec<Vec<(i32, i32)>>,
}

impl Instance {
    fn generate(rng: &mut SmallRng, num_dimensions: usize) -> Instance {
        let num_items = rng.gen_range(1..=6);
        let num_bins = rng.gen_range(1..=3);

        let mut allowed_bins = Vec::with_capacity(num_items);
        for _ in 0..num_items {
            let mut bins = Vec::new();
            for bin in 0..num_bins {
                if rng.gen_bool(0.8) {
                    bins.push(bin);
                }
            }
            if bins.is_empty() {
                bins.push(rng.gen_range(0..num_bins));
            }
            allowed_bins.push(bins);
        }

        let mut sizes = Vec::with_capacity(num_dimensions);
        let mut capacities = Vec::with_capacity(num_dimensions);
        for _ in 0..num_dimensions {
            sizes.push((0..num_items).map(|_| rng.gen_range(0..=6)).collect());

            let mut bounds = Vec::with_capacity(num_bins as usize);
            for _ in 0..num_bins {
                let lower_bound = if rng.gen_bool(0.7) {
                    0
                } else {
                    rng.gen_range(1..=5)
                };
                let upper_bound = lower_bound + rng.gen_range(0..=10);
                bounds.push((lower_bound, upper_bound));
            }
            capacities.push(bounds);
        }

        Instance {
            allowed_bins,
            sizes,
            capacities,
        }
    }

    fn is_solution(&self, assignment: &[i32]) -> bool {
        self.capacities
            .iter()
            .zip(&self.sizes)
            .all(|(capacities, sizes)| {
                capacities
                    .iter()
                    .enumerate()
                    .all(|(bin, &(lower_bound, upper_bound))| {
                        let load = assignment
                            .iter()
                            .zip(sizes)
                            .filter(|&(&value, _)| value == bin as i32)
                            .map(|(_, &size)| size)
                            .sum::<i32>();
                        lower_bound <= load && load <= upper_bound
                    })
            })
    }

    fn brute_force(&self) -> Vec<Vec<i32>> {
        self.allowed_bins
            .iter()
            .map(|bins| bins.iter().copied())
            .multi_cartesian_product()
            .filter(|assignment| self.is_solution(assignment))
            .sorted()
            .collect()
    }

    fn create_variables(&self, state: &mut State) -> (Vec<DomainId>, Vec<Vec<DomainId>>) {
        let items = self
            .allowed_bins
            .iter()
            .map(|bins| {
                let lowest = bins[0];
                let highest = bins[bins.len() - 1];
                let item = state.new_interval_variable(lowest, highest);
                for value in lowest..=highest {
                    if !bins.contains(&value) {
                        let _ = state
                            .post(predicate![item != value])
                            .expect("the value lies strictly between the bounds");
                    }
                }
                item
            })
            .collect();

        let loads = self
            .capacities
            .iter()
            .map(|bounds| {
                bounds
                    .iter()
                    .map(|&(lower_bound, upper_bound)| {
                        state.new_interval_variable(lower_bound, upper_bound)
                    })
                    .collect()
            })
            .collect();

        (items, loads)
    }
}

fn check_against_brute_force(seed: u64, num_dimensions: usize, policy: BigItemsPolicy) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let instance = Instance::generate(&mut rng, num_dimensions);
    let expected = instance.brute_force();

    let mut state = State::default();
    let (items, loads) = instance.create_variables(&mut state);

    let result = if num_dimensions == 1 {
        constraints::bin_packing_with_options(
            &mut state,
            items.clone(),
            instance.sizes[0].clone(),
            loads[0].clone(),
            BinPackingOptions::new(policy),
        )
        .map(|handle| Packing::Single(handle, policy))
    } else {
        constraints::vector_bin_packing(
            &mut state,
            items.clone(),
            instance.sizes.clone(),
            loads.clone(),
        )
        .map(Packing::Vector)
    };

    match result {
        Ok(packing) => {
            let actual = enumerate_solutions(&mut state, packing, &items, &instance.sizes, &loads);
            assert_eq!(expected, actual, "seed {seed}: {instance:?}");
        }
        Err(_) => assert!(expected.is_empty(), "seed {seed}: {instance:?}"),
    }
}

#[test]
fn plain_propagation_finds_exactly_the_solutions() {
    for seed in 0..NUM_INSTANCES {
        check_against_brute_force(seed, 1, BigItemsPolicy::Disabled);
    }
}

#[test]
fn static_big_items_find_exactly_the_solutions() {
    for seed in 0..NUM_INSTANCES {
        check_against_brute_force(seed, 1, BigItemsPolicy::Static);
    }
}

#[test]
fn dynamic_big_items_find_exactly_the_solutions() {
    for seed in 0..NUM_INSTANCES {
        check_against_brute_force(seed, 1, BigItemsPolicy::Dynamic);
    }
}

#[test]
fn two_dimensions_find_exactly_the_solutions() {
    for seed in 0..NUM_INSTANCES {
        check_against_brute_force(seed, 2, BigItemsPolicy::Disabled);
    }
}

#[test]
fn three_dimensions_find_exactly_the_solutions() {
    for seed in 0..NUM_INSTANCES {
        check_against_brute_force(seed, 3, BigItemsPolicy::Disabled);
    }
}
