use clap::Parser;
use log::info;
use packing_core::constraints;
use packing_core::predicate;
use packing_core::propagators::bin_packing::BigItemsPolicy;
use packing_core::propagators::bin_packing::BinPackingOptions;
use packing_core::state::State;
use packing_core::statistics::configure_statistic_logging;
use packing_core::statistics::log_statistic_postfix;
use packing_core::variables::DomainId;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

/// Places randomly sized virtual machines onto identical nodes.
#[derive(Parser)]
struct Cli {
    /// The number of virtual machines.
    #[arg(long, default_value_t = 12)]
    items: usize,

    /// The number of nodes.
    #[arg(long, default_value_t = 4)]
    bins: usize,

    /// The capacity of every node.
    #[arg(long, default_value_t = 20)]
    capacity: i32,

    /// The seed of the instance generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// How candidates which cannot share a node are counted.
    #[arg(long, value_enum, default_value_t = BigItemsPolicy::Dynamic)]
    policy: BigItemsPolicy,

    /// Log the statistics of the propagator after the search.
    #[arg(long)]
    statistics: bool,
}

fn main() {
    env_logger::init();

    let Cli {
        items: num_items,
        bins: num_bins,
        capacity,
        seed,
        policy,
        statistics,
    } = Cli::parse();

    if num_bins == 0 || capacity < 1 {
        println!("Please provide at least one node with a positive capacity");
        return;
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let sizes = (0..num_items)
        .map(|_| rng.gen_range(1..=capacity / 2 + 1))
        .collect::<Vec<_>>();
    info!("Generated sizes {sizes:?}");

    let mut state = State::default();
    let items = (0..num_items)
        .map(|_| state.new_interval_variable(0, num_bins as i32 - 1))
        .collect::<Vec<_>>();
    let loads = (0..num_bins)
        .map(|_| state.new_interval_variable(0, capacity))
        .collect::<Vec<_>>();

    let result = constraints::bin_packing_with_options(
        &mut state,
        items.clone(),
        sizes.clone(),
        loads.clone(),
        BinPackingOptions::new(policy),
    );
    if let Err(error) = result {
        println!("The machines cannot be placed: {error}");
        return;
    }

    if search(&mut state, &items) {
        for (bin, &load) in loads.iter().enumerate() {
            let placed = items
                .iter()
                .enumerate()
                .filter(|&(_, &item)| state.fixed_value(item) == Some(bin as i32))
                .map(|(index, _)| format!("vm{index}({})", sizes[index]))
                .collect::<Vec<_>>();
            println!(
                "node {bin}: load {:>3} | {}",
                state.lower_bound(load),
                placed.join(" ")
            );
        }
    } else {
        println!("The machines cannot be placed.");
    }

    if statistics {
        configure_statistic_logging("%%", None, None, None);
        state.log_statistics(true);
        log_statistic_postfix();
    }
}

/// Depth-first search which places the item with the fewest remaining nodes first.
fn search(state: &mut State, items: &[DomainId]) -> bool {
    let Some(&item) = items
        .iter()
        .filter(|&&item| state.fixed_value(item).is_none())
        .min_by_key(|&&item| domain_size(state, item))
    else {
        return true;
    };

    let values = (state.lower_bound(item)..=state.upper_bound(item))
        .filter(|&value| state.contains(item, value))
        .collect::<Vec<_>>();

    for value in values {
        let checkpoint = state.get_checkpoint();
        state.new_checkpoint();

        let consistent = state.post(predicate![item == value]).is_ok()
            && state.propagate_to_fixed_point().is_ok();
        if consistent && search(state, items) {
            return true;
        }

        state.restore_to(checkpoint);
    }

    false
}

fn domain_size(state: &State, item: DomainId) -> usize {
    (state.lower_bound(item)..=state.upper_bound(item))
        .filter(|&value| state.contains(item, value))
        .count()
}
