#[cfg(doc)]
use super::BinPackingPropagator;

/// How the [`BinPackingPropagator`] sharpens the total load of a bin using candidates which
/// cannot be packed together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum BigItemsPolicy {
    /// Every candidate counts towards the total load of a bin.
    Disabled,
    /// The big candidates of every bin are determined once, when the propagator is installed.
    Static,
    /// The big candidates of every bin are extended whenever the free space of the bin shrinks.
    #[default]
    Dynamic,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct BinPackingOptions {
    /// The treatment of mutually exclusive ("big") candidates of a bin; only used by the
    /// single-dimension propagator.
    pub big_items: BigItemsPolicy,
}

impl BinPackingOptions {
    pub fn new(big_items: BigItemsPolicy) -> Self {
        Self { big_items }
    }
}
