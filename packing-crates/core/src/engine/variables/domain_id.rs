use std::fmt::Debug;
use std::fmt::Display;

use crate::containers::impl_storage_key;

/// An integer variable, such as the bin of an item or the load of a bin. The domain itself is
/// stored in the [`crate::state::State`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(u32);

impl_storage_key!(DomainId);

impl DomainId {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl Debug for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
