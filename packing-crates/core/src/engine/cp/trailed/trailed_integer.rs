use crate::containers::impl_storage_key;

/// A handle to an integer which is automatically restored when the state backtracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailedInteger(u32);

impl_storage_key!(TrailedInteger);
