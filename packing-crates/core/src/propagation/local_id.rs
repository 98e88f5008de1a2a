use crate::containers::impl_storage_key;

/// Identifies a variable within the propagator which registered it, such as the position of an
/// item or load variable; the propagator receives it in [`super::Propagator::notify`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalId(u32);

impl_storage_key!(LocalId);

impl LocalId {
    pub const fn from(value: u32) -> Self {
        LocalId(value)
    }

    pub fn unpack(self) -> u32 {
        self.0
    }
}
