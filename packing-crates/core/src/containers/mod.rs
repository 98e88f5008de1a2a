//! Containers which are indexed by the typed identifiers of the engine.
mod keyed_vec;

pub(crate) use keyed_vec::impl_storage_key;
pub use keyed_vec::KeyedVec;
pub use keyed_vec::StorageKey;
