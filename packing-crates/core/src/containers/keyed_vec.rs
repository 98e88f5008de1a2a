use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Index;
use std::ops::IndexMut;

/// An index type which can be converted to and from a position in a [`KeyedVec`].
pub trait StorageKey: Copy {
    fn index(&self) -> usize;

    fn create_from_index(index: usize) -> Self;
}

/// Implements [`StorageKey`] for a tuple struct wrapping a `u32`.
macro_rules! impl_storage_key {
    ($key:ident) => {
        impl $crate::containers::StorageKey for $key {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn create_from_index(index: usize) -> Self {
                $key(index as u32)
            }
        }
    };
}

pub(crate) use impl_storage_key;

/// A vector which is indexed by `Key` rather than by `usize`, so that for example the domains
/// can only be looked up by a [`crate::variables::DomainId`].
pub struct KeyedVec<Key, Value> {
    elements: Vec<Value>,
    key: PhantomData<fn() -> Key>,
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        KeyedVec {
            elements: Vec::new(),
            key: PhantomData,
        }
    }
}

impl<Key, Value: Clone> Clone for KeyedVec<Key, Value> {
    fn clone(&self) -> Self {
        KeyedVec {
            elements: self.elements.clone(),
            key: PhantomData,
        }
    }
}

impl<Key, Value: Debug> Debug for KeyedVec<Key, Value> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.elements).finish()
    }
}

impl<Key: StorageKey, Value> KeyedVec<Key, Value> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Appends `value` and returns its key.
    pub fn push(&mut self, value: Value) -> Key {
        let key = self.next_key();
        self.elements.push(value);
        key
    }

    /// The key the next pushed value receives.
    pub(crate) fn next_key(&self) -> Key {
        Key::create_from_index(self.elements.len())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.elements.iter_mut()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = Key> {
        (0..self.elements.len()).map(Key::create_from_index)
    }
}

impl<Key: StorageKey, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, key: Key) -> &Value {
        &self.elements[key.index()]
    }
}

impl<Key: StorageKey, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, key: Key) -> &mut Value {
        &mut self.elements[key.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Key(u32);

    impl_storage_key!(Key);

    #[test]
    fn pushed_values_are_found_under_their_key() {
        let mut values = KeyedVec::<Key, &str>::default();
        assert_eq!(Key(0), values.next_key());

        let first = values.push("first");
        let second = values.push("second");

        assert_eq!(Key(1), second);
        assert_eq!("first", values[first]);
        assert_eq!(vec![first, second], values.keys().collect::<Vec<_>>());

        values[second] = "last";
        assert_eq!(vec!["first", "last"], values.iter().copied().collect::<Vec<_>>());
    }
}
