use super::TrailedInteger;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// The value a trailed integer had before it was changed.
#[derive(Debug, Clone, Copy)]
struct TrailedChange {
    old_value: i64,
    reference: TrailedInteger,
}

/// Storage for integers whose modifications are recorded on a [`Trail`], so that they are undone
/// when the state is synchronised to an earlier checkpoint.
#[derive(Default, Debug, Clone)]
pub struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInteger, i64>,
}

impl TrailedValues {
    pub(crate) fn grow(&mut self, initial_value: i64) -> TrailedInteger {
        self.values.push(initial_value)
    }

    /// Reserves `amount` consecutive integers, all initialised to `initial_value`, and returns the
    /// first of them.
    pub(crate) fn grow_many(&mut self, amount: usize, initial_value: i64) -> TrailedInteger {
        let first = self.values.next_key();
        for _ in 0..amount {
            let _ = self.values.push(initial_value);
        }
        first
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint()
    }

    pub fn read(&self, trailed_integer: TrailedInteger) -> i64 {
        self.values[trailed_integer]
    }

    pub(crate) fn synchronise(&mut self, new_checkpoint: usize) {
        self.trail
            .synchronise(new_checkpoint)
            .for_each(|state_change| self.values[state_change.reference] = state_change.old_value)
    }

    fn write(&mut self, trailed_integer: TrailedInteger, value: i64) {
        let old_value = self.values[trailed_integer];
        if old_value == value {
            return;
        }
        let entry = TrailedChange {
            old_value,
            reference: trailed_integer,
        };
        self.trail.push(entry);
        self.values[trailed_integer] = value;
    }

    pub fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.write(trailed_integer, self.values[trailed_integer] + addition);
    }

    pub fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.write(trailed_integer, value);
    }

    /// The handle which lies `offset` positions after `first`; used for blocks allocated with
    /// [`TrailedValues::grow_many`].
    pub(crate) fn offset(first: TrailedInteger, offset: usize) -> TrailedInteger {
        TrailedInteger::create_from_index(first.index() + offset)
    }
}
