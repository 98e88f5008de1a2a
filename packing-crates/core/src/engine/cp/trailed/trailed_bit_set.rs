use super::TrailedInteger;
use super::TrailedValues;

const WORD_SIZE: usize = u64::BITS as usize;

/// A fixed-capacity set of indices `0..capacity` whose contents are restored on backtracking.
///
/// The bits are stored as a block of [`TrailedInteger`]s (one per 64 indices) together with a
/// trailed cardinality, which makes [`TrailedBitSet::is_empty`] constant time.
#[derive(Debug, Clone, Copy)]
pub struct TrailedBitSet {
    first_word: TrailedInteger,
    num_words: usize,
    len: TrailedInteger,
    capacity: usize,
}

impl TrailedBitSet {
    pub(crate) fn new(trailed_values: &mut TrailedValues, capacity: usize) -> TrailedBitSet {
        let num_words = capacity.div_ceil(WORD_SIZE);
        TrailedBitSet {
            first_word: trailed_values.grow_many(num_words, 0),
            num_words,
            len: trailed_values.grow(0),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn word(&self, index: usize) -> TrailedInteger {
        TrailedValues::offset(self.first_word, index / WORD_SIZE)
    }

    fn read_word(&self, trailed_values: &TrailedValues, word_index: usize) -> u64 {
        trailed_values.read(TrailedValues::offset(self.first_word, word_index)) as u64
    }

    pub fn len(&self, trailed_values: &TrailedValues) -> usize {
        trailed_values.read(self.len) as usize
    }

    pub fn is_empty(&self, trailed_values: &TrailedValues) -> bool {
        self.len(trailed_values) == 0
    }

    pub fn contains(&self, trailed_values: &TrailedValues, index: usize) -> bool {
        index < self.capacity
            && (trailed_values.read(self.word(index)) as u64) & (1 << (index % WORD_SIZE)) != 0
    }

    /// Adds `index` to the set; returns whether the set changed.
    pub fn insert(&self, trailed_values: &mut TrailedValues, index: usize) -> bool {
        if self.contains(trailed_values, index) {
            return false;
        }
        let word = self.word(index);
        let bits = trailed_values.read(word) as u64 | (1 << (index % WORD_SIZE));
        trailed_values.assign(word, bits as i64);
        trailed_values.add_assign(self.len, 1);
        true
    }

    /// Removes `index` from the set; returns whether the set changed.
    pub fn remove(&self, trailed_values: &mut TrailedValues, index: usize) -> bool {
        if !self.contains(trailed_values, index) {
            return false;
        }
        let word = self.word(index);
        let bits = trailed_values.read(word) as u64 & !(1 << (index % WORD_SIZE));
        trailed_values.assign(word, bits as i64);
        trailed_values.add_assign(self.len, -1);
        true
    }

    /// The smallest element of the set.
    pub fn first(&self, trailed_values: &TrailedValues) -> Option<usize> {
        self.first_from(trailed_values, 0)
    }

    /// The smallest element of the set which is strictly larger than `index`.
    pub fn next_after(&self, trailed_values: &TrailedValues, index: usize) -> Option<usize> {
        self.first_from(trailed_values, index + 1)
    }

    fn first_from(&self, trailed_values: &TrailedValues, start: usize) -> Option<usize> {
        if start >= self.capacity {
            return None;
        }

        let mut word_index = start / WORD_SIZE;
        let mut bits = self.read_word(trailed_values, word_index) & (u64::MAX << (start % WORD_SIZE));
        loop {
            if bits != 0 {
                return Some(word_index * WORD_SIZE + bits.trailing_zeros() as usize);
            }
            word_index += 1;
            if word_index >= self.num_words {
                return None;
            }
            bits = self.read_word(trailed_values, word_index);
        }
    }

    /// The largest element of the set which is strictly smaller than `index`.
    pub fn last_before(&self, trailed_values: &TrailedValues, index: usize) -> Option<usize> {
        let end = index.min(self.capacity);
        if end == 0 {
            return None;
        }

        let last = end - 1;
        let mut word_index = last / WORD_SIZE;
        let shift = WORD_SIZE - 1 - last % WORD_SIZE;
        let mut bits = (self.read_word(trailed_values, word_index) << shift) >> shift;
        loop {
            if bits != 0 {
                return Some(word_index * WORD_SIZE + (WORD_SIZE - 1 - bits.leading_zeros() as usize));
            }
            if word_index == 0 {
                return None;
            }
            word_index -= 1;
            bits = self.read_word(trailed_values, word_index);
        }
    }

    /// Iterates over the elements in increasing order.
    pub fn iter<'a>(&self, trailed_values: &'a TrailedValues) -> impl Iterator<Item = usize> + 'a {
        let set = *self;
        std::iter::successors(set.first(trailed_values), move |&index| {
            set.next_after(trailed_values, index)
        })
    }
}
