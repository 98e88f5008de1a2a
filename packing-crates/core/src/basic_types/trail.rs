use crate::packing_asserts::packing_assert_simple;

/// An undo log which is partitioned into checkpoints.
///
/// The entries pushed since a checkpoint are handed back, most recent first, when the trail is
/// synchronised to that checkpoint; the owner uses them to restore the old values.
#[derive(Clone, Debug)]
pub(crate) struct Trail<Entry> {
    entries: Vec<Entry>,
    /// The number of entries on the trail when each checkpoint was created.
    checkpoint_starts: Vec<usize>,
}

impl<Entry> Default for Trail<Entry> {
    fn default() -> Self {
        Trail {
            entries: Vec::new(),
            checkpoint_starts: Vec::new(),
        }
    }
}

impl<Entry> Trail<Entry> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.checkpoint_starts.push(self.entries.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.checkpoint_starts.len()
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns to `checkpoint`, yielding the entries pushed since then from newest to oldest.
    pub(crate) fn synchronise(&mut self, checkpoint: usize) -> impl Iterator<Item = Entry> + '_ {
        packing_assert_simple!(checkpoint < self.get_checkpoint());

        let start = self.checkpoint_starts[checkpoint];
        self.checkpoint_starts.truncate(checkpoint);
        self.entries.drain(start..).rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synchronising_to_root_empties_the_trail() {
        let mut trail = Trail::default();

        trail.new_checkpoint();
        trail.push(7);
        let _ = trail.synchronise(0);

        assert_eq!(0, trail.len());
        assert_eq!(0, trail.get_checkpoint());
    }

    #[test]
    fn entries_are_undone_from_newest_to_oldest() {
        let mut trail = Trail::default();
        trail.push(10);

        trail.new_checkpoint();
        trail.push(20);
        trail.new_checkpoint();
        trail.push(30);
        trail.new_checkpoint();
        trail.push(40);

        let undone = trail.synchronise(1).collect::<Vec<_>>();

        assert_eq!(vec![40, 30], undone);
        assert_eq!(2, trail.len());
        assert_eq!(1, trail.get_checkpoint());
    }

    #[test]
    fn empty_checkpoints_are_restored() {
        let mut trail = Trail::default();
        trail.push(1);
        trail.new_checkpoint();
        trail.new_checkpoint();
        trail.push(2);

        let undone = trail.synchronise(1).collect::<Vec<_>>();

        assert_eq!(vec![2], undone);
        assert_eq!(1, trail.len());
    }
}
