//! Slot policies customizing the behavior of a smart item stack handler.

use std::iter::FusedIterator;

use crate::item::ItemStack;


/// Per-slot rules and change hook of a [`SmartItemStackHandler`].
///
/// [`SmartItemStackHandler`]: super::SmartItemStackHandler
pub trait SlotPolicy {

    /// Return false to exclude a slot from insertion and extraction. The slot stays
    /// part of the handler and keeps its content.
    fn valid(&self, _slot: usize) -> bool {
        true
    }

    /// Maximum number of items in the given slot.
    fn slot_limit(&self, _slot: usize) -> u16 {
        64
    }

    /// Maximum number of items of the given stack that the slot can hold.
    fn stack_limit(&self, slot: usize, stack: ItemStack) -> u16 {
        self.slot_limit(slot).min(stack.max_stack_size())
    }

    /// Return true if the given stack can be placed in the slot.
    fn accepts(&self, _slot: usize, _stack: ItemStack) -> bool {
        true
    }

    /// Called synchronously after the content of a slot changed.
    fn contents_changed(&mut self, _slot: usize) {}

}


/// The default policy, all slots are valid and no change is tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainSlots;

impl SlotPolicy for PlainSlots {}


/// A policy recording the indices of slots that have changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    words: Vec<u64>,
}

impl ChangeSet {

    /// Mark the given slot as changed.
    pub fn mark(&mut self, slot: usize) {
        let word = slot / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (slot % 64);
    }

    /// Return true if the given slot has changed.
    pub fn contains(&self, slot: usize) -> bool {
        self.words.get(slot / 64).is_some_and(|word| word & (1 << (slot % 64)) != 0)
    }

    /// Return true if no slot has changed.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Forget all changes.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Iterate over changed slots in ascending order.
    pub fn iter(&self) -> ChangesIter<'_> {
        ChangesIter {
            words: &self.words,
            current: self.words.first().copied().unwrap_or(0),
            index: 0,
        }
    }

}

impl SlotPolicy for ChangeSet {

    fn contents_changed(&mut self, slot: usize) {
        self.mark(slot);
    }

}


/// An iterator of slots that have changed.
pub struct ChangesIter<'a> {
    words: &'a [u64],
    /// Remaining bits of the word being iterated.
    current: u64,
    index: usize,
}

impl FusedIterator for ChangesIter<'_> {}
impl Iterator for ChangesIter<'_> {

    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {

        while self.current == 0 {
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }

        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.index * 64 + bit)

    }

}
