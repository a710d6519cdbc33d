//! Item handler contract, the slot based interface through which storages are filled
//! and emptied by the rest of the game.

use crate::item::ItemStack;

mod policy;
mod smart;

pub use policy::{SlotPolicy, PlainSlots, ChangeSet, ChangesIter};
pub use smart::{SmartItemStackHandler, ItemStackHandler};


/// Amount to give to [`ItemHandler::extract_item`] in order to extract as much as
/// possible from a slot.
pub const UNBOUNDED: u16 = u16::MAX;


/// A container of item stacks addressed by slot index.
///
/// Only insertion and extraction are required, handlers that also support direct
/// overwrite of a slot expose it through [`as_modifiable`](Self::as_modifiable).
pub trait ItemHandler {

    /// Number of slots in this handler, fixed for its whole life.
    fn slots(&self) -> usize;

    /// Get a copy of the stack in the given slot.
    fn stack(&self, slot: usize) -> Result<ItemStack, SlotError>;

    /// Insert a stack in the given slot and return the remainder that has not been
    /// inserted, empty if the whole stack fits. Nothing is modified when simulating.
    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Result<ItemStack, SlotError>;

    /// Extract up to `amount` items from the given slot and return them. Nothing is
    /// modified when simulating.
    fn extract_item(&mut self, slot: usize, amount: u16, simulate: bool) -> Result<ItemStack, SlotError>;

    /// Maximum number of items the given slot can hold.
    fn slot_limit(&self, slot: usize) -> u16;

    /// Return true if the given stack is allowed in the given slot.
    fn is_item_valid(&self, slot: usize, stack: ItemStack) -> bool;

    /// Return the direct overwrite capability of this handler, if supported.
    fn as_modifiable(&mut self) -> Option<&mut dyn ItemHandlerModifiable> {
        None
    }

}

/// Capability of handlers which slots can be overwritten directly.
pub trait ItemHandlerModifiable: ItemHandler {

    /// Replace the stack in the given slot, regardless of its previous content.
    fn set_stack(&mut self, slot: usize, stack: ItemStack) -> Result<(), SlotError>;

}


/// Unrecoverable error of a handler accessed outside of its slots.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("Slot {slot} not in valid range - [0,{size})")]
    OutOfRange {
        slot: usize,
        size: usize,
    },
}
