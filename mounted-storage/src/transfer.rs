//! Copy of item stacks between handlers, taking care of never inserting a stack that
//! would overflow the signed byte item count once stored.

use tracing::{instrument, warn};

use crate::handler::{ItemHandler, ItemStackHandler, PlainSlots, SlotError, UNBOUNDED};
use crate::config::{self, MAX_STORED_COUNT};
use crate::item::ItemStack;


/// Parameters of a transfer between two handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    step: u16,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { step: config::transfer_step() }
    }
}

impl TransferConfig {

    /// Create a configuration with the given step, clamped to `1..=127` so that a
    /// single inserted chunk always fits the stored item count.
    pub fn with_step(step: u16) -> Self {
        Self { step: step.clamp(1, MAX_STORED_COUNT) }
    }

    /// Maximum number of items inserted at once in a destination that has no direct
    /// slot overwrite.
    #[inline]
    pub fn step(&self) -> u16 {
        self.step
    }

}


/// Outcome of a successful transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Total number of items written to the destination.
    pub moved: u32,
    /// Stacks refused by the destination, with the destination slot they were meant for.
    pub leftovers: Vec<(usize, ItemStack)>,
}

impl TransferReport {

    /// Return true if every item of the source has been written to the destination.
    pub fn is_complete(&self) -> bool {
        self.leftovers.is_empty()
    }

    fn record(&mut self, slot: usize, inserted: ItemStack, leftover: ItemStack) {
        if leftover.is_empty() {
            self.moved += inserted.size as u32;
        } else {
            self.moved += inserted.size.saturating_sub(leftover.size) as u32;
            warn!("slot {slot} refused {} of item #{}", leftover.size, leftover.id);
            self.leftovers.push((slot, leftover));
        }
    }

}


/// Copy `size` slots from a handler to another, starting at the given offsets. The
/// previous content of the destination slots is discarded, the source is unchanged.
///
/// When the destination supports direct overwrite, stacks are written as-is.
/// Otherwise each destination slot is first emptied by extraction, then the source
/// stack is inserted in chunks of at most [`TransferConfig::step`] items.
#[instrument(level = "debug", skip(from, to, config))]
pub fn copy_items_over(
    from: &dyn ItemHandler,
    to: &mut dyn ItemHandler,
    size: usize,
    offset_from: usize,
    offset_to: usize,
    config: &TransferConfig,
) -> Result<TransferReport, TransferError> {

    let mut report = TransferReport::default();

    if let Some(to) = to.as_modifiable() {
        for i in 0..size {
            let stack = from.stack(i + offset_from)?;
            to.set_stack(i + offset_to, stack)?;
            if !stack.is_empty() {
                report.moved += stack.size as u32;
            }
        }
        return Ok(report);
    }

    let step = config.step();

    for i in 0..size {

        let slot = i + offset_to;

        to.extract_item(slot, UNBOUNDED, false)?;
        let remaining = to.stack(slot)?;
        if !remaining.is_empty() {
            return Err(TransferError::SlotNotCleared { slot, remaining });
        }

        // Item count is stored as a signed byte, larger stacks would be read back with
        // a negative count, so they are inserted in chunks.
        let mut stack = from.stack(i + offset_from)?;
        while stack.size > step {
            let chunk = stack.split(step);
            let leftover = to.insert_item(slot, chunk, false)?;
            report.record(slot, chunk, leftover);
        }

        let leftover = to.insert_item(slot, stack, false)?;
        report.record(slot, stack, leftover);

    }

    Ok(report)

}

/// Return a plain handler containing the same items as the given handler.
pub fn simple_copy(handler: &dyn ItemHandler) -> Result<ItemStackHandler, TransferError> {
    ItemStackHandler::copy_of(handler, PlainSlots)
}


/// Unrecoverable error of a transfer, the destination is left partially written.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("Can't free slot {slot} in target item handler, {} items remaining", .remaining.size)]
    SlotNotCleared {
        slot: usize,
        remaining: ItemStack,
    },
}
