//! Item stack handler checking slot validity before every insertion and extraction.

use tracing::trace;

use crate::item::ItemStack;
use crate::transfer::{self, TransferConfig, TransferError};

use super::{ItemHandler, ItemHandlerModifiable, SlotError, SlotPolicy, PlainSlots};


/// A plain item stack handler, with no slot excluded and no change tracking.
pub type ItemStackHandler = SmartItemStackHandler<PlainSlots>;


/// A fixed size handler of item stacks, each operation goes through the slot access
/// methods and first checks the slot validity given by the policy.
#[derive(Debug, Clone)]
pub struct SmartItemStackHandler<P = PlainSlots> {
    stacks: Box<[ItemStack]>,
    policy: P,
}

impl ItemStackHandler {

    /// Create a plain handler of the given size, all slots empty.
    pub fn plain(size: usize) -> Self {
        Self::new(size, PlainSlots)
    }

}

impl<P: SlotPolicy> SmartItemStackHandler<P> {

    /// Create a handler of the given size, all slots empty.
    pub fn new(size: usize, policy: P) -> Self {
        Self {
            stacks: vec![ItemStack::EMPTY; size].into_boxed_slice(),
            policy,
        }
    }

    /// Create a handler owning the given stacks, its size is the number of stacks.
    pub fn from_stacks(stacks: Vec<ItemStack>, policy: P) -> Self {
        Self {
            stacks: stacks.into_boxed_slice(),
            policy,
        }
    }

    /// Create a handler of the same size as the given one and copy all of its stacks.
    /// The source is not modified and no stack is shared with it.
    pub fn copy_of(handler: &dyn ItemHandler, policy: P) -> Result<Self, TransferError> {
        let size = handler.slots();
        let mut ret = Self::new(size, policy);
        transfer::copy_items_over(handler, &mut ret, size, 0, 0, &TransferConfig::default())?;
        Ok(ret)
    }

    /// Return a plain handler that contains the same items as this handler.
    pub fn simple_copy(&self) -> Result<ItemStackHandler, TransferError> {
        transfer::simple_copy(self)
    }

    /// Return true if the given slot accepts insertion and extraction.
    #[inline]
    pub fn valid(&self, slot: usize) -> bool {
        self.policy.valid(slot)
    }

    /// Check that the slot index is in range of this handler.
    pub fn validate_slot_index(&self, slot: usize) -> Result<(), SlotError> {
        if slot >= self.stacks.len() {
            Err(SlotError::OutOfRange { slot, size: self.stacks.len() })
        } else {
            Ok(())
        }
    }

    /// Maximum number of items of the given stack that the slot can hold.
    #[inline]
    pub fn stack_limit(&self, slot: usize, stack: ItemStack) -> u16 {
        self.policy.stack_limit(slot, stack)
    }

    /// Get a slice of all stacks in this handler.
    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    /// Consume this handler and return its stacks.
    pub fn into_stacks(self) -> Vec<ItemStack> {
        self.stacks.into_vec()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

}

impl<P: SlotPolicy> ItemHandler for SmartItemStackHandler<P> {

    fn slots(&self) -> usize {
        self.stacks.len()
    }

    fn stack(&self, slot: usize) -> Result<ItemStack, SlotError> {
        self.validate_slot_index(slot)?;
        Ok(self.stacks[slot])
    }

    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> Result<ItemStack, SlotError> {

        if !self.valid(slot) {
            return Ok(stack);
        }

        if stack.is_empty() {
            return Ok(ItemStack::EMPTY);
        }

        if !self.is_item_valid(slot, stack) {
            return Ok(stack);
        }

        self.validate_slot_index(slot)?;

        let existing = self.stacks[slot];
        let mut limit = self.stack_limit(slot, stack);

        if !existing.is_empty() {
            // Never merge with another item, even if the slot has room left.
            if !stack.can_stack_with(existing) {
                return Ok(stack);
            }
            limit = limit.saturating_sub(existing.size);
        }

        if limit == 0 {
            return Ok(stack);
        }

        let reached_limit = stack.size > limit;

        if !simulate {
            let accepted = if reached_limit { limit } else { stack.size };
            if existing.is_empty() {
                self.stacks[slot] = stack.with_size(accepted);
            } else {
                self.stacks[slot].grow(accepted);
            }
            trace!("insert {accepted} of item #{} in slot {slot}", stack.id);
            self.policy.contents_changed(slot);
        }

        if reached_limit {
            Ok(stack.with_size(stack.size - limit))
        } else {
            Ok(ItemStack::EMPTY)
        }

    }

    fn extract_item(&mut self, slot: usize, amount: u16, simulate: bool) -> Result<ItemStack, SlotError> {

        if !self.valid(slot) || amount == 0 {
            return Ok(ItemStack::EMPTY);
        }

        self.validate_slot_index(slot)?;

        let existing = self.stacks[slot];
        if existing.is_empty() {
            return Ok(ItemStack::EMPTY);
        }

        let to_extract = amount.min(existing.max_stack_size());

        if existing.size <= to_extract {
            if !simulate {
                self.stacks[slot] = ItemStack::EMPTY;
                trace!("extract all {} of item #{} from slot {slot}", existing.size, existing.id);
                self.policy.contents_changed(slot);
            }
            Ok(existing)
        } else {
            if !simulate {
                self.stacks[slot] = existing.with_size(existing.size - to_extract);
                trace!("extract {to_extract} of item #{} from slot {slot}", existing.id);
                self.policy.contents_changed(slot);
            }
            Ok(existing.with_size(to_extract))
        }

    }

    fn slot_limit(&self, slot: usize) -> u16 {
        self.policy.slot_limit(slot)
    }

    fn is_item_valid(&self, slot: usize, stack: ItemStack) -> bool {
        self.valid(slot) && self.policy.accepts(slot, stack)
    }

    fn as_modifiable(&mut self) -> Option<&mut dyn ItemHandlerModifiable> {
        Some(self)
    }

}

impl<P: SlotPolicy> ItemHandlerModifiable for SmartItemStackHandler<P> {

    fn set_stack(&mut self, slot: usize, stack: ItemStack) -> Result<(), SlotError> {
        self.validate_slot_index(slot)?;
        self.stacks[slot] = stack;
        self.policy.contents_changed(slot);
        Ok(())
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::handler::{ChangeSet, UNBOUNDED};
    use crate::item::{self, ItemStack};

    /// Policy excluding odd slots and tracking changes.
    #[derive(Debug, Default)]
    struct EvenSlots {
        changes: ChangeSet,
    }

    impl SlotPolicy for EvenSlots {

        fn valid(&self, slot: usize) -> bool {
            slot % 2 == 0
        }

        fn contents_changed(&mut self, slot: usize) {
            self.changes.mark(slot);
        }

    }

    /// Policy only accepting cobblestone.
    struct CobblestoneOnly;

    impl SlotPolicy for CobblestoneOnly {
        fn accepts(&self, _slot: usize, stack: ItemStack) -> bool {
            stack.id == item::COBBLESTONE
        }
    }

    fn dirt(size: u16) -> ItemStack {
        ItemStack::new(item::DIRT).with_size(size)
    }

    #[test]
    fn invalid_slots_untouched() {

        let mut handler = SmartItemStackHandler::from_stacks(vec![dirt(10), dirt(10)], EvenSlots::default());

        assert_eq!(handler.insert_item(1, dirt(5), false), Ok(dirt(5)));
        assert_eq!(handler.insert_item(1, dirt(5), true), Ok(dirt(5)));
        assert_eq!(handler.extract_item(1, 5, false), Ok(ItemStack::EMPTY));
        assert!(!handler.is_item_valid(1, dirt(1)));

        assert_eq!(handler.stacks(), [dirt(10), dirt(10)]);
        assert!(handler.policy().changes.is_empty());

        // Invalid slots are not range checked.
        assert_eq!(handler.insert_item(3, dirt(5), false), Ok(dirt(5)));
        assert_eq!(handler.extract_item(3, 5, false), Ok(ItemStack::EMPTY));

    }

    #[test]
    fn insert_then_extract() {

        let mut handler = SmartItemStackHandler::new(2, ChangeSet::default());

        assert_eq!(handler.insert_item(0, dirt(40), false), Ok(ItemStack::EMPTY));
        assert_eq!(handler.stack(0), Ok(dirt(40)));
        assert_eq!(handler.extract_item(0, 40, false), Ok(dirt(40)));
        assert_eq!(handler.stack(0), Ok(ItemStack::EMPTY));
        assert_eq!(handler.policy().iter().collect::<Vec<_>>(), [0]);

    }

    #[test]
    fn insert_over_limit() {

        let mut handler = SmartItemStackHandler::new(1, ChangeSet::default());

        assert_eq!(handler.insert_item(0, dirt(50), false), Ok(ItemStack::EMPTY));
        assert_eq!(handler.insert_item(0, dirt(50), true), Ok(dirt(36)));
        assert_eq!(handler.stack(0), Ok(dirt(50)));

        assert_eq!(handler.insert_item(0, dirt(50), false), Ok(dirt(36)));
        assert_eq!(handler.stack(0), Ok(dirt(64)));

        // The slot is full.
        assert_eq!(handler.insert_item(0, dirt(1), false), Ok(dirt(1)));

        // Limited by the item max stack size.
        let mut handler = ItemStackHandler::plain(1);
        let eggs = ItemStack::new(item::EGG).with_size(20);
        assert_eq!(handler.insert_item(0, eggs, false), Ok(eggs.with_size(4)));
        assert_eq!(handler.stack(0), Ok(eggs.with_size(16)));

    }

    #[test]
    fn insert_simulate() {

        let mut handler = SmartItemStackHandler::new(1, ChangeSet::default());
        assert_eq!(handler.insert_item(0, dirt(10), true), Ok(ItemStack::EMPTY));
        assert_eq!(handler.stack(0), Ok(ItemStack::EMPTY));
        assert!(handler.policy().is_empty());

    }

    #[test]
    fn insert_incompatible() {

        let mut handler = SmartItemStackHandler::from_stacks(vec![dirt(1)], ChangeSet::default());

        let stone = ItemStack::new(item::STONE).with_size(10);
        assert_eq!(handler.insert_item(0, stone, false), Ok(stone));

        let shovel = ItemStack::new(item::IRON_SHOVEL);
        assert_eq!(handler.insert_item(0, shovel, false), Ok(shovel));

        assert_eq!(handler.insert_item(0, dirt(1).with_damage(2), false), Ok(dirt(1).with_damage(2)));
        assert_eq!(handler.stack(0), Ok(dirt(1)));
        assert!(handler.policy().is_empty());

    }

    #[test]
    fn insert_rejected_item() {
        let mut handler = SmartItemStackHandler::new(1, CobblestoneOnly);
        assert_eq!(handler.insert_item(0, dirt(3), false), Ok(dirt(3)));
        let cobble = ItemStack::new(item::COBBLESTONE).with_size(3);
        assert_eq!(handler.insert_item(0, cobble, false), Ok(ItemStack::EMPTY));
    }

    #[test]
    fn insert_empty() {
        let mut handler = ItemStackHandler::plain(1);
        assert_eq!(handler.insert_item(0, dirt(0), false), Ok(ItemStack::EMPTY));
        assert_eq!(handler.insert_item(5, ItemStack::EMPTY, false), Ok(ItemStack::EMPTY));
    }

    #[test]
    fn extract_partial() {

        let mut handler = SmartItemStackHandler::from_stacks(vec![dirt(30)], ChangeSet::default());

        assert_eq!(handler.extract_item(0, 10, true), Ok(dirt(10)));
        assert!(handler.policy().is_empty());
        assert_eq!(handler.stack(0), Ok(dirt(30)));

        assert_eq!(handler.extract_item(0, 10, false), Ok(dirt(10)));
        assert_eq!(handler.stack(0), Ok(dirt(20)));
        assert!(handler.policy().contains(0));

    }

    #[test]
    fn extract_limited_by_max_stack_size() {

        let mut handler = ItemStackHandler::from_stacks(vec![dirt(300)], PlainSlots);
        assert_eq!(handler.extract_item(0, UNBOUNDED, false), Ok(dirt(64)));
        assert_eq!(handler.stack(0), Ok(dirt(236)));

        assert_eq!(handler.extract_item(0, UNBOUNDED, true), Ok(dirt(64)));
        assert_eq!(handler.stack(0), Ok(dirt(236)));

    }

    #[test]
    fn extract_empty() {

        let mut handler = SmartItemStackHandler::new(1, ChangeSet::default());
        assert_eq!(handler.extract_item(0, 10, false), Ok(ItemStack::EMPTY));
        assert!(handler.policy().is_empty());

        handler.set_stack(0, dirt(5)).unwrap();
        handler.policy_mut().clear();
        assert_eq!(handler.extract_item(0, 0, false), Ok(ItemStack::EMPTY));
        assert!(handler.policy().is_empty());

    }

    #[test]
    fn out_of_range() {

        let mut handler = ItemStackHandler::plain(2);
        let err = SlotError::OutOfRange { slot: 2, size: 2 };

        assert_eq!(handler.insert_item(2, dirt(1), false), Err(err));
        assert_eq!(handler.insert_item(2, dirt(1), true), Err(err));
        assert_eq!(handler.extract_item(2, 1, false), Err(err));
        assert_eq!(handler.stack(2), Err(err));
        assert_eq!(handler.set_stack(2, dirt(1)), Err(err));
        assert_eq!(handler.validate_slot_index(usize::MAX), Err(SlotError::OutOfRange { slot: usize::MAX, size: 2 }));

        assert_eq!(err.to_string(), "Slot 2 not in valid range - [0,2)");

    }

}
