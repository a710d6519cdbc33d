//! NBT serialization and deserialization of whole item handlers.
//!
//! A handler is stored as a compound with its `Size` and an `Items` list of slot
//! compounds. The count of each stored stack is a signed byte, so a slot holding more
//! than 127 items is written as several entries with the same `Slot`, which are merged
//! back when reading.

use std::io::{self, BufReader, BufWriter, Write};
use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use crate::handler::{ItemHandler, ItemStackHandler, SmartItemStackHandler, SlotPolicy, SlotError, PlainSlots};
use crate::serde::nbt::{self, Nbt, NbtCompound, NbtCompoundParse, NbtError, NbtParseError};
use crate::serde::item_stack_nbt;
use crate::config::MAX_STORED_COUNT;
use crate::item::ItemStack;


/// Largest number of slots accepted when decoding a handler.
pub const MAX_SLOTS: usize = u16::MAX as usize;


/// Encode all slots of a handler into a NBT compound.
pub fn to_nbt(handler: &dyn ItemHandler) -> Result<NbtCompound, SlotError> {

    let size = handler.slots();
    let mut items = Vec::new();

    for slot in 0..size {
        let mut stack = handler.stack(slot)?;
        while !stack.is_empty() {
            let chunk = stack.split(MAX_STORED_COUNT);
            let mut comp = NbtCompound::new();
            comp.insert("Slot", slot as i32);
            item_stack_nbt::to_nbt(&mut comp, chunk);
            items.push(Nbt::Compound(comp));
        }
    }

    let mut comp = NbtCompound::new();
    comp.insert("Size", i32::try_from(size).unwrap_or(i32::MAX));
    comp.insert("Items", items);
    Ok(comp)

}

/// Decode the stacks of a handler from a NBT compound, the returned vector has the
/// stored size. A size above [`MAX_SLOTS`] is rejected before anything is allocated.
pub fn stacks_from_nbt(comp: &NbtCompoundParse) -> Result<Vec<ItemStack>, HandlerNbtError> {

    let size = comp.get_int("Size")?;
    if size < 0 {
        warn!("{}: negative handler size {size}, reading it as empty", comp.path());
    }

    let size = size.max(0) as usize;
    if size > MAX_SLOTS {
        return Err(HandlerNbtError::TooManySlots { size });
    }

    let mut stacks = vec![ItemStack::EMPTY; size];

    for item in comp.get_list("Items")?.iter() {

        let item = item.as_compound()?;
        let slot = item.get_int("Slot")?;
        let stack = item_stack_nbt::from_nbt(&item)?;

        let Some(existing) = usize::try_from(slot).ok().and_then(|slot| stacks.get_mut(slot)) else {
            warn!("{}: slot {slot} not in valid range - [0,{size}), skipped", item.path());
            continue;
        };

        if stack.is_empty() {
            continue;
        }

        if existing.is_empty() {
            *existing = stack;
        } else if existing.can_stack_with(stack) {
            if existing.size.checked_add(stack.size).is_none() {
                warn!("{}: slot {slot} overflows {} items, extra items dropped", item.path(), u16::MAX);
            }
            existing.grow(stack.size);
        } else {
            warn!("{}: slot {slot} already holds another item, replaced", item.path());
            *existing = stack;
        }

    }

    Ok(stacks)

}

/// Decode a handler with the given policy from a NBT compound.
pub fn from_nbt<P: SlotPolicy>(comp: &NbtCompoundParse, policy: P) -> Result<SmartItemStackHandler<P>, HandlerNbtError> {
    Ok(SmartItemStackHandler::from_stacks(stacks_from_nbt(comp)?, policy))
}


/// Read a plain handler from a gzip compressed NBT file.
pub fn read_file(path: impl AsRef<Path>) -> Result<ItemStackHandler, HandlerNbtError> {

    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let root = nbt::from_gzip_reader(reader)?;
    let handler = from_nbt(&root.parse().as_compound()?, PlainSlots)?;

    debug!("read handler of {} slots from {}", handler.slots(), path.display());
    Ok(handler)

}

/// Write a handler to a gzip compressed NBT file, replacing any existing file.
pub fn write_file(path: impl AsRef<Path>, handler: &dyn ItemHandler) -> Result<(), HandlerNbtError> {

    let path = path.as_ref();
    let root = Nbt::Compound(to_nbt(handler)?);

    let mut writer = BufWriter::new(File::create(path)?);
    nbt::to_gzip_writer(&mut writer, &root)?;
    writer.flush()?;

    debug!("written handler of {} slots to {}", handler.slots(), path.display());
    Ok(())

}


/// Error returned when reading or writing a handler file.
#[derive(thiserror::Error, Debug)]
pub enum HandlerNbtError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("nbt: {0}")]
    Nbt(#[from] NbtError),
    #[error("nbt parse: {0}")]
    Parse(#[from] NbtParseError),
    #[error("slot: {0}")]
    Slot(#[from] SlotError),
    #[error("handler size {size} exceeds {max} slots", max = MAX_SLOTS)]
    TooManySlots {
        size: usize,
    },
}
