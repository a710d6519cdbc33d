//! NBT serialization and deserialization for [`ItemStack`] type.

use tracing::warn;

use crate::serde::nbt::{NbtParseError, NbtCompound, NbtCompoundParse};
use crate::config::MAX_STORED_COUNT;
use crate::item::ItemStack;


/// Create an item stack from a NBT compound. A negative count, written by a stack that
/// overflowed the signed byte, is read as an empty stack.
pub fn from_nbt(comp: &NbtCompoundParse) -> Result<ItemStack, NbtParseError> {

    let id = comp.get_short("id")? as u16;
    let count = comp.get_byte("Count")?;
    let damage = comp.get_short("Damage")? as u16;

    if count < 0 {
        warn!("{}: item #{id} has a negative count {count}, reading it as empty", comp.path());
    }

    Ok(ItemStack { id, size: count.max(0) as u16, damage })

}

/// Encode an item stack into a NBT compound. The count is clamped to the signed byte
/// range, stacks larger than that must be split before.
pub fn to_nbt(comp: &mut NbtCompound, stack: ItemStack) -> &mut NbtCompound {

    if stack.size > MAX_STORED_COUNT {
        warn!("item #{} count {} clamped to {MAX_STORED_COUNT}", stack.id, stack.size);
    }

    comp.insert("id", stack.id as i16);
    comp.insert("Count", stack.size.min(MAX_STORED_COUNT) as i8);
    comp.insert("Damage", stack.damage as i16);
    comp

}
