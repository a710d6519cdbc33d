//! Serialization and deserialization of item handlers to the NBT format.

pub mod nbt;
pub mod item_stack_nbt;
pub mod handler_nbt;
