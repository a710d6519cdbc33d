//! Item handlers for storages mounted on moving contraptions.
//!
//! The [`handler::SmartItemStackHandler`] checks slot validity before every operation
//! and [`transfer::copy_items_over`] copies stacks between handlers without ever
//! inserting more items at once than the signed byte count of a stored stack allows.

pub mod io;
pub mod config;

pub mod item;
pub mod handler;
pub mod transfer;

pub mod serde;
