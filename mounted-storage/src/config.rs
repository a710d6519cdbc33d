//! Configuration of the storage handlers, given from environment variables and lazy
//! initialized when needed.

use std::num::NonZeroUsize;
use std::env;

use once_cell::race::OnceNonZeroUsize;
use tracing::warn;


/// Largest item count that can be stored in the signed byte `Count` of an item stack.
pub const MAX_STORED_COUNT: u16 = i8::MAX as u16;

/// Name of the environment variable overriding the transfer step.
pub const TRANSFER_STEP_VAR: &str = "MOUNTED_STORAGE_TRANSFER_STEP";


/// Return the maximum number of items inserted at once when copying a stack into a
/// handler that only supports insertion and extraction.
///
/// To change it, set `MOUNTED_STORAGE_TRANSFER_STEP` to a value in `1..=127`, for
/// example `64` to mimic the usual maximum stack size.
pub fn transfer_step() -> u16 {
    static ENV: OnceNonZeroUsize = OnceNonZeroUsize::new();
    let step = ENV.get_or_init(|| {
        let step = env::var(TRANSFER_STEP_VAR)
            .ok()
            .map(|raw| parse_transfer_step(&raw))
            .unwrap_or(MAX_STORED_COUNT);
        NonZeroUsize::new(step as usize).unwrap_or(NonZeroUsize::MIN)
    });
    step.get() as u16
}

/// Parse a transfer step from its textual value, clamping it into the range that can
/// be stored without overflowing the item count.
fn parse_transfer_step(raw: &str) -> u16 {
    match raw.trim().parse::<u16>() {
        Ok(step @ 1..=MAX_STORED_COUNT) => step,
        Ok(0) => {
            warn!("{TRANSFER_STEP_VAR}={raw} is zero, using 1");
            1
        }
        Ok(_) => {
            warn!("{TRANSFER_STEP_VAR}={raw} overflows stored item count, using {MAX_STORED_COUNT}");
            MAX_STORED_COUNT
        }
        Err(_) => {
            warn!("{TRANSFER_STEP_VAR}={raw} is not a number, using {MAX_STORED_COUNT}");
            MAX_STORED_COUNT
        }
    }
}
