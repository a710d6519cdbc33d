//! Command line tool to inspect and repack mounted storage handler files.

use std::env;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use mounted_storage::handler::ItemHandler;
use mounted_storage::serde::handler_nbt::{self, HandlerNbtError};
use mounted_storage::transfer::{self, TransferError};


const USAGE: &str = "usage: mounted-storage-tool inspect <file>\n       mounted-storage-tool repack <input> <output>";


pub fn main() -> ExitCode {

    init_tracing();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ToolError::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }

}

/// Dispatch the command given by the arguments, without the program name.
fn run(args: &[&str]) -> Result<(), ToolError> {
    match *args {
        ["inspect", path] => inspect(path),
        ["repack", input, output] => repack(input, output),
        _ => Err(ToolError::Usage),
    }
}

/// Print the size and occupied slots of a handler file.
fn inspect(path: &str) -> Result<(), ToolError> {

    let handler = handler_nbt::read_file(path)?;
    println!("{path}: {} slots", handler.slots());

    for (slot, stack) in handler.stacks().iter().enumerate() {
        if let Some(stack) = stack.to_non_empty() {
            let item = stack.item();
            println!("  [{slot:>3}] {:>5} x {} (#{}:{})", stack.size, item.name, stack.id, stack.damage);
        }
    }

    Ok(())

}

/// Read a handler file, copy it into a plain handler and write it back, this rewrites
/// any slot holding more than 127 items as byte-safe entries.
fn repack(input: &str, output: &str) -> Result<(), ToolError> {

    let handler = handler_nbt::read_file(input)?;
    let copy = transfer::simple_copy(&handler)?;

    let oversized = copy.stacks().iter().filter(|stack| stack.size > 127).count();
    if oversized != 0 {
        warn!("{oversized} slots hold more than 127 items, they are written as split entries");
    }

    handler_nbt::write_file(output, &copy)?;
    info!("repacked {input} into {output}");
    Ok(())

}

/// Initialize tracing to output into the console.
fn init_tracing() {

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

}


#[derive(thiserror::Error, Debug)]
enum ToolError {
    #[error("invalid arguments")]
    Usage,
    #[error("{0}")]
    File(#[from] HandlerNbtError),
    #[error("{0}")]
    Transfer(#[from] TransferError),
}


#[cfg(test)]
mod tests {

    use std::path::PathBuf;

    use mounted_storage::handler::{ItemStackHandler, PlainSlots};
    use mounted_storage::item::{self, ItemStack};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("mounted-storage-tool-{}-{name}.nbt", std::process::id()))
    }

    #[test]
    fn repack_file() {

        let input = temp_path("input");
        let output = temp_path("output");

        let stacks = vec![
            ItemStack::new(item::DIRT).with_size(300),
            ItemStack::EMPTY,
            ItemStack::new(item::WOOL).with_size(7).with_damage(3),
        ];
        let handler = ItemStackHandler::from_stacks(stacks, PlainSlots);
        handler_nbt::write_file(&input, &handler).unwrap();

        let res = run(&["repack", input.to_str().unwrap(), output.to_str().unwrap()]);
        let repacked = handler_nbt::read_file(&output);

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();

        res.unwrap();
        assert_eq!(repacked.unwrap().stacks(), handler.stacks());

    }

    #[test]
    fn missing_file() {
        let path = temp_path("missing");
        let res = run(&["inspect", path.to_str().unwrap()]);
        assert!(matches!(res, Err(ToolError::File(HandlerNbtError::Io(_)))));
    }

    #[test]
    fn usage() {
        assert!(matches!(run(&[]), Err(ToolError::Usage)));
        assert!(matches!(run(&["inspect"]), Err(ToolError::Usage)));
        assert!(matches!(run(&["repack", "a"]), Err(ToolError::Usage)));
        assert!(matches!(run(&["convert", "a", "b"]), Err(ToolError::Usage)));
    }

}
