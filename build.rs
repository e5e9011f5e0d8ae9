//! Build script for idscp-bridge
//!
//! Emits the VERGEN_* variables consumed by the `version` command.

use vergen::EmitBuilder;

fn main() {
    if let Err(error) = EmitBuilder::builder()
        .all_build()
        .all_cargo()
        .all_git()
        .all_rustc()
        .emit()
    {
        eprintln!("Failed to generate build info: {}", error);
        std::process::exit(1);
    }
}
