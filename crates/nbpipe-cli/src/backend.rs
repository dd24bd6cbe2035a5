//! Wiring of the external compile programs.

use std::path::Path;
use std::sync::Arc;

use nbpipe_core::compile::{CommandBackend, CommandPackager, CompileOrchestrator};

/// Whether `program` names a file rather than something to find on `PATH`.
fn is_path(program: &Path) -> bool {
    program.components().count() > 1
}

/// Build an orchestrator driving `converter` and `packager`.
///
/// Bare program names are resolved through `PATH`.
pub fn orchestrator(converter: &Path, packager: &str) -> anyhow::Result<CompileOrchestrator> {
    if is_path(converter) && !converter.is_file() {
        anyhow::bail!("Converter not found: {}", converter.display());
    }

    let packager = if is_path(Path::new(packager)) {
        CommandPackager::new(packager)
    } else {
        CommandPackager::locate(packager)?
    };

    Ok(CompileOrchestrator::new(
        Arc::new(CommandBackend::new(converter)),
        Arc::new(packager),
    ))
}
