use std::path::PathBuf;

use clap::Parser;

use super::{Error, runtime};
use crate::{catalog::ScriptCatalog, config::AppConfig};

/// Arguments of `scriptop list`.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directories to scan. Defaults to `script_dirs` from the configuration.
    pub dirs: Vec<PathBuf>,
}

/// Scans script directories and prints the catalog as JSON.
pub fn execute(config: &AppConfig, args: ListArgs) -> Result<(), Error> {
    let dirs = if args.dirs.is_empty() { config.script_dirs.clone() } else { args.dirs };
    let catalog = ScriptCatalog::scan(runtime(config), &dirs);

    for (path, err) in catalog.failures() {
        eprintln!("{}: {}", path.display(), err);
    }
    println!("{}", serde_json::to_string_pretty(catalog.entries())?);
    Ok(())
}
