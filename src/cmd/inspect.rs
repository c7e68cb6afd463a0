use std::path::PathBuf;

use clap::Parser;

use super::{Error, runtime};
use crate::{config::AppConfig, models::DiscoveryReport, script::ScriptOperator};

/// Arguments of `scriptop inspect`.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the script file.
    pub script: PathBuf,
}

/// Loads a script, runs discovery and prints the report as JSON.
pub fn execute(config: &AppConfig, args: InspectArgs) -> Result<(), Error> {
    let operator = ScriptOperator::from_file(runtime(config), &args.script)?;
    let report = DiscoveryReport::from_operator(&operator);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
