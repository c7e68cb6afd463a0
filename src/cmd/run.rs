use std::path::PathBuf;

use clap::Parser;

use super::{Error, runtime};
use crate::{
    config::AppConfig,
    models::{RunReport, report::dynamic_to_json},
    script::ScriptOperator,
};

/// Arguments of `scriptop run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the script file.
    pub script: PathBuf,
    /// Parameter values as INDEX=VALUE, e.g. `-p 0=HI -p 1=There`.
    #[arg(short, long = "param", value_name = "INDEX=VALUE")]
    pub params: Vec<String>,
}

/// Splits an `INDEX=VALUE` assignment.
pub fn parse_assignment(assignment: &str) -> Result<(usize, &str), Error> {
    let invalid = || Error::InvalidAssignment(assignment.to_string());
    let (index, value) = assignment.split_once('=').ok_or_else(invalid)?;
    let index = index.trim().parse::<usize>().map_err(|_| invalid())?;
    Ok((index, value))
}

/// Loads a script, applies parameter values, runs it and prints the result.
///
/// A failing script is reported in the JSON output and as an error.
pub fn execute(config: &AppConfig, args: RunArgs) -> Result<(), Error> {
    let mut operator = ScriptOperator::from_file(runtime(config), &args.script)?;

    for assignment in &args.params {
        let (index, value) = parse_assignment(assignment)?;
        operator.set_parameter_from_str(index, value)?;
    }

    let outcome = operator.get_result();
    let report = RunReport {
        command: operator.command(),
        result: outcome.as_ref().ok().map(dynamic_to_json),
        error: operator.last_error().cloned(),
        output: operator.take_output(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    outcome.map(|_| ()).map_err(Error::from)
}
