mod convert;
mod inside;
mod project;

use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub fn run(cli: &Cli) -> Result<Value, CliError> {
    match &cli.command {
        Command::Convert(args) => convert::run(args),
        Command::Project(args) => project::run(args),
        Command::Inside(args) => inside::run(args),
    }
}
