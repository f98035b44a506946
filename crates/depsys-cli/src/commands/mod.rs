//! Command dispatch and handler modules.

mod diff;
mod resolve;
mod status;
mod tree;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Resolve {
            file,
            json,
            no_delta,
            config,
        } => resolve::exec(&file, json, no_delta, config),
        Command::Status { file } => status::exec(&file),
        Command::Tree {
            file,
            depth,
            inverted,
            why,
        } => tree::exec(&file, depth, inverted, why),
        Command::Diff { old, new } => diff::exec(&old, &new),
    }
}
