//! Completions command - print shell completion scripts

use crate::cli::args::Cli;
use crate::error::LaunchpadResult;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

pub fn execute(shell: Shell) -> LaunchpadResult<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, &mut io::stdout());
    Ok(())
}
