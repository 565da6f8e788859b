mod cli;
mod config;
mod constants;
mod flow;
mod generator;
mod git;
mod openai;
mod ui;

use crate::config::Config;
use crate::flow::{Session, State};
use crate::git::GitCommand;
use crate::openai::AzureOpenAi;
use anyhow::{Context, Result, bail};
use std::io::IsTerminal;
use std::path::Path;

fn main() {
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::Cli::parse_args();

    // sanity checks
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        bail!("interactive terminal required");
    }
    git::sanity_check(Path::new("."))?;

    // prompts read ctrl-c themselves; this covers git subprocesses and the model request
    ctrlc::set_handler(|| std::process::exit(ui::on_interrupt()))
        .context("failed to install interrupt handler")?;

    // credentials are only checked when the first request is made
    let config = Config::from_env();
    let repo = GitCommand::new(".", args.verbose);
    let generator = AzureOpenAi::new(config, args.debug_prompt, args.debug_response);
    let mut console = ui::Console;

    if Session::new(&repo, &generator, &mut console).run()? == State::Cancelled {
        ui::report_cancelled();
    }

    Ok(())
}
