use clap::Parser;

/// commit-assistant: draft a commit message for staged changes, then commit and push
#[derive(Parser, Debug)]
#[command(
    name = "commit-assistant",
    about,
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// echo each git command before running it
    #[arg(long, short)]
    pub verbose: bool,

    /// print the prompt sent to the model
    #[arg(long)]
    pub debug_prompt: bool,

    /// print the raw JSON response from the model
    #[arg(long)]
    pub debug_response: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
