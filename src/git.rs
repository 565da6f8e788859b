use crate::{info, warning};
use anyhow::{Context, Result, bail};
use git2::{Repository, RepositoryState};
use std::path::{Path, PathBuf};
use std::process::Command;

/// the git operations the commit flow needs
pub trait VersionControl {
    /// output of `git diff --staged`
    fn staged_diff(&self) -> Result<String>;

    /// output of `git status`
    fn status(&self) -> Result<String>;

    /// lines of `git status --short`
    fn short_status(&self) -> Result<Vec<String>>;

    /// `git add .`
    fn stage_all(&self) -> Result<()>;

    fn commit(&self, message: &str) -> Result<()>;

    fn push(&self) -> Result<()>;
}

/// sanity check that we're in a git repository and in a good state
pub fn sanity_check(path: &Path) -> Result<()> {
    // can be anywhere within the repo
    let repo = Repository::discover(path).context("not in a git repository")?;

    if repo.state() != RepositoryState::Clean {
        bail!("repository is in the middle of an operation (merge, rebase, etc)");
    }

    // committing still works, pushing won't
    if repo.head_detached().unwrap_or(false) {
        warning!("repository is in detached HEAD state");
    }

    Ok(())
}

/// runs the git binary in a working directory
///
/// the binary is used rather than git2 so commit signing (gpg/ssh), hooks,
/// credential helpers and the user's push config all behave as usual
pub struct GitCommand {
    path: PathBuf,
    verbose: bool,
}

impl GitCommand {
    pub fn new(path: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            path: path.into(),
            verbose,
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        if self.verbose {
            use colored::Colorize;
            let line = shlex::try_join(args.iter().copied())
                .unwrap_or_else(|_| args.join(" "));
            info!("{}", format!("$ git {line}").dimmed());
        }

        let mut command = Command::new("git");
        command.args(args).current_dir(&self.path);
        command
    }

    /// run a read-only command and capture its output
    fn read(&self, args: &[&str]) -> Result<String> {
        // status phrases are matched, keep them in english
        let output = self
            .command(args)
            .env("LC_ALL", "C")
            .env_remove("LANGUAGE")
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;

        if !output.status.success() {
            bail!(
                "git {} failed with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// run a command with the terminal attached so the user sees git's output
    fn run(&self, args: &[&str]) -> Result<()> {
        let status = self
            .command(args)
            .status()
            .with_context(|| format!("failed to run git {}", args[0]))?;

        if !status.success() {
            bail!("git {} failed with {}", args[0], status);
        }
        Ok(())
    }
}

impl VersionControl for GitCommand {
    fn staged_diff(&self) -> Result<String> {
        self.read(&["diff", "--staged"])
    }

    fn status(&self) -> Result<String> {
        self.read(&["status"])
    }

    fn short_status(&self) -> Result<Vec<String>> {
        let output = self.read(&["status", "--short"])?;
        Ok(output
            .trim_end()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn stage_all(&self) -> Result<()> {
        self.run(&["add", "."])
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "--message", message])
    }

    fn push(&self) -> Result<()> {
        self.run(&["push"])
    }
}
