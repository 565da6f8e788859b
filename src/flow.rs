//! the interactive commit flow, as a state machine
//!
//! console, git and the model all sit behind traits so tests can script them

use crate::constants::{DIFF_SIZE_MAXIMUM_BYTES, DIFF_SIZE_WARNING_BYTES, MAX_LINE_LENGTH};
use crate::generator::{MessageGenerator, remove_quotes};
use crate::git::VersionControl;
use crate::status;
use crate::ui;
use anyhow::{Result, bail};
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::sync::LazyLock;

const CLEAN_TREE: &str = "nothing to commit, working tree clean";

static AHEAD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Your branch is ahead of '([^']+)' by (\d+) commits?")
        .expect("invalid ahead pattern")
});

/// a yes/no style question put to the user
#[derive(Debug, PartialEq, Eq)]
pub struct Question {
    pub text: &'static str,
    pub choices: &'static str,
}

pub const PUSH: Question = Question {
    text: "Would you like to push to the remote repository?",
    choices: "y/n",
};

pub const STAGE: Question = Question {
    text: "Would you like to add all files to be staged?",
    choices: "y/n",
};

pub const COMMIT: Question = Question {
    text: "Would you like to commit the changes?",
    choices: "y/n/re",
};

pub const LARGE_DIFF: Question = Question {
    text: "Send it anyway?",
    choices: "y/n",
};

/// console side of the flow
pub trait Interaction {
    /// show a generated commit message
    fn show_message(&mut self, message: &str);

    /// list `git status --short` lines
    fn show_unstaged(&mut self, files: &[String]);

    fn show_notice(&mut self, text: &str);

    fn show_warning(&mut self, text: &str);

    /// returns `None` when the user cancelled
    fn ask(&mut self, question: &Question) -> Result<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// nothing read yet
    Idle,
    AwaitPushConfirm,
    AwaitStageConfirm,
    /// a staged diff exists and needs a message
    Generating,
    AwaitCommitConfirm,
    Done,
    Cancelled,
}

/// side effect to run when leaving a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Push,
    StageAll,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Yes,
    Regenerate,
    Other,
}

impl Reply {
    /// empty input takes the default, which is always yes
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Self::Yes,
            "re" => Self::Regenerate,
            _ => Self::Other,
        }
    }
}

/// next state and the effect to run on the way there; `None` means cancelled
pub fn transition(state: &State, reply: Option<Reply>) -> (State, Effect) {
    let Some(reply) = reply else {
        return (State::Cancelled, Effect::None);
    };

    match (state, reply) {
        (State::AwaitPushConfirm, Reply::Yes) => (State::Done, Effect::Push),
        (State::AwaitPushConfirm, _) => (State::Done, Effect::None),
        (State::AwaitStageConfirm, Reply::Yes) => (State::Generating, Effect::StageAll),
        (State::AwaitStageConfirm, _) => (State::Done, Effect::None),
        (State::AwaitCommitConfirm, Reply::Yes) => (State::AwaitPushConfirm, Effect::Commit),
        (State::AwaitCommitConfirm, Reply::Regenerate) => (State::Generating, Effect::None),
        (State::AwaitCommitConfirm, Reply::Other) => (State::Done, Effect::None),
        (other, _) => (other.clone(), Effect::None),
    }
}

/// what `git status` says when nothing is staged
#[derive(Debug, PartialEq, Eq)]
pub enum TreeStatus {
    CleanAhead { upstream: String, commits: u32 },
    Clean,
    Dirty,
}

pub fn classify_status(status: &str) -> TreeStatus {
    if !status.contains(CLEAN_TREE) {
        return TreeStatus::Dirty;
    }

    AHEAD_PATTERN
        .captures(status)
        .and_then(|caps| {
            let commits = caps[2].parse().ok()?;
            Some(TreeStatus::CleanAhead {
                upstream: caps[1].to_string(),
                commits,
            })
        })
        .unwrap_or(TreeStatus::Clean)
}

/// drives the state machine until it reaches `Done` or `Cancelled`
pub struct Session<'a, V, G, I> {
    repo: &'a V,
    generator: &'a G,
    console: &'a mut I,
    diff: String,
    message: String,
    size_checked: bool,
}

impl<'a, V, G, I> Session<'a, V, G, I>
where
    V: VersionControl,
    G: MessageGenerator,
    I: Interaction,
{
    pub fn new(repo: &'a V, generator: &'a G, console: &'a mut I) -> Self {
        Self {
            repo,
            generator,
            console,
            diff: String::new(),
            message: String::new(),
            size_checked: false,
        }
    }

    /// run the flow, returning the final state
    pub fn run(mut self) -> Result<State> {
        let mut state = State::Idle;
        loop {
            state = match state {
                State::Idle => self.inspect()?,
                State::Generating => self.generate()?,
                State::Done => return Ok(State::Done),
                State::Cancelled => return Ok(State::Cancelled),
                awaiting => {
                    let question = match awaiting {
                        State::AwaitPushConfirm => &PUSH,
                        State::AwaitStageConfirm => &STAGE,
                        _ => &COMMIT,
                    };
                    let reply = self.console.ask(question)?.map(|s| Reply::parse(&s));
                    let (next, effect) = transition(&awaiting, reply);
                    self.apply(effect, next)?
                }
            };
        }
    }

    /// decide where to start from the staged diff and status
    fn inspect(&mut self) -> Result<State> {
        self.diff = self.repo.staged_diff()?;
        if !self.diff.trim().is_empty() {
            return Ok(State::Generating);
        }

        let status = self.repo.status()?;
        match classify_status(&status) {
            TreeStatus::CleanAhead { upstream, commits } => {
                self.console.show_notice(&format!(
                    "Working tree clean.\nYour branch is ahead of '{upstream}' by {commits} commit(s)."
                ));
                Ok(State::AwaitPushConfirm)
            }
            TreeStatus::Clean => {
                self.console.show_notice(&status);
                Ok(State::Done)
            }
            TreeStatus::Dirty => {
                let files = self.repo.short_status()?;
                self.console.show_unstaged(&files);
                Ok(State::AwaitStageConfirm)
            }
        }
    }

    fn generate(&mut self) -> Result<State> {
        if self.diff.trim().is_empty() {
            status!("nothing staged, nothing to commit");
            return Ok(State::Done);
        }

        if !self.size_checked {
            self.size_checked = true;
            if let Some(next) = self.check_diff_size()? {
                return Ok(next);
            }
        }

        status!("generating commit message...");
        let spinner = ui::start_spinner();
        let result = self.generator.generate(&self.diff);
        ui::stop_spinner(&spinner);

        self.message = remove_quotes(&result?).to_string();
        self.console.show_message(&self.message);

        if self
            .message
            .lines()
            .any(|line| line.chars().count() > MAX_LINE_LENGTH)
        {
            self.console.show_warning(&format!(
                "commit message has lines longer than {MAX_LINE_LENGTH} chars"
            ));
        }

        Ok(State::AwaitCommitConfirm)
    }

    /// refuse huge diffs, confirm large ones; `Some` overrides the next state
    fn check_diff_size(&mut self) -> Result<Option<State>> {
        let size = self.diff.len();
        if size > DIFF_SIZE_MAXIMUM_BYTES {
            bail!(
                "diff is too large ({} chars, max {})",
                size.to_formatted_string(&Locale::en),
                DIFF_SIZE_MAXIMUM_BYTES.to_formatted_string(&Locale::en)
            );
        }
        if size <= DIFF_SIZE_WARNING_BYTES {
            return Ok(None);
        }

        self.console.show_warning(&format!(
            "diff is large ({} chars), this may use many tokens",
            size.to_formatted_string(&Locale::en)
        ));
        let next = match self.console.ask(&LARGE_DIFF)?.map(|s| Reply::parse(&s)) {
            None => Some(State::Cancelled),
            Some(Reply::Yes) => None,
            Some(_) => Some(State::Done),
        };
        Ok(next)
    }

    fn apply(&mut self, effect: Effect, next: State) -> Result<State> {
        match effect {
            Effect::None => {}
            Effect::Push => self.repo.push()?,
            Effect::StageAll => {
                self.repo.stage_all()?;
                self.diff = self.repo.staged_diff()?;
            }
            Effect::Commit => {
                if self.message.trim().is_empty() {
                    self.console
                        .show_warning("refusing to commit an empty message");
                    return Ok(State::AwaitCommitConfirm);
                }
                self.repo.commit(&self.message)?;
            }
        }
        Ok(next)
    }
}
