use crate::flow::{Interaction, Question};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// spinner currently on screen, so an interrupt can clear it
static ACTIVE_SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

#[macro_export]
macro_rules! warning {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).yellow());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).yellow());
    }};
}

#[macro_export]
macro_rules! error {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).red());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).red());
    }};
}

#[macro_export]
macro_rules! status {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!($fmt $(, $($arg)*)?).green());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!("{}", $expr).green());
    }};
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    // format string literal (with or without inline formatting or args)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

pub fn start_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner}")
            .expect("invalid spinner template"),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    *ACTIVE_SPINNER
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(spinner.clone());
    spinner
}

pub fn stop_spinner(spinner: &ProgressBar) {
    spinner.finish_and_clear();
    ACTIVE_SPINNER
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

pub fn report_cancelled() {
    info!();
    warning!("operation cancelled");
}

/// ctrl-c outside a prompt (git subprocess, model request); returns the exit code
pub fn on_interrupt() -> i32 {
    interrupted(&ACTIVE_SPINNER)
}

fn interrupted(spinner: &Mutex<Option<ProgressBar>>) -> i32 {
    if let Some(spinner) = spinner
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
    {
        spinner.finish_and_clear();
    }
    report_cancelled();
    0
}

/// ask a question on the terminal; `None` when the user cancelled (ctrl-c / ctrl-d)
pub fn ask(question: &Question) -> Result<Option<String>> {
    use rustyline::DefaultEditor;
    use rustyline::error::ReadlineError;

    info!();
    info!(
        "{} {}",
        question.text.bold(),
        format!("({})", question.choices).bold()
    );

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    match editor.readline("[y]: ") {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            info!("^C");
            Ok(None)
        }
        Err(e) => Err(e).context("failed to read response"),
    }
}

/// the real terminal
pub struct Console;

impl Interaction for Console {
    fn show_message(&mut self, message: &str) {
        info!();
        info!("{}", message.green().bold());
    }

    fn show_unstaged(&mut self, files: &[String]) {
        info!();
        info!("{}", "Unstaged files:".white().bold());
        for file in files {
            info!("{}", file.trim().magenta().bold());
        }
    }

    fn show_notice(&mut self, text: &str) {
        info!();
        info!(text.trim_end());
    }

    fn show_warning(&mut self, text: &str) {
        warning!(text);
    }

    fn ask(&mut self, question: &Question) -> Result<Option<String>> {
        ask(question)
    }
}
