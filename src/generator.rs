use anyhow::Result;

/// something that turns a staged diff into a commit message
pub trait MessageGenerator {
    fn generate(&self, diff: &str) -> Result<String>;
}

const QUOTES: [char; 2] = ['\'', '"'];

/// strip one leading and one trailing quote character, if present
///
/// models like to wrap the whole message in quotes
pub fn remove_quotes(message: &str) -> &str {
    let message = message.strip_prefix(QUOTES).unwrap_or(message);
    message.strip_suffix(QUOTES).unwrap_or(message)
}
