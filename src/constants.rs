// commit message
pub const MAX_LINE_LENGTH: usize = 72;

// diff
pub const DIFF_SIZE_WARNING_BYTES: usize = 50 * 1024;
pub const DIFF_SIZE_MAXIMUM_BYTES: usize = 100 * 1024;

// azure openai
pub const DEFAULT_DEPLOYMENT: &str = "gpt-35-turbo";
pub const MAX_TOKENS: u32 = 3000;
pub const TEMPERATURE: f32 = 0.3;
pub const REQUEST_TIMEOUT_SECS: u64 = 120;
