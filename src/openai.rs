use crate::config::Config;
use crate::generator::MessageGenerator;
use crate::info;
use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

pub fn get_prompt() -> String {
    r#"
You are a git commit message writer. Please write a concise git commit message after carefully reviewing the "git diff --staged" output. Only include the changes made and nothing else. Commit message output format:

```
<type> (<changed file>): <message>
```

You can choose any type from options like "improvement", "feat", "fix", "chore", "docs", "refactor", "style", "test", "perf", "build", "ci", "revert", "security", "breaking", etc.

The <changed file> should be the name of the modified file, and <message> should be your brief interpretation of the git diff. Keep it concise.
"#
    .trim()
    .to_string()
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// azure openai chat completions client
pub struct AzureOpenAi {
    config: Config,
    agent: ureq::Agent,
    debug_prompt: bool,
    debug_response: bool,
}

impl AzureOpenAi {
    pub fn new(config: Config, debug_prompt: bool, debug_response: bool) -> Self {
        // non-2xx responses carry a useful error body, so don't turn them into ureq errors
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();

        Self {
            config,
            agent: ureq::Agent::new_with_config(agent_config),
            debug_prompt,
            debug_response,
        }
    }
}

impl MessageGenerator for AzureOpenAi {
    fn generate(&self, diff: &str) -> Result<String> {
        let prompt = get_prompt();

        // print prompt if requested (before adding diff)
        if self.debug_prompt {
            use colored::Colorize;
            info!("\n{}", prompt.dimmed());
        }

        let content = format!("{prompt}\n\nDiff: <<<{diff}>>>");
        let request = ChatRequest {
            model: &self.config.deployment,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &content,
            }],
        };

        let url = self.config.completions_url()?;
        let api_key = self.config.api_key()?;

        let mut response = self
            .agent
            .post(&url)
            .header("api-key", api_key)
            .send_json(&request)
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_string()
            .context("failed to read completion response")?;

        if self.debug_response {
            use colored::Colorize;
            info!("\n{}", body.dimmed());
        }

        if !status.is_success() {
            bail!(describe_error(status.as_u16(), &body));
        }

        first_completion(&body)
    }
}

/// text of the first choice in a chat completion response body
fn first_completion(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).context("malformed completion response")?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("completion response contained no choices"))?;

    Ok(choice.message.content.unwrap_or_default().trim().to_string())
}

fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: ApiError {
                code: Some(code),
                message,
            },
        }) => format!("completion request failed ({status} {code}): {message}"),
        Ok(ErrorResponse { error }) => {
            format!("completion request failed ({status}): {}", error.message)
        }
        Err(_) if body.trim().is_empty() => format!("completion request failed ({status})"),
        Err(_) => format!("completion request failed ({status}): {}", body.trim()),
    }
}

#[cfg(test)]
mod tests;
