use super::*;
use crate::config::{ENV_BASE, ENV_DEPLOYMENT, ENV_KEY, ENV_VERSION};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIFF: &str = "diff --git a/x.py b/x.py\n+y = 1\n";

fn config_for(server: &MockServer) -> Config {
    let base = server.uri();
    Config::from_lookup(move |name| match name {
        ENV_BASE => Some(base.clone()),
        ENV_VERSION => Some("2023-05-15".to_string()),
        ENV_KEY => Some("test-key".to_string()),
        ENV_DEPLOYMENT => Some("test-deployment".to_string()),
        _ => None,
    })
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "finish_reason": "stop",
                "message": { "role": "assistant", "content": content }
            }
        ]
    })
}

/// ureq blocks, so run it off the runtime driving the mock server
async fn generate(config: Config) -> Result<String> {
    tokio::task::spawn_blocking(move || AzureOpenAi::new(config, false, false).generate(DIFF))
        .await
        .unwrap()
}

#[test]
fn test_prompt_describes_format() {
    let prompt = get_prompt();
    assert!(prompt.contains("<type> (<changed file>): <message>"));
    assert!(prompt.contains("git diff --staged"));
}

#[test]
fn test_request_body_shape() {
    let request = ChatRequest {
        model: "gpt-35-turbo",
        max_tokens: 3000,
        temperature: 0.3,
        messages: vec![ChatMessage {
            role: "user",
            content: "hello",
        }],
    };

    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["model"], "gpt-35-turbo");
    assert_eq!(value["max_tokens"], 3000);
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][0]["content"], "hello");
    assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
}

#[test]
fn test_first_completion_takes_first_choice() {
    let body = json!({
        "choices": [
            { "message": { "content": "  feat (x.py): add y\n" } },
            { "message": { "content": "fix (x.py): other" } }
        ]
    })
    .to_string();

    assert_eq!(first_completion(&body).unwrap(), "feat (x.py): add y");
}

#[test]
fn test_first_completion_rejects_bad_bodies() {
    let err = first_completion(r#"{"choices": []}"#).unwrap_err();
    assert!(err.to_string().contains("no choices"));

    let err = first_completion("<html>gateway timeout</html>").unwrap_err();
    assert!(err.to_string().contains("malformed"));
}

#[test]
fn test_describe_error() {
    let body = r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}"#;
    assert_eq!(
        describe_error(401, body),
        "completion request failed (401 401): Access denied due to invalid subscription key."
    );

    let body = r#"{"error": {"message": "The API deployment for this resource does not exist."}}"#;
    assert_eq!(
        describe_error(404, body),
        "completion request failed (404): The API deployment for this resource does not exist."
    );

    assert_eq!(describe_error(502, ""), "completion request failed (502)");
    assert_eq!(
        describe_error(500, "oops"),
        "completion request failed (500): oops"
    );
}

#[test]
fn test_missing_credentials_fail_before_request() {
    let config = Config::from_lookup(|_| None);

    let err = AzureOpenAi::new(config, false, false)
        .generate(DIFF)
        .unwrap_err();

    assert_eq!(err.to_string(), "AZURE_OPENAI_BASE is not set");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_sends_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/test-deployment/chat/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .and(header("api-key", "test-key"))
        .and(body_partial_json(json!({
            "model": "test-deployment",
            "max_tokens": 3000
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("\"feat (x.py): add y\"")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message = generate(config_for(&server)).await.unwrap();

    // quote stripping is the caller's job
    assert_eq!(message, "\"feat (x.py): add y\"");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_embeds_diff_in_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&server)
        .await;

    generate(config_for(&server)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let content = body["messages"][0]["content"].as_str().unwrap();
    assert!(content.starts_with(&get_prompt()));
    assert!(content.ends_with(&format!("Diff: <<<{DIFF}>>>")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_surfaces_service_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "401", "message": "invalid subscription key" }
        })))
        .mount(&server)
        .await;

    let err = generate(config_for(&server)).await.unwrap_err();

    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("invalid subscription key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_does_not_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    assert!(generate(config_for(&server)).await.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_debug_output_leaves_request_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "max_tokens": 3000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("fix (x.py): y")))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let message = tokio::task::spawn_blocking(move || {
        AzureOpenAi::new(config, true, true).generate(DIFF)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(message, "fix (x.py): y");
}
