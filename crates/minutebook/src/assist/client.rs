//! The external text-improvement collaborator.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::AssistConfig;
use crate::error::{Error, Result};

const SYSTEM_PROMPT: &str = "You are an editor of formal meeting minutes. Proofread, improve the \
wording without changing the meaning, write a concise formal executive summary, and list anything \
missing. Reply with JSON only.";

const RESPONSE_SHAPE: &str = r#"{"agendaItems":[{"item":"","speaker":""}],"decisions":[{"decision":"","responsible":"","deadline":""}],"executiveSummary":"","issues":[""]}"#;

/// Something that can rewrite minutes text.
///
/// The input is the normalized request payload; the output is the raw text
/// the service answered with. Interpreting that text is the adapter's job.
#[async_trait]
pub trait Improver: Send + Sync + std::fmt::Debug {
    /// Send one improvement request.
    ///
    /// # Errors
    ///
    /// Returns an error for any transport failure or unusable response.
    async fn improve(&self, input: &Value) -> Result<String>;
}

/// An OpenAI-compatible chat completions client.
#[derive(Debug, Clone)]
pub struct HttpImprover {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl HttpImprover {
    /// Build a client from the `[assist]` configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is set, or an external
    /// service error if the HTTP client cannot be built.
    pub fn new(config: &AssistConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::ConfigValidation {
                message: "assist.api_key is required for the external service".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn request_body(&self, input: &Value) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Improve the wording and fix spelling without changing the meaning. \
                         Write a clear, short executive summary.\n\
                         Return JSON only, shaped exactly like:\n{RESPONSE_SHAPE}\n\nInput:\n{input}"
                    ),
                },
            ],
        })
    }
}

#[async_trait]
impl Improver for HttpImprover {
    async fn improve(&self, input: &Value) -> Result<String> {
        debug!(url = %self.url, model = %self.model, "Requesting text improvement");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(input))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::external(format!("HTTP {status}")));
        }

        let body: Value = response.json().await?;
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::external("response carries no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> AssistConfig {
        AssistConfig {
            api_key: Some("sk-test".to_string()),
            endpoint: "https://llm.example.com/v1/".to_string(),
            ..AssistConfig::default()
        }
    }

    #[test]
    fn test_new_requires_key() {
        let err = HttpImprover::new(&AssistConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_url_joins_endpoint() {
        let improver = HttpImprover::new(&config_with_key()).unwrap();
        assert_eq!(improver.url, "https://llm.example.com/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let improver = HttpImprover::new(&config_with_key()).unwrap();
        let body = improver.request_body(&json!({"meetingTitle": "Budget"}));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("\"meetingTitle\":\"Budget\""));
        assert!(user.contains("executiveSummary"));
    }
}
