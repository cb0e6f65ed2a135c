//! Intent classification via an OpenAI-compatible completions gateway.
//!
//! The user's raw text goes to `/v1/chat/completions` with a fixed system
//! instruction demanding a bare JSON object; the single text completion is
//! parsed into a [`RawIntent`]. Output the model got wrong degrades to an
//! unknown intent instead of erroring; transport failures still surface.

pub mod intent;

pub use intent::{Intent, RawIntent};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::warn;

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;

/// System instruction for the completions call. The model must answer with
/// only a raw JSON object — no prose, no code fences, no reasoning tags.
const INTENT_SYSTEM_PROMPT: &str = r#"You are an API assistant. Given a user's message, respond with **only a raw JSON object**, without any commentary, reasoning, or tags like <think>. Your output must be **only valid JSON** in this format:
For billing actions:
{
  "intent": "query_bill" | "query_bill_detailed" | "pay_bill",
  "subscriberNo": "123456",
  "month": 3,
  "year": 2025
}

The years dont have to be 4 digits, for example the user can ask for year 1, 10, 123...

You MUST:
- NOT Wrap the JSON in triple backticks like ```json
- Return ONLY a JSON object.
- NOT include <think> tags or any explanation.
- NOT comment or reason your response.
- NOT guess missing values.
- Always return something in valid JSON format."#;

/// Classification seam — lets the orchestrator run without the network.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify raw user text into a structured intent.
    async fn classify(&self, text: &str) -> Result<RawIntent, ClassifierError>;
}

/// Classifier backed by an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionsClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
}

impl ChatCompletionsClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.api_url)
    }
}

#[async_trait]
impl IntentClassifier for ChatCompletionsClassifier {
    async fn classify(&self, text: &str) -> Result<RawIntent, ClassifierError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": INTENT_SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
        });

        let resp = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::RequestFailed {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(ClassifierError::RequestFailed {
                reason: format!("completions endpoint returned {}", resp.status()),
            });
        }

        let data: serde_json::Value =
            resp.json()
                .await
                .map_err(|e| ClassifierError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        let content = data
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ClassifierError::InvalidResponse {
                reason: "no completion content in response".into(),
            })?;

        Ok(parse_intent(content))
    }
}

/// Parse the model's text completion. No retry on malformed output — it
/// degrades to an unknown intent so the orchestrator always has something
/// to dispatch on.
pub fn parse_intent(raw: &str) -> RawIntent {
    match serde_json::from_str::<RawIntent>(raw.trim()) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, raw = raw, "Classifier returned invalid JSON");
            RawIntent::unknown()
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    fn test_classifier(base_url: &str) -> ChatCompletionsClassifier {
        ChatCompletionsClassifier::new(&ClassifierConfig {
            api_url: base_url.to_string(),
            api_key: SecretString::from("test-key"),
            model: "test-model".to_string(),
        })
    }

    #[test]
    fn parse_intent_valid_json() {
        let raw = parse_intent(r#"{"intent":"query_bill","subscriberNo":"42","month":1,"year":2025}"#);
        assert_eq!(raw.intent(), Intent::QueryBill);
        assert_eq!(raw.subscriber_no.as_deref(), Some("42"));
    }

    #[test]
    fn parse_intent_malformed_degrades_to_unknown() {
        for raw in [
            "I think the user wants their bill.",
            "```json\n{\"intent\":\"query_bill\"}\n```",
            "<think>hmm</think>{\"intent\":\"pay_bill\"}",
            "",
        ] {
            assert_eq!(parse_intent(raw).intent(), Intent::Unknown);
        }
    }

    #[test]
    fn parse_intent_non_object_json_degrades_to_unknown() {
        // Valid JSON, wrong shape.
        assert_eq!(parse_intent(r#""query_bill""#).intent(), Intent::Unknown);
        assert_eq!(parse_intent("[1, 2]").intent(), Intent::Unknown);
    }

    #[test]
    fn parse_intent_tolerates_surrounding_whitespace() {
        let raw = parse_intent("  {\"intent\":\"pay_bill\"}\n");
        assert_eq!(raw.intent(), Intent::PayBill);
    }

    #[tokio::test]
    async fn classify_parses_completion_content() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(json!({
                "choices": [{ "message": {
                    "content": "{\"intent\":\"query_bill\",\"subscriberNo\":\"12345\",\"month\":3,\"year\":2025}"
                }}]
            }));
        });

        let raw = test_classifier(&server.base_url())
            .classify("what's my bill for March")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(raw.intent(), Intent::QueryBill);
        assert_eq!(raw.month, Some(3));
        assert_eq!(raw.year, Some(2025));
    }

    #[tokio::test]
    async fn classify_malformed_completion_is_unknown_not_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{ "message": { "content": "Sorry, I can't help with that." }}]
            }));
        });

        let raw = test_classifier(&server.base_url())
            .classify("gibberish")
            .await
            .unwrap();
        assert_eq!(raw.intent(), Intent::Unknown);
    }

    #[tokio::test]
    async fn classify_non_2xx_is_an_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429);
        });

        let err = test_classifier(&server.base_url())
            .classify("anything")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn classify_missing_content_is_an_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        });

        let err = test_classifier(&server.base_url())
            .classify("anything")
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidResponse { .. }));
    }
}
