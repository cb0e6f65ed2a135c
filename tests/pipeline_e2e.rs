//! End-to-end pipeline tests: real store, real HTTP clients, mock servers
//! for the classification and billing gateways.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::json;

use billing_assist::billing::HttpBillingClient;
use billing_assist::classifier::ChatCompletionsClassifier;
use billing_assist::config::{BillingConfig, ClassifierConfig};
use billing_assist::pipeline::{ChangeListener, MessageProcessor};
use billing_assist::store::{LibSqlStore, Message, MessageStore};

const POLL: Duration = Duration::from_millis(10);

struct Harness {
    store: Arc<dyn MessageStore>,
    listener_handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    /// Wire the real pipeline against the given mock gateway base URLs.
    async fn start(classifier_url: &str, billing_url: &str) -> Self {
        let store: Arc<dyn MessageStore> = Arc::new(LibSqlStore::new_memory().await.unwrap());

        let classifier = Arc::new(ChatCompletionsClassifier::new(&ClassifierConfig {
            api_url: classifier_url.to_string(),
            api_key: SecretString::from("test-key"),
            model: "test-model".to_string(),
        }));
        let billing = Arc::new(HttpBillingClient::new(&BillingConfig {
            site_url: billing_url.to_string(),
            username: "gw-user".to_string(),
            password: SecretString::from("gw-pass"),
        }));

        let processor = Arc::new(MessageProcessor::new(
            Arc::clone(&store),
            classifier,
            billing,
        ));
        let listener = ChangeListener::new(Arc::clone(&store), processor, POLL);
        let listener_handle = tokio::spawn(async move { listener.run().await });

        Self {
            store,
            listener_handle,
        }
    }

    async fn bot_replies(&self) -> Vec<Message> {
        self.store
            .added_after(0)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .filter(|m| m.sender == Message::SENDER_BOT)
            .collect()
    }

    async fn wait_for_reply(&self) -> Message {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(reply) = self.bot_replies().await.into_iter().next() {
                return reply;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for a bot reply"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.listener_handle.abort();
    }
}

fn mock_classification(server: &MockServer, content: &str) {
    let content = content.to_string();
    server.mock(move |when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(json!({ "choices": [{ "message": { "content": content }}] }));
    });
}

fn mock_login_ok(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/mobileapi/v1/Login");
        then.status(200).json_body(json!({ "token": "jwt-e2e" }));
    });
}

#[tokio::test]
async fn user_message_produces_bill_summary_reply() {
    let llm = MockServer::start_async().await;
    let gateway = MockServer::start_async().await;

    mock_classification(
        &llm,
        r#"{"intent":"query_bill","subscriberNo":"12345","month":3,"year":2025}"#,
    );
    mock_login_ok(&gateway);
    let bill_mock = gateway.mock(|when, then| {
        when.method(GET)
            .path("/mobileapi/v1/Billing/QueryBill")
            .query_param("subscriberNo", "12345")
            .query_param("month", "3")
            .query_param("year", "2025")
            .header("authorization", "Bearer jwt-e2e");
        then.status(200)
            .json_body(json!({ "totalRemaining": 42.5, "isPaid": false }));
    });

    let harness = Harness::start(&llm.base_url(), &gateway.base_url()).await;
    let id = harness
        .store
        .append(Message::SENDER_USER, "what's my bill for March")
        .await
        .unwrap();

    let reply = harness.wait_for_reply().await;
    bill_mock.assert();
    assert!(reply.text.contains("Bill Summary for March 2025"));
    assert!(reply.text.contains("Subscriber No: 12345"));
    assert!(reply.text.contains("Remaining Balance: $42.50"));
    assert!(reply.text.contains("Status: Not Paid"));

    assert!(harness.store.get(&id).await.unwrap().unwrap().processed);
}

#[tokio::test]
async fn tokenless_login_yields_literal_error_reply() {
    let llm = MockServer::start_async().await;
    let gateway = MockServer::start_async().await;

    mock_classification(&llm, r#"{"intent":"query_bill","subscriberNo":"1"}"#);
    gateway.mock(|when, then| {
        when.method(POST).path("/mobileapi/v1/Login");
        then.status(200).json_body(json!({ "message": "welcome" }));
    });

    let harness = Harness::start(&llm.base_url(), &gateway.base_url()).await;
    let id = harness
        .store
        .append(Message::SENDER_USER, "my bill please")
        .await
        .unwrap();

    let reply = harness.wait_for_reply().await;
    assert_eq!(reply.text, "Failed to retrieve token");
    assert!(harness.store.get(&id).await.unwrap().unwrap().processed);
}

#[tokio::test]
async fn gibberish_completion_yields_fixed_unknown_reply() {
    let llm = MockServer::start_async().await;
    let gateway = MockServer::start_async().await;

    mock_classification(&llm, "I'm sorry, I don't know what you mean.");
    mock_login_ok(&gateway);

    let harness = Harness::start(&llm.base_url(), &gateway.base_url()).await;
    harness
        .store
        .append(Message::SENDER_USER, "asdf qwerty")
        .await
        .unwrap();

    let reply = harness.wait_for_reply().await;
    assert_eq!(reply.text, "I couldn't understand your request.");
}

#[tokio::test]
async fn billing_outage_becomes_error_reply_and_message_stays_processed() {
    let llm = MockServer::start_async().await;
    let gateway = MockServer::start_async().await;

    mock_classification(
        &llm,
        r#"{"intent":"query_bill","subscriberNo":"2","month":1,"year":2025}"#,
    );
    mock_login_ok(&gateway);
    gateway.mock(|when, then| {
        when.method(GET).path("/mobileapi/v1/Billing/QueryBill");
        then.status(503);
    });

    let harness = Harness::start(&llm.base_url(), &gateway.base_url()).await;
    let id = harness
        .store
        .append(Message::SENDER_USER, "bill for January")
        .await
        .unwrap();

    let reply = harness.wait_for_reply().await;
    assert_eq!(
        reply.text,
        "Billing gateway returned HTTP 503 for QueryBill"
    );
    assert!(harness.store.get(&id).await.unwrap().unwrap().processed);
}

#[tokio::test]
async fn preexisting_unprocessed_message_is_replayed_on_startup() {
    let llm = MockServer::start_async().await;
    let gateway = MockServer::start_async().await;

    mock_classification(
        &llm,
        r#"{"intent":"query_bill","subscriberNo":"3","month":6,"year":2025}"#,
    );
    mock_login_ok(&gateway);
    gateway.mock(|when, then| {
        when.method(GET).path("/mobileapi/v1/Billing/QueryBill");
        then.status(200)
            .json_body(json!({ "totalRemaining": 10.0, "isPaid": true }));
    });

    // The message exists before the listener starts — the feed replays it.
    let store: Arc<dyn MessageStore> = Arc::new(LibSqlStore::new_memory().await.unwrap());
    let id = store
        .append(Message::SENDER_USER, "bill from before the restart")
        .await
        .unwrap();

    let classifier = Arc::new(ChatCompletionsClassifier::new(&ClassifierConfig {
        api_url: llm.base_url(),
        api_key: SecretString::from("test-key"),
        model: "test-model".to_string(),
    }));
    let billing = Arc::new(HttpBillingClient::new(&BillingConfig {
        site_url: gateway.base_url(),
        username: "gw-user".to_string(),
        password: SecretString::from("gw-pass"),
    }));
    let processor = Arc::new(MessageProcessor::new(
        Arc::clone(&store),
        classifier,
        billing,
    ));
    let listener = ChangeListener::new(Arc::clone(&store), processor, POLL);
    let handle = tokio::spawn(async move { listener.run().await });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if store.get(&id).await.unwrap().unwrap().processed {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for replay"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    handle.abort();
}
