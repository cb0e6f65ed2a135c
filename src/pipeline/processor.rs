//! Message processor — classify, authenticate, bill, reply.
//!
//! Flow per qualifying message:
//! 1. Classifier extracts a raw intent; defaults fill the gaps
//! 2. Fresh gateway login (no token survives a pipeline run)
//! 3. Dispatch on intent → formatted reply text
//! 4. Persist the reply as a bot message, mark the source processed
//!
//! Every error raised in steps 1-3 is caught here; the source message is
//! marked processed on success and failure alike, so a message is handled
//! at most once across restarts.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::billing::client::BillingGateway;
use crate::classifier::{Intent, IntentClassifier};
use crate::error::PipelineError;
use crate::format;
use crate::pipeline::types::{BillingRequest, IntentDefaults};
use crate::store::traits::{Message, MessageStore};

/// Drives one message through the full pipeline.
pub struct MessageProcessor {
    store: Arc<dyn MessageStore>,
    classifier: Arc<dyn IntentClassifier>,
    billing: Arc<dyn BillingGateway>,
    defaults: IntentDefaults,
}

impl MessageProcessor {
    pub fn new(
        store: Arc<dyn MessageStore>,
        classifier: Arc<dyn IntentClassifier>,
        billing: Arc<dyn BillingGateway>,
    ) -> Self {
        Self {
            store,
            classifier,
            billing,
            defaults: IntentDefaults::default(),
        }
    }

    /// Whether a change-feed addition needs handling at all. Bot replies,
    /// empty texts, and already-processed documents are skipped.
    pub fn should_handle(message: &Message) -> bool {
        message.is_from_user() && !message.text.is_empty() && !message.processed
    }

    /// Handle one added message end to end.
    ///
    /// This is the per-task error boundary: nothing escapes to the caller,
    /// so one failing message never affects others or the listener loop.
    pub async fn handle(&self, message: &Message) {
        if !Self::should_handle(message) {
            debug!(id = %message.id, sender = %message.sender, "Skipping message");
            return;
        }

        info!(id = %message.id, "Processing user message");

        let reply = match self.run(message).await {
            Ok(text) => text,
            Err(e) => {
                error!(id = %message.id, error = %e, "Pipeline failed");
                // The error's display text is surfaced to the user verbatim.
                e.to_string()
            }
        };

        self.finish(&message.id, &reply).await;
    }

    /// Steps 1-3: classify, authenticate, dispatch.
    async fn run(&self, message: &Message) -> Result<String, PipelineError> {
        let raw = self.classifier.classify(&message.text).await?;
        let request = BillingRequest::resolve(raw, &self.defaults);
        debug!(
            id = %message.id,
            intent = request.intent.label(),
            subscriber = %request.subscriber_no,
            "Intent resolved"
        );

        // Token acquisition precedes dispatch, so auth failures surface
        // even when the intent never reaches the billing backend.
        let token = self.billing.login().await.ok_or(PipelineError::Auth)?;

        let reply = match request.intent {
            Intent::QueryBill => {
                let bill = self.billing.query_bill(&token, &request.query()).await?;
                format::bill_summary(&request.subscriber_no, request.month, request.year, &bill)
            }
            Intent::QueryBillDetailed => {
                let bill = self
                    .billing
                    .query_bill_detailed(&token, &request.query(), &request.paging())
                    .await?;
                format::detailed_bill(&request.subscriber_no, request.month, request.year, &bill)
            }
            Intent::PayBill => self.billing.pay_bill(&token, &request.query()).await?,
            Intent::Unknown => format::UNKNOWN_INTENT_REPLY.to_string(),
        };

        Ok(reply)
    }

    /// Step 4: persist the reply, flip the processed flag. Store failures
    /// here are logged and dropped — there is no further fallback.
    async fn finish(&self, source_id: &str, reply: &str) {
        if let Err(e) = self.store.append(Message::SENDER_BOT, reply).await {
            error!(id = source_id, error = %e, "Failed to persist bot reply");
        }
        if let Err(e) = self.store.mark_processed(source_id).await {
            error!(id = source_id, error = %e, "Failed to mark message processed");
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
