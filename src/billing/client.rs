//! HTTP client for the billing gateway.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::billing::types::{BillPage, BillQuery, BillSummary, DetailedBill, SessionToken};
use crate::config::BillingConfig;
use crate::error::BillingError;

/// Gateway seam — lets the orchestrator run without the network.
#[async_trait]
pub trait BillingGateway: Send + Sync {
    /// Log in with the configured credentials.
    ///
    /// Returns `None` on any failure — network error, non-2xx status, or a
    /// body without a non-empty token. No retry, no backoff, no caching.
    async fn login(&self) -> Option<SessionToken>;

    async fn query_bill(
        &self,
        token: &SessionToken,
        query: &BillQuery,
    ) -> Result<BillSummary, BillingError>;

    async fn query_bill_detailed(
        &self,
        token: &SessionToken,
        query: &BillQuery,
        page: &BillPage,
    ) -> Result<DetailedBill, BillingError>;

    /// Submit a payment. The gateway's response body is opaque and
    /// rendered to the user as-is.
    async fn pay_bill(
        &self,
        token: &SessionToken,
        query: &BillQuery,
    ) -> Result<String, BillingError>;
}

/// reqwest-backed gateway client.
pub struct HttpBillingClient {
    client: reqwest::Client,
    site_url: String,
    username: String,
    password: SecretString,
}

impl HttpBillingClient {
    pub fn new(config: &BillingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            site_url: config.site_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    fn login_url(&self) -> String {
        format!("{}/mobileapi/v1/Login", self.site_url)
    }

    fn billing_url(&self, operation: &str) -> String {
        format!("{}/mobileapi/v1/Billing/{operation}", self.site_url)
    }

    fn period_params(query: &BillQuery) -> [(&'static str, String); 3] {
        [
            ("subscriberNo", query.subscriber_no.clone()),
            ("month", query.month.to_string()),
            ("year", query.year.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[async_trait]
impl BillingGateway for HttpBillingClient {
    async fn login(&self) -> Option<SessionToken> {
        let body = serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        });

        let resp = match self.client.post(self.login_url()).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Gateway login failed");
                return None;
            }
        };

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "Gateway login rejected");
            return None;
        }

        match resp.json::<LoginResponse>().await {
            Ok(LoginResponse { token: Some(token) }) if !token.is_empty() => {
                debug!("Gateway login succeeded");
                Some(SessionToken::new(token))
            }
            Ok(_) => {
                warn!("Gateway login response carried no token");
                None
            }
            Err(e) => {
                warn!(error = %e, "Gateway login response unreadable");
                None
            }
        }
    }

    async fn query_bill(
        &self,
        token: &SessionToken,
        query: &BillQuery,
    ) -> Result<BillSummary, BillingError> {
        let resp = self
            .client
            .get(self.billing_url("QueryBill"))
            .query(&Self::period_params(query))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| BillingError::RequestFailed {
                endpoint: "QueryBill",
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(BillingError::Status {
                endpoint: "QueryBill",
                status: resp.status().as_u16(),
            });
        }

        resp.json().await.map_err(|e| BillingError::InvalidResponse {
            endpoint: "QueryBill",
            reason: e.to_string(),
        })
    }

    async fn query_bill_detailed(
        &self,
        token: &SessionToken,
        query: &BillQuery,
        page: &BillPage,
    ) -> Result<DetailedBill, BillingError> {
        let resp = self
            .client
            .get(self.billing_url("QueryBillDetailed"))
            .query(&Self::period_params(query))
            .query(&[
                ("page", page.page.to_string()),
                ("pageSize", page.page_size.to_string()),
            ])
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| BillingError::RequestFailed {
                endpoint: "QueryBillDetailed",
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(BillingError::Status {
                endpoint: "QueryBillDetailed",
                status: resp.status().as_u16(),
            });
        }

        resp.json().await.map_err(|e| BillingError::InvalidResponse {
            endpoint: "QueryBillDetailed",
            reason: e.to_string(),
        })
    }

    async fn pay_bill(
        &self,
        token: &SessionToken,
        query: &BillQuery,
    ) -> Result<String, BillingError> {
        let resp = self
            .client
            .post(self.billing_url("PayBill"))
            .query(&Self::period_params(query))
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| BillingError::RequestFailed {
                endpoint: "PayBill",
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(BillingError::Status {
                endpoint: "PayBill",
                status: resp.status().as_u16(),
            });
        }

        resp.text().await.map_err(|e| BillingError::InvalidResponse {
            endpoint: "PayBill",
            reason: e.to_string(),
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
