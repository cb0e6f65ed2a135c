//! Environment-driven configuration, read once at startup.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default classification endpoint base URL.
const DEFAULT_CLASSIFIER_API_URL: &str = "https://api.together.xyz";

/// Default classification model identifier.
const DEFAULT_CLASSIFIER_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.1";

/// Default liveness listen port.
const DEFAULT_PORT: u16 = 3000;

/// Default message-store location.
const DEFAULT_DB_PATH: &str = "./data/billing-assist.db";

/// Default change-feed poll interval in milliseconds.
const DEFAULT_POLL_MS: u64 = 1000;

/// Top-level runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub billing: BillingConfig,
    pub classifier: ClassifierConfig,
    pub store: StoreConfig,
    /// Liveness endpoint listen port (`PORT`, default 3000).
    pub listen_port: u16,
    /// Change-feed poll interval (`BILLING_ASSIST_POLL_MS`, default 1000ms).
    pub poll_interval: Duration,
}

/// Billing gateway settings.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Gateway base URL (`SITE_URL`).
    pub site_url: String,
    /// Login username (`GATEWAY_USER`).
    pub username: String,
    /// Login password (`GATEWAY_PASS`).
    pub password: SecretString,
}

/// Intent-classification gateway settings.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Completions endpoint base URL (`CLASSIFIER_API_URL`).
    pub api_url: String,
    /// API key (`TOGETHER_API_KEY`).
    pub api_key: SecretString,
    /// Model identifier (`CLASSIFIER_MODEL`).
    pub model: String,
}

/// Message-store settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database file path (`BILLING_ASSIST_DB_PATH`).
    pub db_path: String,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Required: `SITE_URL`, `GATEWAY_USER`, `GATEWAY_PASS`,
    /// `TOGETHER_API_KEY`. Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            billing: BillingConfig {
                site_url: required("SITE_URL")?,
                username: required("GATEWAY_USER")?,
                password: SecretString::from(required("GATEWAY_PASS")?),
            },
            classifier: ClassifierConfig {
                api_url: optional("CLASSIFIER_API_URL", DEFAULT_CLASSIFIER_API_URL),
                api_key: SecretString::from(required("TOGETHER_API_KEY")?),
                model: optional("CLASSIFIER_MODEL", DEFAULT_CLASSIFIER_MODEL),
            },
            store: StoreConfig {
                db_path: optional("BILLING_ASSIST_DB_PATH", DEFAULT_DB_PATH),
            },
            listen_port: parse_or("PORT", DEFAULT_PORT)?,
            poll_interval: Duration::from_millis(parse_or(
                "BILLING_ASSIST_POLL_MS",
                DEFAULT_POLL_MS,
            )?),
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: name.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
