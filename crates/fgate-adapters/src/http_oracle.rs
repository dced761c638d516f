use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fgate_runtime::{BatchCheckItem, BatchCheckResult, OracleClient, OracleConfig, TupleKey};

/// Client for an OpenFGA-compatible HTTP API
pub struct HttpOracleClient {
    client: Client,
    api_url: String,
    store_id: String,
    authorization_model_id: Option<String>,
    api_token: Option<String>,
}

impl HttpOracleClient {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        if config.store_id.is_empty() {
            bail!("oracle.store_id is required for the HTTP oracle");
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            store_id: config.store_id.clone(),
            authorization_model_id: config.authorization_model_id.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/stores/{}/{}", self.api_url, self.store_id, action)
    }

    fn post(&self, action: &str) -> RequestBuilder {
        let request = self.client.post(self.endpoint(action));
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .post(action)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Oracle request '{}' failed", action))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Oracle API error ({}): {}", status, error_body));
        }

        response
            .json()
            .await
            .with_context(|| format!("Malformed oracle response for '{}'", action))
    }
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    tuple_key: &'a TupleKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_model_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct CheckResponse {
    allowed: bool,
}

#[derive(Serialize)]
struct BatchCheckRequest<'a> {
    checks: &'a [BatchCheckItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_model_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct BatchCheckResponse {
    #[serde(default)]
    result: HashMap<String, BatchCheckSingleResult>,
}

#[derive(Deserialize)]
struct BatchCheckSingleResult {
    #[serde(default)]
    allowed: bool,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[async_trait]
impl OracleClient for HttpOracleClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn check(&self, tuple: &TupleKey) -> Result<bool> {
        let response: CheckResponse = self
            .send(
                "check",
                &CheckRequest {
                    tuple_key: tuple,
                    authorization_model_id: self.authorization_model_id.as_deref(),
                },
            )
            .await?;
        Ok(response.allowed)
    }

    async fn check_many(&self, checks: &[BatchCheckItem]) -> Result<Vec<BatchCheckResult>> {
        let response: BatchCheckResponse = self
            .send(
                "batch-check",
                &BatchCheckRequest {
                    checks,
                    authorization_model_id: self.authorization_model_id.as_deref(),
                },
            )
            .await?;

        debug!(requested = checks.len(), answered = response.result.len(), "Batch check answered");

        Ok(response
            .result
            .into_iter()
            .map(|(correlation_id, single)| {
                if let Some(error) = &single.error {
                    warn!(correlation_id = %correlation_id, error = %error, "Oracle could not answer check");
                }
                BatchCheckResult {
                    allowed: single.allowed && single.error.is_none(),
                    correlation_id,
                }
            })
            .collect())
    }
}
