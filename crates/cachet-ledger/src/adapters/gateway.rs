//! HTTP gateway ledger adapter.
//!
//! Talks JSON to a ledger gateway: `POST /records`, `GET /records/{id}`,
//! `GET /records/{id}/validity`, `GET /health`. The gateway shields the
//! orchestrator from whatever chain protocol sits behind it.
//!
//! A gateway configured without an endpoint reports itself unavailable on
//! every call; missing configuration is never treated as a successful write.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cachet_core::config::LedgerConfig;
use cachet_core::types::{LedgerId, LedgerRecordRef, RecordId, RecordPayload};

use crate::error::AdapterError;
use crate::traits::{Connectivity, ILedger, LedgerRecord};

/// Per-request timeout; the orchestrator's overall deadline sits above this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How an HTTP status translates into the adapter error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx.
    Success,
    /// 404.
    NotFound,
    /// Other 4xx: the gateway understood us and said no.
    Rejected,
    /// 5xx and everything else: could not get a usable answer.
    Unavailable,
}

/// Classify an HTTP status code. Pure function so the mapping is testable
/// without a server.
pub fn classify_status(status: reqwest::StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Success
    } else if status == reqwest::StatusCode::NOT_FOUND {
        StatusClass::NotFound
    } else if status.is_client_error() {
        StatusClass::Rejected
    } else {
        StatusClass::Unavailable
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    payload: &'a RecordPayload,
}

#[derive(Deserialize)]
struct SubmitResponse {
    record_id: String,
    /// Base64-encoded proof blob.
    proof: String,
    explorer_url: Option<String>,
}

#[derive(Deserialize)]
struct FetchResponse {
    record_id: String,
    payload: RecordPayload,
    committed_at: DateTime<Utc>,
    proof: String,
}

#[derive(Deserialize)]
struct ValidityResponse {
    valid: bool,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Ledger adapter speaking to an HTTP record gateway.
pub struct GatewayLedger {
    id: LedgerId,
    client: reqwest::Client,
    endpoint: Option<String>,
    auth_token: Option<String>,
    explorer_base: Option<String>,
}

impl GatewayLedger {
    /// Create an adapter for the given endpoint.
    pub fn new(id: LedgerId, endpoint: impl Into<String>) -> Self {
        Self {
            id,
            client: reqwest::Client::new(),
            endpoint: Some(endpoint.into()),
            auth_token: None,
            explorer_base: None,
        }
    }

    /// Build from a `[ledgers.*]` configuration section. An absent endpoint
    /// yields an adapter that reports itself unavailable.
    pub fn from_config(id: LedgerId, config: &LedgerConfig) -> Self {
        Self {
            id,
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            auth_token: config
                .auth_token
                .clone()
                .filter(|token| !token.is_empty()),
            explorer_base: config.explorer_base.clone(),
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Attach a base URL for browsable explorer references.
    pub fn with_explorer_base(mut self, base: impl Into<String>) -> Self {
        self.explorer_base = Some(base.into());
        self
    }

    fn endpoint(&self) -> Result<&str, AdapterError> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| AdapterError::unavailable(&self.id, "no endpoint configured"))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.timeout(REQUEST_TIMEOUT);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Browsable reference for a record: the gateway's own if it sent one,
    /// otherwise derived from the configured explorer base.
    fn explorer_url(&self, from_gateway: Option<String>, record_id: &str) -> Option<String> {
        from_gateway.or_else(|| {
            self.explorer_base
                .as_ref()
                .map(|base| format!("{}/records/{}", base.trim_end_matches('/'), record_id))
        })
    }

    /// Pull the gateway's error message out of a failed response body.
    async fn error_detail(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => format!("HTTP {}: {}", status, body.error),
            Err(_) => format!("HTTP {}", status),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> AdapterError {
        AdapterError::unavailable(&self.id, err.to_string())
    }

    fn decode_error(&self, err: reqwest::Error) -> AdapterError {
        AdapterError::unavailable(&self.id, format!("invalid response: {}", err))
    }

    fn decode_proof(&self, encoded: &str) -> Result<Vec<u8>, AdapterError> {
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| {
                AdapterError::unavailable(&self.id, format!("invalid proof encoding: {}", e))
            })
    }
}

#[async_trait]
impl ILedger for GatewayLedger {
    async fn submit(&self, payload: &RecordPayload) -> Result<LedgerRecordRef, AdapterError> {
        let endpoint = self.endpoint()?;
        let url = format!("{}/records", endpoint.trim_end_matches('/'));

        let response = self
            .request(self.client.post(&url))
            .json(&SubmitRequest { payload })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match classify_status(response.status()) {
            StatusClass::Success => {
                let body: SubmitResponse =
                    response.json().await.map_err(|e| self.decode_error(e))?;
                let proof = self.decode_proof(&body.proof)?;
                let explorer_url = self.explorer_url(body.explorer_url, &body.record_id);

                tracing::info!(
                    ledger = %self.id,
                    record_id = %body.record_id,
                    kind = payload.kind(),
                    "record committed via gateway"
                );

                Ok(LedgerRecordRef {
                    ledger: self.id.clone(),
                    record_id: RecordId::new(body.record_id),
                    proof,
                    explorer_url,
                })
            }
            // A 404 on submit means the gateway has no such route or
            // collection; that is a caller/deployment error, not a miss.
            StatusClass::NotFound | StatusClass::Rejected => Err(AdapterError::Rejected {
                ledger: self.id.clone(),
                reason: Self::error_detail(response).await,
            }),
            StatusClass::Unavailable => Err(AdapterError::Unavailable {
                ledger: self.id.clone(),
                reason: Self::error_detail(response).await,
            }),
        }
    }

    async fn fetch(&self, record_id: &RecordId) -> Result<LedgerRecord, AdapterError> {
        let endpoint = self.endpoint()?;
        let url = format!(
            "{}/records/{}",
            endpoint.trim_end_matches('/'),
            record_id.as_str()
        );

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match classify_status(response.status()) {
            StatusClass::Success => {
                let body: FetchResponse =
                    response.json().await.map_err(|e| self.decode_error(e))?;
                let proof = self.decode_proof(&body.proof)?;
                Ok(LedgerRecord {
                    record_id: RecordId::new(body.record_id),
                    payload: body.payload,
                    committed_at: body.committed_at,
                    proof,
                })
            }
            StatusClass::NotFound => Err(AdapterError::NotFound {
                ledger: self.id.clone(),
                record_id: record_id.clone(),
            }),
            StatusClass::Rejected => Err(AdapterError::Rejected {
                ledger: self.id.clone(),
                reason: Self::error_detail(response).await,
            }),
            StatusClass::Unavailable => Err(AdapterError::Unavailable {
                ledger: self.id.clone(),
                reason: Self::error_detail(response).await,
            }),
        }
    }

    async fn check_validity(&self, record_id: &RecordId) -> Result<bool, AdapterError> {
        let endpoint = self.endpoint()?;
        let url = format!(
            "{}/records/{}/validity",
            endpoint.trim_end_matches('/'),
            record_id.as_str()
        );

        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match classify_status(response.status()) {
            StatusClass::Success => {
                let body: ValidityResponse =
                    response.json().await.map_err(|e| self.decode_error(e))?;
                Ok(body.valid)
            }
            StatusClass::NotFound => Err(AdapterError::NotFound {
                ledger: self.id.clone(),
                record_id: record_id.clone(),
            }),
            StatusClass::Rejected => Err(AdapterError::Rejected {
                ledger: self.id.clone(),
                reason: Self::error_detail(response).await,
            }),
            StatusClass::Unavailable => Err(AdapterError::Unavailable {
                ledger: self.id.clone(),
                reason: Self::error_detail(response).await,
            }),
        }
    }

    async fn connectivity(&self) -> Connectivity {
        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint,
            Err(_) => return Connectivity::unreachable("no endpoint configured"),
        };
        let url = format!("{}/health", endpoint.trim_end_matches('/'));

        match self.request(self.client.get(&url)).send().await {
            Ok(response) if response.status().is_success() => {
                Connectivity::reachable(format!("gateway at {}", endpoint))
            }
            Ok(response) => {
                Connectivity::unreachable(format!("health check returned HTTP {}", response.status()))
            }
            Err(e) => Connectivity::unreachable(e.to_string()),
        }
    }

    fn ledger_id(&self) -> &LedgerId {
        &self.id
    }
}
