use crate::auth::{canonical_body, sign_request, signing_input};
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::Utc;
use configuration::settings::ApiConfig;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing;

mod auth;
pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{ApiResponse, CallStatus, RemoteEnvelope};

/// Header carrying the vendor identifier on every request.
const HEADER_VENDOR: &str = "x-vendor";
/// Header pinning the remote API version.
const HEADER_API_VERSION: &str = "x-api-version";
/// Header carrying the request timestamp in milliseconds since the epoch.
const HEADER_TIMESTAMP: &str = "x-timestamp";
/// Header carrying the hex HMAC-SHA256 digest of the request.
const HEADER_SIGNATURE: &str = "x-auth-signature";

/// The API version this client speaks.
const API_VERSION: &str = "1";

/// Number of records a summary call asks for when the caller does not say.
pub const DEFAULT_SUMMARY_LIMIT: u32 = 10;

/// The generic, abstract interface for the bookkeeping API client.
/// This trait is the contract callers program against, allowing the
/// underlying implementation (live or mock) to be swapped out.
///
/// Every method resolves to a normalized [`ApiResponse`] instead of a
/// `Result`: remote rejections and transport failures alike are folded into
/// the envelope, so callers inspect `status` rather than match on errors.
#[async_trait]
pub trait VyaparApi: Send + Sync {
    /// Fetches a capped listing of inventory items.
    async fn item_summary(&self, limit: u32) -> ApiResponse;

    /// Fetches full records for the given item ids.
    async fn item_detailed(&self, item_ids: &[i64]) -> ApiResponse;

    /// Fetches a capped listing of parties (customers and suppliers).
    async fn party_summary(&self, limit: u32) -> ApiResponse;

    /// Fetches full records for the given party ids.
    async fn party_detailed(&self, party_ids: &[i64]) -> ApiResponse;

    /// Fetches a capped listing of transactions.
    async fn transaction_summary(&self, limit: u32) -> ApiResponse;

    /// Fetches full records for the given transaction ids.
    async fn transaction_detailed(&self, transaction_ids: &[i64]) -> ApiResponse;
}

/// The three record families the remote API exposes. Each maps onto a pair
/// of endpoints and, for detailed lookups, its own id-list field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entity {
    Item,
    Party,
    Transaction,
}

impl Entity {
    fn summary_endpoint(self) -> &'static str {
        match self {
            Entity::Item => "items-summary",
            Entity::Party => "parties-summary",
            Entity::Transaction => "transactions-summary",
        }
    }

    fn detailed_endpoint(self) -> &'static str {
        match self {
            Entity::Item => "items-detailed",
            Entity::Party => "parties-detailed",
            Entity::Transaction => "transactions-detailed",
        }
    }

    fn ids_field(self) -> &'static str {
        match self {
            Entity::Item => "item_ids",
            Entity::Party => "party_ids",
            Entity::Transaction => "transaction_ids",
        }
    }
}

/// A concrete implementation of [`VyaparApi`] against the live Vyapar API.
///
/// Credentials and identity are fixed at construction; the instance is
/// cheaply cloneable and safe to share, since every call builds its own
/// timestamp and signature.
#[derive(Clone)]
pub struct VyaparClient {
    client: reqwest::Client,
    base_url: String,
    user_id: i64,
    vendor: String,
    api_key: String,
    timeout_secs: u64,
}

impl VyaparClient {
    /// Builds a client scoped to one remote account.
    ///
    /// Fails fast with [`ApiError::Configuration`] when either credential is
    /// missing or blank; proceeding would only produce unverifiable
    /// signatures.
    pub fn new(user_id: i64, config: &ApiConfig) -> Result<Self, ApiError> {
        if config.api_key.trim().is_empty() {
            return Err(ApiError::Configuration(
                "VYAPAR_API_KEY must be set to a non-empty secret key".to_string(),
            ));
        }
        if config.vendor.trim().is_empty() {
            return Err(ApiError::Configuration(
                "VYAPAR_VENDOR must be set to a non-empty vendor id".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_VENDOR,
            HeaderValue::from_str(&config.vendor).map_err(|_| {
                ApiError::Configuration(
                    "VYAPAR_VENDOR contains characters that cannot appear in a header".to_string(),
                )
            })?,
        );
        headers.insert(HEADER_API_VERSION, HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to build reqwest client"),
            base_url: normalize_base_url(&config.base_url),
            user_id,
            vendor: config.vendor.clone(),
            api_key: config.api_key.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn summary_payload(&self, limit: u32) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("user_data_identifier_id".to_string(), json!(self.user_id));
        payload.insert("limit".to_string(), json!(limit));
        payload
    }

    fn detailed_payload(&self, entity: Entity, ids: &[i64]) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("user_data_identifier_id".to_string(), json!(self.user_id));
        payload.insert(entity.ids_field().to_string(), json!(ids));
        payload
    }

    async fn summary(&self, entity: Entity, limit: u32) -> ApiResponse {
        self.post_signed(entity.summary_endpoint(), self.summary_payload(limit))
            .await
    }

    async fn detailed(&self, entity: Entity, ids: &[i64]) -> ApiResponse {
        self.post_signed(entity.detailed_endpoint(), self.detailed_payload(entity, ids))
            .await
    }

    /// The single point where a request is signed and sent and its outcome
    /// normalized.
    ///
    /// The canonical body string computed here is used both as the signed
    /// text and as the bytes on the wire; signing a re-serialization would
    /// risk a mismatch the remote verifier rejects.
    async fn post_signed(&self, endpoint: &str, payload: Map<String, Value>) -> ApiResponse {
        let url = format!("{}{}", self.base_url, endpoint);
        let timestamp = Utc::now().timestamp_millis().to_string();

        let body = canonical_body(&payload);
        let signature = sign_request(
            &self.api_key,
            &signing_input(&body, &self.vendor, &timestamp),
        );

        tracing::debug!(%url, %timestamp, "Sending signed request");

        let result = self
            .client
            .post(&url)
            .header(HEADER_TIMESTAMP, timestamp.as_str())
            .header(HEADER_SIGNATURE, signature.as_str())
            .body(body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                let err = ApiError::from_transport(err, self.timeout_secs);
                tracing::warn!(%url, error = %err, "Transport failure");
                return ApiResponse::transport_failure(err.to_string());
            }
        };

        let http_status = response.status().as_u16();
        // Read the raw bytes first: a timeout or dropped connection while the
        // body streams is a transport failure, not a malformed remote reply.
        let envelope = match response.bytes().await {
            // A body that is not JSON still classifies by HTTP status alone.
            Ok(bytes) => serde_json::from_slice::<RemoteEnvelope>(&bytes).unwrap_or_default(),
            Err(err) => {
                let err = ApiError::from_transport(err, self.timeout_secs);
                tracing::warn!(%url, error = %err, "Transport failure while reading the body");
                return ApiResponse::transport_failure(err.to_string());
            }
        };

        let outcome = responses::classify_outcome(http_status, envelope);
        match outcome.status {
            CallStatus::Success => tracing::debug!(%url, http_status, "Call succeeded"),
            CallStatus::Failed => {
                tracing::warn!(%url, http_status, message = %outcome.message, "Call failed");
            }
        }
        outcome
    }
}

#[async_trait]
impl VyaparApi for VyaparClient {
    async fn item_summary(&self, limit: u32) -> ApiResponse {
        self.summary(Entity::Item, limit).await
    }

    async fn item_detailed(&self, item_ids: &[i64]) -> ApiResponse {
        self.detailed(Entity::Item, item_ids).await
    }

    async fn party_summary(&self, limit: u32) -> ApiResponse {
        self.summary(Entity::Party, limit).await
    }

    async fn party_detailed(&self, party_ids: &[i64]) -> ApiResponse {
        self.detailed(Entity::Party, party_ids).await
    }

    async fn transaction_summary(&self, limit: u32) -> ApiResponse {
        self.summary(Entity::Transaction, limit).await
    }

    async fn transaction_detailed(&self, transaction_ids: &[i64]) -> ApiResponse {
        self.detailed(Entity::Transaction, transaction_ids).await
    }
}

/// Guarantees exactly one trailing slash so endpoint names concatenate
/// cleanly whether or not the configured URL carried one.
fn normalize_base_url(raw: &str) -> String {
    format!("{}/", raw.trim_end_matches('/'))
}
