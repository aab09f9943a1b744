//! REST API client and typed endpoint fetchers.
//!
//! DESIGN
//! ======
//! `PlatformApi` is the seam between resource units and the network: one
//! `get` returning a decoded [`Envelope`]. `HttpApi` implements it over
//! `reqwest`; tests substitute in-memory implementations. The typed
//! `fetch_*` functions own the endpoint paths and payload keys.
//!
//! ERROR HANDLING
//! ==============
//! Transport problems surface as [`ApiError`]; the fetchers fold them into
//! [`FetchError`] so callers handle a single taxonomy.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use tracing::debug;

use super::envelope::{Envelope, FetchError};
use super::types::{BlockchainStats, Membership, Mission, NewsItem, Nft, Phase, Transaction};
use crate::config::{ClientConfig, Timeouts};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the HTTP transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be sent or the body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The server returned 404; `message` is the envelope's failure text
    /// when the body was an envelope.
    #[error("not found: {path}")]
    NotFound { path: String, message: Option<String> },

    /// A non-success status whose body is not an envelope.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// A success status whose body is not an envelope.
    #[error("API response parse failed: {0}")]
    Decode(String),
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::HttpClientBuild(msg) | ApiError::Request(msg) => Self::Network(msg),
            ApiError::NotFound { message: Some(msg), .. } => Self::Rejected(msg),
            ApiError::NotFound { path, message: None } => Self::NotFound { kind: "Resource", id: path },
            ApiError::Status { status, .. } => Self::Network(format!("server returned status {status}")),
            ApiError::Decode(msg) => Self::Decode(msg),
        }
    }
}

// =============================================================================
// CLIENT SEAM
// =============================================================================

/// Read access to the platform API.
#[async_trait::async_trait]
pub trait PlatformApi: Send + Sync {
    /// `GET {base}{path}`, optionally authenticated with a bearer token.
    async fn get(&self, path: &str, token: Option<&str>) -> Result<Envelope, ApiError>;
}

/// `reqwest`-backed [`PlatformApi`].
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// Build a client from parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl PlatformApi for HttpApi {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<Envelope, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;
        debug!(%url, status, bytes = text.len(), "api response");

        if status == 404 {
            return match serde_json::from_str::<Envelope>(&text) {
                Ok(envelope) if envelope.success => Ok(envelope),
                Ok(envelope) => Err(ApiError::NotFound { path: path.to_owned(), message: Some(envelope.failure_message()) }),
                Err(_) => Err(ApiError::NotFound { path: path.to_owned(), message: None }),
            };
        }
        match serde_json::from_str::<Envelope>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(e) if (200..300).contains(&status) => Err(ApiError::Decode(e.to_string())),
            Err(_) => Err(ApiError::Status { status, body: text }),
        }
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// How a single phase is resolved by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhaseLookup {
    /// `GET /phases/{id}`.
    #[default]
    Direct,
    /// `GET /phases` and search the collection locally.
    Scan,
}

/// All staking phases, in server order.
///
/// # Errors
///
/// Any transport or envelope failure.
pub async fn fetch_phases(api: &dyn PlatformApi) -> Result<Vec<Phase>, FetchError> {
    api.get("/phases", None).await?.payload("phases")
}

/// One staking phase by id.
///
/// # Errors
///
/// `NotFound` when no phase has this id; otherwise any transport or envelope failure.
pub async fn fetch_phase(api: &dyn PlatformApi, id: &str, lookup: PhaseLookup) -> Result<Phase, FetchError> {
    let not_found = || FetchError::NotFound { kind: "Phase", id: id.to_owned() };
    let Ok(numeric) = id.trim().parse::<u64>() else {
        return Err(not_found());
    };
    match lookup {
        PhaseLookup::Direct => match api.get(&format!("/phases/{numeric}"), None).await {
            Ok(envelope) => envelope.payload("phase"),
            Err(ApiError::NotFound { .. }) => Err(not_found()),
            Err(e) => Err(e.into()),
        },
        PhaseLookup::Scan => find_phase(fetch_phases(api).await?, id),
    }
}

/// Linear search of a fetched phase collection.
///
/// # Errors
///
/// `NotFound` when no element matches `id`.
pub fn find_phase(phases: Vec<Phase>, id: &str) -> Result<Phase, FetchError> {
    phases
        .into_iter()
        .find(|p| p.matches_id(id))
        .ok_or_else(|| FetchError::NotFound { kind: "Phase", id: id.to_owned() })
}

/// Network-wide staking statistics.
///
/// # Errors
///
/// Any transport or envelope failure.
pub async fn fetch_blockchain_stats(api: &dyn PlatformApi) -> Result<BlockchainStats, FetchError> {
    api.get("/blockchain/stats", None).await?.payload("stats")
}

/// Transaction history for `wallet`, authenticated with `token` when present.
///
/// # Errors
///
/// `NotFound` without a request when `wallet` is not a plain alphanumeric
/// address; otherwise any transport or envelope failure.
pub async fn fetch_transaction_history(
    api: &dyn PlatformApi,
    wallet: &str,
    token: Option<&str>,
) -> Result<Vec<Transaction>, FetchError> {
    if wallet.is_empty() || !wallet.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FetchError::NotFound { kind: "Wallet", id: wallet.to_owned() });
    }
    api.get(&format!("/transactions/{wallet}"), token).await?.payload("transactions")
}

/// Membership tiers.
///
/// # Errors
///
/// Any transport or envelope failure.
pub async fn fetch_memberships(api: &dyn PlatformApi) -> Result<Vec<Membership>, FetchError> {
    api.get("/memberships", None).await?.payload("memberships")
}

/// Marketplace NFTs.
///
/// # Errors
///
/// Any transport or envelope failure.
pub async fn fetch_nfts(api: &dyn PlatformApi) -> Result<Vec<Nft>, FetchError> {
    api.get("/nfts", None).await?.payload("nfts")
}

/// Missions visible to the caller.
///
/// # Errors
///
/// Any transport or envelope failure.
pub async fn fetch_missions(api: &dyn PlatformApi, token: Option<&str>) -> Result<Vec<Mission>, FetchError> {
    api.get("/missions", token).await?.payload("missions")
}

/// Latest news items.
///
/// # Errors
///
/// Any transport or envelope failure.
pub async fn fetch_news(api: &dyn PlatformApi) -> Result<Vec<NewsItem>, FetchError> {
    api.get("/news", None).await?.payload("news")
}
