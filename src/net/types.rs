//! Domain records decoded from API payloads.
//!
//! Field names follow the API's camelCase JSON. Optional fields default so
//! older or partial server responses still decode.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Staking phase lifecycle as reported by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Upcoming,
    Active,
    Completed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A staking phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub phase_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub apy: f64,
    #[serde(default)]
    pub min_stake: f64,
    #[serde(default)]
    pub total_staked: f64,
    #[serde(default)]
    pub capacity: Option<f64>,
}

impl Phase {
    /// True when `id` names this phase (`"2"` matches `phaseId: 2`).
    #[must_use]
    pub fn matches_id(&self, id: &str) -> bool {
        id.trim().parse::<u64>().is_ok_and(|n| n == self.phase_id)
    }
}

/// Network-wide staking statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockchainStats {
    pub network: String,
    pub block_height: u64,
    pub total_staked: f64,
    pub total_stakers: u64,
    pub total_rewards_distributed: f64,
    pub current_apy: f64,
}

/// One entry in a wallet's transaction history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default)]
    pub phase_id: Option<u64>,
}

/// A purchasable membership tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub duration_days: Option<u32>,
}

/// A marketplace NFT.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub token_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub listed: bool,
}

/// A user mission with progress toward its target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reward: f64,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub target: u32,
    #[serde(default)]
    pub completed: bool,
}

/// A news article summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// Authenticated user profile as persisted alongside the session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub membership: Option<String>,
}
