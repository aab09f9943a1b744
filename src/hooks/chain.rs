//! On-chain data units: network statistics and wallet transaction history.

#[cfg(test)]
#[path = "chain_test.rs"]
mod chain_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::api::{PlatformApi, fetch_blockchain_stats, fetch_transaction_history};
use crate::net::envelope::FetchError;
use crate::net::types::{BlockchainStats, Transaction};
use crate::state::auth::AuthSession;
use crate::state::resource::{AsyncResource, Resource};

/// Network-wide staking statistics.
pub struct ChainStats {
    api: Arc<dyn PlatformApi>,
    resource: Resource<BlockchainStats>,
}

impl ChainStats {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("blockchain_stats") }
    }

    pub async fn mount(&self) {
        self.resource.trigger((), |()| fetch_blockchain_stats(self.api.as_ref())).await;
    }

    pub async fn refetch(&self) {
        self.resource.refetch(|()| fetch_blockchain_stats(self.api.as_ref())).await;
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<BlockchainStats> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<BlockchainStats>> {
        self.resource.subscribe()
    }
}

/// Dependency value for [`TransactionHistory`]: who is asking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryKey {
    pub wallet: Option<String>,
    pub token: Option<String>,
}

impl HistoryKey {
    #[must_use]
    pub fn from_session(session: Option<&AuthSession>) -> Self {
        Self {
            wallet: session.and_then(AuthSession::wallet_address).map(str::to_owned),
            token: session.map(|s| s.token.clone()),
        }
    }
}

/// Transaction history of the signed-in wallet.
///
/// Without a wallet address the unit settles to an empty list and makes no
/// request.
pub struct TransactionHistory {
    api: Arc<dyn PlatformApi>,
    resource: Resource<Vec<Transaction>, HistoryKey>,
}

impl TransactionHistory {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("transaction_history") }
    }

    /// Refetch when the session's wallet or token changed.
    pub async fn sync(&self, session: Option<&AuthSession>) {
        let key = HistoryKey::from_session(session);
        if key.wallet.is_none() {
            self.resource.resolve(key, Vec::new());
            return;
        }
        self.resource.trigger(key, |key| self.load(key)).await;
    }

    pub async fn refetch(&self) {
        self.resource.refetch(|key| self.load(key)).await;
    }

    async fn load(&self, key: HistoryKey) -> Result<Vec<Transaction>, FetchError> {
        match key.wallet.as_deref() {
            Some(wallet) => fetch_transaction_history(self.api.as_ref(), wallet, key.token.as_deref()).await,
            None => Ok(Vec::new()),
        }
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Vec<Transaction>> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Vec<Transaction>>> {
        self.resource.subscribe()
    }
}
