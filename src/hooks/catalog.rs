//! Catalog units: membership tiers, marketplace NFTs, missions, news.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::api::{PlatformApi, fetch_memberships, fetch_missions, fetch_news, fetch_nfts};
use crate::net::types::{Membership, Mission, NewsItem, Nft};
use crate::state::auth::AuthSession;
use crate::state::resource::{AsyncResource, Resource};

pub struct Memberships {
    api: Arc<dyn PlatformApi>,
    resource: Resource<Vec<Membership>>,
}

impl Memberships {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("memberships") }
    }

    pub async fn mount(&self) {
        self.resource.trigger((), |()| fetch_memberships(self.api.as_ref())).await;
    }

    pub async fn refetch(&self) {
        self.resource.refetch(|()| fetch_memberships(self.api.as_ref())).await;
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Vec<Membership>> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Vec<Membership>>> {
        self.resource.subscribe()
    }
}

pub struct Nfts {
    api: Arc<dyn PlatformApi>,
    resource: Resource<Vec<Nft>>,
}

impl Nfts {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("nfts") }
    }

    pub async fn mount(&self) {
        self.resource.trigger((), |()| fetch_nfts(self.api.as_ref())).await;
    }

    pub async fn refetch(&self) {
        self.resource.refetch(|()| fetch_nfts(self.api.as_ref())).await;
    }

    /// Listed NFTs only, when loaded.
    #[must_use]
    pub fn listed(&self) -> Vec<Nft> {
        self.resource
            .snapshot()
            .into_data()
            .map(|nfts| nfts.into_iter().filter(|n| n.listed).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Vec<Nft>> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Vec<Nft>>> {
        self.resource.subscribe()
    }
}

/// Missions, personalised when a session token is present.
pub struct Missions {
    api: Arc<dyn PlatformApi>,
    resource: Resource<Vec<Mission>, Option<String>>,
}

impl Missions {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("missions") }
    }

    /// Refetch when the session token changed.
    pub async fn sync(&self, session: Option<&AuthSession>) {
        let token = session.map(|s| s.token.clone());
        self.resource
            .trigger(token, |token| async move { fetch_missions(self.api.as_ref(), token.as_deref()).await })
            .await;
    }

    pub async fn refetch(&self) {
        self.resource
            .refetch(|token| async move { fetch_missions(self.api.as_ref(), token.as_deref()).await })
            .await;
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Vec<Mission>> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Vec<Mission>>> {
        self.resource.subscribe()
    }
}

pub struct News {
    api: Arc<dyn PlatformApi>,
    resource: Resource<Vec<NewsItem>>,
}

impl News {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("news") }
    }

    pub async fn mount(&self) {
        self.resource.trigger((), |()| fetch_news(self.api.as_ref())).await;
    }

    pub async fn refetch(&self) {
        self.resource.refetch(|()| fetch_news(self.api.as_ref())).await;
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Vec<NewsItem>> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Vec<NewsItem>>> {
        self.resource.subscribe()
    }
}
