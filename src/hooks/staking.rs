//! Staking phase units: the phase list and a single phase by id.

#[cfg(test)]
#[path = "staking_test.rs"]
mod staking_test;

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::watch;

use crate::net::api::{PhaseLookup, PlatformApi, fetch_phase, fetch_phases};
use crate::net::types::Phase;
use crate::state::countdown::{Countdown, CountdownTimer};
use crate::state::resource::{AsyncResource, Resource};

/// All staking phases.
pub struct Phases {
    api: Arc<dyn PlatformApi>,
    resource: Resource<Vec<Phase>>,
}

impl Phases {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api, resource: Resource::new("phases") }
    }

    /// Fetch on first mount; later calls are no-ops.
    pub async fn mount(&self) {
        self.resource.trigger((), |()| fetch_phases(self.api.as_ref())).await;
    }

    pub async fn refetch(&self) {
        self.resource.refetch(|()| fetch_phases(self.api.as_ref())).await;
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Vec<Phase>> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Vec<Phase>>> {
        self.resource.subscribe()
    }
}

/// One staking phase, keyed by its id.
pub struct PhaseById {
    api: Arc<dyn PlatformApi>,
    lookup: PhaseLookup,
    resource: Resource<Phase, String>,
}

impl PhaseById {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>, lookup: PhaseLookup) -> Self {
        Self { api, lookup, resource: Resource::new("phase") }
    }

    /// Load phase `id`; a no-op when `id` is already selected and did not fail.
    pub async fn select(&self, id: &str) {
        let lookup = self.lookup;
        self.resource
            .trigger(id.to_owned(), |id| async move { fetch_phase(self.api.as_ref(), &id, lookup).await })
            .await;
    }

    pub async fn refetch(&self) {
        let lookup = self.lookup;
        self.resource
            .refetch(|id| async move { fetch_phase(self.api.as_ref(), &id, lookup).await })
            .await;
    }

    /// Id of the current selection.
    #[must_use]
    pub fn selected(&self) -> Option<String> {
        self.resource.deps()
    }

    #[must_use]
    pub fn state(&self) -> AsyncResource<Phase> {
        self.resource.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<Phase>> {
        self.resource.subscribe()
    }
}

/// Time left in `phase` at `now`; zero when the phase has no end date.
#[must_use]
pub fn phase_countdown(phase: &Phase, now: OffsetDateTime) -> Countdown {
    phase.end_date.map_or_else(Countdown::default, |end| Countdown::until(end, now))
}

/// Start a ticking countdown toward the end of `phase`.
#[must_use]
pub fn start_phase_countdown(phase: &Phase, period: Duration) -> CountdownTimer {
    CountdownTimer::start(phase_countdown(phase, OffsetDateTime::now_utc()), period)
}
