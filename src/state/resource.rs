//! Async resource lifecycle: `Idle → Loading → Success | Error`.
//!
//! DESIGN
//! ======
//! A [`Resource`] owns the observable state of one fetch. Views subscribe to
//! a `watch` channel; resource units drive it with [`Resource::trigger`]
//! (runs when the dependency value changes) and [`Resource::refetch`]
//! (always runs, reusing the last dependency value).
//!
//! Every trigger takes a new generation number. A settlement only lands if
//! its generation is still the latest, so a slow response for an old
//! dependency value can never overwrite a newer one.
//!
//! ERROR HANDLING
//! ==============
//! Fetch errors are stored as user-facing strings and never returned to the
//! caller. If a fetch future is dropped before it settles, a guard moves the
//! resource out of `Loading` so observers never wait forever.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::net::envelope::FetchError;

// =============================================================================
// STATE
// =============================================================================

/// Coarse lifecycle status, for callers that do not need the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Observable state of one fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum AsyncResource<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> AsyncResource<T> {
    #[must_use]
    pub fn status(&self) -> ResourceStatus {
        match self {
            Self::Idle => ResourceStatus::Idle,
            Self::Loading => ResourceStatus::Loading,
            Self::Success(_) => ResourceStatus::Success,
            Self::Error(_) => ResourceStatus::Error,
        }
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Consume into the payload, if any.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }
}

// =============================================================================
// RESOURCE
// =============================================================================

struct Trigger<D> {
    /// Generation of the most recent trigger; 0 before the first one.
    generation: u64,
    deps: Option<D>,
}

/// Drives one [`AsyncResource`] through its lifecycle.
///
/// `D` is the dependency value; a change in `D` restarts the fetch.
pub struct Resource<T, D = ()> {
    name: &'static str,
    state: watch::Sender<AsyncResource<T>>,
    trigger: Mutex<Trigger<D>>,
}

impl<T, D> Resource<T, D>
where
    T: Clone + Send + Sync,
    D: Clone + PartialEq,
{
    /// New idle resource; `name` labels its log lines.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let (state, _) = watch::channel(AsyncResource::Idle);
        Self { name, state, trigger: Mutex::new(Trigger { generation: 0, deps: None }) }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<T> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AsyncResource<T>> {
        self.state.subscribe()
    }

    /// Generation of the latest trigger.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Dependency value of the latest trigger.
    #[must_use]
    pub fn deps(&self) -> Option<D> {
        self.lock().deps.clone()
    }

    /// Fetch if `deps` differs from the last trigger, on first use, or when
    /// the last fetch failed.
    ///
    /// Returns `false` without calling `fetch` when `deps` is unchanged and
    /// the resource is loading or holds data.
    pub async fn trigger<F, Fut>(&self, deps: D, fetch: F) -> bool
    where
        F: FnOnce(D) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let Some(generation) = self.begin(&deps, false) else {
            return false;
        };
        self.run(generation, fetch(deps)).await;
        true
    }

    /// Fetch again with the last dependency value, clearing any error.
    ///
    /// Returns `false` if the resource has never been triggered.
    pub async fn refetch<F, Fut>(&self, fetch: F) -> bool
    where
        F: FnOnce(D) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let Some(deps) = self.deps() else {
            return false;
        };
        let Some(generation) = self.begin(&deps, true) else {
            return false;
        };
        self.run(generation, fetch(deps)).await;
        true
    }

    /// Settle immediately with `value` without fetching.
    ///
    /// Used when a required dependency is absent. Same no-op rule as
    /// [`Resource::trigger`].
    pub fn resolve(&self, deps: D, value: T) -> bool {
        let Some(generation) = self.begin(&deps, false) else {
            return false;
        };
        self.settle(generation, Ok(value))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Trigger<D>> {
        self.trigger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, deps: &D, force: bool) -> Option<u64> {
        let mut trigger = self.lock();
        let errored = matches!(*self.state.borrow(), AsyncResource::Error(_));
        if !force && !errored && trigger.generation > 0 && trigger.deps.as_ref() == Some(deps) {
            return None;
        }
        trigger.generation += 1;
        trigger.deps = Some(deps.clone());
        self.state.send_replace(AsyncResource::Loading);
        debug!(resource = self.name, generation = trigger.generation, "fetch started");
        Some(trigger.generation)
    }

    async fn run<Fut>(&self, generation: u64, fut: Fut)
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut guard = SettleGuard { resource: self, generation, settled: false };
        let result = fut.await;
        guard.settled = true;
        self.settle(generation, result);
    }

    /// Publish a settled result if `generation` is still the latest.
    fn settle(&self, generation: u64, result: Result<T, FetchError>) -> bool {
        let trigger = self.lock();
        if trigger.generation != generation {
            debug!(resource = self.name, generation, latest = trigger.generation, "discarding stale response");
            return false;
        }
        let next = match result {
            Ok(data) => {
                debug!(resource = self.name, generation, "fetch succeeded");
                AsyncResource::Success(data)
            }
            Err(err) => {
                warn!(resource = self.name, generation, error = %err, "fetch failed");
                AsyncResource::Error(err.user_message())
            }
        };
        self.state.send_replace(next);
        true
    }
}

/// Moves the resource out of `Loading` if the fetch future is dropped early.
struct SettleGuard<'a, T, D>
where
    T: Clone + Send + Sync,
    D: Clone + PartialEq,
{
    resource: &'a Resource<T, D>,
    generation: u64,
    settled: bool,
}

impl<T, D> Drop for SettleGuard<'_, T, D>
where
    T: Clone + Send + Sync,
    D: Clone + PartialEq,
{
    fn drop(&mut self) {
        if !self.settled {
            self.resource.settle(self.generation, Err(FetchError::Cancelled));
        }
    }
}
