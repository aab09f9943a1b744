//! Resource units, one per platform endpoint.
//!
//! DESIGN
//! ======
//! Each unit pairs a [`Resource`](crate::state::resource::Resource) with the
//! typed fetcher for its endpoint. Views call `mount` (or `sync` / `select`
//! for units keyed by a dependency) and observe the state through
//! `subscribe`. `refetch` retries with the last dependency value.

pub mod catalog;
pub mod chain;
pub mod staking;
