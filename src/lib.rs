//! # nftstake-client
//!
//! Client core for the staking / NFT investment platform. Views bind to the
//! resource units in [`hooks`]; each unit wraps a [`state::resource::Resource`]
//! that tracks the fetch lifecycle of one API endpoint.
//!
//! This crate contains the REST envelope codec and HTTP client (`net`),
//! client-side state machines (`state`), per-endpoint resource units
//! (`hooks`), and environment configuration (`config`).

pub mod config;
pub mod hooks;
pub mod net;
pub mod state;
