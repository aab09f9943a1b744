//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by concern (`resource`, `countdown`, `auth`) so resource
//! units and views depend on small focused models.

pub mod auth;
pub mod countdown;
pub mod resource;
