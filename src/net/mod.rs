//! Network layer: wire envelope, domain records, and the API client.
//!
//! DESIGN
//! ======
//! Every endpoint answers with the same `{success, data, error, message}`
//! envelope. `envelope` turns that duck-typed shape into a `Result` once, at
//! the boundary, so nothing above `net` inspects optional fields.

pub mod api;
pub mod envelope;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;
