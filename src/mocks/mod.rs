//! Test doubles for the Document Library client.
//!
//! Enabled for this crate's own tests and, for downstream crates, through
//! the `mocks` feature.

mod transport;

pub use transport::{MockResponse, MockTransport};
