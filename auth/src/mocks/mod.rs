//! Mock provider implementations for testing.
//!
//! In-memory stand-ins for the identity provider, used by unit and
//! integration tests.

pub mod provider;

pub use provider::{MockIdentityProvider, ProviderCall};
