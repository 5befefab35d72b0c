//! Relayer API Adapter
//!
//! HTTP implementation of the `RelayerTransport` port. Envelope and
//! payload shapes live in `crate::ports::wire`.

pub mod client;

pub use client::{RelayerClientConfig, RelayerHttpClient};
