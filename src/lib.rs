//! SportX Order Engine — Library Root
//!
//! Client-side engine for building, signing and tracking peer-to-peer
//! betting orders against the SportX relayer. Re-exports all modules
//! for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;

pub use domain::errors::{Result, SportxError};
pub use usecases::SportX;
