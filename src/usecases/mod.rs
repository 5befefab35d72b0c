//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! client's workflows.
//!
//! Use cases:
//! - `OrderSigner`: domain-separated signing of orders, fills, cancels
//! - `SportX`: order lifecycle client over the relayer

pub mod signer;
pub mod sportx;

pub use signer::OrderSigner;
pub use sportx::{CancelSubmission, FillSubmission, OrderSubmission, SportX};
