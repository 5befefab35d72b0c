//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the lifecycle client requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `RelayerTransport`: JSON request/response to the relayer HTTP API
//! - `SigningKey`: opaque holder of the maker/taker key
//! - `ChainApproval`: ERC-20 allowance for the protocol's transfer proxy
//!
//! `wire` holds the relayer envelope codec and DTOs shared by all of them.

pub mod chain;
pub mod relayer;
pub mod signing;
pub mod wire;

pub use chain::{ApprovalReceipt, ChainApproval};
pub use relayer::{HttpMethod, RelayerTransport, TransportError};
pub use signing::{SigningError, SigningKey};
