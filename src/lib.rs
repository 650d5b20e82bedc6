//! Append-only, hash-linked chains of data records.
//!
//! A [`SimpleBlockchain`] seals each appended payload into a [`ChainLink`]
//! whose SHA-256 hash covers its index, timestamp, payload and the previous
//! link's hash. Chains are verified on demand and whenever they are read back
//! through a [`ChainCodec`].

pub mod chain;
pub mod codec;
pub mod config;
pub mod error;
pub mod hash;
pub mod json;
pub mod link;
pub mod model;
pub mod payload;
pub mod registry;
pub mod shared;
pub mod store;
pub mod xml;

pub use chain::SimpleBlockchain;
pub use codec::ChainCodec;
pub use error::{BreakKind, ChainError, Result};
pub use link::ChainLink;
pub use registry::CodecRegistry;
