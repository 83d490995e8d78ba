//! Remote client capability for Guild Manager
//!
//! The engine never talks to the remote service directly; it goes through
//! the [`RemoteClient`] trait defined here. Each call fails independently
//! with a typed [`RemoteError`], and the engine decides what is fatal,
//! what is retried, and what merely skips dependent operations.
//!
//! [`memory::InMemoryGuild`] is a complete in-process implementation used
//! by the CLI's simulated apply and by every executor test. Live transport
//! implementations are intentionally out of tree.

mod client;
mod error;
pub mod memory;

pub use client::{RemoteClient, fetch_snapshot};
pub use error::RemoteError;
