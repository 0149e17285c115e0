//! An async HTTP client for FReD keygroup storage nodes
//!
//! The client turns keygroup and item operations into single HTTP/1.1 requests
//! against a node's web interface and returns the raw response bodies.
//!
//! # Features
//! - Async/await API using tokio
//! - Optional API version prefix on every path
//! - Identifiers percent-encoded into their own path segments
//! - Keygroup, item, replica and trigger routes
//! - Optional per-request timeout
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fred_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fred_client::Error> {
//!     let client = Client::new("localhost", 9001)?;
//!
//!     client.create_keygroup("kg").await?;
//!     client.put("kg", "1", "hi!").await?;
//!
//!     let value = client.read("kg", "1").await?;
//!     println!("Read: {}", String::from_utf8_lossy(&value));
//!
//!     client.delete("kg", "1").await?;
//!     client.delete_keygroup("kg").await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod error;
pub mod types;

pub use bytes::Bytes;
pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use types::*;
