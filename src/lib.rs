//! LineKV: a single-node key-value server over a line-delimited protocol
//!
//! Clients open a TCP connection and exchange newline-framed GET/PUT
//! requests and responses. Values are durable in one file per key and
//! served through a bounded in-memory cache with a pluggable eviction
//! policy.
//!
//! # Architecture
//!
//! - Thread-per-connection blocking I/O with a sequential accept loop
//! - Write-through cache in front of per-key file storage
//! - Eviction strategy (FIFO, LRU, LFU) fixed at server construction
//! - One shared store behind a global mutex

/// Eviction-policy caches
pub mod cache;

/// Client library for the wire protocol
pub mod client;

/// Configuration management for the server
pub mod config;

/// Error types and result aliases
pub mod error;

/// Network layer for connection handling
pub mod network;

/// Line-oriented wire protocol implementation
pub mod protocol;

/// Core server implementation
pub mod server;

/// Per-key file persistence
pub mod storage;

/// Cache and storage composition
pub mod store;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use server::Server;
