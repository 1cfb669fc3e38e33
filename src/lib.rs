//! # RendezKV
//!
//! An in-memory key-value store served over TCP with:
//! - A line-based text request protocol (`set` / `get` / `del`)
//! - Length-prefixed binary response frames
//! - A single storage engine thread that owns the map outright
//! - Rendezvous handoff between connection handlers and the engine
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Listener                            │
//! │              (one thread per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Connection Handlers                           │
//! │        (decode line → command, encode response frame)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  set / get / del  (zero-capacity channels)
//!                       ▼
//!               ┌───────────────┐
//!               │Storage Engine │ ── get reply (per-request channel)
//!               │ (owns Table)  │
//!               └───────────────┘
//! ```
//!
//! Nothing is persisted; the table lives as long as the engine thread.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

mod store;
pub mod protocol;
pub mod engine;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, ParseError, Result};
pub use config::{Config, Mode};
pub use engine::{Engine, EngineGuard, EngineHandle, EngineStats};
pub use network::Server;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RendezKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
