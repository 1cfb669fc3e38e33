//! Network Module
//!
//! TCP listener and per-connection handling.
//!
//! ## Architecture
//! - Single acceptor thread (the caller of [`Server::run`])
//! - One thread per accepted connection
//! - Optional bounded pool of connection slots in front of `accept`
//! - Commands reach the table only through the engine handle

mod server;
mod connection;
mod slots;

pub use server::Server;
pub use connection::Connection;
pub use slots::{ConnectionSlots, SlotPermit};
