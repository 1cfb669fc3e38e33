//! Engine Module
//!
//! The storage engine: a single thread that owns the key-value table and
//! serves it through message passing.
//!
//! ## Responsibilities
//! - Receive set/get/delete messages and apply them one at a time
//! - Reply to `get` on a per-request reply channel
//! - Trigger compaction after enough deletions
//! - Stop on the shutdown signal
//!
//! ## Concurrency Model: Single Owner
//!
//! - Every command kind has its own zero-capacity (rendezvous) channel.
//!   A send returns only once the loop has taken the message.
//! - The loop applies a message completely before it selects again, so a
//!   handler that got past a `set`/`del` send may answer `ok`: any later
//!   message from the same handler observes the mutation.
//! - No ordering is defined between command kinds; `select!` serves
//!   whichever channel is ready.
//! - When the loop exits its receivers drop, so every pending or later
//!   send fails with [`KvError::EngineUnavailable`] instead of hanging.

use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::select;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::protocol::{Command, Response};
use crate::store::Table;

// =============================================================================
// Messages
// =============================================================================

/// Insert or overwrite `key`; no reply
#[derive(Debug)]
pub struct SetCommand {
    pub key: String,
    pub value: Bytes,
}

/// Look up `key`; the result goes back on `reply`
#[derive(Debug)]
pub struct GetCommand {
    pub key: String,
    pub reply: Sender<Option<Bytes>>,
}

/// Remove `key` if present; no reply
#[derive(Debug)]
pub struct DeleteCommand {
    pub key: String,
}

/// Counters reported when the engine stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub sets: u64,
    pub gets: u64,
    pub deletes: u64,
    pub compactions: u64,
    pub live_keys: usize,
}

// =============================================================================
// Engine
// =============================================================================

/// The storage engine loop and the table it owns
pub struct Engine {
    set_rx: Receiver<SetCommand>,
    get_rx: Receiver<GetCommand>,
    del_rx: Receiver<DeleteCommand>,
    shutdown_rx: Receiver<()>,
    table: Table,
}

impl Engine {
    /// Spawn the engine loop on its own thread
    ///
    /// Returns the handle used to talk to it and the guard that stops it.
    pub fn start(config: &Config) -> Result<(EngineHandle, EngineGuard)> {
        let (engine, handle, shutdown_tx) = Self::new(config.compaction_threshold);

        let thread = thread::Builder::new()
            .name("storage-engine".to_string())
            .spawn(move || engine.run())?;

        tracing::debug!(
            compaction_threshold = config.compaction_threshold,
            "storage engine started"
        );

        Ok((
            handle,
            EngineGuard {
                shutdown_tx: Some(shutdown_tx),
                thread: Some(thread),
            },
        ))
    }

    fn new(compaction_threshold: usize) -> (Self, EngineHandle, Sender<()>) {
        let (set_tx, set_rx) = bounded(0);
        let (get_tx, get_rx) = bounded(0);
        let (del_tx, del_rx) = bounded(0);
        let (shutdown_tx, shutdown_rx) = bounded(0);

        let engine = Self {
            set_rx,
            get_rx,
            del_rx,
            shutdown_rx,
            table: Table::new(compaction_threshold),
        };
        let handle = EngineHandle {
            set_tx,
            get_tx,
            del_tx,
        };

        (engine, handle, shutdown_tx)
    }

    /// Process messages until shutdown, or until every handle is gone
    fn run(self) -> EngineStats {
        let Engine {
            set_rx,
            get_rx,
            del_rx,
            shutdown_rx,
            mut table,
        } = self;
        let mut stats = EngineStats::default();

        loop {
            select! {
                recv(set_rx) -> msg => match msg {
                    Ok(SetCommand { key, value }) => {
                        tracing::trace!(%key, len = value.len(), "set");
                        table.set(key, value);
                        stats.sets += 1;
                    }
                    Err(_) => break,
                },
                recv(get_rx) -> msg => match msg {
                    Ok(GetCommand { key, reply }) => {
                        let value = table.get(&key);
                        tracing::trace!(%key, found = value.is_some(), "get");
                        stats.gets += 1;
                        // The requester may have gone away; nothing to do then
                        let _ = reply.send(value);
                    }
                    Err(_) => break,
                },
                recv(del_rx) -> msg => match msg {
                    Ok(DeleteCommand { key }) => {
                        let removed = table.delete(&key);
                        tracing::trace!(
                            %key,
                            removed,
                            pending = table.pending_deletions(),
                            "del"
                        );
                        stats.deletes += 1;
                    }
                    Err(_) => break,
                },
                recv(shutdown_rx) -> _ => {
                    tracing::debug!("storage engine received shutdown signal");
                    break;
                },
            }
        }

        stats.compactions = table.compactions();
        stats.live_keys = table.len();

        tracing::debug!(?stats, "storage engine stopped");
        stats
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable sending side of the engine
///
/// This is the only way to reach the table.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    set_tx: Sender<SetCommand>,
    get_tx: Sender<GetCommand>,
    del_tx: Sender<DeleteCommand>,
}

impl EngineHandle {
    /// Hand a set to the engine
    ///
    /// Returns once the engine has taken the message; the write is applied
    /// before the engine accepts anything else.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>) -> Result<()> {
        self.set_tx
            .send(SetCommand {
                key: key.into(),
                value: value.into(),
            })
            .map_err(|_| KvError::EngineUnavailable)
    }

    /// Look up a key, blocking until the engine replies
    pub fn get(&self, key: impl Into<String>) -> Result<Option<Bytes>> {
        let (reply, reply_rx) = bounded(1);

        self.get_tx
            .send(GetCommand {
                key: key.into(),
                reply,
            })
            .map_err(|_| KvError::EngineUnavailable)?;

        reply_rx.recv().map_err(|_| KvError::EngineUnavailable)
    }

    /// Hand a delete to the engine; no confirmation is awaited
    pub fn delete(&self, key: impl Into<String>) -> Result<()> {
        self.del_tx
            .send(DeleteCommand { key: key.into() })
            .map_err(|_| KvError::EngineUnavailable)
    }

    /// Execute a parsed command and build its response
    pub fn execute(&self, command: Command) -> Result<Response> {
        match command {
            Command::Set { key, value } => {
                self.set(key, value)?;
                Ok(Response::Ok)
            }
            Command::Get { key } => Ok(match self.get(key)? {
                Some(value) => Response::Found(value),
                None => Response::NotFound,
            }),
            Command::Del { key } => {
                self.delete(key)?;
                Ok(Response::Ok)
            }
        }
    }
}

// =============================================================================
// Guard
// =============================================================================

/// Owner of the engine's shutdown signal
///
/// Dropping the guard signals shutdown without waiting for the loop.
#[derive(Debug)]
pub struct EngineGuard {
    shutdown_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<EngineStats>>,
}

impl EngineGuard {
    /// Signal shutdown and wait for the loop to finish
    pub fn shutdown(mut self) -> Result<EngineStats> {
        // Disconnecting the channel is the signal
        self.shutdown_tx.take();

        let thread = self.thread.take().ok_or(KvError::EngineUnavailable)?;
        thread.join().map_err(|_| KvError::EnginePanicked)
    }
}

impl Drop for EngineGuard {
    fn drop(&mut self) {
        self.shutdown_tx.take();
    }
}
