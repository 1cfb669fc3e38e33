//! TCP Server
//!
//! Accepts connections and runs each on its own thread.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use super::{Connection, ConnectionSlots, SlotPermit};
use crate::config::Config;
use crate::engine::EngineHandle;
use crate::error::{KvError, Result};

/// TCP server for RendezKV
pub struct Server {
    listener: TcpListener,
    engine: EngineHandle,

    /// Admission limit, `None` when connections are unbounded
    slots: Option<ConnectionSlots>,
}

impl Server {
    /// Bind the configured address
    pub fn bind(config: &Config, engine: EngineHandle) -> Result<Self> {
        let listener = TcpListener::bind(&config.address).map_err(|source| KvError::Bind {
            addr: config.address.clone(),
            source,
        })?;

        let slots = (config.max_connections > 0)
            .then(|| ConnectionSlots::new(config.max_connections));

        Ok(Self {
            listener,
            engine,
            slots,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Connection slots, if an admission limit is configured
    pub fn slots(&self) -> Option<&ConnectionSlots> {
        self.slots.as_ref()
    }

    /// Run the accept loop (blocking)
    ///
    /// Only returns on an accept failure, which the caller should treat as
    /// fatal: without its listening socket the server has nothing to do.
    pub fn run(self) -> Result<()> {
        tracing::info!("listening {}", self.local_addr()?);

        loop {
            let permit = self.slots.as_ref().map(ConnectionSlots::acquire);

            let (stream, peer) = self.listener.accept().map_err(|e| {
                tracing::error!("accept failed: {}", e);
                KvError::Accept(e)
            })?;

            self.spawn_handler(stream, peer, permit);
        }
    }

    fn spawn_handler(&self, stream: TcpStream, peer: SocketAddr, permit: Option<SlotPermit>) {
        let engine = self.engine.clone();

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                // Held for the lifetime of the handler
                let _permit = permit;

                let result = Connection::new(stream, engine).and_then(|mut conn| conn.handle());
                if let Err(e) = result {
                    tracing::debug!("connection {} closed with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::warn!("failed to spawn handler for {}: {}", peer, e);
        }
    }
}
