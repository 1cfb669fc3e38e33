//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{self, BufRead, BufReader, BufWriter};
use std::net::TcpStream;

use crate::engine::EngineHandle;
use crate::error::{KvError, Result};
use crate::protocol::{decode_request, write_response, Response};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed per response)
    writer: BufWriter<TcpStream>,

    /// Sending side of the storage engine
    engine: EngineHandle,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: EngineHandle) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Responses are small; don't let Nagle hold them back
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads request lines in a loop and answers each with one frame.
    /// Returns `Ok` when the client goes away, `Err` on any other I/O
    /// failure or when the storage engine is gone.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("serving {}", self.peer_addr);

        let mut line = String::new();
        loop {
            line.clear();

            match self.reader.read_line(&mut line) {
                // A line cut off by end-of-stream is dropped with the connection
                Ok(_) if !line.ends_with('\n') => {
                    tracing::debug!("disconnecting {}", self.peer_addr);
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) if is_disconnect(&e) => {
                    tracing::debug!("disconnecting {}: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("disconnecting {} due to error: {}", self.peer_addr, e);
                    return Err(e.into());
                }
            }

            tracing::trace!("received from {}: {:?}", self.peer_addr, line.trim_end());

            let response = match self.dispatch(&line) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("disconnecting {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            if let Err(e) = write_response(&mut self.writer, &response) {
                if let KvError::Io(ref io_err) = e {
                    if is_disconnect(io_err) {
                        tracing::debug!(
                            "client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!(
                    "disconnecting {} due to failure while sending a message: {}",
                    self.peer_addr,
                    e
                );
                return Err(e);
            }
        }
    }

    /// Turn one request line into a response
    ///
    /// Malformed lines are answered in-band and never reach the engine.
    fn dispatch(&self, line: &str) -> Result<Response> {
        match decode_request(line) {
            Ok(command) => self.engine.execute(command),
            Err(err) => {
                tracing::debug!("rejected request from {}: {}", self.peer_addr, err);
                Ok(Response::from(err))
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}
