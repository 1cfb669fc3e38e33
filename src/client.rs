//! Client
//!
//! Blocking client for the wire protocol, and the interactive terminal
//! loop behind `--mode client`.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{encode_request, read_response, Command};

/// A connection to a RendezKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one raw request line and wait for its response payload
    ///
    /// A trailing `\n` is added when missing.
    pub fn send_line(&mut self, line: &str) -> Result<String> {
        self.writer.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;

        read_response(&mut self.reader)
    }

    /// Send a command and wait for its response payload
    pub fn execute(&mut self, command: &Command) -> Result<String> {
        self.send_line(&encode_request(command))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<String> {
        self.execute(&Command::Set {
            key: key.to_string(),
            value: Bytes::copy_from_slice(value.as_bytes()),
        })
    }

    pub fn get(&mut self, key: &str) -> Result<String> {
        self.execute(&Command::Get {
            key: key.to_string(),
        })
    }

    pub fn del(&mut self, key: &str) -> Result<String> {
        self.execute(&Command::Del {
            key: key.to_string(),
        })
    }
}

/// Run the interactive client on stdin/stdout until stdin closes
pub fn run_interactive(config: &Config) -> Result<()> {
    tracing::info!("connecting to {}", config.address);
    let client = Client::connect(&config.address)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    repl(client, stdin.lock(), stdout.lock())
}

/// Prompt/response loop over arbitrary input and output
pub fn repl<R: BufRead, W: Write>(mut client: Client, mut input: R, mut output: W) -> Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            tracing::info!("disconnecting");
            return Ok(());
        }

        if line.trim().is_empty() {
            continue;
        }

        let response = client.send_line(&line)?;
        writeln!(output, "< {}", response)?;
    }
}
