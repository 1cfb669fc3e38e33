//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request
//! One text line, fields separated by the first space(s):
//! ```text
//! <command> SP <key> [SP <value>] LF
//! ```
//!
//! ### Response
//! ```text
//! ┌──────────────────┬─────────────────────────────┐
//! │ Len (4, u32 LE)  │         Payload             │
//! └──────────────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, CommandType, Response};
use crate::error::{KvError, ParseError, Result};

/// Response header size: 4 byte little-endian payload length
pub const FRAME_HEADER_SIZE: usize = 4;

/// Largest value a `set` may carry
pub const MAX_VALUE_LEN: u32 = u32::MAX;

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Decode a request line into a command
///
/// Surrounding whitespace (including the line terminator) is ignored.
/// The command token is matched before the argument is required, so a
/// bare `frobnicate` reports an unknown command rather than a missing
/// argument.
pub fn decode_request(line: &str) -> std::result::Result<Command, ParseError> {
    let line = line.trim();

    let (token, rest) = match line.split_once(' ') {
        Some((token, rest)) => (token, Some(rest)),
        None => (line, None),
    };

    let command_type = CommandType::from_token(token)
        .ok_or_else(|| ParseError::UnknownCommand(token.to_string()))?;

    let rest = rest.ok_or_else(|| ParseError::MissingArgument(token.to_string()))?;

    match command_type {
        CommandType::Set => {
            let (key, value) = rest
                .split_once(' ')
                .ok_or_else(|| ParseError::MissingValue(rest.to_string()))?;
            check_value_len(value.len())?;

            Ok(Command::Set {
                key: key.to_string(),
                value: Bytes::copy_from_slice(value.as_bytes()),
            })
        }
        CommandType::Get => Ok(Command::Get {
            key: rest.to_string(),
        }),
        CommandType::Del => Ok(Command::Del {
            key: rest.to_string(),
        }),
    }
}

/// Encode a command as a request line (including the trailing `\n`)
pub fn encode_request(command: &Command) -> String {
    match command {
        Command::Set { key, value } => {
            format!("set {} {}\n", key, String::from_utf8_lossy(value))
        }
        Command::Get { key } => format!("get {}\n", key),
        Command::Del { key } => format!("del {}\n", key),
    }
}

/// Reject values whose length does not fit the 32-bit length space
pub fn check_value_len(len: usize) -> std::result::Result<(), ParseError> {
    if len as u64 > MAX_VALUE_LEN as u64 {
        return Err(ParseError::ValueTooLong(len));
    }
    Ok(())
}

// =============================================================================
// Response Framing
// =============================================================================

/// Prefix a payload with its little-endian u32 length
pub fn encode_frame(payload: &[u8]) -> Result<Bytes> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        KvError::Protocol(format!(
            "response payload too large: {} bytes (max {})",
            payload.len(),
            u32::MAX
        ))
    })?;

    let mut frame = BytesMut::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.put_u32_le(len);
    frame.put_slice(payload);

    Ok(frame.freeze())
}

/// Encode a response to a complete frame
pub fn encode_response(response: &Response) -> Result<Bytes> {
    encode_frame(&response.payload())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a framed response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let frame = encode_response(response)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read one framed response from a stream and return its text payload
///
/// Blocks until the whole frame is received or an error occurs
pub fn read_response<R: Read>(reader: &mut R) -> Result<String> {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_le_bytes(header) as usize;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    String::from_utf8(payload)
        .map_err(|e| KvError::Protocol(format!("response is not valid UTF-8: {}", e)))
}
