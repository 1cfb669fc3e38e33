//! Response definitions
//!
//! Represents responses to clients. Every response renders to the UTF-8
//! payload that goes inside a frame.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ParseError;

const FOUND_PREFIX: &[u8] = b"found: ";

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `set` / `del` handed to the engine
    Ok,

    /// `get` hit
    Found(Bytes),

    /// `get` miss
    NotFound,

    /// The request line was rejected before reaching the engine
    Rejected(ParseError),
}

impl Response {
    /// Render the frame payload
    pub fn payload(&self) -> Bytes {
        match self {
            Response::Ok => Bytes::from_static(b"ok"),
            Response::NotFound => Bytes::from_static(b"not found"),
            Response::Found(value) => {
                let mut buf = BytesMut::with_capacity(FOUND_PREFIX.len() + value.len());
                buf.put_slice(FOUND_PREFIX);
                buf.put_slice(value);
                buf.freeze()
            }
            Response::Rejected(err) => Bytes::from(err.to_string()),
        }
    }
}

impl From<ParseError> for Response {
    fn from(err: ParseError) -> Self {
        Response::Rejected(err)
    }
}
