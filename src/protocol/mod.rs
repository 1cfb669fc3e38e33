//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Request Format
//! A single UTF-8 text line terminated by `\n`:
//! ```text
//! set <key> <value>     value may contain spaces
//! get <key>
//! del <key>
//! ```
//!
//! ## Response Format
//! ```text
//! ┌──────────────────┬─────────────────────────────┐
//! │ Len (4, u32 LE)  │   Payload (UTF-8, Len bytes) │
//! └──────────────────┴─────────────────────────────┘
//! ```
//!
//! ### Payloads
//! - `ok`
//! - `found: <value>`
//! - `not found`
//! - `unknown command '<token>'`
//! - `parse error: ...` / `value is too long, ...`

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::Response;
pub use codec::{
    check_value_len, decode_request, encode_frame, encode_request, encode_response,
    read_response, write_response, FRAME_HEADER_SIZE, MAX_VALUE_LEN,
};
