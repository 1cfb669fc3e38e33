//! Store Module
//!
//! The key-value map owned by the storage engine loop.
//!
//! ## Responsibilities
//! - Hold the live entries
//! - Count deletions and rebuild the map once the count reaches the
//!   compaction threshold, releasing capacity left behind by removals
//!
//! The module is private to the crate: the only way in from outside is a
//! message sent through [`crate::engine::EngineHandle`].

mod table;

pub(crate) use table::Table;
