//! Object types and their canonical encodings
//!
//! Every object is stored as `<type> <size>\0<payload>` and identified by the SHA-1
//! of exactly those bytes. There are four kinds:
//!
//! - **Blob**: file content (raw bytes)
//! - **Tree**: directory listing (mode, path and object id per entry)
//! - **Commit**: snapshot metadata in the key-value-list-with-message format
//! - **Tag**: annotated pointer to another object, same format as commits

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod kvlm;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of a SHA-1 hash in raw bytes, as embedded in tree entries
pub const OBJECT_ID_RAW_LENGTH: usize = 20;
