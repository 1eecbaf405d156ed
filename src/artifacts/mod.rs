//! Object model and the algorithms built on it
//!
//! - `objects`: object kinds, the canonical codec, tree and header formats
//! - `revision`: reference names and revision expressions
//! - `log`: commit history traversal

pub mod log;
pub mod objects;
pub mod revision;
