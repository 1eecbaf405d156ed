//! A content-addressable object store in the style of git's loose object database.
//!
//! - `areas`: the on-disk pieces of a repository (layout, config, object database, refs)
//! - `artifacts`: object formats, name resolution and history traversal
//! - `commands`: plumbing and porcelain entry points used by the binary
//! - `errors`: the error taxonomy shared by every layer below `commands`

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
