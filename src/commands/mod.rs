//! Command implementations behind the `bitstore` binary
//!
//! - `plumbing`: direct access to objects and references (hash-object, cat-file,
//!   ls-tree, rev-parse, show-ref)
//! - `porcelain`: small user-facing workflows (init, log, tag, checkout)
//!
//! Each command writes its output through [`Repository::writer`] so tests can
//! capture it.
//!
//! [`Repository::writer`]: crate::areas::repository::Repository::writer

pub mod plumbing;
pub mod porcelain;
