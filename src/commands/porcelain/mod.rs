//! Porcelain commands
//!
//! - `init`: create a repository
//! - `log`: commit graph as graphviz
//! - `tag`: list tags or create one
//! - `checkout`: materialize a tree into an empty directory

pub mod checkout;
pub mod init;
pub mod log;
pub mod tag;
