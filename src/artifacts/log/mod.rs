//! Commit history traversal
//!
//! - `rev_list`: depth-first walk over every parent of a commit, visiting each
//!   commit once even when histories merge or a corrupt graph loops

pub mod rev_list;
