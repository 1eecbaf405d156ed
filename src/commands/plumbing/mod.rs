//! Plumbing commands
//!
//! - `hash-object`: compute an object id and optionally store the object
//! - `cat-file`: print an object's payload
//! - `ls-tree`: list the entries of a tree
//! - `rev-parse`: resolve a revision to a full hash
//! - `show-ref`: list every reference with its hash

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
pub mod rev_parse;
pub mod show_ref;
