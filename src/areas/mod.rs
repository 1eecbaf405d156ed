//! Core repository components
//!
//! - `config`: the control directory's configuration file
//! - `database`: loose object store
//! - `refs`: reference files (HEAD, branches, tags)
//! - `repository`: ties the pieces together around one worktree

pub mod config;
pub mod database;
pub mod refs;
pub mod repository;
