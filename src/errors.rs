use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::path::PathBuf;

/// Failures surfaced by the object store, the object formats and the reference resolver.
///
/// Nothing here is retried internally: content-addressed data does not change between
/// attempts, so callers decide on remediation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unsupported repository at {}: {reason}", .path.display())]
    UnsupportedRepository { path: PathBuf, reason: String },

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("object {oid} is corrupt: {reason}")]
    ObjectCorrupt { oid: ObjectId, reason: String },

    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("malformed tree at offset {offset}: {reason}")]
    MalformedTree { offset: usize, reason: String },

    #[error("malformed header at offset {offset}: {reason}")]
    MalformedHeader { offset: usize, reason: String },

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid reference name: {0}")]
    InvalidRefName(String),

    #[error("reference {0} is locked by another writer")]
    RefLocked(String),

    #[error("reference {0} not found")]
    RefNotFound(String),

    #[error("short object id {name} is ambiguous, candidates are: {}", join_oids(.candidates))]
    AmbiguousReference {
        name: String,
        candidates: Vec<ObjectId>,
    },

    #[error("reference cycle detected: {}", .chain.join(" -> "))]
    ReferenceCycle { chain: Vec<String> },

    #[error("object {oid} is a {actual}, not a {expected}")]
    UnexpectedObjectType {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn join_oids(oids: &[ObjectId]) -> String {
    oids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
