//! References (HEAD, branches, tags)
//!
//! A reference file holds either a 40-character hash (direct) or
//! `ref: <path>` (symbolic), followed by a newline. Symbolic references are
//! followed until a direct one is reached.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::revision::ref_name::RefName;
use crate::artifacts::revision::REFS_DIR;
use crate::errors::{Result, StoreError};
use derive_new::new;
use file_guard::Lock;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

const SYMREF_REGEX: &str = r"^ref: (.+)$";
const LOCK_SUFFIX: &str = ".lock";

/// Content of a single reference file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefValue {
    Symbolic(RefName),
    Direct(ObjectId),
}

impl std::fmt::Display for RefValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefValue::Symbolic(target) => write!(f, "ref: {target}"),
            RefValue::Direct(oid) => write!(f, "{oid}"),
        }
    }
}

/// The reference namespace, sorted by name at every level
pub type RefTree = BTreeMap<String, RefNode>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    Oid(ObjectId),
    Tree(RefTree),
}

/// References manager rooted at the control directory
#[derive(Debug, new)]
pub struct Refs {
    path: Box<Path>,
}

impl Refs {
    pub fn exists(&self, name: &RefName) -> bool {
        self.ref_path(name).is_file()
    }

    /// Read one reference file without following it; `None` if it is absent or empty
    pub fn read_raw(&self, name: &RefName) -> Result<Option<RefValue>> {
        let path = self.ref_path(name);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        match regex::Regex::new(SYMREF_REGEX)?.captures(content) {
            Some(caps) => Ok(Some(RefValue::Symbolic(RefName::try_parse(&caps[1])?))),
            None => Ok(Some(RefValue::Direct(ObjectId::try_parse(content)?))),
        }
    }

    /// Follow `name` through symbolic references to a hash.
    ///
    /// `None` means the chain ends at a missing reference, like `HEAD` on an
    /// unborn branch. A chain that comes back to a reference it already visited
    /// fails with [`StoreError::ReferenceCycle`].
    pub fn read_ref(&self, name: &RefName) -> Result<Option<ObjectId>> {
        let mut current = name.clone();
        let mut seen = HashSet::new();
        let mut chain = Vec::new();

        loop {
            chain.push(current.to_string());
            if !seen.insert(current.clone()) {
                return Err(StoreError::ReferenceCycle { chain });
            }

            match self.read_raw(&current)? {
                Some(RefValue::Direct(oid)) => {
                    trace!(reference = %name, %oid, hops = chain.len(), "resolved reference");
                    return Ok(Some(oid));
                }
                Some(RefValue::Symbolic(target)) => current = target,
                None => return Ok(None),
            }
        }
    }

    /// The last reference in the symbolic chain starting at `HEAD`
    /// (`refs/heads/master` on a branch, `HEAD` itself when detached).
    pub fn current_ref(&self) -> Result<RefName> {
        let mut current = RefName::head();
        let mut chain = vec![current.to_string()];

        while let Some(RefValue::Symbolic(target)) = self.read_raw(&current)? {
            let revisited = chain.contains(&target.to_string());
            chain.push(target.to_string());
            if revisited {
                return Err(StoreError::ReferenceCycle { chain });
            }
            current = target;
        }

        Ok(current)
    }

    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        self.read_ref(&RefName::head())
    }

    /// Replace a reference file atomically.
    ///
    /// The new content goes to `<ref>.lock`, held under an exclusive lock,
    /// and is then renamed over the reference, so readers see either the old
    /// or the new value. An existing lock file means another writer owns the
    /// reference and fails with [`StoreError::RefLocked`].
    pub fn update_ref(&self, name: &RefName, value: &RefValue) -> Result<()> {
        let path = self.ref_path(name);
        let parent = path.parent().ok_or_else(|| {
            StoreError::InvalidRefName(format!("{name} has no parent directory"))
        })?;
        std::fs::create_dir_all(parent)?;

        let mut lock_path = path.clone().into_os_string();
        lock_path.push(LOCK_SUFFIX);
        let lock_path = PathBuf::from(lock_path);

        match write_lock_file(&lock_path, &format!("{value}\n")) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::RefLocked(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        if let Err(err) = std::fs::rename(&lock_path, &path) {
            let _ = std::fs::remove_file(&lock_path);
            return Err(err.into());
        }

        debug!(reference = %name, %value, "updated reference");
        Ok(())
    }

    /// Nested listing of every reference under `subtree` (default `refs`).
    ///
    /// Symbolic references are resolved; dangling ones are left out.
    pub fn list(&self, subtree: Option<&RefName>) -> Result<RefTree> {
        let base = match subtree {
            Some(name) => self.ref_path(name),
            None => self.refs_path().to_path_buf(),
        };

        let mut tree = RefTree::new();
        if !base.is_dir() {
            return Ok(tree);
        }

        let files = WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file());

        for entry in files {
            let Ok(relative) = entry.path().strip_prefix(self.path.as_ref()) else {
                continue;
            };
            let name = match RefName::try_parse(relative_name(relative)) {
                Ok(name) => name,
                Err(err) => {
                    // lock files and editor leftovers live next to real refs
                    warn!(path = %relative.display(), %err, "skipping file with an invalid ref name");
                    continue;
                }
            };

            let Some(oid) = self.read_ref(&name)? else {
                warn!(reference = %name, "skipping dangling reference");
                continue;
            };

            let Ok(within) = entry.path().strip_prefix(&base) else {
                continue;
            };
            insert_node(&mut tree, within, oid);
        }

        Ok(tree)
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join(REFS_DIR).into_boxed_path()
    }

    fn ref_path(&self, name: &RefName) -> PathBuf {
        self.path.join(name.as_ref_path())
    }
}

/// `(path, hash)` pairs of a listing sorted by path, each path prefixed with `prefix`
pub fn flatten(tree: &RefTree, prefix: &str) -> Vec<(String, ObjectId)> {
    let mut flat = Vec::new();
    let mut stack = vec![(prefix.to_string(), tree)];

    while let Some((prefix, tree)) = stack.pop() {
        let mut subtrees = Vec::new();
        for (name, node) in tree {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };
            match node {
                RefNode::Oid(oid) => flat.push((path, oid.clone())),
                RefNode::Tree(subtree) => subtrees.push((path, subtree)),
            }
        }
        stack.extend(subtrees.into_iter().rev());
    }

    flat.sort_by(|(a, _), (b, _)| a.cmp(b));
    flat
}

/// Create `lock_path`, failing if it exists, and write `content` to it.
///
/// The lock file is removed again when writing fails.
fn write_lock_file(lock_path: &Path, content: &str) -> std::io::Result<()> {
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)?;

    let written = write_locked(&mut lock_file, content);
    drop(lock_file);
    if written.is_err() {
        let _ = std::fs::remove_file(lock_path);
    }

    written
}

fn write_locked(file: &mut File, content: &str) -> std::io::Result<()> {
    let mut lock = file_guard::lock(file, Lock::Exclusive, 0, 1)?;
    lock.deref_mut().write_all(content.as_bytes())?;
    lock.sync_all()
}

fn relative_name(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn insert_node(tree: &mut RefTree, path: &Path, oid: ObjectId) {
    let mut parts = path
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    let Some(leaf) = parts.pop() else {
        return;
    };

    let mut level = tree;
    for part in parts {
        let node = level
            .entry(part)
            .or_insert_with(|| RefNode::Tree(RefTree::new()));
        level = match node {
            RefNode::Tree(subtree) => subtree,
            // a file and a directory cannot share a name on disk
            RefNode::Oid(_) => return,
        };
    }
    level.insert(leaf, RefNode::Oid(oid));
}
