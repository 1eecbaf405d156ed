use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{self, Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use derive_new::new;
use fake::rand;
use std::collections::HashSet;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Loose object database rooted at `.git/objects`
#[derive(Debug, new)]
pub struct Database {
    path: Box<Path>,
}

// TODO: read packfiles once clone/fetch exist to produce them
impl Database {
    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Hash a payload and, when `persist` is set, write it to the fan-out directory.
    ///
    /// Writing is idempotent: an object already on disk is left untouched, and a
    /// concurrent writer of the same id can only produce identical bytes.
    pub fn put(&self, kind: ObjectType, payload: &[u8], persist: bool) -> Result<ObjectId> {
        let (canonical, oid) = object::encode(kind, payload)?;

        if persist {
            let object_path = self.path.join(oid.to_path());
            if object_path.exists() {
                trace!(%oid, "object already stored");
            } else {
                self.write_object(&object_path, &canonical)?;
                debug!(%oid, %kind, size = payload.len(), "stored object");
            }
        }

        Ok(oid)
    }

    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.put(object.object_type(), &object.serialize()?, true)
    }

    /// Read, decompress and decode the object stored under `oid`.
    ///
    /// The decompressed bytes must hash back to `oid`; a swapped or damaged
    /// file is [`StoreError::ObjectCorrupt`].
    pub fn get(&self, oid: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let raw = self.read_object(oid)?;
        let actual = object::hash(&raw)?;
        if &actual != oid {
            return Err(StoreError::ObjectCorrupt {
                oid: oid.clone(),
                reason: format!("content hashes to {actual}"),
            });
        }

        let (kind, payload) = object::decode(raw)?;
        trace!(%oid, %kind, size = payload.len(), "loaded object");

        Ok((kind, payload))
    }

    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).is_file()
    }

    pub fn parse_object(&self, oid: &ObjectId) -> Result<ObjectBox> {
        let (kind, payload) = self.get(oid)?;
        ObjectBox::parse(kind, payload)
    }

    pub fn object_type(&self, oid: &ObjectId) -> Result<ObjectType> {
        Ok(self.get(oid)?.0)
    }

    pub fn parse_commit(&self, oid: &ObjectId) -> Result<Commit> {
        self.parse_as(oid, ObjectType::Commit)
    }

    pub fn parse_tree(&self, oid: &ObjectId) -> Result<Tree> {
        self.parse_as(oid, ObjectType::Tree)
    }

    pub fn parse_tag(&self, oid: &ObjectId) -> Result<Tag> {
        self.parse_as(oid, ObjectType::Tag)
    }

    fn parse_as<T: Unpackable>(&self, oid: &ObjectId, expected: ObjectType) -> Result<T> {
        let (actual, payload) = self.get(oid)?;
        if actual != expected {
            return Err(StoreError::UnexpectedObjectType {
                oid: oid.clone(),
                expected,
                actual,
            });
        }

        T::deserialize(payload)
    }

    /// Follow tags to their target and commits to their tree until an object of
    /// kind `wanted` is reached.
    pub fn peel(&self, oid: &ObjectId, wanted: ObjectType) -> Result<ObjectId> {
        let mut current = oid.clone();
        let mut seen = HashSet::new();

        loop {
            if !seen.insert(current.clone()) {
                return Err(StoreError::ObjectCorrupt {
                    oid: current,
                    reason: "tag chain loops back on itself".into(),
                });
            }

            let actual = self.object_type(&current)?;
            if actual == wanted {
                return Ok(current);
            }

            current = match actual {
                ObjectType::Tag => self.parse_tag(&current)?.object()?,
                ObjectType::Commit if wanted == ObjectType::Tree => {
                    self.parse_commit(&current)?.tree_oid()?
                }
                _ => {
                    return Err(StoreError::UnexpectedObjectType {
                        oid: current,
                        expected: wanted,
                        actual,
                    });
                }
            };
            trace!(%current, %wanted, "peeled object");
        }
    }

    /// Every entry reachable from the tree `root`, depth-first in entry order,
    /// paired with its `/`-separated path.
    ///
    /// A subtree that contains itself is reported as corrupt instead of being
    /// walked forever.
    pub fn walk_tree(&self, root: &ObjectId) -> Result<Vec<(String, TreeEntry)>> {
        struct Pending {
            path: String,
            entry: TreeEntry,
            ancestors: Vec<ObjectId>,
        }

        let mut walked = Vec::new();
        let mut stack = self
            .parse_tree(root)?
            .into_entries()
            .into_iter()
            .rev()
            .map(|entry| Pending {
                path: entry.name().into_owned(),
                entry,
                ancestors: vec![root.clone()],
            })
            .collect::<Vec<_>>();

        while let Some(Pending {
            path,
            entry,
            ancestors,
        }) = stack.pop()
        {
            if entry.is_tree() {
                if ancestors.contains(&entry.oid) {
                    return Err(StoreError::ObjectCorrupt {
                        oid: entry.oid,
                        reason: format!("tree contains itself at {path}"),
                    });
                }

                let mut child_ancestors = ancestors;
                child_ancestors.push(entry.oid.clone());
                let children = self.parse_tree(&entry.oid)?.into_entries();
                stack.extend(children.into_iter().rev().map(|child| Pending {
                    path: format!("{path}/{}", child.name()),
                    entry: child,
                    ancestors: child_ancestors.clone(),
                }));
            }

            walked.push((path, entry));
        }

        Ok(walked)
    }

    fn read_object(&self, oid: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(oid.to_path());
        let compressed = std::fs::read(&object_path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::ObjectNotFound(oid.clone()),
            _ => StoreError::Io(err),
        })?;

        Self::decompress(&compressed).map_err(|err| StoreError::ObjectCorrupt {
            oid: oid.clone(),
            reason: err.to_string(),
        })
    }

    fn write_object(&self, object_path: &Path, canonical: &[u8]) -> Result<()> {
        let object_dir = object_path.parent().ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid object path {}", object_path.display()),
            )
        })?;
        std::fs::create_dir_all(object_dir)?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let compressed = Self::compress(canonical)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        file.write_all(&compressed)?;
        drop(file);

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path)?;

        Ok(())
    }

    fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with the given hex prefix, sorted.
    ///
    /// Prefixes of 2+ characters only scan their own fan-out directory.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let dirs: Vec<PathBuf> = if prefix.len() >= 2 {
            vec![self.path.join(&prefix[..2])]
        } else {
            (0..=255u8)
                .map(|i| self.path.join(format!("{i:02x}")))
                .collect()
        };

        let mut matches = Vec::new();
        for dir_path in dirs.iter().filter(|dir| dir.is_dir()) {
            let dir_name = dir_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            for entry in std::fs::read_dir(dir_path)? {
                let file_name = entry?.file_name();
                let full_oid = format!("{dir_name}{}", file_name.to_string_lossy());

                // temp files and strays never parse as ids
                if full_oid.starts_with(prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        trace!(prefix, candidates = matches.len(), "scanned objects by prefix");
        Ok(matches)
    }
}
