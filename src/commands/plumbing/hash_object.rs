use crate::areas::repository::Repository;
use crate::artifacts::objects::object::{self, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;

/// Hash `path` as an object of `kind` without storing it; needs no repository
pub fn hash_file(path: &Path, kind: ObjectType) -> anyhow::Result<ObjectId> {
    let payload = read_payload(path, kind)?;
    let (_, oid) = object::encode(kind, &payload)?;

    Ok(oid)
}

impl Repository {
    pub fn hash_object(&self, path: &Path, kind: ObjectType, write: bool) -> anyhow::Result<()> {
        let payload = read_payload(path, kind)?;

        let oid = self.database().put(kind, &payload, write)?;
        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}

fn read_payload(path: &Path, kind: ObjectType) -> anyhow::Result<Bytes> {
    let payload = Bytes::from(
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
    );

    // refuse to hash something that would not read back as `kind`
    ObjectBox::parse(kind, payload.clone())
        .with_context(|| format!("{} is not a valid {kind} object", path.display()))?;

    Ok(payload)
}
