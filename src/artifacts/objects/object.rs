use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// Produces the kind-specific payload of an object (without the `<type> <size>\0` header).
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Rebuilds an object from its kind-specific payload.
pub trait Unpackable {
    fn deserialize(payload: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn object_id(&self) -> Result<ObjectId> {
        let payload = self.serialize()?;
        let (_, oid) = encode(self.object_type(), &payload)?;
        Ok(oid)
    }
}

/// Wrap a payload in its canonical `<type> <size>\0` header and hash the result.
pub fn encode(kind: ObjectType, payload: &[u8]) -> Result<(Bytes, ObjectId)> {
    let size = payload.len().to_string();
    let mut canonical = Vec::with_capacity(kind.as_bytes().len() + size.len() + payload.len() + 2);
    canonical.extend_from_slice(kind.as_bytes());
    canonical.push(b' ');
    canonical.extend_from_slice(size.as_bytes());
    canonical.push(0);
    canonical.extend_from_slice(payload);

    let oid = hash(&canonical)?;
    Ok((canonical.into(), oid))
}

/// SHA-1 over already-canonical bytes.
pub fn hash(canonical: &[u8]) -> Result<ObjectId> {
    let mut hasher = Sha1::new();
    hasher.update(canonical);

    ObjectId::from_digest(&hasher.finalize())
}

/// Split decompressed canonical bytes into their kind and payload.
///
/// The payload is a zero-copy slice of `raw`.
pub fn decode(raw: Bytes) -> Result<(ObjectType, Bytes)> {
    let space = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| StoreError::MalformedObject("missing object type separator".into()))?;
    let kind = ObjectType::try_from(&raw[..space])?;

    let nul = raw[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|position| space + 1 + position)
        .ok_or_else(|| StoreError::MalformedObject("missing NUL after object size".into()))?;

    let size = std::str::from_utf8(&raw[space + 1..nul])
        .ok()
        .filter(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|size| size.parse::<usize>().ok())
        .ok_or_else(|| {
            StoreError::MalformedObject(format!(
                "invalid object size {:?}",
                String::from_utf8_lossy(&raw[space + 1..nul])
            ))
        })?;

    let actual = raw.len() - nul - 1;
    if size != actual {
        return Err(StoreError::MalformedObject(format!(
            "bad length: header declares {size} bytes, found {actual}"
        )));
    }

    Ok((kind, raw.slice(nul + 1..)))
}

/// A parsed object of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBox {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl ObjectBox {
    pub fn parse(kind: ObjectType, payload: Bytes) -> Result<Self> {
        Ok(match kind {
            ObjectType::Blob => ObjectBox::Blob(Blob::deserialize(payload)?),
            ObjectType::Tree => ObjectBox::Tree(Tree::deserialize(payload)?),
            ObjectType::Commit => ObjectBox::Commit(Commit::deserialize(payload)?),
            ObjectType::Tag => ObjectBox::Tag(Tag::deserialize(payload)?),
        })
    }
}

impl Packable for ObjectBox {
    fn serialize(&self) -> Result<Bytes> {
        match self {
            ObjectBox::Blob(blob) => blob.serialize(),
            ObjectBox::Tree(tree) => tree.serialize(),
            ObjectBox::Commit(commit) => commit.serialize(),
            ObjectBox::Tag(tag) => tag.serialize(),
        }
    }
}

impl Object for ObjectBox {
    fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Tree(_) => ObjectType::Tree,
            ObjectBox::Commit(_) => ObjectType::Commit,
            ObjectBox::Tag(_) => ObjectType::Tag,
        }
    }

    fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
            ObjectBox::Tag(tag) => tag.display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn hello_blob_has_the_well_known_hash() {
        let (canonical, oid) = encode(ObjectType::Blob, b"hello\n").unwrap();

        assert_eq!(&canonical[..], b"blob 6\0hello\n");
        assert_eq!(oid.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn empty_tree_has_the_well_known_hash() {
        let (_, oid) = encode(ObjectType::Tree, b"").unwrap();

        assert_eq!(oid.as_ref(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn decode_returns_kind_and_payload() {
        let (canonical, _) = encode(ObjectType::Commit, b"tree x\n\nmsg").unwrap();
        let (kind, payload) = decode(canonical).unwrap();

        assert_eq!(kind, ObjectType::Commit);
        assert_eq!(&payload[..], b"tree x\n\nmsg");
    }

    #[test]
    fn decoded_object_hashes_back_to_its_id() {
        let (canonical, oid) = encode(ObjectType::Blob, b"some content").unwrap();
        let (kind, payload) = decode(canonical).unwrap();

        assert_eq!(encode(kind, &payload).unwrap().1, oid);
    }

    #[rstest]
    #[case::unknown_kind(&b"blub 5\0hello"[..])]
    #[case::no_separator(&b"blob"[..])]
    #[case::no_nul(&b"blob 5hello"[..])]
    #[case::short_payload(&b"blob 6\0hello"[..])]
    #[case::long_payload(&b"blob 4\0hello"[..])]
    #[case::size_not_decimal(&b"blob x\0hello"[..])]
    #[case::empty_size(&b"blob \0"[..])]
    fn decode_rejects_malformed_objects(#[case] raw: &[u8]) {
        assert!(matches!(
            decode(Bytes::copy_from_slice(raw)),
            Err(StoreError::MalformedObject(_))
        ));
    }

    #[test]
    fn object_box_dispatches_on_kind() {
        let object = ObjectBox::parse(ObjectType::Blob, Bytes::from_static(b"abc")).unwrap();

        assert_eq!(object.object_type(), ObjectType::Blob);
        assert_eq!(&object.serialize().unwrap()[..], b"abc");
    }
}
