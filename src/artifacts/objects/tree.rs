//! Tree object
//!
//! Trees are directory snapshots: an ordered list of entries, each naming a blob,
//! a subtree or a gitlink.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal mode> <path>\0<20-byte raw sha1>`
//!
//! Entries are written sorted by path, with directories compared as if their name
//! ended in `/`. This is the order git itself uses, so logically identical trees
//! always hash the same.

use crate::artifacts::objects::OBJECT_ID_RAW_LENGTH;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, StoreError};
use bytes::Bytes;
use derive_new::new;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Hash, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub path: Bytes,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Order entries the way git does: a directory `a` sorts as `a/`
    pub fn cmp_path(&self, other: &TreeEntry) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }

    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let suffix = self.is_tree().then_some(b'/');
        self.path.iter().copied().chain(suffix)
    }
}

/// Parse a tree payload into its entries, in on-disk order.
pub fn parse(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset < payload.len() {
        let (entry, next) = parse_one(payload, offset)?;
        entries.push(entry);
        offset = next;
    }

    Ok(entries)
}

fn parse_one(payload: &[u8], offset: usize) -> Result<(TreeEntry, usize)> {
    let malformed = |at: usize, reason: &str| StoreError::MalformedTree {
        offset: at,
        reason: reason.to_string(),
    };

    let digits = payload[offset..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let mode_end = offset + digits;
    if payload.get(mode_end) != Some(&b' ') {
        return Err(malformed(mode_end, "expected a space after the mode"));
    }

    // ascii digits only, so the conversion cannot fail
    let mode = std::str::from_utf8(&payload[offset..mode_end])
        .ok()
        .and_then(EntryMode::from_octal_str)
        .ok_or_else(|| malformed(offset, "invalid octal mode"))?;

    let path_start = mode_end + 1;
    let nul = payload[path_start..]
        .iter()
        .position(|&b| b == 0)
        .map(|position| path_start + position)
        .ok_or_else(|| malformed(path_start, "missing NUL after the path"))?;
    if nul == path_start {
        return Err(malformed(path_start, "empty path"));
    }

    let oid_start = nul + 1;
    let oid_end = oid_start + OBJECT_ID_RAW_LENGTH;
    if oid_end > payload.len() {
        return Err(malformed(oid_start, "truncated object id"));
    }
    let oid = ObjectId::from_digest(&payload[oid_start..oid_end])?;

    let path = Bytes::copy_from_slice(&payload[path_start..nul]);
    Ok((TreeEntry::new(mode, path, oid), oid_end))
}

/// Serialize entries into a tree payload, sorted git-style.
pub fn serialize(entries: &[TreeEntry]) -> Result<Bytes> {
    let mut sorted = entries.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.cmp_path(b));

    let mut payload = Vec::new();
    for entry in sorted {
        write!(payload, "{} ", entry.mode.as_str())?;
        payload.extend_from_slice(&entry.path);
        payload.push(0);
        entry.oid.write_h40_to(&mut payload)?;
    }

    Ok(payload.into())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }
}

impl Packable for Tree {
    fn serialize(&self) -> Result<Bytes> {
        serialize(&self.entries)
    }
}

impl Unpackable for Tree {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Ok(Self::new(parse(&payload)?))
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "{:06o} {} {}\t{}",
                    entry.mode.as_u32(),
                    entry.mode.object_type(),
                    entry.oid,
                    entry.name()
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::entry_mode::FileMode;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    const BLOB_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";
    const TREE_OID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    fn raw_oid(oid: &str) -> Vec<u8> {
        let mut raw = Vec::new();
        ObjectId::try_parse(oid).unwrap().write_h40_to(&mut raw).unwrap();
        raw
    }

    fn entry(mode: EntryMode, path: &str, oid: &str) -> TreeEntry {
        TreeEntry::new(
            mode,
            Bytes::copy_from_slice(path.as_bytes()),
            ObjectId::try_parse(oid).unwrap(),
        )
    }

    #[test]
    fn parses_entries_in_offset_order() {
        let mut payload = b"100644 hello.txt\0".to_vec();
        payload.extend(raw_oid(BLOB_OID));
        payload.extend(b"40000 src\0");
        payload.extend(raw_oid(TREE_OID));

        let entries = parse(&payload).unwrap();

        assert_eq!(
            entries,
            vec![
                entry(EntryMode::File(FileMode::Regular), "hello.txt", BLOB_OID),
                entry(EntryMode::Directory, "src", TREE_OID),
            ]
        );
    }

    #[test]
    fn empty_payload_is_an_empty_tree() {
        assert!(parse(b"").unwrap().is_empty());
    }

    #[rstest]
    #[case::missing_space(b"100644hello\0".to_vec(), 6)]
    #[case::missing_nul(b"100644 hello".to_vec(), 7)]
    #[case::empty_path(b"100644 \0".to_vec(), 7)]
    #[case::truncated_oid(b"100644 a\0\x01\x02\x03".to_vec(), 9)]
    #[case::non_digit_mode(b"10x644 a\0".to_vec(), 2)]
    #[case::zero_padded_mode(b"040000 d\0".to_vec(), 0)]
    fn rejects_malformed_entries(#[case] payload: Vec<u8>, #[case] expected_offset: usize) {
        match parse(&payload) {
            Err(StoreError::MalformedTree { offset, .. }) => assert_eq!(offset, expected_offset),
            other => panic!("expected MalformedTree, got {other:?}"),
        }
    }

    #[test]
    fn reports_offset_of_the_second_broken_entry() {
        let mut payload = b"100644 a\0".to_vec();
        payload.extend(raw_oid(BLOB_OID));
        payload.extend(b"100644 b\0\x01");

        match parse(&payload) {
            Err(StoreError::MalformedTree { offset, .. }) => assert_eq!(offset, 38),
            other => panic!("expected MalformedTree, got {other:?}"),
        }
    }

    #[test]
    fn directories_sort_as_if_suffixed_with_a_slash() {
        let entries = vec![
            entry(EntryMode::Directory, "foo", TREE_OID),
            entry(EntryMode::File(FileMode::Regular), "foo.txt", BLOB_OID),
            entry(EntryMode::File(FileMode::Regular), "foo-bar", BLOB_OID),
        ];

        let reparsed = parse(&serialize(&entries).unwrap()).unwrap();
        let names = reparsed.iter().map(|e| e.name().into_owned()).collect::<Vec<_>>();

        // '-' (0x2d) < '.' (0x2e) < '/' (0x2f)
        assert_eq!(names, vec!["foo-bar", "foo.txt", "foo"]);
    }

    #[test]
    fn serialization_is_independent_of_input_order() {
        let a = entry(EntryMode::File(FileMode::Regular), "a", BLOB_OID);
        let b = entry(EntryMode::Directory, "b", TREE_OID);

        assert_eq!(
            serialize(&[a.clone(), b.clone()]).unwrap(),
            serialize(&[b, a]).unwrap()
        );
    }

    #[test]
    fn tree_with_one_file_matches_git() {
        let tree = Tree::new(vec![entry(
            EntryMode::File(FileMode::Regular),
            "hello.txt",
            BLOB_OID,
        )]);

        // `printf 'hello\n' > hello.txt && git add hello.txt && git write-tree`
        assert_eq!(
            tree.object_id().unwrap().as_ref(),
            "aaa96ced2d9a1c8e72c56b253a0e2fe78393feb7"
        );
    }

    fn arb_entry() -> impl Strategy<Value = TreeEntry> {
        (
            prop_oneof![
                Just(EntryMode::File(FileMode::Regular)),
                Just(EntryMode::File(FileMode::Executable)),
                Just(EntryMode::Directory),
                Just(EntryMode::Symlink),
                Just(EntryMode::Gitlink),
            ],
            "[a-zA-Z0-9._-]{1,12}",
            "[0-9a-f]{40}",
        )
            .prop_map(|(mode, path, oid)| {
                TreeEntry::new(mode, Bytes::from(path), ObjectId::try_parse(oid).unwrap())
            })
    }

    proptest! {
        #[test]
        fn parse_inverts_serialize(entries in proptest::collection::vec(arb_entry(), 0..16)) {
            let mut sorted = entries.clone();
            sorted.sort_by(|a, b| a.cmp_path(b));

            let payload = serialize(&entries).unwrap();

            prop_assert_eq!(parse(&payload).unwrap(), sorted);
        }
    }
}
