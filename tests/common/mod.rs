#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use bitstore::areas::refs::RefValue;
use bitstore::areas::repository::Repository;
use bitstore::artifacts::objects::blob::Blob;
use bitstore::artifacts::objects::commit::{Author, Commit};
use bitstore::artifacts::objects::entry_mode::{EntryMode, FileMode};
use bitstore::artifacts::objects::object_id::ObjectId;
use bitstore::artifacts::objects::tree::{Tree, TreeEntry};
use bitstore::artifacts::revision::ref_name::RefName;
use bytes::Bytes;
use rstest::fixture;
use std::path::Path;

pub const HELLO_BLOB_OID: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

pub fn run_bitstore_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("bitstore").expect("Failed to find bitstore binary");
    cmd.env_remove("BIT_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn raw_stdout_of(dir: &Path, args: &[&str]) -> Vec<u8> {
    let output = run_bitstore_command(dir, args)
        .output()
        .expect("Failed to run bitstore");
    assert!(
        output.status.success(),
        "bitstore {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output.stdout
}

pub fn stdout_of(dir: &Path, args: &[&str]) -> String {
    String::from_utf8(raw_stdout_of(dir, args)).expect("stdout is not utf-8")
}

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_bitstore_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    repository_dir
}

/// Two commits on master:
///
/// ```text
/// first:  1.txt = "one", a/2.txt = "two", a/b/3.txt = "three"
/// second: 1.txt = "uno", rest unchanged
/// ```
pub struct History {
    pub dir: TempDir,
    pub first: ObjectId,
    pub second: ObjectId,
    pub second_tree: ObjectId,
    pub blob_one: ObjectId,
}

#[fixture]
pub fn history(init_repository_dir: TempDir) -> History {
    let repository = Repository::open(init_repository_dir.path(), Box::new(std::io::sink()))
        .expect("Failed to open repository");
    let author = Author::try_from("Ada Lovelace <ada@example.com> 1700000000 +0000")
        .expect("Failed to parse author");

    let blob = |content: &'static str| {
        repository
            .database()
            .store(&Blob::new(Bytes::from_static(content.as_bytes())))
            .expect("Failed to store blob")
    };
    let file = |name: &'static str, oid: &ObjectId| {
        TreeEntry::new(
            EntryMode::File(FileMode::Regular),
            Bytes::from_static(name.as_bytes()),
            oid.clone(),
        )
    };
    let dir = |name: &'static str, oid: &ObjectId| {
        TreeEntry::new(
            EntryMode::Directory,
            Bytes::from_static(name.as_bytes()),
            oid.clone(),
        )
    };
    let tree = |entries: Vec<TreeEntry>| {
        repository
            .database()
            .store(&Tree::new(entries))
            .expect("Failed to store tree")
    };

    let blob_one = blob("one");
    let b_tree = tree(vec![file("3.txt", &blob("three"))]);
    let a_tree = tree(vec![file("2.txt", &blob("two")), dir("b", &b_tree)]);
    let first_tree = tree(vec![file("1.txt", &blob_one), dir("a", &a_tree)]);
    let second_tree = tree(vec![file("1.txt", &blob("uno")), dir("a", &a_tree)]);

    let first = repository
        .database()
        .store(&Commit::new(&first_tree, &[], &author, &author, "Initial commit\n"))
        .expect("Failed to store commit");
    let second = repository
        .database()
        .store(&Commit::new(
            &second_tree,
            &[first.clone()],
            &author,
            &author,
            "Translate \"one\"\n",
        ))
        .expect("Failed to store commit");

    repository
        .refs()
        .update_ref(
            &RefName::try_parse("refs/heads/master").expect("valid ref name"),
            &RefValue::Direct(second.clone()),
        )
        .expect("Failed to update master");

    History {
        dir: init_repository_dir,
        first,
        second,
        second_tree,
        blob_one,
    }
}
