use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use common::{repository_dir, run_bitstore_command};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn init_repository_successfully(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let git_dir = repository_dir.path().canonicalize()?.join(".git");

    run_bitstore_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty Git repository in .+\n$",
        )?)
        .stdout(predicate::str::contains(git_dir.display().to_string()));

    assert_eq!(
        std::fs::read_to_string(git_dir.join("HEAD"))?,
        "ref: refs/heads/master\n"
    );
    for dir in ["branches", "objects", "refs/heads", "refs/tags"] {
        assert!(git_dir.join(dir).is_dir(), "missing {dir}");
    }
    assert!(std::fs::read_to_string(git_dir.join("config"))?.contains("repositoryformatversion = 0"));

    Ok(())
}

#[rstest]
fn init_at_a_new_path_creates_it(repository_dir: TempDir) {
    let nested = repository_dir.path().join("nested/project");

    run_bitstore_command(repository_dir.path(), &["init", "nested/project"])
        .assert()
        .success();

    assert!(nested.join(".git/objects").is_dir());
}

#[rstest]
fn init_refuses_a_non_empty_directory(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    repository_dir.child("notes.txt").write_str("keep me")?;

    run_bitstore_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not empty"));

    Ok(())
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_bitstore_command(repository_dir.path(), &["show-ref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported repository"));
}

#[rstest]
fn unsupported_format_versions_are_rejected(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_bitstore_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir
        .child(".git/config")
        .write_str("[core]\n\trepositoryformatversion = 1\n")?;

    run_bitstore_command(repository_dir.path(), &["show-ref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repositoryformatversion 1"));

    Ok(())
}
