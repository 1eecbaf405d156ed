//! Reference names and revision expressions
//!
//! A revision is anything that names an object: `HEAD`, a full or abbreviated
//! hash, a tag, a branch, a path under `refs/`, optionally followed by `^` or `~N`.

pub mod ref_name;
pub mod resolver;

pub const INVALID_REF_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
pub const PARENT_REGEX: &str = r"^(.+)\^$";
pub const ANCESTOR_REGEX: &str = r"^(.+)\~(\d+)$";
pub const REF_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "@" => "HEAD",
};

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";
pub const REFS_DIR: &str = "refs";
pub const HEADS_DIR: &str = "refs/heads";
pub const TAGS_DIR: &str = "refs/tags";

/// Shortest hex prefix accepted as an abbreviated object id
pub const MIN_ABBREV_LENGTH: usize = 4;
