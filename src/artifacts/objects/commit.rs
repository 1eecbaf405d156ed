//! Commit object
//!
//! Commits record a tree, zero or more parents and who made the snapshot.
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! The payload is kept as a [`Kvlm`] so headers this crate does not interpret
//! (`gpgsig`, `encoding`, ...) survive a read/write cycle untouched.

use crate::artifacts::objects::kvlm::Kvlm;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, StoreError};
use bytes::Bytes;

/// Author, committer or tagger information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Create a new author with the current timestamp
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> timestamp timezone", as written in object headers
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load author information from environment variables
    ///
    /// Reads GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL, and optionally GIT_AUTHOR_DATE.
    /// If no date is provided, uses current time. `None` when name or email is unset.
    pub fn load_from_env() -> Option<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").ok()?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").ok()?;
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(ts) => Some(Author::new_with_timestamp(name, email, ts)),
            None => Some(Author::new(name, email)),
        }
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self> {
        let invalid =
            |reason: &str| StoreError::MalformedObject(format!("{reason} in identity {value:?}"));

        // Format: "name <email> timestamp timezone"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(invalid("missing timestamp or timezone"));
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| invalid("invalid timestamp"))?;
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| invalid("missing '<'"))?;
        let email_end = name_email_part
            .find('>')
            .filter(|&end| end > email_start)
            .ok_or_else(|| invalid("missing '>'"))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        let offset = parse_timezone(timezone).ok_or_else(|| invalid("invalid timezone"))?;
        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| invalid("timestamp out of range"))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// "+hhmm" / "-hhmm" into a fixed offset
fn parse_timezone(timezone: &str) -> Option<chrono::FixedOffset> {
    let (sign, digits) = match timezone.split_at_checked(1)? {
        ("+", digits) => (1, digits),
        ("-", digits) => (-1, digits),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Commit object, a typed view over its header block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    kvlm: Kvlm,
}

impl Commit {
    pub fn new(
        tree_oid: &ObjectId,
        parents: &[ObjectId],
        author: &Author,
        committer: &Author,
        message: &str,
    ) -> Self {
        let mut kvlm = Kvlm::new(message.to_string());
        kvlm.push("tree", tree_oid.to_string());
        for parent in parents {
            kvlm.push("parent", parent.to_string());
        }
        kvlm.push("author", author.display());
        kvlm.push("committer", committer.display());

        Commit { kvlm }
    }

    pub fn kvlm(&self) -> &Kvlm {
        &self.kvlm
    }

    pub fn tree_oid(&self) -> Result<ObjectId> {
        let tree = self
            .kvlm
            .first(b"tree")
            .ok_or_else(|| StoreError::MalformedObject("commit has no tree header".into()))?;

        header_oid(tree)
    }

    /// Parents in header order; empty for a root commit
    pub fn parents(&self) -> Result<Vec<ObjectId>> {
        self.kvlm
            .get(b"parent")
            .unwrap_or_default()
            .iter()
            .map(header_oid)
            .collect()
    }

    pub fn author(&self) -> Result<Author> {
        let author = self
            .kvlm
            .first(b"author")
            .ok_or_else(|| StoreError::MalformedObject("commit has no author header".into()))?;

        Author::try_from(String::from_utf8_lossy(author).as_ref())
    }

    pub fn message(&self) -> String {
        String::from_utf8_lossy(self.kvlm.message()).into_owned()
    }

    /// First line of the commit message
    pub fn short_message(&self) -> String {
        self.message().lines().next().unwrap_or("").to_string()
    }
}

pub(crate) fn header_oid(value: &Bytes) -> Result<ObjectId> {
    let value = std::str::from_utf8(value)
        .map_err(|_| StoreError::InvalidObjectId(String::from_utf8_lossy(value).into_owned()))?;

    ObjectId::try_parse(value)
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.kvlm.serialize())
    }
}

impl Unpackable for Commit {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Ok(Commit {
            kvlm: Kvlm::parse(payload)?,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.kvlm.serialize()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn author() -> Author {
        Author::try_from("Ada Lovelace <ada@example.com> 1700000000 +0100").unwrap()
    }

    #[rstest]
    fn author_line_round_trips(author: Author) {
        assert_eq!(author.display(), "Ada Lovelace <ada@example.com> 1700000000 +0100");
        assert_eq!(author.display_name(), "Ada Lovelace <ada@example.com>");
    }

    #[rstest]
    fn commit_exposes_tree_and_parents(author: Author) {
        let tree = ObjectId::try_parse("4b825dc642cb6eb9a060e54bf8d69288fbee4904").unwrap();
        let parents = vec![
            ObjectId::try_parse("1111111111111111111111111111111111111111").unwrap(),
            ObjectId::try_parse("2222222222222222222222222222222222222222").unwrap(),
        ];

        let commit = Commit::new(&tree, &parents, &author, &author, "Merge\n\nbody\n");
        let reparsed = Commit::deserialize(commit.serialize().unwrap()).unwrap();

        assert_eq!(reparsed.tree_oid().unwrap(), tree);
        assert_eq!(reparsed.parents().unwrap(), parents);
        assert_eq!(reparsed.author().unwrap(), author);
        assert_eq!(reparsed.short_message(), "Merge");
    }

    #[rstest]
    fn root_commit_has_no_parents(author: Author) {
        let tree = ObjectId::try_parse("4b825dc642cb6eb9a060e54bf8d69288fbee4904").unwrap();
        let commit = Commit::new(&tree, &[], &author, &author, "Initial\n");

        assert!(commit.parents().unwrap().is_empty());
    }

    #[rstest]
    #[case::no_timezone("Ada <ada@example.com> 1700000000")]
    #[case::bad_timestamp("Ada <ada@example.com> soon +0000")]
    #[case::no_email("Ada ada@example.com 1700000000 +0000")]
    #[case::bad_timezone("Ada <ada@example.com> 1700000000 0100")]
    fn malformed_identities_are_malformed_objects(#[case] raw: &str) {
        assert!(matches!(
            Author::try_from(raw),
            Err(StoreError::MalformedObject(_))
        ));
    }

    #[test]
    fn commit_with_a_broken_author_is_malformed() {
        let commit = Commit::deserialize(Bytes::from_static(
            b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\nauthor nobody\n\nmsg",
        ))
        .unwrap();

        assert!(matches!(
            commit.author(),
            Err(StoreError::MalformedObject(_))
        ));
    }

    #[test]
    fn commit_without_tree_is_malformed() {
        let commit = Commit::deserialize(Bytes::from_static(b"author x\n\nmsg")).unwrap();

        assert!(matches!(
            commit.tree_oid(),
            Err(StoreError::MalformedObject(_))
        ));
    }
}
