use crate::errors::StoreError;
use std::str::FromStr;

/// The closed set of object kinds the store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl TryFrom<&[u8]> for ObjectType {
    type Error = StoreError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match value {
            b"blob" => Ok(ObjectType::Blob),
            b"tree" => Ok(ObjectType::Tree),
            b"commit" => Ok(ObjectType::Commit),
            b"tag" => Ok(ObjectType::Tag),
            _ => Err(StoreError::MalformedObject(format!(
                "unknown object type {:?}",
                String::from_utf8_lossy(value)
            ))),
        }
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ObjectType::try_from(value.as_bytes())
    }
}

impl FromStr for ObjectType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::try_from(s)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
