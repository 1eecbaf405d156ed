use crate::artifacts::objects::object_type::ObjectType;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd, Hash)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// File type and permission bits of a tree entry.
///
/// Modes outside the well-known set are kept as `Other`. Only canonical
/// digits (no zero padding) are accepted, so every parsed mode is written
/// back as the same bytes and a re-serialized tree keeps its id.
#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum EntryMode {
    File(FileMode),
    Directory,
    Symlink,
    Gitlink,
    Other(u32),
}

impl Default for EntryMode {
    fn default() -> Self {
        EntryMode::File(FileMode::Regular)
    }
}

impl EntryMode {
    /// Parse the ASCII octal digits found in a tree entry; zero-padded digits are refused
    pub fn from_octal_str(mode: &str) -> Option<Self> {
        if mode.is_empty() || mode.len() > 6 {
            return None;
        }

        let value = u32::from_str_radix(mode, 8).ok()?;
        if format!("{value:o}") != mode {
            return None;
        }

        Some(Self::from(value))
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::Directory => 0o40000,
            EntryMode::Symlink => 0o120000,
            EntryMode::Gitlink => 0o160000,
            EntryMode::Other(mode) => *mode,
        }
    }

    /// Canonical digits as written inside tree objects (no zero padding)
    pub fn as_str(&self) -> String {
        format!("{:o}", self.as_u32())
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Kind of object an entry with this mode points at
    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::Directory => ObjectType::Tree,
            EntryMode::Gitlink => ObjectType::Commit,
            _ => ObjectType::Blob,
        }
    }
}

impl From<u32> for EntryMode {
    fn from(mode: u32) -> Self {
        match mode {
            0o100644 => EntryMode::File(FileMode::Regular),
            0o100755 => EntryMode::File(FileMode::Executable),
            0o40000 => EntryMode::Directory,
            0o120000 => EntryMode::Symlink,
            0o160000 => EntryMode::Gitlink,
            other => EntryMode::Other(other),
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}
