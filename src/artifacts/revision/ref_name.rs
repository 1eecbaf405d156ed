use crate::artifacts::revision::{HEAD_REF_NAME, HEADS_DIR, INVALID_REF_NAME_REGEX, TAGS_DIR};
use crate::errors::{Result, StoreError};

/// A reference path relative to the control directory (`HEAD`, `refs/heads/master`)
/// or a short name (`master`, `v1.0`) that the resolver expands.
///
/// Validation keeps names from escaping the control directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefName(String);

impl RefName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::InvalidRefName("reference name cannot be empty".into()));
        }

        let re = regex::Regex::new(INVALID_REF_NAME_REGEX)?;
        if re.is_match(&name) {
            Err(StoreError::InvalidRefName(name))
        } else {
            Ok(Self(name))
        }
    }

    pub fn head() -> Self {
        Self(HEAD_REF_NAME.to_string())
    }

    pub fn branch(name: &RefName) -> Self {
        Self(format!("{HEADS_DIR}/{}", name.0))
    }

    pub fn tag(name: &RefName) -> Self {
        Self(format!("{TAGS_DIR}/{}", name.0))
    }

    pub fn is_head(&self) -> bool {
        self.0 == HEAD_REF_NAME
    }

    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::proptest;

    proptest! {
        #[test]
        fn accepts_plain_names(ref_name in "[a-zA-Z0-9_-]+") {
            assert!(RefName::try_parse(ref_name).is_ok());
        }

        #[test]
        fn accepts_hierarchical_names(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(RefName::try_parse(format!("{prefix}/{suffix}")).is_ok());
        }

        #[test]
        fn rejects_names_starting_with_dot(suffix in "[a-zA-Z0-9_-]+") {
            assert!(RefName::try_parse(format!(".{suffix}")).is_err());
        }

        #[test]
        fn rejects_names_ending_with_lock(prefix in "[a-zA-Z0-9_-]+") {
            assert!(RefName::try_parse(format!("{prefix}.lock")).is_err());
        }

        #[test]
        fn rejects_parent_directory_hops(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+"
        ) {
            assert!(RefName::try_parse(format!("{prefix}/../{suffix}")).is_err());
            assert!(RefName::try_parse(format!("{prefix}..{suffix}")).is_err());
        }

        #[test]
        fn rejects_leading_or_trailing_slash(name in "[a-zA-Z0-9_-]+") {
            assert!(RefName::try_parse(format!("/{name}")).is_err());
            assert!(RefName::try_parse(format!("{name}/")).is_err());
        }

        #[test]
        fn rejects_revision_operators(
            prefix in "[a-zA-Z0-9_-]+",
            suffix in "[a-zA-Z0-9_-]+",
            special_char in r"[\*:\?\[\\^~ ]"
        ) {
            assert!(RefName::try_parse(format!("{prefix}{special_char}{suffix}")).is_err());
        }
    }

    #[test]
    fn empty_name_is_invalid() {
        assert!(matches!(
            RefName::try_parse(""),
            Err(StoreError::InvalidRefName(_))
        ));
    }

    #[test]
    fn expands_into_namespaces() {
        let name = RefName::try_parse("v1.0").unwrap();

        assert_eq!(RefName::tag(&name).as_ref(), "refs/tags/v1.0");
        assert_eq!(RefName::branch(&name).as_ref(), "refs/heads/v1.0");
        assert!(RefName::head().is_head());
    }
}
