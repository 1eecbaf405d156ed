use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::{ObjectId, is_lower_hex};
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::revision::ref_name::RefName;
use crate::artifacts::revision::{
    ANCESTOR_REGEX, MIN_ABBREV_LENGTH, PARENT_REGEX, REF_ALIASES, REFS_DIR,
};
use crate::errors::{Result, StoreError};
use tracing::trace;

/// A revision expression that names one object.
///
/// Supported forms:
/// - `HEAD` (and its alias `@`)
/// - full hashes and abbreviated hashes of at least 4 hex characters
/// - tag names, branch names, and paths under `refs/`
/// - `<revision>^` (first parent) and `<revision>~<n>` (n-th first-parent ancestor)
///
/// A bare name is tried, in order, as `HEAD`, a full hash, an abbreviated
/// hash, a tag, a branch and finally a path below the control directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Ref(RefName),
    /// The first parent of a revision (e.g. `HEAD^`)
    Parent(Box<Revision>),
    /// The Nth first-parent ancestor of a revision (e.g. `HEAD~3`)
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> Result<Revision> {
        let parent_re = regex::Regex::new(PARENT_REGEX)?;
        let ancestor_re = regex::Regex::new(ANCESTOR_REGEX)?;

        if let Some(caps) = parent_re.captures(revision) {
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Parent(Box::new(base_revision)))
        } else if let Some(caps) = ancestor_re.captures(revision) {
            let generations = caps[2]
                .parse::<usize>()
                .map_err(|_| StoreError::InvalidRefName(revision.to_string()))?;
            let base_revision = Self::try_parse(&caps[1])?;
            Ok(Revision::Ancestor(Box::new(base_revision), generations))
        } else {
            let resolved_name = *REF_ALIASES.get(revision).unwrap_or(&revision);
            Ok(Revision::Ref(RefName::try_parse(resolved_name)?))
        }
    }

    pub fn resolve(&self, repository: &Repository) -> Result<ObjectId> {
        match self {
            Revision::Ref(name) => resolve_name(repository, name),
            Revision::Parent(base_revision) => {
                let oid = base_revision.resolve(repository)?;
                self.first_parent(repository, &oid)
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(repository)?;
                for _ in 0..*generations {
                    oid = self.first_parent(repository, &oid)?;
                }
                Ok(oid)
            }
        }
    }

    fn first_parent(&self, repository: &Repository, oid: &ObjectId) -> Result<ObjectId> {
        let commit_oid = repository.database().peel(oid, ObjectType::Commit)?;
        let commit = repository.database().parse_commit(&commit_oid)?;

        commit
            .parents()?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::RefNotFound(self.to_string()))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}

/// Resolve a bare reference name to a hash.
///
/// An abbreviated hash that matches more than one stored object fails with
/// [`StoreError::AmbiguousReference`]; one that matches nothing may still be a
/// tag or branch name.
pub fn resolve_name(repository: &Repository, name: &RefName) -> Result<ObjectId> {
    let not_found = || StoreError::RefNotFound(name.to_string());
    let refs = repository.refs();

    if name.is_head() {
        return refs.read_head()?.ok_or_else(not_found);
    }

    let raw = name.as_ref();
    let lowered = raw.to_ascii_lowercase();
    if is_lower_hex(&lowered) {
        if lowered.len() == OBJECT_ID_LENGTH {
            return ObjectId::try_parse(lowered);
        }

        if lowered.len() >= MIN_ABBREV_LENGTH {
            let mut candidates = repository.database().find_objects_by_prefix(&lowered)?;
            trace!(prefix = %lowered, candidates = candidates.len(), "abbreviated hash");
            match candidates.len() {
                0 => {}
                1 => return Ok(candidates.remove(0)),
                _ => {
                    return Err(StoreError::AmbiguousReference {
                        name: raw.to_string(),
                        candidates,
                    });
                }
            }
        }
    }

    let mut namespaced = vec![RefName::tag(name), RefName::branch(name)];
    if raw.starts_with(&format!("{REFS_DIR}/")) {
        namespaced.push(name.clone());
    }

    for candidate in namespaced {
        if refs.exists(&candidate) {
            return refs.read_ref(&candidate)?.ok_or_else(not_found);
        }
    }

    Err(not_found())
}
