use crate::areas::config::{Config, REPOSITORY_FORMAT_VERSION};
use crate::areas::database::Database;
use crate::areas::refs::{RefTree, RefValue, Refs};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision::ref_name::RefName;
use crate::artifacts::revision::resolver::Revision;
use crate::errors::{Result, StoreError};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONTROL_DIR: &str = ".git";
const DEFAULT_BRANCH: &str = "refs/heads/master";
const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// A worktree plus its control directory
pub struct Repository {
    worktree: Box<Path>,
    git_dir: Box<Path>,
    config: Config,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
}

impl Repository {
    /// Open the repository whose worktree is `worktree`.
    ///
    /// The control directory must exist and its config must declare a
    /// supported `core.repositoryformatversion`.
    pub fn open(worktree: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let git_dir = worktree.join(CONTROL_DIR);
        let unsupported = |reason: String| StoreError::UnsupportedRepository {
            path: worktree.to_path_buf(),
            reason,
        };

        if !git_dir.is_dir() {
            return Err(unsupported("not a git repository".into()));
        }

        let config_path = git_dir.join("config");
        if !config_path.is_file() {
            return Err(unsupported("configuration file missing".into()));
        }
        let config = Config::load(&config_path)?;

        match config.repository_format_version() {
            Some(Ok(REPOSITORY_FORMAT_VERSION)) => {}
            Some(Ok(version)) => {
                return Err(unsupported(format!(
                    "unsupported repositoryformatversion {version}"
                )));
            }
            Some(Err(raw)) => {
                return Err(unsupported(format!("invalid repositoryformatversion {raw}")));
            }
            None => return Err(unsupported("repositoryformatversion is not set".into())),
        }

        debug!(worktree = %worktree.display(), "opened repository");
        Ok(Repository {
            worktree: worktree.into(),
            database: Database::new(git_dir.join("objects").into_boxed_path()),
            refs: Refs::new(git_dir.clone().into_boxed_path()),
            git_dir: git_dir.into_boxed_path(),
            config,
            writer: RefCell::new(writer),
        })
    }

    /// Open the closest repository at or above `path`
    pub fn find(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let path = path.canonicalize()?;

        match path
            .ancestors()
            .find(|candidate| candidate.join(CONTROL_DIR).is_dir())
        {
            Some(worktree) => Self::open(worktree, writer),
            None => Err(StoreError::UnsupportedRepository {
                path,
                reason: "no git directory in this path or any parent".into(),
            }),
        }
    }

    /// Create a fresh repository at `path`, which must be absent or an empty directory
    pub fn init(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let unsupported = |reason: &str| StoreError::UnsupportedRepository {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if path.exists() {
            if !path.is_dir() {
                return Err(unsupported("not a directory"));
            }
            if std::fs::read_dir(path)?.next().is_some() {
                return Err(unsupported("directory is not empty"));
            }
        } else {
            std::fs::create_dir_all(path)?;
        }

        let git_dir = path.join(CONTROL_DIR);
        for dir in [
            &["branches"][..],
            &["objects"][..],
            &["refs", "tags"][..],
            &["refs", "heads"][..],
        ] {
            create_dir(&git_dir, dir)?;
        }

        std::fs::write(git_dir.join("description"), DEFAULT_DESCRIPTION)?;
        Config::default_config().save(&git_dir.join("config"))?;

        let repository = Self::open(path, writer)?;
        repository.refs.update_ref(
            &RefName::head(),
            &RefValue::Symbolic(RefName::try_parse(DEFAULT_BRANCH)?),
        )?;
        debug!(git_dir = %repository.git_dir.display(), "initialized repository");

        Ok(repository)
    }

    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Path under the control directory
    pub fn repo_path(&self, parts: &[&str]) -> PathBuf {
        parts
            .iter()
            .fold(self.git_dir.to_path_buf(), |path, part| path.join(part))
    }

    /// Directory under the control directory, created when `mkdir` is set.
    ///
    /// `None` if the directory is absent and `mkdir` is not set.
    pub fn repo_dir(&self, parts: &[&str], mkdir: bool) -> Result<Option<PathBuf>> {
        let path = self.repo_path(parts);

        if path.exists() {
            if path.is_dir() {
                return Ok(Some(path));
            }
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} is not a directory", path.display()),
            )));
        }

        if mkdir {
            std::fs::create_dir_all(&path)?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// File path under the control directory whose parent directories are
    /// created when `mkdir` is set
    pub fn repo_file(&self, parts: &[&str], mkdir: bool) -> Result<Option<PathBuf>> {
        let Some((_, dirs)) = parts.split_last() else {
            return Ok(Some(self.git_dir.to_path_buf()));
        };

        Ok(self
            .repo_dir(dirs, mkdir)?
            .map(|_| self.repo_path(parts)))
    }

    /// Resolve a revision expression to a hash
    pub fn resolve(&self, name: &str) -> Result<ObjectId> {
        Revision::try_parse(name)?.resolve(self)
    }

    /// Resolve `name` and, when `kind` is given, make sure the result is of that
    /// kind. With `follow`, tags are peeled to their target and commits to
    /// their tree until `kind` is reached.
    pub fn find_object(
        &self,
        name: &str,
        kind: Option<ObjectType>,
        follow: bool,
    ) -> Result<ObjectId> {
        let oid = self.resolve(name)?;
        let Some(kind) = kind else {
            return Ok(oid);
        };

        if follow {
            return self.database.peel(&oid, kind);
        }

        let actual = self.database.object_type(&oid)?;
        if actual == kind {
            Ok(oid)
        } else {
            Err(StoreError::UnexpectedObjectType {
                oid,
                expected: kind,
                actual,
            })
        }
    }

    /// Nested listing of `refs/` or of one namespace below it
    pub fn list_refs(&self, subtree: Option<&str>) -> Result<RefTree> {
        let subtree = subtree.map(RefName::try_parse).transpose()?;
        self.refs.list(subtree.as_ref())
    }
}

fn create_dir(base: &Path, parts: &[&str]) -> Result<()> {
    let path = parts.iter().fold(base.to_path_buf(), |path, part| path.join(part));
    std::fs::create_dir_all(path)?;
    Ok(())
}
