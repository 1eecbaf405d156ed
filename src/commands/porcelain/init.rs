use crate::areas::repository::Repository;
use anyhow::Context;
use std::path::Path;

impl Repository {
    /// Create a repository at `path` and report where it lives
    pub fn init_at(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Repository::init(path, writer)
            .with_context(|| format!("failed to initialize a repository at {}", path.display()))?;

        let git_dir = repository.git_dir().canonicalize()?;
        writeln!(
            repository.writer(),
            "Initialized empty Git repository in {}",
            git_dir.display()
        )?;

        Ok(repository)
    }
}
