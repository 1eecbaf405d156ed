use crate::areas::repository::Repository;
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::path::{Component, Path};
use tracing::{debug, warn};

impl Repository {
    /// Write the tree behind `name` (a commit, tag or tree) into `target`,
    /// which must be absent or an empty directory
    pub fn checkout(&self, name: &str, target: &Path) -> anyhow::Result<()> {
        let tree_oid = self.find_object(name, Some(ObjectType::Tree), true)?;

        if target.exists() {
            if !target.is_dir() {
                anyhow::bail!("{} is not a directory", target.display());
            }
            if std::fs::read_dir(target)?.next().is_some() {
                anyhow::bail!("{} is not empty", target.display());
            }
        } else {
            std::fs::create_dir_all(target)
                .with_context(|| format!("failed to create {}", target.display()))?;
        }

        for (path, entry) in self.database().walk_tree(&tree_oid)? {
            let relative = Path::new(&path);
            if !relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
            {
                anyhow::bail!("refusing to check out unsafe path {path}");
            }
            let destination = target.join(relative);

            match entry.mode {
                EntryMode::Directory | EntryMode::Gitlink => {
                    std::fs::create_dir_all(&destination)?;
                }
                EntryMode::File(_) | EntryMode::Symlink => {
                    let (_, content) = self.database().get(&entry.oid)?;
                    std::fs::write(&destination, &content)
                        .with_context(|| format!("failed to write {}", destination.display()))?;
                }
                EntryMode::Other(mode) => {
                    warn!(%path, mode = %format!("{mode:o}"), "skipping entry with unknown mode");
                    continue;
                }
            }
            debug!(%path, "checked out");
        }

        Ok(())
    }
}
