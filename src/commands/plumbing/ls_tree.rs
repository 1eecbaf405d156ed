use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::TreeEntry;

impl Repository {
    /// List the entries of the tree behind `name`; with `recursive`, list every
    /// non-tree entry below it by its full path instead.
    pub fn ls_tree(&self, name: &str, recursive: bool) -> anyhow::Result<()> {
        let oid = self.find_object(name, Some(ObjectType::Tree), true)?;

        if recursive {
            for (path, entry) in self.database().walk_tree(&oid)? {
                if !entry.is_tree() {
                    self.write_tree_entry(&entry, &path)?;
                }
            }
        } else {
            for entry in self.database().parse_tree(&oid)?.entries() {
                self.write_tree_entry(entry, &entry.name())?;
            }
        }

        Ok(())
    }

    fn write_tree_entry(&self, entry: &TreeEntry, path: &str) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{:06o} {} {}\t{}",
            entry.mode.as_u32(),
            entry.mode.object_type(),
            entry.oid,
            path
        )?;

        Ok(())
    }
}
