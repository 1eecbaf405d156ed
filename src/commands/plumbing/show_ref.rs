use crate::areas::refs::flatten;
use crate::areas::repository::Repository;
use crate::artifacts::revision::REFS_DIR;

impl Repository {
    pub fn show_ref(&self) -> anyhow::Result<()> {
        let refs = self.list_refs(None)?;

        for (path, oid) in flatten(&refs, REFS_DIR) {
            writeln!(self.writer(), "{oid} {path}")?;
        }

        Ok(())
    }
}
