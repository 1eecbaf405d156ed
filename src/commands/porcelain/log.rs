use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::object_type::ObjectType;

impl Repository {
    /// Print the commit graph reachable from `name` as a graphviz digraph
    pub fn log(&self, name: &str) -> anyhow::Result<()> {
        let start = self.find_object(name, Some(ObjectType::Commit), true)?;

        writeln!(self.writer(), "digraph bitlog{{")?;
        writeln!(self.writer(), "  node[shape=rect]")?;

        for item in RevList::new(self.database(), start) {
            let (oid, commit) = item?;
            let message = commit
                .short_message()
                .replace('\\', "\\\\")
                .replace('"', "\\\"");

            writeln!(
                self.writer(),
                "  c_{oid} [label=\"{}: {message}\"]",
                oid.to_short_oid()
            )?;
            for parent in commit.parents()? {
                writeln!(self.writer(), "  c_{oid} -> c_{parent};")?;
            }
        }

        writeln!(self.writer(), "}}")?;

        Ok(())
    }
}
