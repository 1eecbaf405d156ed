use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;

impl Repository {
    pub fn rev_parse(&self, name: &str, kind: Option<ObjectType>) -> anyhow::Result<()> {
        let oid = self.find_object(name, kind, true)?;
        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}
