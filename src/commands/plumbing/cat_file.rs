use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;

impl Repository {
    /// Print the raw payload of `name`, peeled to `kind`
    pub fn cat_file(&self, kind: ObjectType, name: &str) -> anyhow::Result<()> {
        let oid = self.find_object(name, Some(kind), true)?;
        let (_, payload) = self.database().get(&oid)?;

        self.writer().write_all(&payload)?;

        Ok(())
    }
}
