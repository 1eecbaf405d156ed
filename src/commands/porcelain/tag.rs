use crate::areas::refs::{RefValue, flatten};
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::revision::TAGS_DIR;
use crate::artifacts::revision::ref_name::RefName;
use anyhow::Context;

impl Repository {
    /// List tag names, one per line
    pub fn list_tags(&self) -> anyhow::Result<()> {
        let tags = self.list_refs(Some(TAGS_DIR))?;

        for (name, _) in flatten(&tags, "") {
            writeln!(self.writer(), "{name}")?;
        }

        Ok(())
    }

    /// Point `refs/tags/<name>` at `target`, through a tag object when `annotate` is set
    pub fn create_tag(
        &self,
        name: &str,
        target: &str,
        annotate: bool,
        message: &str,
    ) -> anyhow::Result<()> {
        let tag_name = RefName::try_parse(name)?;
        let tag_ref = RefName::tag(&tag_name);
        if self.refs().exists(&tag_ref) {
            anyhow::bail!("tag '{name}' already exists");
        }

        let target_oid = self.resolve(target)?;
        let ref_oid = if annotate {
            let kind = self.database().object_type(&target_oid)?;
            let tagger = self.tagger()?;
            let message = if message.ends_with('\n') || message.is_empty() {
                message.to_string()
            } else {
                format!("{message}\n")
            };

            self.database()
                .store(&Tag::new(&target_oid, kind, name, &tagger, &message))?
        } else {
            target_oid
        };

        self.refs()
            .update_ref(&tag_ref, &RefValue::Direct(ref_oid))?;

        Ok(())
    }

    /// Tagger identity from `GIT_AUTHOR_*`, falling back to `user.name` and
    /// `user.email` from the config
    fn tagger(&self) -> anyhow::Result<Author> {
        if let Some(author) = Author::load_from_env() {
            return Ok(author);
        }

        let name = self
            .config()
            .get("user", "name")
            .context("no tagger identity: set GIT_AUTHOR_NAME or user.name")?;
        let email = self
            .config()
            .get("user", "email")
            .context("no tagger identity: set GIT_AUTHOR_EMAIL or user.email")?;

        Ok(Author::new(name.to_string(), email.to_string()))
    }
}
