//! Annotated tag object
//!
//! ```text
//! object <sha>
//! type commit
//! tag v1.0
//! tagger <name> <email> <timestamp> <timezone>
//!
//! <tag message>
//! ```

use crate::artifacts::objects::commit::{Author, header_oid};
use crate::artifacts::objects::kvlm::Kvlm;
use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Result, StoreError};
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    kvlm: Kvlm,
}

impl Tag {
    pub fn new(
        object: &ObjectId,
        kind: ObjectType,
        name: &str,
        tagger: &Author,
        message: &str,
    ) -> Self {
        let mut kvlm = Kvlm::new(message.to_string());
        kvlm.push("object", object.to_string());
        kvlm.push("type", kind.as_str());
        kvlm.push("tag", name.to_string());
        kvlm.push("tagger", tagger.display());

        Tag { kvlm }
    }

    pub fn kvlm(&self) -> &Kvlm {
        &self.kvlm
    }

    /// The object this tag points at
    pub fn object(&self) -> Result<ObjectId> {
        let object = self
            .kvlm
            .first(b"object")
            .ok_or_else(|| StoreError::MalformedObject("tag has no object header".into()))?;

        header_oid(object)
    }

    /// Declared kind of the tagged object
    pub fn target_type(&self) -> Result<ObjectType> {
        let kind = self
            .kvlm
            .first(b"type")
            .ok_or_else(|| StoreError::MalformedObject("tag has no type header".into()))?;

        ObjectType::try_from(&kind[..])
    }

    pub fn name(&self) -> Option<String> {
        self.kvlm
            .first(b"tag")
            .map(|name| String::from_utf8_lossy(name).into_owned())
    }

    pub fn message(&self) -> String {
        String::from_utf8_lossy(self.kvlm.message()).into_owned()
    }
}

impl Packable for Tag {
    fn serialize(&self) -> Result<Bytes> {
        Ok(self.kvlm.serialize())
    }
}

impl Unpackable for Tag {
    fn deserialize(payload: Bytes) -> Result<Self> {
        Ok(Tag {
            kvlm: Kvlm::parse(payload)?,
        })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.kvlm.serialize()).into_owned()
    }
}
