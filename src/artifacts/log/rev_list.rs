use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::collections::HashSet;
use tracing::trace;

/// Commits reachable from a starting point, parents in header order, each at most once
pub struct RevList<'r> {
    database: &'r Database,
    pending: Vec<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl<'r> RevList<'r> {
    pub fn new(database: &'r Database, start: ObjectId) -> Self {
        RevList {
            database,
            pending: vec![start],
            visited: HashSet::new(),
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = loop {
            let oid = self.pending.pop()?;
            if self.visited.insert(oid.clone()) {
                break oid;
            }
            trace!(%oid, "commit already visited");
        };

        match self.database.parse_commit(&oid) {
            Ok(commit) => match commit.parents() {
                Ok(parents) => {
                    self.pending.extend(parents.into_iter().rev());
                    Some(Ok((oid, commit)))
                }
                Err(err) => {
                    self.pending.clear();
                    Some(Err(err))
                }
            },
            Err(err) => {
                // a broken commit ends the walk
                self.pending.clear();
                Some(Err(err))
            }
        }
    }
}
