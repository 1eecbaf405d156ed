//! Key-value list with message
//!
//! Commits and annotated tags share one text layout: a block of `key value` header
//! lines followed by a blank line and a free-form message.
//!
//! ```text
//! tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147
//! parent 206941306e8a8af65b66eaaaea388a7ae24d49a0
//! author Thibault Polge <thibault@thb.lt> 1527025023 +0200
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  iQIzBAABCAAdFiEExwXquOM8bWb4Q3vkjhtLpjRlC8g=
//!  -----END PGP SIGNATURE-----
//!
//! Create first draft
//! ```
//!
//! A value spills over several lines by starting each continuation line with a
//! single space. Keys may repeat (merge commits carry several `parent` lines); the
//! values of a repeated key are kept together in order, and keys keep the order in
//! which they were first seen.

use crate::errors::{Result, StoreError};
use bytes::Bytes;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    headers: Vec<(Bytes, Vec<Bytes>)>,
    message: Bytes,
}

impl Kvlm {
    pub fn new(message: impl Into<Bytes>) -> Self {
        Kvlm {
            headers: Vec::new(),
            message: message.into(),
        }
    }

    /// Headers in first-seen key order
    pub fn headers(&self) -> impl Iterator<Item = (&Bytes, &[Bytes])> {
        self.headers
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
    }

    /// All values recorded for `key`
    pub fn get(&self, key: &[u8]) -> Option<&[Bytes]> {
        self.headers
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn first(&self, key: &[u8]) -> Option<&Bytes> {
        self.get(key).and_then(<[Bytes]>::first)
    }

    /// Append a value, keeping the position of an already present key
    pub fn push(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        let key = key.into();
        let value = value.into();

        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.headers.push((key, vec![value])),
        }
    }

    pub fn message(&self) -> &Bytes {
        &self.message
    }

    pub fn parse(payload: Bytes) -> Result<Self> {
        let mut kvlm = Kvlm::default();
        let mut start = 0;

        loop {
            let space = find(&payload, b' ', start);
            let newline = find(&payload, b'\n', start);

            let is_message = match (space, newline) {
                (None, _) => true,
                (Some(space), Some(newline)) => newline < space,
                (Some(_), None) => false,
            };

            if is_message {
                if newline != Some(start) {
                    return Err(StoreError::MalformedHeader {
                        offset: start,
                        reason: "expected a blank line before the message".into(),
                    });
                }
                kvlm.message = payload.slice(start + 1..);
                return Ok(kvlm);
            }

            // is_message is false only when a space was found
            let space = space.unwrap_or(start);
            if space == start {
                return Err(StoreError::MalformedHeader {
                    offset: start,
                    reason: "empty header key".into(),
                });
            }

            let end = value_end(&payload, start)?;
            let key = payload.slice(start..space);
            let value = unfold(&payload[space + 1..end]);
            kvlm.push(key, value);

            start = end + 1;
        }
    }

    pub fn serialize(&self) -> Bytes {
        let mut payload = Vec::new();

        for (key, values) in &self.headers {
            for value in values {
                payload.extend_from_slice(key);
                payload.push(b' ');
                fold_into(&mut payload, value);
                payload.push(b'\n');
            }
        }

        payload.push(b'\n');
        payload.extend_from_slice(&self.message);
        payload.into()
    }
}

fn find(haystack: &[u8], needle: u8, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .iter()
        .position(|&b| b == needle)
        .map(|position| from + position)
}

/// Offset of the newline that terminates the value starting at `start`,
/// skipping newlines followed by a continuation space.
fn value_end(payload: &[u8], start: usize) -> Result<usize> {
    let mut end = start;

    loop {
        end = find(payload, b'\n', end + 1).ok_or_else(|| StoreError::MalformedHeader {
            offset: start,
            reason: "header value runs past the end of the payload".into(),
        })?;

        if payload.get(end + 1) != Some(&b' ') {
            return Ok(end);
        }
    }
}

/// Drop the single leading space of every continuation line.
fn unfold(raw: &[u8]) -> Bytes {
    let mut value = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        value.push(b);
        if b == b'\n' && bytes.peek() == Some(&b' ') {
            bytes.next();
        }
    }

    value.into()
}

/// Re-insert the continuation space after every embedded newline.
fn fold_into(payload: &mut Vec<u8>, value: &[u8]) {
    for &b in value {
        payload.push(b);
        if b == b'\n' {
            payload.push(b' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    const MERGE_COMMIT: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
parent 206941306e8a8af65b66eaaaea388a7ae24d49a0\n\
parent 0ddf0e0d1a7c4bd3c6ab0fcd80d0cb0e2e1e3b4d\n\
author Thibault Polge <thibault@thb.lt> 1527025023 +0200\n\
committer Thibault Polge <thibault@thb.lt> 1527025044 +0200\n\
\n\
Merge branch 'feature'\n";

    const SIGNED_COMMIT: &[u8] = b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\
author Thibault Polge <thibault@thb.lt> 1527025023 +0200\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQIzBAABCAAdFiEExwXquOM8bWb4Q3vkjhtLpjRlC8g=\n -----END PGP SIGNATURE-----\n\
\n\
Create first draft\n";

    #[test]
    fn repeated_keys_collect_values_in_order() {
        let kvlm = Kvlm::parse(Bytes::from_static(MERGE_COMMIT)).unwrap();

        let parents = kvlm.get(b"parent").unwrap();
        assert_eq!(parents.len(), 2);
        assert_eq!(&parents[0][..], b"206941306e8a8af65b66eaaaea388a7ae24d49a0");
        assert_eq!(&parents[1][..], b"0ddf0e0d1a7c4bd3c6ab0fcd80d0cb0e2e1e3b4d");
        assert_eq!(&kvlm.message()[..], b"Merge branch 'feature'\n");
    }

    #[test]
    fn keys_keep_first_seen_order() {
        let kvlm = Kvlm::parse(Bytes::from_static(MERGE_COMMIT)).unwrap();
        let keys = kvlm.headers().map(|(key, _)| key.clone()).collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![
                Bytes::from_static(b"tree"),
                Bytes::from_static(b"parent"),
                Bytes::from_static(b"author"),
                Bytes::from_static(b"committer"),
            ]
        );
    }

    #[rstest]
    #[case::merge(MERGE_COMMIT)]
    #[case::signed(SIGNED_COMMIT)]
    #[case::no_headers(b"\njust a message")]
    #[case::empty_message(b"tree 29ff16c9c14e2652b22f8b78bb08a5a07930c147\n\n")]
    fn reserializes_byte_for_byte(#[case] raw: &'static [u8]) {
        let kvlm = Kvlm::parse(Bytes::from_static(raw)).unwrap();

        assert_eq!(&kvlm.serialize()[..], raw);
    }

    #[test]
    fn continuation_lines_lose_one_leading_space() {
        let kvlm = Kvlm::parse(Bytes::from_static(SIGNED_COMMIT)).unwrap();

        assert_eq!(
            &kvlm.first(b"gpgsig").unwrap()[..],
            &b"-----BEGIN PGP SIGNATURE-----\n\niQIzBAABCAAdFiEExwXquOM8bWb4Q3vkjhtLpjRlC8g=\n-----END PGP SIGNATURE-----"[..]
        );
    }

    #[rstest]
    #[case::unterminated_value(&b"tree abc"[..])]
    #[case::missing_blank_line(&b"tree abc\n"[..])]
    #[case::keyless_line(&b"tree abc\nnospace\n\nmsg"[..])]
    #[case::empty_key(&b" abc\n\nmsg"[..])]
    #[case::empty_payload(&b""[..])]
    fn rejects_malformed_headers(#[case] raw: &'static [u8]) {
        assert!(matches!(
            Kvlm::parse(Bytes::from_static(raw)),
            Err(StoreError::MalformedHeader { .. })
        ));
    }

    #[test]
    fn push_appends_to_existing_key() {
        let mut kvlm = Kvlm::new("msg");
        kvlm.push("parent", "a");
        kvlm.push("tree", "t");
        kvlm.push("parent", "b");

        assert_eq!(&kvlm.serialize()[..], b"parent a\nparent b\ntree t\n\nmsg");
    }

    fn arb_kvlm() -> impl Strategy<Value = Kvlm> {
        let header = (
            "[a-z]{1,8}",
            proptest::collection::vec("[ -~\n]{0,24}", 1..3),
        );
        (proptest::collection::vec(header, 0..6), "[ -~\n]{0,64}").prop_map(
            |(headers, message)| {
                let mut kvlm = Kvlm::new(message);
                for (key, values) in headers {
                    for value in values {
                        kvlm.push(key.clone(), value);
                    }
                }
                kvlm
            },
        )
    }

    proptest! {
        #[test]
        fn parse_inverts_serialize(kvlm in arb_kvlm()) {
            let reparsed = Kvlm::parse(kvlm.serialize()).unwrap();

            prop_assert_eq!(reparsed, kvlm);
        }
    }
}
