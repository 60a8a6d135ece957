//! User-supplied configuration overrides, shared across units through the
//! peer relation. The underlying databag rejects literal `.` in keys, so keys
//! are stored through a reversible escaping transform.

use std::collections::BTreeMap;

use crate::connection::RelationData;

pub const ESCAPE_CHAR: char = '_';

/// Escape a key for peer storage: `.` becomes `_d` and a literal `_` becomes
/// `_u`. Every escape sequence is two characters starting with the escape
/// character, so the encoding is prefix-free and [`unescape_key`] inverts it
/// for every input, dots and underscores in any arrangement included.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '.' => {
                out.push(ESCAPE_CHAR);
                out.push('d');
            }
            ESCAPE_CHAR => {
                out.push(ESCAPE_CHAR);
                out.push('u');
            }
            c => out.push(c),
        }
    }
    out
}

/// Exact inverse of [`escape_key`]: the escape character always consumes the
/// following character, `d` for a dot and `u` for an underscore. Anything
/// else after the escape character cannot come out of [`escape_key`] and is
/// passed through untouched.
pub fn unescape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR {
            match chars.next() {
                Some('d') => out.push('.'),
                Some('u') => out.push(ESCAPE_CHAR),
                Some(other) => {
                    out.push(ESCAPE_CHAR);
                    out.push(other);
                }
                None => out.push(ESCAPE_CHAR),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// The hub's own configuration overrides, kept in the peer relation databag
/// with escaped keys. Removal writes an empty-string tombstone since the
/// databag cannot drop keys; [`PeerConfig::properties`] filters those out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeerConfig {
    data: RelationData,
}

impl PeerConfig {
    pub fn new(data: RelationData) -> Self {
        Self { data }
    }

    /// The unescaped override mapping, tombstones removed.
    pub fn properties(&self) -> BTreeMap<String, String> {
        self.data
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (unescape_key(key), value.clone()))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data
            .get(&escape_key(key))
            .is_some_and(|value| !value.is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.data.insert(escape_key(key), value.to_string());
    }

    /// Tombstone the key. Returns false when it was not present.
    pub fn remove(&mut self, key: &str) -> bool {
        if !self.contains(key) {
            return false;
        }
        self.data.insert(escape_key(key), String::new());
        true
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// The escaped databag, written back to peer storage by the runtime.
    pub fn raw(&self) -> &RelationData {
        &self.data
    }
}
