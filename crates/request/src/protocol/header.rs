//! The header bag of a message.
//!
//! Unlike `http::HeaderMap`, names keep the spelling they were first inserted
//! with and distinct names iterate in insertion order, which is what a client
//! needs to reproduce a request head exactly. Lookups fold ASCII case only.
//!
//! The bag is persistent: the entries live behind a [`triomphe::Arc`] and every
//! `with*` call builds a new entry list, leaving the receiver untouched.

use std::fmt;

use triomphe::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

/// Ordered, case-insensitive, multi-valued mapping of header names to values.
#[derive(Clone)]
pub struct HeaderBag {
    entries: Arc<Vec<HeaderEntry>>,
}

impl HeaderBag {
    /// An empty bag.
    pub fn new() -> Self {
        Self { entries: Arc::new(Vec::new()) }
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag holds no header at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `name` is present, ignoring ASCII case.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All values for `name` in insertion order; empty if the header is absent.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(index) => &self.entries[index].values,
            None => &[],
        }
    }

    /// The values for `name` joined with `", "`, or `None` if absent.
    pub fn get_line(&self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries[index].values.join(", "))
    }

    /// Iterates `(name, values)` in insertion order, names spelled as first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    /// Returns a bag where `name` maps to exactly `values`.
    ///
    /// An existing header keeps its position and spelling; a new one goes to
    /// the end. An empty `values` removes the header.
    pub fn with<I, V>(&self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return self.without(name);
        }

        let position = self.position(name);
        self.modify(|entries| match position {
            Some(index) => entries[index].values = values,
            None => entries.push(HeaderEntry { name: name.to_owned(), values }),
        })
    }

    /// Returns a bag with `value` appended after the existing values of `name`.
    pub fn with_added<V: Into<String>>(&self, name: &str, value: V) -> Self {
        let position = self.position(name);
        let value = value.into();
        self.modify(|entries| match position {
            Some(index) => entries[index].values.push(value),
            None => entries.push(HeaderEntry { name: name.to_owned(), values: vec![value] }),
        })
    }

    /// Returns a bag without any value for `name`.
    ///
    /// If `name` is absent the returned bag shares storage with `self`.
    pub fn without(&self, name: &str) -> Self {
        match self.position(name) {
            Some(index) => self.modify(|entries| {
                entries.remove(index);
            }),
            None => self.clone(),
        }
    }

    /// Whether both bags share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    fn modify<F: FnOnce(&mut Vec<HeaderEntry>)>(&self, f: F) -> Self {
        let mut entries = Vec::clone(&self.entries);
        f(&mut entries);
        Self { entries: Arc::new(entries) }
    }
}

impl Default for HeaderBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Equal when the same names (ignoring case) carry the same values in the same order.
impl PartialEq for HeaderBag {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|((name, values), (other_name, other_values))| {
                name.eq_ignore_ascii_case(other_name) && values == other_values
            })
    }
}

impl Eq for HeaderBag {}

impl fmt::Debug for HeaderBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Collects `(name, value)` pairs the way repeated [`HeaderBag::with_added`]
/// calls would.
impl<K, V> FromIterator<(K, V)> for HeaderBag
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut entries: Vec<HeaderEntry> = Vec::new();
        for (name, value) in iter {
            let name = name.as_ref();
            match entries.iter_mut().find(|entry| entry.name.eq_ignore_ascii_case(name)) {
                Some(entry) => entry.values.push(value.into()),
                None => entries.push(HeaderEntry { name: name.to_owned(), values: vec![value.into()] }),
            }
        }
        Self { entries: Arc::new(entries) }
    }
}
