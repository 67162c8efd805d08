use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};

use crate::json::Value;

/// Fields of a JSON object in wire order.
///
/// Names are not required to be unique; lookups return the first occurrence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    inner: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Object { inner: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Object {
            inner: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field, keeping any earlier field of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.inner.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.inner
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.inner.iter().any(|(k, _)| k == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|(k, _)| k.as_str())
    }
}

impl Deref for Object {
    type Target = Vec<(String, Value)>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for Object {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
    {
        Object {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
