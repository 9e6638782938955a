//! Ordered string-keyed map of variants.

use std::collections::HashMap;

use super::Variant;

/// Object variant body: insertion-ordered, unique keys.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantObject {
    entries: Vec<(String, Variant)>,
}

impl VariantObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Variant> {
        self.position(key).map(|i| &mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Inserts or replaces. A replaced key keeps its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Variant>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Variant> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl IntoIterator for VariantObject {
    type Item = (String, Variant);
    type IntoIter = std::vec::IntoIter<(String, Variant)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Variant>> FromIterator<(K, V)> for VariantObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = ObjectBuilder::default();
        for (k, v) in iter {
            builder.insert(k.into(), v.into());
        }
        builder.finish()
    }
}

/// Builds an object from a stream of entries in linear time.
///
/// Same semantics as repeated [`VariantObject::set`]: a repeated key replaces
/// the earlier value in place.
#[derive(Default)]
pub(super) struct ObjectBuilder {
    object: VariantObject,
    index: HashMap<String, usize>,
}

impl ObjectBuilder {
    pub(super) fn insert(&mut self, key: String, value: Variant) {
        match self.index.get(&key) {
            Some(&i) => self.object.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.object.entries.len());
                self.object.entries.push((key, value));
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.object.len()
    }

    pub(super) fn finish(self) -> VariantObject {
        self.object
    }
}
