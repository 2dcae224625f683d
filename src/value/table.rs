use rustc_hash::FxHashMap as HashMap;

use crate::{new_ref, s_read, value::Key, RefType, Value};

/// An insertion ordered mapping
///
/// Entries are kept in the order they were first inserted, with a hash index
/// on the side for lookups.
#[derive(Clone, Debug, Default)]
pub struct Table {
    entries: Vec<(Key, RefType<Value>)>,
    index: HashMap<Key, usize>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        for (k, v) in self.iter() {
            match other.get(k) {
                Some(w) if std::sync::Arc::ptr_eq(v, w) => continue,
                Some(w) if *s_read!(v) == *s_read!(w) => continue,
                _ => return false,
            }
        }

        true
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder flavored [`Table::insert`].
    pub fn with<K: Into<Key>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.insert(key.into(), new_ref!(Value, value.into()));
        self
    }

    pub fn into_value(self) -> Value {
        Value::Table(self)
    }

    /// Insert or replace
    ///
    /// Replacing keeps the key's original position and hands back the value
    /// that was there.
    pub fn insert(&mut self, key: Key, value: RefType<Value>) -> Option<RefType<Value>> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&RefType<Value>> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &Key) -> Option<RefType<Value>> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(p) = self.index.get_mut(k) {
                *p -= 1;
            }
        }

        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &RefType<Value>> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &RefType<Value>)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::sym;

    #[test]
    fn replacing_keeps_position() {
        let mut table = Table::new().with("a", 1).with("b", 2);
        let old = table.insert(Key::from("a"), new_ref!(Value, Value::from(3)));

        assert_eq!(*s_read!(old.unwrap()), Value::from(1));
        assert_eq!(
            table.keys().cloned().collect::<Vec<_>>(),
            [Key::from("a"), Key::from("b")]
        );
    }

    #[test]
    fn remove_reindexes() {
        let mut table = Table::new()
            .with("a", 1)
            .with(sym("b"), 2)
            .with(3, "three")
            .with("d", 4);

        assert!(table.remove(&Key::Symbol(sym("b"))).is_some());
        assert!(table.remove(&Key::Symbol(sym("b"))).is_none());
        assert_eq!(table.len(), 3);
        assert_eq!(*s_read!(table.get(&Key::from(3)).unwrap()), Value::from("three"));
        assert_eq!(*s_read!(table.get(&Key::from("d")).unwrap()), Value::from(4));
    }
}
