use std::sync::Arc;

use crate::{new_ref, s_read, value::Symbol, RefType, Value};

/// A record with a fixed set of named members
///
/// Members are declared when the record is built and keep their declaration
/// order. Each one can be read as a method named after it, written with
/// `<member>=`, or looked up with `[]` by symbol, string, or position.
#[derive(Clone, Debug)]
pub struct Record {
    type_name: String,
    members: Vec<(Symbol, RefType<Value>)>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(other.members.iter())
                .all(|((k1, v1), (k2, v2))| {
                    k1 == k2 && (Arc::ptr_eq(v1, v2) || *s_read!(v1) == *s_read!(v2))
                })
    }
}

impl Eq for Record {}

impl Record {
    pub fn new<S: AsRef<str>>(type_name: S) -> Self {
        Self {
            type_name: type_name.as_ref().to_owned(),
            members: Vec::new(),
        }
    }

    /// Builder flavored [`Record::define_member`].
    pub fn with<S: AsRef<str>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.define_member(name, new_ref!(Value, value.into()));
        self
    }

    /// Create a member
    ///
    /// Defining a member that already exists replaces its value and keeps its
    /// position.
    pub fn define_member<S: AsRef<str>>(&mut self, name: S, value: RefType<Value>) {
        match self.position(name.as_ref()) {
            Some(pos) => self.members[pos].1 = value,
            None => self.members.push((Symbol::new(name), value)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|(k, _)| k.as_str() == name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get_member(&self, name: &str) -> Option<&RefType<Value>> {
        self.position(name).map(|pos| &self.members[pos].1)
    }

    /// Replace the value of an existing member.
    ///
    /// Returns the old value, or `None` if there is no such member, in which
    /// case nothing is changed.
    pub fn set_member(&mut self, name: &str, value: RefType<Value>) -> Option<RefType<Value>> {
        let pos = self.position(name)?;
        Some(std::mem::replace(&mut self.members[pos].1, value))
    }

    pub fn at(&self, pos: usize) -> Option<&RefType<Value>> {
        self.members.get(pos).map(|(_, v)| v)
    }

    pub fn set_at(&mut self, pos: usize, value: RefType<Value>) -> Option<RefType<Value>> {
        let slot = self.members.get_mut(pos)?;
        Some(std::mem::replace(&mut slot.1, value))
    }

    pub fn members(&self) -> impl Iterator<Item = &Symbol> {
        self.members.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &RefType<Value>)> {
        self.members.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn members_keep_declaration_order() {
        let point = Record::new("Point").with("y", 2).with("x", 1).with("y", 3);

        let names = point.members().map(|m| m.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["y", "x"]);
        assert_eq!(*s_read!(point.get_member("y").unwrap()), Value::from(3));
    }

    #[test]
    fn set_member_requires_existing_member() {
        let mut point = Record::new("Point").with("x", 1);

        assert!(point
            .set_member("z", new_ref!(Value, Value::from(9)))
            .is_none());
        assert_eq!(point.len(), 1);

        let old = point.set_member("x", new_ref!(Value, Value::from(5))).unwrap();
        assert_eq!(*s_read!(old), Value::from(1));
        assert_eq!(*s_read!(point.at(0).unwrap()), Value::from(5));
    }
}
