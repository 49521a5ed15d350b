//! The minimal concrete structural value tree this crate produces when
//! serializing a table (SPEC_FULL.md §6, "writer-side value-tree interface").
//!
//! The Format's full value-tree data model is out of scope; this is only the
//! narrow slice (null/int/string/list/struct, plus type annotations on
//! structs) needed to represent a symbol table.

/// A node of the structural value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    String(String),
    List(Vec<Value>),
    Struct(StructValue),
}

impl Value {
    #[must_use]
    pub fn new_empty_struct() -> Self {
        Self::Struct(StructValue::new())
    }

    #[must_use]
    pub fn new_empty_list() -> Self {
        Self::List(Vec::new())
    }

    #[must_use]
    pub fn new_null_struct() -> Self {
        Self::Null
    }

    pub fn new_string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    #[must_use]
    pub fn new_int(value: i64) -> Self {
        Self::Int(value)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Struct(_) => "struct",
        }
    }

    #[must_use]
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }
}

/// A struct value: an ordered list of named fields plus type annotations.
///
/// Field order is preserved as fields are added; `put` replaces an existing
/// field of the same name in place rather than appending a duplicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    annotations: Vec<String>,
    fields: Vec<(String, Value)>,
}

impl StructValue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type_annotation(&mut self, annotation: impl Into<String>) {
        self.annotations.push(annotation.into());
    }

    #[must_use]
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    /// Appends a field, even if one with the same name already exists.
    pub fn add(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Replaces the first field named `name`, or appends if none exists.
    pub fn put(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Removes every field named `name`.
    pub fn remove_all(&mut self, name: &str) {
        self.fields.retain(|(n, _)| n != name);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_replaces_in_place_add_appends() {
        let mut s = StructValue::new();
        s.add("a", Value::new_int(1));
        s.add("a", Value::new_int(2));
        assert_eq!(s.fields().len(), 2);

        let mut s2 = StructValue::new();
        s2.put("a", Value::new_int(1));
        s2.put("a", Value::new_int(2));
        assert_eq!(s2.fields().len(), 1);
        assert_eq!(s2.get("a"), Some(&Value::new_int(2)));
    }

    #[test]
    fn remove_all_clears_every_matching_field() {
        let mut s = StructValue::new();
        s.add("$5", Value::new_string("a"));
        s.add("$5", Value::new_string("b"));
        s.add("$6", Value::new_string("c"));
        s.remove_all("$5");
        assert_eq!(s.fields().len(), 1);
        assert_eq!(s.get("$6"), Some(&Value::new_string("c")));
    }
}
