//! A hand-rolled [`StructReader`] over an in-memory [`Value`] tree, so the
//! integration tests can drive `parse_local`/`parse_shared` without a real
//! byte-level decoder.

use symtab_core::{StructReader, TypeTag, Value};

fn tag_of(value: &Value) -> TypeTag {
    match value {
        Value::Null => TypeTag::Null,
        Value::Int(_) => TypeTag::Int,
        Value::String(_) => TypeTag::String,
        Value::List(_) => TypeTag::List,
        Value::Struct(_) => TypeTag::Struct,
    }
}

fn field_id_of(name: &str) -> i64 {
    match name {
        "name" => 4,
        "version" => 5,
        "imports" => 6,
        "symbols" => 7,
        "max_id" => 8,
        _ => name
            .strip_prefix('$')
            .and_then(|digits| digits.parse::<i64>().ok())
            .unwrap_or(-1),
    }
}

enum Frame<'a> {
    Struct { fields: &'a [(String, Value)], index: Option<usize> },
    List { items: &'a [Value], index: Option<usize> },
}

/// Cursor over an in-memory struct or list, usable wherever a symbol table
/// reader binding expects an external [`StructReader`].
pub struct ValueCursor<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> ValueCursor<'a> {
    /// Builds a cursor already positioned inside `root` (as if `step_in` had
    /// just been called on a reader pointed at it).
    pub fn into_struct(root: &'a Value) -> Self {
        let Value::Struct(s) = root else { panic!("root must be a struct") };
        Self {
            stack: vec![Frame::Struct { fields: s.fields(), index: None }],
        }
    }

    fn current(&self) -> &'a Value {
        match self.stack.last().expect("cursor is empty") {
            Frame::Struct { fields, index } => &fields[index.expect("next() not yet called")].1,
            Frame::List { items, index } => &items[index.expect("next() not yet called")],
        }
    }
}

impl<'a> StructReader for ValueCursor<'a> {
    fn has_next(&mut self) -> bool {
        match self.stack.last().unwrap() {
            Frame::Struct { fields, index } => index.map_or(0, |i| i + 1) < fields.len(),
            Frame::List { items, index } => index.map_or(0, |i| i + 1) < items.len(),
        }
    }

    fn next(&mut self) -> TypeTag {
        match self.stack.last_mut().unwrap() {
            Frame::Struct { index, .. } => *index = Some(index.map_or(0, |i| i + 1)),
            Frame::List { index, .. } => *index = Some(index.map_or(0, |i| i + 1)),
        }
        self.get_type()
    }

    fn is_null_value(&self) -> bool {
        self.current().is_null()
    }

    fn field_id(&self) -> i64 {
        match self.stack.last().unwrap() {
            Frame::Struct { fields, index } => field_id_of(&fields[index.expect("next() not yet called")].0),
            Frame::List { .. } => -1,
        }
    }

    fn get_type(&self) -> TypeTag {
        tag_of(self.current())
    }

    fn step_in(&mut self) {
        match self.current() {
            Value::Struct(s) => self.stack.push(Frame::Struct { fields: s.fields(), index: None }),
            Value::List(items) => self.stack.push(Frame::List { items, index: None }),
            _ => panic!("cannot step into a scalar"),
        }
    }

    fn step_out(&mut self) {
        self.stack.pop();
    }

    fn is_in_struct(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Struct { .. }))
    }

    fn int_value(&self) -> i64 {
        match self.current() {
            Value::Int(v) => *v,
            _ => panic!("current value is not an int"),
        }
    }

    fn string_value(&self) -> String {
        match self.current() {
            Value::String(s) => s.clone(),
            _ => panic!("current value is not a string"),
        }
    }
}
