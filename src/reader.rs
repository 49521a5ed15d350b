/// The shape of a value the external reader is currently positioned over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Null,
    Int,
    String,
    List,
    Struct,
    /// Any other type the Format supports; tolerated and skipped.
    Other,
}

/// The narrow subset of a streaming reader that the reader binding consumes.
///
/// This crate never produces an implementation of this trait itself — it is
/// the caller's streaming decoder, positioned by the caller at the opening of
/// the struct that represents a symbol table. All methods assume the reader
/// is already in a valid position to answer them; this crate does not guard
/// against a misbehaving implementation.
pub trait StructReader {
    /// Advances to the next element of the current container, if any.
    /// Returns `false` once the container is exhausted.
    fn has_next(&mut self) -> bool;
    /// Returns the type of the element `has_next` just advanced onto.
    fn next(&mut self) -> TypeTag;
    /// Whether the current value is a typed null.
    fn is_null_value(&self) -> bool;
    /// The field id of the current value if positioned inside a struct, or
    /// `-1` if there is none (not in a struct, or the field has no id).
    fn field_id(&self) -> i64;
    /// The type of the current value (equivalent to the last `next` result).
    fn get_type(&self) -> TypeTag;
    /// Steps into the current container (list or struct).
    fn step_in(&mut self);
    /// Steps out of the current container, back to its parent.
    fn step_out(&mut self);
    /// Whether the reader is currently positioned inside a struct.
    fn is_in_struct(&self) -> bool;
    /// Reads the current value as an integer.
    fn int_value(&self) -> i64;
    /// Reads the current value as a string.
    fn string_value(&self) -> String;
}
