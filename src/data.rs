/// Semantic classification of a data value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Map,
    Struct,
    List,
    Value,
    Nil,
}

/// Access to caller data. The renderer never inspects data directly; it
/// classifies a handle with `type_of` and extracts through the accessors,
/// so any data shape can back a template.
///
/// `to_text` is the scalar-to-string conversion; the name steers clear of
/// the blanket `ToString` impl on backends that are `Display`.
pub trait Data {
    fn type_of(&self) -> DataType;

    /// Fields for a struct, entries for a map, elements for a list,
    /// characters for a scalar, 0 for nil.
    fn length_of(&self) -> usize;

    fn get_field(&self, _name: &str) -> Option<&dyn Data> {
        None
    }

    fn get_key(&self, _name: &str) -> Option<&dyn Data> {
        None
    }

    fn has_key(&self, _name: &str) -> bool {
        false
    }

    fn index_at(&self, _index: usize) -> Option<&dyn Data> {
        None
    }

    fn to_text(&self) -> String {
        String::new()
    }

    fn is_nil(&self) -> bool {
        self.type_of() == DataType::Nil
    }
}
