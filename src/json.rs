use crate::data::{Data, DataType};
pub use serde_json::Value as JsonValue;

impl Data for JsonValue {
    fn type_of(&self) -> DataType {
        match self {
            JsonValue::Object(_) => DataType::Map,
            JsonValue::Array(_) => DataType::List,
            JsonValue::Null => DataType::Nil,
            _ => DataType::Value,
        }
    }

    fn length_of(&self) -> usize {
        match self {
            JsonValue::Object(entries) => entries.len(),
            JsonValue::Array(elements) => elements.len(),
            JsonValue::String(text) => text.chars().count(),
            JsonValue::Number(number) => number.to_string().len(),
            JsonValue::Bool(flag) => flag.to_string().len(),
            JsonValue::Null => 0,
        }
    }

    fn get_key(&self, name: &str) -> Option<&dyn Data> {
        match self {
            JsonValue::Object(entries) => entries.get(name).map(|value| value as &dyn Data),
            _ => None,
        }
    }

    fn has_key(&self, name: &str) -> bool {
        matches!(self, JsonValue::Object(entries) if entries.contains_key(name))
    }

    fn index_at(&self, index: usize) -> Option<&dyn Data> {
        match self {
            JsonValue::Array(elements) => elements.get(index).map(|value| value as &dyn Data),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        match self {
            JsonValue::String(text) => text.clone(),
            JsonValue::Number(number) => number.to_string(),
            JsonValue::Bool(flag) => flag.to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let json: JsonValue =
            serde_json::from_str(r#"{"a": [1], "b": "x", "c": null}"#).unwrap();
        assert_eq!(json.type_of(), DataType::Map);
        assert_eq!(json.get_key("a").unwrap().type_of(), DataType::List);
        assert_eq!(json.get_key("b").unwrap().type_of(), DataType::Value);
        assert!(json.get_key("c").unwrap().is_nil());
        assert!(json.has_key("a"));
        assert!(!json.has_key("d"));
        assert_eq!(json.length_of(), 3);
    }

    #[test]
    fn scalars_stringify_deterministically() {
        let json: JsonValue = serde_json::from_str(r#"[42, true, "x"]"#).unwrap();
        assert_eq!(json.index_at(0).unwrap().to_text(), "42");
        assert_eq!(json.index_at(1).unwrap().to_text(), "true");
        assert_eq!(json.index_at(2).unwrap().to_text(), "x");
        assert!(json.index_at(3).is_none());
    }
}
