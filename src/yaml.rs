use crate::data::{Data, DataType};
pub use serde_yaml::Value as YamlValue;

// tagged values classify as whatever they wrap
fn untag(value: &YamlValue) -> &YamlValue {
    match value {
        YamlValue::Tagged(tagged) => &tagged.value,
        other => other,
    }
}

impl Data for YamlValue {
    fn type_of(&self) -> DataType {
        match untag(self) {
            YamlValue::Mapping(_) => DataType::Map,
            YamlValue::Sequence(_) => DataType::List,
            YamlValue::Null => DataType::Nil,
            _ => DataType::Value,
        }
    }

    fn length_of(&self) -> usize {
        match untag(self) {
            YamlValue::Mapping(entries) => entries.len(),
            YamlValue::Sequence(elements) => elements.len(),
            YamlValue::String(text) => text.chars().count(),
            YamlValue::Number(number) => number.to_string().len(),
            YamlValue::Bool(flag) => flag.to_string().len(),
            _ => 0,
        }
    }

    fn get_key(&self, name: &str) -> Option<&dyn Data> {
        let key = YamlValue::String(name.to_string());
        match untag(self) {
            YamlValue::Mapping(entries) => entries.get(&key).map(|value| value as &dyn Data),
            _ => None,
        }
    }

    fn has_key(&self, name: &str) -> bool {
        let key = YamlValue::String(name.to_string());
        matches!(untag(self), YamlValue::Mapping(entries) if entries.contains_key(&key))
    }

    fn index_at(&self, index: usize) -> Option<&dyn Data> {
        match untag(self) {
            YamlValue::Sequence(elements) => elements.get(index).map(|value| value as &dyn Data),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        match untag(self) {
            YamlValue::String(text) => text.clone(),
            YamlValue::Number(number) => number.to_string(),
            YamlValue::Bool(flag) => flag.to_string(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let yaml: YamlValue =
            serde_yaml::from_str("a: [1, 2]\nb: text\nc: ~\n").unwrap();
        assert_eq!(yaml.type_of(), DataType::Map);
        assert_eq!(yaml.get_key("a").unwrap().type_of(), DataType::List);
        assert_eq!(yaml.get_key("a").unwrap().length_of(), 2);
        assert_eq!(yaml.get_key("b").unwrap().to_text(), "text");
        assert!(yaml.get_key("c").unwrap().is_nil());
        assert!(!yaml.has_key("d"));
    }

    #[test]
    fn tagged_values_are_seen_through() {
        let yaml: YamlValue = serde_yaml::from_str("!note hello").unwrap();
        assert_eq!(yaml.type_of(), DataType::Value);
        assert_eq!(yaml.to_text(), "hello");
    }
}
