use std::collections::HashMap;

use crate::data::{Data, DataType};

/// A hand-built data tree for callers that do not want to go through
/// serde. `Record` is an ordered named-field record and classifies as a
/// struct; `Map` classifies as a map.
pub enum Item {
    Nil,
    Bool(bool),
    Text(String),
    List(Vec<Item>),
    Map(HashMap<String, Item>),
    Record(Vec<(String, Item)>),
}

impl Item {
    pub fn nil() -> Item {
        Item::Nil
    }

    pub fn bool(flag: bool) -> Item {
        Item::Bool(flag)
    }

    pub fn text(text: &str) -> Item {
        Item::Text(text.to_owned())
    }

    pub fn list(elements: Vec<Item>) -> Item {
        Item::List(elements)
    }

    pub fn map(entries: HashMap<String, Item>) -> Item {
        Item::Map(entries)
    }

    pub fn record(fields: Vec<(&str, Item)>) -> Item {
        Item::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_owned(), value))
                .collect(),
        )
    }
}

impl Data for Item {
    fn type_of(&self) -> DataType {
        match self {
            Item::Nil => DataType::Nil,
            Item::Map(_) => DataType::Map,
            Item::Record(_) => DataType::Struct,
            Item::List(_) => DataType::List,
            _ => DataType::Value,
        }
    }

    fn length_of(&self) -> usize {
        match self {
            Item::Nil => 0,
            Item::Bool(flag) => flag.to_string().len(),
            Item::Text(text) => text.chars().count(),
            Item::List(elements) => elements.len(),
            Item::Map(entries) => entries.len(),
            Item::Record(fields) => fields.len(),
        }
    }

    fn get_field(&self, name: &str) -> Option<&dyn Data> {
        match self {
            Item::Record(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value as &dyn Data),
            _ => None,
        }
    }

    fn get_key(&self, name: &str) -> Option<&dyn Data> {
        match self {
            Item::Map(entries) => entries.get(name).map(|value| value as &dyn Data),
            _ => None,
        }
    }

    fn has_key(&self, name: &str) -> bool {
        match self {
            Item::Map(entries) => entries.contains_key(name),
            Item::Record(fields) => fields.iter().any(|(field, _)| field == name),
            _ => false,
        }
    }

    fn index_at(&self, index: usize) -> Option<&dyn Data> {
        match self {
            Item::List(elements) => elements.get(index).map(|value| value as &dyn Data),
            _ => None,
        }
    }

    fn to_text(&self) -> String {
        match self {
            Item::Bool(flag) => flag.to_string(),
            Item::Text(text) => text.clone(),
            _ => String::new(),
        }
    }
}
