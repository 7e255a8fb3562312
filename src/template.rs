use std::collections::HashMap;

use crate::data::Data;
use crate::error::RenderError;
use crate::lexer::{self, Token};
use crate::processor::Processor;
use crate::whitespace;

/// A lexed and whitespace-analyzed template, reusable across renders.
pub struct Template {
    tokens: Vec<Token>,
}

impl Template {
    pub fn from(input: &str) -> Result<Self, RenderError> {
        let mut tokens = lexer::lex(input)?;
        whitespace::analyze(&mut tokens);
        Ok(Template { tokens })
    }

    pub fn render(&self, data: &dyn Data) -> String {
        self.render_with_partials(data, &HashMap::new())
    }

    pub fn render_with_partials(
        &self,
        data: &dyn Data,
        partials: &HashMap<String, String>,
    ) -> String {
        // the processor mutates its copy of the tokens in place
        Processor::new(self.tokens.clone(), data, partials).run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonValue;

    #[test]
    fn renders_repeatedly() {
        let template = Template::from("Hello, {{name}}!").unwrap();
        let json: JsonValue = serde_json::from_str(r#"{"name": "world"}"#).unwrap();
        assert_eq!(template.render(&json), "Hello, world!");
        assert_eq!(template.render(&json), "Hello, world!");
    }

    #[test]
    fn lex_errors_surface() {
        assert!(Template::from("{{#a}}never closed").is_err());
    }

    #[test]
    fn missing_partial_renders_empty() {
        let template = Template::from("[{{>gone}}]").unwrap();
        let json: JsonValue = serde_json::from_str("{}").unwrap();
        assert_eq!(
            template.render_with_partials(&json, &HashMap::new()),
            "[]"
        );
    }
}
