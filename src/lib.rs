mod lexer;
mod whitespace;
mod processor;
mod template;
mod context;
mod data;
mod error;
mod items;
mod json;
mod yaml;

pub use self::data::{Data, DataType};
pub use self::error::RenderError;
pub use self::items::Item;
pub use self::json::JsonValue;
pub use self::template::Template;
pub use self::yaml::YamlValue;

use std::collections::HashMap;

/// Render a template in one call.
pub fn render(
    template: &str,
    data: &dyn Data,
    partials: &HashMap<String, String>,
) -> Result<String, RenderError> {
    Ok(Template::from(template)?.render_with_partials(data, partials))
}
