use thiserror::Error;

/// Errors surfaced while turning template text into tokens. Anything that
/// goes wrong later (missing names, missing partials, type mismatches)
/// degrades to empty output instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unbalanced tags: {0}")]
    UnbalancedTags(String),
    #[error("invalid delimiters tag: {0}")]
    InvalidDelimiters(String),
}
