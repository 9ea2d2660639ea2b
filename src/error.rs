use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Terminal conversion failures. Block-shape mismatches in the JSON → HCL
/// direction never surface here; they degrade to plain attributes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse hcl")]
    Parse(#[from] ParseError),

    #[error("format hcl")]
    Format(#[from] hcl::Error),

    #[error("parse json: {0}")]
    Json(String),

    /// Block and non-block data collide under one name.
    #[error("cannot convert block {path}: {reason}")]
    StructuralConflict { path: String, reason: String },

    #[error("expected a JSON object at the document root, got {0}")]
    NotAnObject(&'static str),
}

/// Syntax error reported by the frontend, positioned 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        Self { message: message.into(), line, column }
    }
}

/// Byte offset → 1-based (line, column).
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

pub(crate) fn kind_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let src = "a = 1\nbb = @";
        assert_eq!(line_column(src, 0), (1, 1));
        assert_eq!(line_column(src, 11), (2, 6));
        let err = ParseError::at(src, 11, "unexpected character");
        assert_eq!(err.to_string(), "2:6: unexpected character");
    }
}
