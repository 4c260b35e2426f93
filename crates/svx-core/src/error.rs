//! Error types.
//!
//! Two tiers: [`ParseError`] aborts a whole document parse, while
//! [`ValueError`] is what the individual value grammars return. The
//! document builder decides per call site whether a `ValueError` escalates
//! to a `ParseError` (geometry and structure) or is dropped with a warning
//! (style properties).

/// Failure of a single attribute or property value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("empty {kind} value")]
    Empty { kind: &'static str },

    #[error("invalid {kind} value: {value:?}")]
    Invalid { kind: &'static str, value: String },

    #[error("{kind} cannot be negative: {value:?}")]
    Negative { kind: &'static str, value: String },
}

impl ValueError {
    pub(crate) fn invalid(kind: &'static str, value: &str) -> Self {
        Self::Invalid {
            kind,
            value: value.to_string(),
        }
    }

    pub(crate) fn negative(kind: &'static str, value: &str) -> Self {
        Self::Negative {
            kind,
            value: value.to_string(),
        }
    }
}

/// Fatal document parse failure. No partial document is returned.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document: root element must be <svg>")]
    RootNotSvg,

    #[error("invalid document: no <svg> root element found")]
    EmptyDocument,

    #[error("invalid document: <{element}> is only valid inside {expected}")]
    Misplaced {
        element: &'static str,
        expected: &'static str,
    },

    #[error("invalid <{element}> attribute {attribute}: {source}")]
    Attribute {
        element: &'static str,
        attribute: &'static str,
        #[source]
        source: ValueError,
    },

    #[error("invalid transform list {value:?}: {reason}")]
    Transform { value: String, reason: String },

    #[error("invalid stylesheet: {0}")]
    Css(String),
}

/// Result alias used across the parsing layer.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_error_mentions_element_and_value() {
        let err = ParseError::Attribute {
            element: "rect",
            attribute: "width",
            source: ValueError::negative("length", "-5"),
        };
        let msg = err.to_string();
        assert!(msg.contains("<rect>"), "{msg}");
        assert!(msg.contains("\"-5\""), "{msg}");
    }
}
