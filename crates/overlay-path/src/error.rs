//! Error types for selector compilation and evaluation.

use crate::dialect::Dialect;

/// A syntax or typing error in a selector expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected root identifier '$' at position {0}")]
    ExpectedRoot(usize),

    #[error("unexpected token {token:?} at position {position}")]
    UnexpectedToken { token: char, position: usize },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("invalid escape sequence at position {0}")]
    InvalidEscape(usize),

    #[error("invalid number at position {0}")]
    InvalidNumber(usize),

    #[error("unclosed string starting at position {0}")]
    UnclosedString(usize),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// The expression is well-formed but not well-typed.
    #[error("{0}")]
    Type(String),

    #[error("{0} is not supported by the {1} dialect")]
    Unsupported(&'static str, Dialect),
}

/// Errors surfaced by [`JsonPath`](crate::JsonPath).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SelectorError {
    /// The expression does not compile under the given dialect.
    #[error("invalid {dialect} jsonpath {expression:?}: {source}")]
    Compile {
        expression: String,
        dialect: Dialect,
        #[source]
        source: ParseError,
    },

    /// The selector compiled but could not be evaluated against the tree.
    #[error("error evaluating jsonpath {expression:?}: {source}")]
    Evaluation {
        expression: String,
        #[source]
        source: EvalError,
    },
}

/// A failure while walking the tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Aliases are never resolved, so nothing below one can be selected.
    #[error("cannot traverse alias *{0}")]
    Alias(String),
}

/// Convenience alias for selector results.
pub type SelectorResult<T> = Result<T, SelectorError>;
