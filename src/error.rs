//! Error types
//!
//! Every error here is scoped to a single candidate or a single decode call;
//! none of them should stop a surrounding generation run.

use std::io;

/// Type alias for model construction results
pub type ModelResult<T> = Result<T, ModelError>;

/// Type alias for decoding results
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Structural invariant violations while building value models
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{executable} expects {expected} arguments, got {actual}")]
    ArgumentCount {
        executable: String,
        expected: usize,
        actual: usize,
    },

    #[error("{executable} argument {position} must be {expected}, got {actual}")]
    ArgumentType {
        executable: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("array declared with length {declared} but built with length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("store index {index} is outside a collection of length {length}")]
    StoreOutOfBounds { index: usize, length: usize },

    #[error("inconsistent model of type {ty}: {detail}")]
    Inconsistent { ty: String, detail: String },
}

/// Non-fatal generation signals.
///
/// Providers log these and contribute nothing for the slot (or a `Null`
/// model where the construction planner allows one).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationIssue {
    #[error("provider does not support type {0}")]
    UnsupportedVariant(String),

    #[error("no accessible constructor for {0}")]
    NoAccessibleConstructor(String),

    #[error("recursion budget exhausted while generating {0}")]
    RecursionBudgetExhausted(String),

    #[error("generation cancelled")]
    Cancelled,
}

/// Failures decoding one raw execution record
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported raw value: {0}")]
    UnsupportedVariant(String),

    #[error("execution produced {actual} result values but {expected} were declared")]
    ResultShapeMismatch { expected: usize, actual: usize },

    #[error("raw value of type {actual} does not match declared type {expected}")]
    TypeMismatch { expected: String, actual: String },

    #[error("cannot parse {value:?} as {ty}")]
    MalformedLiteral { ty: String, value: String },

    #[error("malformed execution record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
