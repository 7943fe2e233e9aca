//! Error types for formatting and validation.

/// Errors raised while compiling an expression tree to SQL text.
///
/// All of these are detected synchronously, before any I/O: the formatter
/// never emits partial SQL for an input it cannot fully compile.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A member path did not have the `entity.column[.json.path]` shape.
    #[error("invalid member path '{0}': expected an entity.column prefix")]
    InvalidMemberPath(String),

    /// A JSON expression had a shape the compiler does not accept.
    #[error("unsupported json expression: {0}")]
    UnsupportedJsonShape(String),

    /// A literal value cannot be rendered by the target dialect.
    #[error("unsupported literal value: {0}")]
    UnsupportedValue(String),

    /// An INSERT statement carried no columns or no rows.
    #[error("insert into '{0}' has no columns or no rows")]
    EmptyInsert(String),

    /// A projection needs an alias but none was given or derivable.
    #[error("projection '{0}' has no explicit or derivable alias")]
    MissingAlias(String),

    /// The target dialect does not implement a required operation.
    #[error("dialect does not support {0}")]
    Unsupported(&'static str),
}

/// Result type for formatting operations.
pub type Result<T> = std::result::Result<T, FormatError>;
