//! Scalar expressions: columns, literals, operators, functions, casts and
//! JSON constructors.

use crate::error::{FormatError, Result};
use crate::value::{ToValue, Value};

use super::statement::SelectStatement;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Like,
    NotLike,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    /// Returns the SQL token for this operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

/// Target of an explicit cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// Cast to character text.
    Text,
    /// Truncate to an integer (floor of the decimal form).
    Integer,
    /// Cast to a signed 64-bit integer.
    Long,
    /// Cast to a double-precision float.
    Double,
    /// Cast to a decimal with explicit precision and scale.
    Decimal { precision: u32, scale: u32 },
}

/// Granularity of a current-time expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateGranularity {
    /// Calendar date only.
    Date,
    /// Full timestamp.
    Timestamp,
}

/// A named field inside a JSON object constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonField {
    /// Key name in the produced document.
    pub alias: String,
    /// Expression producing the value.
    pub value: Expr,
}

impl JsonField {
    /// Creates a named JSON field.
    #[must_use]
    pub fn new(alias: impl Into<String>, value: Expr) -> Self {
        Self {
            alias: alias.into(),
            value,
        }
    }
}

/// Source of a JSON array constructor.
///
/// Each shape compiles differently, so the distinction is carried in the
/// tree instead of being guessed from argument inspection at render time.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonArraySource {
    /// A column already holding JSON array text, emitted as a plain
    /// quoted reference.
    Column { table: Option<String>, name: String },
    /// Aggregate every row of a nested query into one array of objects.
    Query(Box<SelectStatement>),
    /// An inline array of literal values.
    Values(Vec<Value>),
}

/// A scalar function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Function name, emitted as-is.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<Expr>,
    /// Whether to emit `DISTINCT` before the arguments (aggregates only).
    pub distinct: bool,
}

/// A scalar expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// A column reference, optionally qualified by a table or alias.
    Column {
        table: Option<String>,
        name: String,
    },
    /// A binary operation.
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// A function call.
    Function(FunctionCall),
    /// An explicit cast.
    Cast { expr: Box<Expr>, target: CastKind },
    /// A freshly generated random UUID.
    NewUuid,
    /// A UUID derived deterministically from the argument.
    UuidFrom(Box<Expr>),
    /// The current date or timestamp.
    Now(DateGranularity),
    /// Extraction of a JSON path from a document column.
    ///
    /// `path` always has at least three segments: entity, column, then one
    /// or more document keys. [`Expr::member`] enforces the shape.
    JsonGet { path: Vec<String> },
    /// A JSON object built from named fields.
    JsonObject(Vec<JsonField>),
    /// A JSON array built from a column, a nested query or literal values.
    JsonArray(JsonArraySource),
    /// A grouped JSON array aggregate over a JSON object constructor.
    JsonGroupArray(Box<Expr>),
    /// A parenthesized scalar subquery.
    Subquery(Box<SelectStatement>),
    /// A NULL test.
    IsNull { expr: Box<Expr>, negated: bool },
    /// An IN list test.
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
}

impl Expr {
    /// Creates a literal expression from any convertible value.
    #[must_use]
    pub fn literal(value: impl ToValue) -> Self {
        Self::Literal(value.to_value())
    }

    /// Creates an unqualified column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Creates a table-qualified column reference.
    #[must_use]
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Parses a dotted member path.
    ///
    /// One segment is an unqualified column, two are `table.column`, three
    /// or more select a JSON path inside a document column. Empty segments
    /// are rejected.
    pub fn member(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(FormatError::InvalidMemberPath(String::from(path)));
        }
        match segments.as_slice() {
            [] => Err(FormatError::InvalidMemberPath(String::from(path))),
            [name] => Ok(Self::column(*name)),
            [table, name] => Ok(Self::qualified(*table, *name)),
            _ => Ok(Self::JsonGet {
                path: segments.into_iter().map(String::from).collect(),
            }),
        }
    }

    /// Creates a function call expression.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Function(FunctionCall {
            name: name.into(),
            args,
            distinct: false,
        })
    }

    /// Creates a `COUNT(...)` aggregate.
    #[must_use]
    pub fn count(arg: Expr) -> Self {
        Self::function("COUNT", vec![arg])
    }

    /// Creates a cast expression.
    #[must_use]
    pub fn cast(self, target: CastKind) -> Self {
        Self::Cast {
            expr: Box::new(self),
            target,
        }
    }

    /// Combines with another expression using a binary operator.
    #[must_use]
    pub fn binary(self, op: BinaryOperator, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// `self = other`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: impl ToValue) -> Self {
        self.binary(BinaryOperator::Eq, Self::literal(other))
    }

    /// `self <> other`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn ne(self, other: impl ToValue) -> Self {
        self.binary(BinaryOperator::NotEq, Self::literal(other))
    }

    /// `self > other`.
    #[must_use]
    pub fn gt(self, other: impl ToValue) -> Self {
        self.binary(BinaryOperator::Gt, Self::literal(other))
    }

    /// `self >= other`.
    #[must_use]
    pub fn gte(self, other: impl ToValue) -> Self {
        self.binary(BinaryOperator::GtEq, Self::literal(other))
    }

    /// `self < other`.
    #[must_use]
    pub fn lt(self, other: impl ToValue) -> Self {
        self.binary(BinaryOperator::Lt, Self::literal(other))
    }

    /// `self <= other`.
    #[must_use]
    pub fn lte(self, other: impl ToValue) -> Self {
        self.binary(BinaryOperator::LtEq, Self::literal(other))
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Expr) -> Self {
        self.binary(BinaryOperator::And, other)
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Expr) -> Self {
        self.binary(BinaryOperator::Or, other)
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// `self IN (values...)`.
    #[must_use]
    pub fn in_list<T: ToValue>(self, values: Vec<T>) -> Self {
        Self::InList {
            expr: Box::new(self),
            list: values.into_iter().map(Self::literal).collect(),
            negated: false,
        }
    }

    /// Creates a JSON object constructor from named fields.
    #[must_use]
    pub fn json_object(fields: Vec<JsonField>) -> Self {
        Self::JsonObject(fields)
    }

    /// Creates a grouped JSON array aggregate.
    #[must_use]
    pub fn json_group_array(object: Expr) -> Self {
        Self::JsonGroupArray(Box::new(object))
    }
}
