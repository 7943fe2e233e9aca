//! Query expression tree.
//!
//! The tree is plain data: callers build it with the constructors in
//! [`expression`] and [`statement`], and the formatter compiles it to SQL
//! text in one pass. Nothing here performs I/O or holds dialect state.

pub mod expression;
pub mod statement;

pub use expression::{
    BinaryOperator, CastKind, DateGranularity, Expr, FunctionCall, JsonArraySource, JsonField,
};
pub use statement::{
    InsertStatement, JoinClause, JoinType, OrderByItem, OrderDirection, SelectColumn,
    SelectStatement, Statement, TableRef,
};
