//! Statements: SELECT and INSERT.

use crate::value::Value;

use super::expression::Expr;

/// Sort direction for ORDER BY items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword for this direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub direction: OrderDirection,
}

/// Join flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinType {
    /// Returns the SQL keyword sequence for this join.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A join clause: flavor, target and ON condition.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableRef,
    /// ON condition; absent for CROSS joins.
    pub on: Option<Expr>,
}

/// A FROM or JOIN target.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A named table, optionally aliased.
    Table { name: String, alias: Option<String> },
    /// A parenthesized subquery with a mandatory alias.
    Subquery {
        query: Box<SelectStatement>,
        alias: String,
    },
}

impl TableRef {
    /// Creates an unaliased table reference.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            alias: None,
        }
    }

    /// Creates an aliased table reference.
    #[must_use]
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Table {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Returns the name the rest of the query refers to this source by.
    #[must_use]
    pub fn reference_name(&self) -> &str {
        match self {
            Self::Table { name, alias } => alias.as_deref().unwrap_or(name),
            Self::Subquery { alias, .. } => alias,
        }
    }
}

/// One projected column: an expression and its optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Projects an expression without an explicit alias.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Projects an expression under an explicit alias.
    #[must_use]
    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// A SELECT statement.
///
/// Built fluently and compiled by the formatter; an empty `columns` list
/// means `SELECT *`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub distinct: bool,
    pub columns: Vec<SelectColumn>,
    pub from: Option<TableRef>,
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectStatement {
    /// Starts a SELECT from a table.
    #[must_use]
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            from: Some(TableRef::table(table)),
            ..Self::default()
        }
    }

    /// Starts a SELECT from an aliased table.
    #[must_use]
    pub fn from_aliased(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            from: Some(TableRef::aliased(table, alias)),
            ..Self::default()
        }
    }

    /// Requests DISTINCT rows.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Projects an expression.
    #[must_use]
    pub fn column(mut self, expr: Expr) -> Self {
        self.columns.push(SelectColumn::new(expr));
        self
    }

    /// Projects an expression under an alias.
    #[must_use]
    pub fn column_as(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.columns.push(SelectColumn::aliased(expr, alias));
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, join_type: JoinType, table: TableRef, on: Expr) -> Self {
        self.joins.push(JoinClause {
            join_type,
            table,
            on: Some(on),
        });
        self
    }

    /// Adds a CROSS join.
    #[must_use]
    pub fn cross_join(mut self, table: TableRef) -> Self {
        self.joins.push(JoinClause {
            join_type: JoinType::Cross,
            table,
            on: None,
        });
        self
    }

    /// Sets the WHERE clause, AND-combining with any existing condition.
    #[must_use]
    pub fn filter(mut self, condition: Expr) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Adds a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    /// Sets the HAVING clause.
    #[must_use]
    pub fn having(mut self, condition: Expr) -> Self {
        self.having = Some(condition);
        self
    }

    /// Adds an ORDER BY item.
    #[must_use]
    pub fn order_by(mut self, expr: Expr, direction: OrderDirection) -> Self {
        self.order_by.push(OrderByItem { expr, direction });
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// An INSERT statement with inline literal rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl InsertStatement {
    /// Creates an INSERT into the given columns.
    #[must_use]
    pub fn new<S: Into<String>>(table: impl Into<String>, columns: Vec<S>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends one row of values.
    #[must_use]
    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }
}

/// Any statement the formatter can compile.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
}
