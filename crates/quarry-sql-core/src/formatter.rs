//! Expression tree to SQL text compilation.
//!
//! [`SqlFormatter`] walks a statement in one pass and asks its [`Dialect`]
//! for every engine-specific fragment. Errors abort the whole compilation;
//! no partial SQL is ever returned.

use crate::ast::{
    Expr, InsertStatement, JsonArraySource, JsonField, SelectColumn, SelectStatement, Statement,
    TableRef,
};
use crate::dialect::Dialect;
use crate::error::{FormatError, Result};
use crate::value::Value;

/// Compiles statements and expressions to SQL text for one dialect.
///
/// The formatter is stateless between calls and can be shared freely.
#[derive(Debug, Clone)]
pub struct SqlFormatter<D: Dialect> {
    dialect: D,
}

impl<D: Dialect> SqlFormatter<D> {
    /// Creates a formatter over a dialect.
    pub const fn new(dialect: D) -> Self {
        Self { dialect }
    }

    /// Returns the underlying dialect.
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Compiles any statement.
    pub fn format(&self, statement: &Statement) -> Result<String> {
        match statement {
            Statement::Select(select) => self.format_select(select),
            Statement::Insert(insert) => self.format_insert(insert),
        }
    }

    /// Compiles a SELECT statement.
    pub fn format_select(&self, select: &SelectStatement) -> Result<String> {
        let mut sql = String::from("SELECT ");
        if select.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.format_projections(&select.columns)?);

        if let Some(from) = &select.from {
            sql.push_str(" FROM ");
            sql.push_str(&self.format_table_ref(from)?);
        }

        for join in &select.joins {
            sql.push(' ');
            sql.push_str(join.join_type.as_str());
            sql.push(' ');
            sql.push_str(&self.format_table_ref(&join.table)?);
            if let Some(on) = &join.on {
                sql.push_str(" ON ");
                sql.push_str(&self.format_expr(on)?);
            }
        }

        if let Some(where_clause) = &select.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&self.format_expr(where_clause)?);
        }

        if !select.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            let exprs: Result<Vec<String>> =
                select.group_by.iter().map(|e| self.format_expr(e)).collect();
            sql.push_str(&exprs?.join(", "));
        }

        if let Some(having) = &select.having {
            sql.push_str(" HAVING ");
            sql.push_str(&self.format_expr(having)?);
        }

        if !select.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let items: Result<Vec<String>> = select
                .order_by
                .iter()
                .map(|item| {
                    Ok(format!(
                        "{} {}",
                        self.format_expr(&item.expr)?,
                        item.direction.as_str()
                    ))
                })
                .collect();
            sql.push_str(&items?.join(", "));
        }

        if let Some(limit) = select.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = select.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(sql)
    }

    /// Compiles an INSERT statement with inline literal rows.
    ///
    /// A statement without columns or without rows is rejected before any
    /// text is produced.
    pub fn format_insert(&self, insert: &InsertStatement) -> Result<String> {
        if insert.columns.is_empty() || insert.rows.is_empty() {
            return Err(FormatError::EmptyInsert(insert.table.clone()));
        }
        let columns: Vec<String> = insert
            .columns
            .iter()
            .map(|c| self.dialect.escape_name(c))
            .collect();
        let rows: Result<Vec<String>> = insert
            .rows
            .iter()
            .map(|row| {
                let values: Result<Vec<String>> =
                    row.iter().map(|v| self.dialect.escape_value(v)).collect();
                Ok(format!("({})", values?.join(", ")))
            })
            .collect();
        Ok(format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.dialect.escape_name(&insert.table),
            columns.join(", "),
            rows?.join(", ")
        ))
    }

    /// Compiles a scalar expression.
    pub fn format_expr(&self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Literal(value) => self.dialect.escape_value(value),
            Expr::Column { table, name } => Ok(self.format_column(table.as_deref(), name)),
            Expr::Binary { left, op, right } => Ok(format!(
                "({} {} {})",
                self.format_expr(left)?,
                op.as_str(),
                self.format_expr(right)?
            )),
            Expr::Function(call) => {
                let args: Result<Vec<String>> =
                    call.args.iter().map(|a| self.format_expr(a)).collect();
                let distinct = if call.distinct { "DISTINCT " } else { "" };
                Ok(format!("{}({distinct}{})", call.name, args?.join(", ")))
            }
            Expr::Cast { expr, target } => {
                let inner = self.format_expr(expr)?;
                self.dialect.cast(&inner, *target)
            }
            Expr::NewUuid => self.dialect.random_uuid(),
            Expr::UuidFrom(inner) => {
                let inner = self.format_expr(inner)?;
                self.dialect.derived_uuid(&inner)
            }
            Expr::Now(granularity) => self.dialect.now(*granularity),
            Expr::JsonGet { path } => self.format_json_get(path),
            Expr::JsonObject(fields) => self.format_json_object(fields),
            Expr::JsonArray(source) => self.format_json_array(source),
            Expr::JsonGroupArray(inner) => match inner.as_ref() {
                Expr::JsonObject(_) => {
                    let inner = self.format_expr(inner)?;
                    self.dialect.json_group_array(&inner)
                }
                _ => Err(FormatError::UnsupportedJsonShape(String::from(
                    "grouped json arrays aggregate json objects only",
                ))),
            },
            Expr::Subquery(select) => Ok(format!("({})", self.format_select(select)?)),
            Expr::IsNull { expr, negated } => Ok(format!(
                "{} IS {}NULL",
                self.format_expr(expr)?,
                if *negated { "NOT " } else { "" }
            )),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let items: Result<Vec<String>> =
                    list.iter().map(|e| self.format_expr(e)).collect();
                Ok(format!(
                    "{} {}IN ({})",
                    self.format_expr(expr)?,
                    if *negated { "NOT " } else { "" },
                    items?.join(", ")
                ))
            }
        }
    }

    fn format_column(&self, table: Option<&str>, name: &str) -> String {
        match table {
            Some(table) => format!(
                "{}.{}",
                self.dialect.escape_name(table),
                self.dialect.escape_name(name)
            ),
            None => self.dialect.escape_name(name),
        }
    }

    fn format_projections(&self, columns: &[SelectColumn]) -> Result<String> {
        if columns.is_empty() {
            return Ok(String::from("*"));
        }
        let parts: Result<Vec<String>> = columns
            .iter()
            .map(|column| self.format_projection(column))
            .collect();
        Ok(parts?.join(", "))
    }

    fn format_projection(&self, column: &SelectColumn) -> Result<String> {
        let rendered = self.format_expr(&column.expr)?;
        let alias = match &column.alias {
            Some(alias) => Some(alias.clone()),
            None if self.dialect.force_alias() => Some(
                derive_alias(&column.expr)
                    .ok_or_else(|| FormatError::MissingAlias(rendered.clone()))?,
            ),
            None => None,
        };
        match alias {
            Some(alias) => Ok(format!(
                "{rendered} AS {}",
                self.dialect.escape_name(&alias)
            )),
            None => Ok(rendered),
        }
    }

    fn format_table_ref(&self, table: &TableRef) -> Result<String> {
        match table {
            TableRef::Table { name, alias } => {
                let rendered = self.dialect.escape_name(name);
                Ok(match alias {
                    Some(alias) => {
                        format!("{rendered} AS {}", self.dialect.escape_name(alias))
                    }
                    None => rendered,
                })
            }
            TableRef::Subquery { query, alias } => Ok(format!(
                "({}) AS {}",
                self.format_select(query)?,
                self.dialect.escape_name(alias)
            )),
        }
    }

    /// Compiles a JSON path member into a path extraction call.
    ///
    /// The first two segments name the entity and document column; the rest
    /// form the `$.`-rooted document path.
    fn format_json_get(&self, path: &[String]) -> Result<String> {
        let [entity, column, keys @ ..] = path else {
            return Err(FormatError::InvalidMemberPath(path.join(".")));
        };
        if keys.is_empty() {
            return Err(FormatError::InvalidMemberPath(path.join(".")));
        }
        let column = self.format_column(Some(entity), column);
        let document_path = format!("$.{}", keys.join("."));
        self.dialect.json_extract(&column, &document_path)
    }

    fn format_json_object(&self, fields: &[JsonField]) -> Result<String> {
        let pairs: Result<Vec<(String, String)>> = fields
            .iter()
            .map(|field| Ok((field.alias.clone(), self.format_expr(&field.value)?)))
            .collect();
        self.dialect.json_object(&pairs?)
    }

    fn format_json_array(&self, source: &JsonArraySource) -> Result<String> {
        match source {
            // The column already holds JSON text; emit the quoted
            // reference and let the engine parse it.
            JsonArraySource::Column { table, name } => {
                Ok(self.format_column(table.as_deref(), name))
            }
            JsonArraySource::Query(query) => self.format_json_array_query(query),
            JsonArraySource::Values(values) => self.format_json_array_values(values),
        }
    }

    /// Rewrites a nested query into a scalar subquery that aggregates every
    /// row as a JSON object into one array.
    fn format_json_array_query(&self, query: &SelectStatement) -> Result<String> {
        let from = query.from.as_ref().ok_or_else(|| {
            FormatError::UnsupportedJsonShape(String::from(
                "json array over a query requires a FROM source",
            ))
        })?;
        if query.columns.is_empty() {
            return Err(FormatError::UnsupportedJsonShape(String::from(
                "json array over a query requires explicit projections",
            )));
        }

        let fields: Result<Vec<JsonField>> = query
            .columns
            .iter()
            .map(|column| {
                let alias = column
                    .alias
                    .clone()
                    .or_else(|| derive_alias(&column.expr))
                    .ok_or_else(|| {
                        FormatError::MissingAlias(format!("{:?}", column.expr))
                    })?;
                Ok(JsonField::new(alias, column.expr.clone()))
            })
            .collect();

        let mut rewritten = query.clone();
        rewritten.columns = vec![SelectColumn::aliased(
            Expr::json_group_array(Expr::json_object(fields?)),
            from.reference_name(),
        )];
        Ok(format!("({})", self.format_select(&rewritten)?))
    }

    /// Compiles an inline array of values.
    ///
    /// All-scalar arrays become a JSON array constructor call; anything
    /// holding nested arrays or documents is serialized once as a single
    /// JSON text literal.
    fn format_json_array_values(&self, values: &[Value]) -> Result<String> {
        if values.iter().all(Value::is_scalar) {
            let items: Result<Vec<String>> =
                values.iter().map(|v| self.dialect.escape_value(v)).collect();
            self.dialect.json_array(&items?)
        } else {
            let document = Value::Array(values.to_vec()).to_json();
            self.dialect
                .escape_value(&Value::Text(document.to_string()))
        }
    }
}

/// Derives an implicit projection alias where the expression names one.
fn derive_alias(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Column { name, .. } => Some(name.clone()),
        // Path extraction aliases to the column, per document projection
        // semantics: one path per document column per projection list.
        Expr::JsonGet { path } => path.get(1).cloned(),
        _ => None,
    }
}
