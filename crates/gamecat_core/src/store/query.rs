//! Fetch request description and SQL rendering.
//!
//! # Invariants
//! - Column names are checked against `Entity::COLUMNS` before they reach SQL.
//! - Values are always bound as parameters, never interpolated.
//! - Without explicit sort descriptors results are ordered by the key column.

use super::entity::Entity;
use rusqlite::types::Value;

/// Comparison used by one predicate condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    IsNull,
    IsNotNull,
}

impl Comparison {
    fn sql_operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    fn takes_value(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    column: String,
    comparison: Comparison,
    value: Value,
}

/// Conjunction of column conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        column: impl Into<String>,
        comparison: Comparison,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition {
            column: column.into(),
            comparison,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Eq, value)
    }

    pub fn not_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::NotEq, value)
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Lt, value)
    }

    pub fn le(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Le, value)
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Gt, value)
    }

    pub fn ge(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Comparison::Ge, value)
    }

    pub fn like(self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.with(column, Comparison::Like, Value::Text(pattern.into()))
    }

    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.with(column, Comparison::IsNull, Value::Null)
    }

    pub fn is_not_null(self, column: impl Into<String>) -> Self {
        self.with(column, Comparison::IsNotNull, Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub column: String,
    pub ascending: bool,
}

impl SortDescriptor {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Query options for `Store::fetch_all` and `Store::fetch_first`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRequest {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub predicate: Option<Predicate>,
    pub sort: Vec<SortDescriptor>,
}

impl FetchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn sort_by(mut self, descriptor: SortDescriptor) -> Self {
        self.sort.push(descriptor);
        self
    }
}

/// Rendered statement plus its bind values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: String,
    pub binds: Vec<Value>,
}

pub(crate) fn select_statement<E: Entity>(request: &FetchRequest) -> Result<Statement, String> {
    let mut statement = Statement {
        sql: format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::ENTITY_NAME),
        binds: Vec::new(),
    };
    push_where::<E>(&mut statement, request.predicate.as_ref())?;

    statement.sql.push_str(" ORDER BY ");
    if request.sort.is_empty() {
        statement.sql.push_str(E::KEY_COLUMN);
        statement.sql.push_str(" ASC");
    } else {
        let mut terms = Vec::with_capacity(request.sort.len());
        for descriptor in &request.sort {
            ensure_column::<E>(descriptor.column.as_str())?;
            let direction = if descriptor.ascending { "ASC" } else { "DESC" };
            terms.push(format!("{} {direction}", descriptor.column));
        }
        statement.sql.push_str(&terms.join(", "));
    }

    match (request.limit, request.offset) {
        (Some(limit), offset) => {
            statement.sql.push_str(" LIMIT ? OFFSET ?");
            statement.binds.push(Value::Integer(i64::from(limit)));
            statement
                .binds
                .push(Value::Integer(i64::from(offset.unwrap_or(0))));
        }
        (None, Some(offset)) if offset > 0 => {
            statement.sql.push_str(" LIMIT -1 OFFSET ?");
            statement.binds.push(Value::Integer(i64::from(offset)));
        }
        (None, _) => {}
    }

    Ok(statement)
}

pub(crate) fn count_statement<E: Entity>(predicate: Option<&Predicate>) -> Result<Statement, String> {
    let mut statement = Statement {
        sql: format!("SELECT COUNT(*) FROM {}", E::ENTITY_NAME),
        binds: Vec::new(),
    };
    push_where::<E>(&mut statement, predicate)?;
    Ok(statement)
}

pub(crate) fn upsert_sql<E: Entity>() -> String {
    let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
    let updates: Vec<String> = E::COLUMNS
        .iter()
        .filter(|column| **column != E::KEY_COLUMN)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect();
    let conflict_action = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders}) ON CONFLICT({}) {conflict_action}",
        E::ENTITY_NAME,
        E::COLUMNS.join(", "),
        E::KEY_COLUMN,
    )
}

pub(crate) fn delete_sql<E: Entity>() -> String {
    format!("DELETE FROM {} WHERE {} = ?1", E::ENTITY_NAME, E::KEY_COLUMN)
}

fn push_where<E: Entity>(statement: &mut Statement, predicate: Option<&Predicate>) -> Result<(), String> {
    let Some(predicate) = predicate.filter(|predicate| !predicate.is_empty()) else {
        return Ok(());
    };

    let mut clauses = Vec::with_capacity(predicate.conditions.len());
    for condition in &predicate.conditions {
        ensure_column::<E>(condition.column.as_str())?;
        let operator = condition.comparison.sql_operator();
        if condition.comparison.takes_value() {
            clauses.push(format!("{} {operator} ?", condition.column));
            statement.binds.push(condition.value.clone());
        } else {
            clauses.push(format!("{} {operator}", condition.column));
        }
    }
    statement.sql.push_str(" WHERE ");
    statement.sql.push_str(&clauses.join(" AND "));
    Ok(())
}

fn ensure_column<E: Entity>(column: &str) -> Result<(), String> {
    if E::has_column(column) {
        Ok(())
    } else {
        Err(format!(
            "unknown column `{column}` for entity `{}`",
            E::ENTITY_NAME
        ))
    }
}
