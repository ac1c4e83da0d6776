//! Translates Specifications into SQLite statements.
//!
//! Entity documents live in `entities.data` as JSON text and every field
//! access goes through `json_extract`, whose null and type rules the
//! in-memory evaluator mirrors. JSON paths and values are always bound as
//! parameters, never spliced into the SQL text.

use rusqlite::ToSql;

use crate::core::Entity;
use crate::error::{EvaluationError, StorageResult};
use crate::specification::{Criterion, OrderKey, PagingWindow, Specification};
use crate::types::{FieldPath, ScalarValue};

const BACKEND_NAME: &str = "sqlite";

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL text with `?N` placeholders.
    pub sql: String,
    /// Bound parameter values, in placeholder order.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text parameter.
    Text(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Real(f64),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a text parameter.
    pub fn text(s: impl Into<String>) -> Self {
        SqlParam::Text(s.into())
    }

    /// Returns a rusqlite-compatible reference.
    pub fn as_sql(&self) -> &dyn ToSql {
        match self {
            SqlParam::Text(s) => s,
            SqlParam::Integer(i) => i,
            SqlParam::Real(f) => f,
            SqlParam::Null => &rusqlite::types::Null,
        }
    }
}

impl From<&ScalarValue> for SqlParam {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::Null => SqlParam::Null,
            ScalarValue::Bool(b) => SqlParam::Integer(i64::from(*b)),
            ScalarValue::Integer(i) => SqlParam::Integer(*i),
            ScalarValue::Real(f) => SqlParam::Real(*f),
            ScalarValue::Text(s) => SqlParam::Text(s.clone()),
        }
    }
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter and returns its placeholder.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    /// Returns the parameters as rusqlite references.
    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(SqlParam::as_sql).collect()
    }
}

/// Builds `SELECT` and `COUNT` statements for one entity type.
///
/// Output rows of [`select`](Self::select) are `(id, data, include_0, ...)`
/// with one trailing column per included relation, in the order returned
/// alongside the fragment.
pub struct SqlTranslator<E> {
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: Entity> SqlTranslator<E> {
    /// Creates a translator for `E`.
    pub fn new() -> Self {
        Self {
            _entity: std::marker::PhantomData,
        }
    }

    /// Translates the full pipeline.
    ///
    /// `window` is `None` for criteria-only evaluation, in which case
    /// includes and orderings are ignored and rows come back in id order.
    pub fn select<P>(
        &self,
        spec: &Specification<E, P>,
        window: Option<PagingWindow>,
    ) -> StorageResult<(SqlFragment, Vec<String>)> {
        let mut fragment = SqlFragment::default();
        let collection = fragment.add_param(SqlParam::text(E::COLLECTION));

        let mut columns = vec!["e.id".to_string(), "e.data".to_string()];
        let mut included = Vec::new();
        if window.is_some() {
            for relation in spec.includes() {
                if !E::is_relation(relation) {
                    return Err(unsupported(format!(
                        "include of undeclared relation '{}'",
                        relation
                    )));
                }
                let placeholder = fragment.add_param(SqlParam::text(relation.as_str()));
                columns.push(format!(
                    "(SELECT r.data FROM entity_relations r \
                     WHERE r.collection = e.collection AND r.entity_id = e.id AND r.relation = {})",
                    placeholder
                ));
                included.push(relation.clone());
            }
        }

        let mut sql = format!(
            "SELECT {} FROM entities e WHERE e.collection = {}",
            columns.join(", "),
            collection
        );
        for criterion in spec.criteria() {
            let condition = self.criterion(&mut fragment, criterion)?;
            sql.push_str(" AND (");
            sql.push_str(&condition);
            sql.push(')');
        }

        let mut order_terms = Vec::new();
        if window.is_some() {
            for order in spec.orderings() {
                let path = match &order.key {
                    OrderKey::Field(path) => path,
                    OrderKey::Computed { .. } => {
                        return Err(unsupported(format!("ordering by {}", order.key)));
                    }
                };
                let expr = self.field(&mut fragment, path)?;
                order_terms.push(format!("{} {}", expr, order.direction.as_sql()));
            }
        }
        order_terms.push("e.id ASC".to_string());
        sql.push_str(" ORDER BY ");
        sql.push_str(&order_terms.join(", "));

        if let Some(window) = window {
            match (window.take, window.skip) {
                (Some(take), skip) => {
                    let limit = fragment.add_param(SqlParam::Integer(clamp(take)));
                    let offset = fragment.add_param(SqlParam::Integer(clamp(skip)));
                    sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
                }
                (None, 0) => {}
                (None, skip) => {
                    let offset = fragment.add_param(SqlParam::Integer(clamp(skip)));
                    sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset));
                }
            }
        }

        fragment.sql = sql;
        Ok((fragment, included))
    }

    /// Translates the criteria into a `COUNT(*)` statement.
    pub fn count<P>(&self, spec: &Specification<E, P>) -> StorageResult<SqlFragment> {
        let mut fragment = SqlFragment::default();
        let collection = fragment.add_param(SqlParam::text(E::COLLECTION));
        let mut sql = format!(
            "SELECT COUNT(*) FROM entities e WHERE e.collection = {}",
            collection
        );
        for criterion in spec.criteria() {
            let condition = self.criterion(&mut fragment, criterion)?;
            sql.push_str(" AND (");
            sql.push_str(&condition);
            sql.push(')');
        }
        fragment.sql = sql;
        Ok(fragment)
    }

    fn criterion(&self, fragment: &mut SqlFragment, criterion: &Criterion<E>) -> StorageResult<String> {
        let condition = match criterion {
            Criterion::Compare { field, op, value } => {
                let expr = self.field(fragment, field)?;
                let value = fragment.add_param(SqlParam::from(value));
                format!("{} {} {}", expr, op.as_sql(), value)
            }
            Criterion::In { field, values } => {
                if values.is_empty() {
                    return Ok("0".to_string());
                }
                let expr = self.field(fragment, field)?;
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|value| fragment.add_param(SqlParam::from(value)))
                    .collect();
                format!("{} IN ({})", expr, placeholders.join(", "))
            }
            Criterion::IsNull { field } => format!("{} IS NULL", self.field(fragment, field)?),
            Criterion::IsNotNull { field } => {
                format!("{} IS NOT NULL", self.field(fragment, field)?)
            }
            Criterion::Contains { field, needle } => {
                let path = self.json_path(fragment, field)?;
                let needle = fragment.add_param(SqlParam::text(needle.as_str()));
                format!(
                    "json_type(e.data, {path}) = 'text' AND instr(json_extract(e.data, {path}), {needle}) > 0"
                )
            }
            Criterion::StartsWith { field, prefix } => {
                let path = self.json_path(fragment, field)?;
                let prefix = fragment.add_param(SqlParam::text(prefix.as_str()));
                format!(
                    "json_type(e.data, {path}) = 'text' AND instr(json_extract(e.data, {path}), {prefix}) = 1"
                )
            }
            Criterion::Custom { label, .. } => {
                return Err(unsupported(format!("custom criterion '{}'", label)));
            }
        };
        Ok(condition)
    }

    /// Binds the JSON path for a field and returns its placeholder.
    fn json_path(&self, fragment: &mut SqlFragment, path: &FieldPath) -> StorageResult<String> {
        if path.root().is_some_and(E::is_relation) {
            return Err(unsupported(format!(
                "field '{}' inside relation '{}'",
                path,
                path.root().unwrap_or_default()
            )));
        }
        let json_path = path
            .to_json_path()
            .ok_or_else(|| unsupported(format!("field path '{}'", path)))?;
        Ok(fragment.add_param(SqlParam::Text(json_path)))
    }

    fn field(&self, fragment: &mut SqlFragment, path: &FieldPath) -> StorageResult<String> {
        let placeholder = self.json_path(fragment, path)?;
        Ok(format!("json_extract(e.data, {})", placeholder))
    }
}

impl<E> std::fmt::Debug for SqlTranslator<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlTranslator").finish()
    }
}

impl<E: Entity> Default for SqlTranslator<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn unsupported(expression: String) -> crate::error::StorageError {
    EvaluationError::UnsupportedExpression {
        backend_name: BACKEND_NAME.to_string(),
        expression,
    }
    .into()
}
