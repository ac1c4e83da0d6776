//! Filter predicates.
//!
//! A [`Criterion`] is one predicate over an entity. Every criterion of a
//! Specification must hold for an entity to match; there is no OR or NOT at
//! this layer.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::types::{FieldPath, ScalarValue};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Returns the SQL operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A predicate evaluated directly against the entity.
pub type PredicateFn<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// One filter predicate.
///
/// All variants except [`Criterion::Custom`] are plain data and can be
/// translated into a persisted store's query language. `Custom` only runs in
/// memory.
pub enum Criterion<E> {
    /// `field <op> value`.
    Compare {
        /// Field being compared.
        field: FieldPath,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand side.
        value: ScalarValue,
    },
    /// `field IN (values...)`. An empty list matches nothing.
    In {
        /// Field being tested.
        field: FieldPath,
        /// Accepted values.
        values: Vec<ScalarValue>,
    },
    /// The field is missing or JSON `null`.
    IsNull {
        /// Field being tested.
        field: FieldPath,
    },
    /// The field is present and not JSON `null`.
    IsNotNull {
        /// Field being tested.
        field: FieldPath,
    },
    /// The field is text containing `needle` (case-sensitive).
    Contains {
        /// Field being tested.
        field: FieldPath,
        /// Substring to look for.
        needle: String,
    },
    /// The field is text beginning with `prefix` (case-sensitive).
    StartsWith {
        /// Field being tested.
        field: FieldPath,
        /// Required prefix.
        prefix: String,
    },
    /// An arbitrary predicate, identified by `label` in diagnostics.
    Custom {
        /// Human-readable name for errors and logs.
        label: String,
        /// The predicate.
        predicate: PredicateFn<E>,
    },
}

impl<E> Criterion<E> {
    /// Creates a comparison criterion.
    pub fn compare(
        field: impl Into<FieldPath>,
        op: CompareOp,
        value: impl Into<ScalarValue>,
    ) -> Self {
        Criterion::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<FieldPath>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<FieldPath>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    /// `field < value`
    pub fn lt(field: impl Into<FieldPath>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    /// `field <= value`
    pub fn le(field: impl Into<FieldPath>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(field, CompareOp::Le, value)
    }

    /// `field > value`
    pub fn gt(field: impl Into<FieldPath>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    /// `field >= value`
    pub fn ge(field: impl Into<FieldPath>, value: impl Into<ScalarValue>) -> Self {
        Self::compare(field, CompareOp::Ge, value)
    }

    /// `field IN (values...)`
    pub fn one_of<V, I>(field: impl Into<FieldPath>, values: I) -> Self
    where
        V: Into<ScalarValue>,
        I: IntoIterator<Item = V>,
    {
        Criterion::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The field is missing or null.
    pub fn is_null(field: impl Into<FieldPath>) -> Self {
        Criterion::IsNull {
            field: field.into(),
        }
    }

    /// The field is present and not null.
    pub fn is_not_null(field: impl Into<FieldPath>) -> Self {
        Criterion::IsNotNull {
            field: field.into(),
        }
    }

    /// The field is text containing `needle`.
    pub fn contains(field: impl Into<FieldPath>, needle: impl Into<String>) -> Self {
        Criterion::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// The field is text starting with `prefix`.
    pub fn starts_with(field: impl Into<FieldPath>, prefix: impl Into<String>) -> Self {
        Criterion::StartsWith {
            field: field.into(),
            prefix: prefix.into(),
        }
    }

    /// An arbitrary predicate. Only the in-memory evaluator can run it.
    pub fn custom<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Criterion::Custom {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Returns the field this criterion reads, if it reads one.
    pub fn field(&self) -> Option<&FieldPath> {
        match self {
            Criterion::Compare { field, .. }
            | Criterion::In { field, .. }
            | Criterion::IsNull { field }
            | Criterion::IsNotNull { field }
            | Criterion::Contains { field, .. }
            | Criterion::StartsWith { field, .. } => Some(field),
            Criterion::Custom { .. } => None,
        }
    }

    /// Tests the criterion against an entity and its JSON document.
    pub fn matches(&self, entity: &E, document: &Value) -> bool {
        match self {
            Criterion::Compare { field, op, value } => field
                .extract(document)
                .sql_cmp(value)
                .is_some_and(|ordering| op.accepts(ordering)),
            Criterion::In { field, values } => {
                let actual = field.extract(document);
                values
                    .iter()
                    .any(|candidate| actual.sql_cmp(candidate) == Some(Ordering::Equal))
            }
            Criterion::IsNull { field } => field.extract(document).is_null(),
            Criterion::IsNotNull { field } => !field.extract(document).is_null(),
            Criterion::Contains { field, needle } => {
                field.is_text(document)
                    && field
                        .extract(document)
                        .as_text()
                        .is_some_and(|text| text.contains(needle.as_str()))
            }
            Criterion::StartsWith { field, prefix } => {
                field.is_text(document)
                    && field
                        .extract(document)
                        .as_text()
                        .is_some_and(|text| text.starts_with(prefix.as_str()))
            }
            Criterion::Custom { predicate, .. } => predicate(entity),
        }
    }
}

impl<E> Clone for Criterion<E> {
    fn clone(&self) -> Self {
        match self {
            Criterion::Compare { field, op, value } => Criterion::Compare {
                field: field.clone(),
                op: *op,
                value: value.clone(),
            },
            Criterion::In { field, values } => Criterion::In {
                field: field.clone(),
                values: values.clone(),
            },
            Criterion::IsNull { field } => Criterion::IsNull {
                field: field.clone(),
            },
            Criterion::IsNotNull { field } => Criterion::IsNotNull {
                field: field.clone(),
            },
            Criterion::Contains { field, needle } => Criterion::Contains {
                field: field.clone(),
                needle: needle.clone(),
            },
            Criterion::StartsWith { field, prefix } => Criterion::StartsWith {
                field: field.clone(),
                prefix: prefix.clone(),
            },
            Criterion::Custom { label, predicate } => Criterion::Custom {
                label: label.clone(),
                predicate: Arc::clone(predicate),
            },
        }
    }
}

impl<E> fmt::Display for Criterion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Compare { field, op, value } => write!(f, "{} {} {}", field, op, value),
            Criterion::In { field, values } => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} IN ({})", field, rendered.join(", "))
            }
            Criterion::IsNull { field } => write!(f, "{} IS NULL", field),
            Criterion::IsNotNull { field } => write!(f, "{} IS NOT NULL", field),
            Criterion::Contains { field, needle } => write!(f, "{} CONTAINS '{}'", field, needle),
            Criterion::StartsWith { field, prefix } => {
                write!(f, "{} STARTS WITH '{}'", field, prefix)
            }
            Criterion::Custom { label, .. } => write!(f, "custom criterion '{}'", label),
        }
    }
}

impl<E> fmt::Debug for Criterion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Criterion({})", self)
    }
}
