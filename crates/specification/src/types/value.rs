//! Scalar values used by criteria and ordering keys.
//!
//! Field values are read out of an entity's JSON document. The rules here
//! mirror what SQLite's `json_extract` produces, which is what lets the
//! in-memory evaluator return exactly what the SQLite evaluator returns:
//!
//! | JSON | Scalar |
//! |------|--------|
//! | missing path, `null` | `Null` |
//! | `true` / `false` | `Integer(1)` / `Integer(0)` |
//! | integer | `Integer` (`Real` if it does not fit in `i64`) |
//! | float | `Real` |
//! | string | `Text` |
//! | array, object | `Text` holding the compact JSON |

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single comparable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// SQL NULL.
    Null,
    /// Boolean; stored and compared as the integer 1 or 0.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Real(f64),
    /// UTF-8 text.
    Text(String),
}

/// Storage class rank: NULL < numeric < text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Null,
    Numeric,
    Text,
}

impl ScalarValue {
    /// Reads a JSON value the way `json_extract` does.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ScalarValue::Null,
            Value::Bool(b) => ScalarValue::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ScalarValue::Integer(i),
                None => ScalarValue::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ScalarValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => ScalarValue::Text(value.to_string()),
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Returns the text content, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Booleans collapse to integers and NaN to `Null`, matching how SQLite
    /// binds them as parameters.
    pub(crate) fn normalized(&self) -> ScalarValue {
        match self {
            ScalarValue::Bool(b) => ScalarValue::Integer(i64::from(*b)),
            ScalarValue::Real(r) if r.is_nan() => ScalarValue::Null,
            other => other.clone(),
        }
    }

    fn class(&self) -> Class {
        match self {
            ScalarValue::Null => Class::Null,
            ScalarValue::Bool(_) | ScalarValue::Integer(_) | ScalarValue::Real(_) => {
                Class::Numeric
            }
            ScalarValue::Text(_) => Class::Text,
        }
    }

    /// Comparison as performed in a SQL `WHERE` clause.
    ///
    /// Returns `None` when either side is `Null`: the comparison is unknown
    /// and the row does not match, whatever the operator.
    pub fn sql_cmp(&self, other: &ScalarValue) -> Option<Ordering> {
        if self.normalized().is_null() || other.normalized().is_null() {
            return None;
        }
        Some(self.sort_cmp(other))
    }

    /// Total order as used by SQL `ORDER BY` (NULL sorts first).
    pub fn sort_cmp(&self, other: &ScalarValue) -> Ordering {
        let (left, right) = (self.normalized(), other.normalized());
        match left.class().cmp(&right.class()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match (&left, &right) {
            (ScalarValue::Null, ScalarValue::Null) => Ordering::Equal,
            (ScalarValue::Integer(a), ScalarValue::Integer(b)) => a.cmp(b),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => a.as_bytes().cmp(b.as_bytes()),
            (ScalarValue::Real(a), ScalarValue::Real(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (ScalarValue::Integer(i), ScalarValue::Real(r)) => int_real_cmp(*i, *r),
            (ScalarValue::Real(r), ScalarValue::Integer(i)) => int_real_cmp(*i, *r).reverse(),
            _ => Ordering::Equal,
        }
    }
}

/// Compares an integer with a real exactly, without rounding the integer
/// through `f64`.
///
/// Reals outside the `i64` range order beyond every integer. Otherwise the
/// integer is compared with the truncated real, and on a tie the sign of the
/// real's fractional part decides. `-0.0` and `0.0` are both equal to `0`.
fn int_real_cmp(i: i64, r: f64) -> Ordering {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if r < -I64_BOUND {
        return Ordering::Greater;
    }
    if r >= I64_BOUND {
        return Ordering::Less;
    }
    match i.cmp(&(r.trunc() as i64)) {
        Ordering::Equal => 0.0f64.partial_cmp(&r.fract()).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Real(r) => write!(f, "{}", r),
            ScalarValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Integer(n)
    }
}

impl From<i32> for ScalarValue {
    fn from(n: i32) -> Self {
        ScalarValue::Integer(i64::from(n))
    }
}

impl From<u32> for ScalarValue {
    fn from(n: u32) -> Self {
        ScalarValue::Integer(i64::from(n))
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Real(n)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}
