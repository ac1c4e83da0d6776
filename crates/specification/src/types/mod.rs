//! Core value types shared by specifications, evaluators and repositories.

pub mod field;
pub mod pagination;
pub mod value;

pub use field::{FieldPath, PathSegment};
pub use pagination::{PageMetadata, PagedResult};
pub use value::ScalarValue;
