//! Backend identification.

/// Identifies the kind of store an evaluator runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// SQLite database (file-based or in-memory).
    Sqlite,
    /// Plain in-process collection, used as a test double.
    InMemory,
    /// Custom or unknown backend.
    Custom(&'static str),
}

impl BackendKind {
    /// Returns true if this backend runs queries server-side.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, BackendKind::InMemory)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Sqlite => write!(f, "sqlite"),
            BackendKind::InMemory => write!(f, "in-memory"),
            BackendKind::Custom(name) => write!(f, "{}", name),
        }
    }
}
