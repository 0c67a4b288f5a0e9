use std::fmt::{Display, Formatter};

/// The statement could not even be prepared: rewriting or binding
/// resolution failed before anything reached a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// A `:`-led token failed validation. Carries the original SQL, the
    /// offending fragment, and its byte offset in the original text.
    MalformedParameterName {
        sql: String,
        fragment: String,
        offset: usize,
    },
    /// A named parameter referenced by the statement has no bound value.
    UnboundParameter { name: String },
}

impl PrepareError {
    pub(crate) fn malformed(sql: &str, offset: usize) -> Self {
        Self::MalformedParameterName {
            sql: sql.to_string(),
            fragment: offending_fragment(sql, offset),
            offset,
        }
    }
}

// The fragment shown to callers runs from the bad token to the next
// whitespace, capped so a pathological statement stays readable.
fn offending_fragment(sql: &str, offset: usize) -> String {
    sql[offset..]
        .chars()
        .take_while(|ch| !ch.is_whitespace())
        .take(32)
        .collect()
}

impl Display for PrepareError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedParameterName {
                sql,
                fragment,
                offset,
            } => write!(
                f,
                "malformed named parameter '{fragment}' at byte {offset} of statement: {sql}"
            ),
            Self::UnboundParameter { name } => {
                write!(f, "no value bound for named parameter '{name}'")
            }
        }
    }
}

impl std::error::Error for PrepareError {}

/// Failure of a prepared statement at execution time, distinguishable from
/// [`PrepareError`] so callers can report "could not be prepared" and "the
/// database rejected it" separately.
#[derive(Debug)]
pub enum ExecuteError {
    Prepare(PrepareError),
    Backend { message: String },
    Mapping { message: String },
    HandleClosed,
}

impl ExecuteError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
        }
    }
}

impl From<PrepareError> for ExecuteError {
    fn from(error: PrepareError) -> Self {
        Self::Prepare(error)
    }
}

impl Display for ExecuteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prepare(error) => write!(f, "statement could not be prepared: {error}"),
            Self::Backend { message } => write!(f, "statement execution failed: {message}"),
            Self::Mapping { message } => write!(f, "row mapping failed: {message}"),
            Self::HandleClosed => write!(f, "handle is closed"),
        }
    }
}

impl std::error::Error for ExecuteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Prepare(error) => Some(error),
            _ => None,
        }
    }
}
