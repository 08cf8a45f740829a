use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned post identifier.
///
/// Treated as opaque: resources may hand out numbers or strings, both are kept
/// as text and echoed back verbatim in `DELETE <base>/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawPostId", into = "String")]
pub struct PostId(String);

impl PostId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PostId> for String {
    fn from(value: PostId) -> Self {
        value.0
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPostId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawPostId> for PostId {
    fn from(value: RawPostId) -> Self {
        match value {
            RawPostId::Number(n) => Self(n.to_string()),
            RawPostId::Text(s) => Self(s),
        }
    }
}
