use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Identifier shared between services (product ids, national ids, user ids).
///
/// The downstream services are not consistent about whether an id travels as
/// a JSON string or a JSON number. The original representation is kept so it
/// can be forwarded verbatim, while equality and hashing use the normalized
/// string form: `12345678` and `"12345678"` are the same identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(serde_json::Number),
    Text(String),
}

impl Identifier {
    /// Returns the normalized string form used for comparisons.
    pub fn as_key(&self) -> String {
        match self {
            Identifier::Number(n) => n.to_string(),
            Identifier::Text(s) => s.clone(),
        }
    }

    /// Returns true if the identifier carries no usable value.
    pub fn is_blank(&self) -> bool {
        match self {
            Identifier::Number(_) => false,
            Identifier::Text(s) => s.trim().is_empty(),
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{n}"),
            Identifier::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier::Text(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::Text(s)
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Identifier::Number(n.into())
    }
}
