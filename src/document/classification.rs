use std::fmt;

use serde::{Deserialize, Serialize};

/// Document type as decided by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentClassification {
    Handwritten,
    Printed,
    /// The classifier produced no confident prediction.
    Unknown,
}

impl DocumentClassification {
    /// Maps the classifier's class index, `0` handwritten and `1` printed.
    #[must_use]
    pub fn from_class_id(id: usize) -> Self {
        match id {
            0 => Self::Handwritten,
            1 => Self::Printed,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handwritten => "handwritten",
            Self::Printed => "printed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
