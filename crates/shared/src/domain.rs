use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ElementId);

/// Kind of interactive element. Only `Question` collects free text; every
/// other kind is tallied against the element's option list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Question,
    Poll,
    Vote,
    Quiz,
    Rating,
    Other(String),
}

impl ElementKind {
    pub fn as_str(&self) -> &str {
        match self {
            ElementKind::Question => "question",
            ElementKind::Poll => "poll",
            ElementKind::Vote => "vote",
            ElementKind::Quiz => "quiz",
            ElementKind::Rating => "rating",
            ElementKind::Other(raw) => raw,
        }
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self, ElementKind::Question)
    }
}

impl From<String> for ElementKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "question" => ElementKind::Question,
            "poll" => ElementKind::Poll,
            "vote" => ElementKind::Vote,
            "quiz" => ElementKind::Quiz,
            "rating" => ElementKind::Rating,
            _ => ElementKind::Other(raw),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(raw: &str) -> Self {
        ElementKind::from(raw.to_string())
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub title: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One audience submission. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSlide {
    pub current_slide: String,
    pub timestamp: DateTime<Utc>,
}

impl Default for CurrentSlide {
    fn default() -> Self {
        Self {
            current_slide: String::new(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}
