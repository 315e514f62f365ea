use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} `{raw}`")]
pub struct ParseEnumError {
    kind: &'static str,
    raw: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

/// Lowercases and strips separators so "Almost Done", "almost-done" and
/// "almost_done" all compare equal.
pub(crate) fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Kind of coursework. Used for display grouping only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Homework,
    Quiz,
    Test,
    Exam,
    Summative,
    Formative,
    Project,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Homework,
        Category::Quiz,
        Category::Test,
        Category::Exam,
        Category::Summative,
        Category::Formative,
        Category::Project,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Homework => "Homework",
            Category::Quiz => "Quiz",
            Category::Test => "Test",
            Category::Exam => "Exam",
            Category::Summative => "Summative",
            Category::Formative => "Formative",
            Category::Project => "Project",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Category::ALL
            .into_iter()
            .find(|candidate| normalize_label(candidate.label()) == wanted)
            .ok_or_else(|| ParseEnumError::new("category", s))
    }
}
