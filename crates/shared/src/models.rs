use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SalaryError;

/// Salary of a vacancy as advertised by a job board.
///
/// Boards disagree about how to express this: HeadHunter sends an object
/// with optional `from`/`to` bounds, SuperJob sends bare numbers with `0`
/// meaning unset, and older saved files contain `null`, numbers, `"MIN-MAX"`
/// strings or free-text placeholders. All of those collapse into one of
/// three tags here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Salary {
    Unspecified,
    Exact(i64),
    Range { min: i64, max: i64 },
}

impl Salary {
    /// The single numeric view used for filtering and comparison:
    /// the amount for `Exact`, the midpoint for `Range`.
    pub fn comparable(&self) -> Option<f64> {
        match self {
            Salary::Unspecified => None,
            Salary::Exact(amount) => Some(*amount as f64),
            Salary::Range { min, max } => Some((*min as f64 + *max as f64) / 2.0),
        }
    }

    fn parse_range(text: &str) -> Option<Self> {
        let (min, max) = text.split_once('-')?;
        let min = min.trim().parse().ok()?;
        let max = max.trim().parse().ok()?;
        Some(Salary::Range { min, max })
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Salary::Unspecified => write!(f, "not specified"),
            Salary::Exact(amount) => write!(f, "{}", amount),
            Salary::Range { min, max } => write!(f, "{}-{}", min, max),
        }
    }
}

// On the wire: `Unspecified` is `null`, `Exact` a bare number, `Range` the
// string "MIN-MAX". Matches what the saved-vacancies file has always held.
impl Serialize for Salary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Salary::Unspecified => serializer.serialize_none(),
            Salary::Exact(amount) => serializer.serialize_i64(*amount),
            Salary::Range { min, max } => serializer.serialize_str(&format!("{}-{}", min, max)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SalaryRepr {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Salary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<SalaryRepr>::deserialize(deserializer)? {
            None => Salary::Unspecified,
            Some(SalaryRepr::Number(amount)) => Salary::Exact(amount),
            // Strings that are not a MIN-MAX range are legacy placeholders
            // ("Зарплата не указана", "not specified", ...)
            Some(SalaryRepr::Text(text)) => {
                Salary::parse_range(&text).unwrap_or(Salary::Unspecified)
            }
        })
    }
}

/// A single job posting. `link` uniquely identifies it within the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    pub title: String,
    pub link: String,
    pub salary: Salary,
    pub description: String,
}

impl Vacancy {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        salary: Salary,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            salary,
            description: description.into(),
        }
    }

    /// Compare two vacancies by salary and describe the outcome.
    ///
    /// Fails with `SalaryError::Unspecified` when either side has no
    /// numeric salary to compare.
    pub fn compare_by_salary(&self, other: &Vacancy) -> Result<String, SalaryError> {
        let own = self.salary.comparable().ok_or(SalaryError::Unspecified)?;
        let theirs = other.salary.comparable().ok_or(SalaryError::Unspecified)?;

        let relation = if own > theirs {
            "pays more than"
        } else if own < theirs {
            "pays less than"
        } else {
            "pays the same as"
        };

        Ok(format!(
            "{} at {:.2} {} {} at {:.2}",
            self.title, own, relation, other.title, theirs
        ))
    }
}

/// Inclusive salary bounds parsed from user input of the form "MIN-MAX".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    min: i64,
    max: i64,
}

impl SalaryRange {
    pub fn parse(input: &str) -> Result<Self, SalaryError> {
        let invalid = || SalaryError::InvalidRange(input.to_string());
        let (min, max) = input.split_once('-').ok_or_else(invalid)?;
        let min = min.trim().parse().map_err(|_| invalid())?;
        let max = max.trim().parse().map_err(|_| invalid())?;
        Ok(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min as f64 && value <= self.max as f64
    }
}

/// Filter over the saved-vacancy list. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub salary: Option<SalaryRange>,
    pub description: Option<String>,
}
