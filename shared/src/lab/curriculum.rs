//! Lesson catalogue.
//!
//! The bundled curriculum is a JSON document compiled into the binary. Each
//! dialect has an ordered list of lessons; exercise lessons name the data
//! source they run against and the [`Check`] their results must satisfy.

use super::check::Check;
use crate::models::{DataSource, Dialect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const BUILTIN: &str = include_str!("../../data/curriculum.json");

/// Errors that can occur when loading or looking up lessons.
#[derive(Debug, Error)]
pub enum CurriculumError {
    /// The curriculum document is not valid JSON for this schema.
    #[error("Invalid curriculum document: {0}")]
    Json(#[from] serde_json::Error),

    /// An exercise lesson lacks a required part.
    #[error("{dialect} lesson {index} is an exercise but has no {missing}")]
    Incomplete {
        /// Dialect of the lesson.
        dialect: Dialect,
        /// Zero-based lesson index.
        index: usize,
        /// The missing part.
        missing: &'static str,
    },

    /// No lesson at this index.
    #[error("No {dialect} lesson at index {index}")]
    UnknownLesson {
        /// Requested dialect.
        dialect: Dialect,
        /// Requested index.
        index: usize,
    },

    /// The lesson exists but has nothing to attempt.
    #[error("{dialect} lesson {index} has no exercise")]
    NoExercise {
        /// Requested dialect.
        dialect: Dialect,
        /// Requested index.
        index: usize,
    },
}

/// Kind of lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    /// Reading only.
    Theory,
    /// Exercise with a starter query.
    Guided,
    /// Exercise without scaffolding.
    Practical,
    /// Open-ended exercise.
    Challenge,
}

impl LessonKind {
    /// Returns true for kinds that carry an exercise.
    #[must_use]
    pub fn is_exercise(self) -> bool {
        !matches!(self, Self::Theory)
    }
}

impl std::fmt::Display for LessonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Theory => write!(f, "theory"),
            Self::Guided => write!(f, "guided"),
            Self::Practical => write!(f, "practical"),
            Self::Challenge => write!(f, "challenge"),
        }
    }
}

/// A worked example shown with a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// What the example demonstrates.
    pub description: String,
    /// The example query.
    pub query: String,
}

/// One lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson kind.
    pub kind: LessonKind,
    /// Title.
    pub title: String,
    /// One-line description.
    pub description: String,
    /// Theory paragraphs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub theory: Vec<String>,
    /// Worked examples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    /// The task statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Dataset the exercise runs against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    /// Pre-filled query text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starter_query: Option<String>,
    /// Hint shown on request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// What a passing result looks like.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<Check>,
}

/// The runnable part of an exercise lesson.
#[derive(Debug, Clone, Copy)]
pub struct Exercise<'a> {
    /// The lesson itself.
    pub lesson: &'a Lesson,
    /// Dataset to run attempts against.
    pub data_source: DataSource,
    /// Check applied to attempt results.
    pub check: &'a Check,
}

/// Lessons for every dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curriculum {
    lessons: BTreeMap<Dialect, Vec<Lesson>>,
}

impl Curriculum {
    /// Loads the curriculum bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled document is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use shared::lab::Curriculum;
    /// use shared::models::Dialect;
    ///
    /// let curriculum = Curriculum::builtin().unwrap();
    /// assert!(curriculum.len(Dialect::Sql) > 0);
    /// ```
    pub fn builtin() -> Result<Self, CurriculumError> {
        Self::from_json(BUILTIN)
    }

    /// Parses and validates a curriculum document.
    ///
    /// # Errors
    ///
    /// Returns [`CurriculumError::Json`] for malformed input and
    /// [`CurriculumError::Incomplete`] when an exercise lesson lacks a task,
    /// a data source or a check.
    pub fn from_json(json: &str) -> Result<Self, CurriculumError> {
        let curriculum: Self = serde_json::from_str(json)?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    /// Checks that every exercise lesson is runnable.
    ///
    /// # Errors
    ///
    /// Returns [`CurriculumError::Incomplete`] naming the first problem found.
    pub fn validate(&self) -> Result<(), CurriculumError> {
        for (&dialect, lessons) in &self.lessons {
            for (index, lesson) in lessons.iter().enumerate() {
                if !lesson.kind.is_exercise() {
                    continue;
                }
                let missing = if lesson.task.is_none() {
                    "task"
                } else if lesson.data_source.is_none() {
                    "data source"
                } else if lesson.check.is_none() {
                    "check"
                } else {
                    continue;
                };
                return Err(CurriculumError::Incomplete {
                    dialect,
                    index,
                    missing,
                });
            }
        }
        Ok(())
    }

    /// Lessons for a dialect, in order.
    #[must_use]
    pub fn lessons(&self, dialect: Dialect) -> &[Lesson] {
        self.lessons.get(&dialect).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of lessons for a dialect.
    #[must_use]
    pub fn len(&self, dialect: Dialect) -> usize {
        self.lessons(dialect).len()
    }

    /// Returns true if no dialect has any lessons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lessons.values().all(Vec::is_empty)
    }

    /// Looks up one lesson.
    ///
    /// # Errors
    ///
    /// Returns [`CurriculumError::UnknownLesson`] if the index is out of range.
    pub fn lesson(&self, dialect: Dialect, index: usize) -> Result<&Lesson, CurriculumError> {
        self.lessons(dialect)
            .get(index)
            .ok_or(CurriculumError::UnknownLesson { dialect, index })
    }

    /// Looks up the exercise of a lesson.
    ///
    /// # Errors
    ///
    /// Returns [`CurriculumError::UnknownLesson`] if the index is out of range
    /// and [`CurriculumError::NoExercise`] for a theory lesson.
    pub fn exercise(&self, dialect: Dialect, index: usize) -> Result<Exercise<'_>, CurriculumError> {
        let lesson = self.lesson(dialect, index)?;
        match (&lesson.data_source, &lesson.check) {
            (Some(data_source), Some(check)) if lesson.kind.is_exercise() => Ok(Exercise {
                lesson,
                data_source: *data_source,
                check,
            }),
            _ => Err(CurriculumError::NoExercise { dialect, index }),
        }
    }
}
