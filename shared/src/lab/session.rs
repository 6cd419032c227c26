//! Learner session state.
//!
//! A [`Session`] is a plain value owned by whoever drives the lab (the CLI
//! practice loop, a test, a future web front-end). Nothing here is global.

use super::curriculum::{Curriculum, CurriculumError};
use crate::models::{Dialect, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur when changing or using session state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The lesson index is outside the dialect's lesson list.
    #[error("No {dialect} lesson at index {index} ({available} available)")]
    LessonOutOfRange {
        /// Current dialect.
        dialect: Dialect,
        /// Requested index.
        index: usize,
        /// Number of lessons in the dialect.
        available: usize,
    },

    /// The current lesson cannot be attempted.
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
}

/// Identifies one lesson across dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LessonKey {
    /// Dialect of the lesson.
    pub dialect: Dialect,
    /// Zero-based index in the dialect's lesson list.
    pub index: usize,
}

impl std::fmt::Display for LessonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.dialect, self.index)
    }
}

/// Result of grading one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptOutcome {
    /// The results satisfied the lesson's check.
    pub passed: bool,
    /// This attempt completed the lesson for the first time.
    pub newly_completed: bool,
}

/// Completion summary for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Completed exercise lessons.
    pub completed: usize,
    /// Exercise lessons available.
    pub total: usize,
    /// `completed / total` as a rounded percentage; 0 when there is nothing
    /// to complete.
    pub percent: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}% Complete ({}/{})",
            self.percent, self.completed, self.total
        )
    }
}

/// Current position and completion history of one learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    dialect: Dialect,
    lesson: usize,
    completed: BTreeMap<LessonKey, DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Dialect::Sql)
    }
}

impl Session {
    /// Starts a session at the first lesson of `dialect`.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            lesson: 0,
            completed: BTreeMap::new(),
        }
    }

    /// The current dialect.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The current lesson index.
    #[must_use]
    pub fn lesson_index(&self) -> usize {
        self.lesson
    }

    /// Key of the current lesson.
    #[must_use]
    pub fn current(&self) -> LessonKey {
        LessonKey {
            dialect: self.dialect,
            index: self.lesson,
        }
    }

    /// Switches dialect and returns to its first lesson. Completion history
    /// is kept.
    pub fn select_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
        self.lesson = 0;
    }

    /// Moves to a lesson of the current dialect.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LessonOutOfRange`] if the index does not exist;
    /// the session is left unchanged.
    pub fn select_lesson(&mut self, curriculum: &Curriculum, index: usize) -> Result<(), SessionError> {
        let available = curriculum.len(self.dialect);
        if index >= available {
            return Err(SessionError::LessonOutOfRange {
                dialect: self.dialect,
                index,
                available,
            });
        }
        self.lesson = index;
        Ok(())
    }

    /// Advances to the next lesson. Returns false at the last lesson.
    pub fn next_lesson(&mut self, curriculum: &Curriculum) -> bool {
        self.select_lesson(curriculum, self.lesson + 1).is_ok()
    }

    /// Goes back one lesson. Returns false at the first lesson.
    pub fn previous_lesson(&mut self) -> bool {
        match self.lesson.checked_sub(1) {
            Some(index) => {
                self.lesson = index;
                true
            }
            None => false,
        }
    }

    /// Grades results for the current lesson and records completion.
    ///
    /// A lesson is completed the first time an attempt passes; later passing
    /// attempts keep the original completion time.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Curriculum`] if the current lesson has no
    /// exercise.
    pub fn record_attempt(
        &mut self,
        curriculum: &Curriculum,
        results: &[Record],
    ) -> Result<AttemptOutcome, SessionError> {
        let exercise = curriculum.exercise(self.dialect, self.lesson)?;
        let passed = exercise.check.evaluate(results);

        let mut newly_completed = false;
        if passed {
            let key = self.current();
            if !self.completed.contains_key(&key) {
                self.completed.insert(key, Utc::now());
                newly_completed = true;
                tracing::info!(lesson = %key, "Lesson completed");
            }
        }

        Ok(AttemptOutcome {
            passed,
            newly_completed,
        })
    }

    /// Returns true if the lesson has been completed.
    #[must_use]
    pub fn is_completed(&self, key: LessonKey) -> bool {
        self.completed.contains_key(&key)
    }

    /// When the lesson was completed, if it was.
    #[must_use]
    pub fn completed_at(&self, key: LessonKey) -> Option<DateTime<Utc>> {
        self.completed.get(&key).copied()
    }

    /// Completion of the current dialect's exercise lessons.
    #[must_use]
    pub fn progress(&self, curriculum: &Curriculum) -> Progress {
        let exercises: Vec<usize> = curriculum
            .lessons(self.dialect)
            .iter()
            .enumerate()
            .filter(|(_, lesson)| lesson.kind.is_exercise())
            .map(|(index, _)| index)
            .collect();
        let total = exercises.len();
        let completed = exercises
            .iter()
            .filter(|&&index| {
                self.is_completed(LessonKey {
                    dialect: self.dialect,
                    index,
                })
            })
            .count();
        let percent = if total == 0 {
            0
        } else {
            (completed * 100 + total / 2) / total
        };

        Progress {
            completed,
            total,
            percent,
        }
    }
}
