//! Lesson catalogue, result checks and learner sessions.

pub mod check;
pub mod curriculum;
pub mod session;

pub use check::{Check, Scope};
pub use curriculum::{Curriculum, CurriculumError, Example, Exercise, Lesson, LessonKind};
pub use session::{AttemptOutcome, LessonKey, Progress, Session, SessionError};
