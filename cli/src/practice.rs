//! Interactive practice loop.
//!
//! Reads queries from any `BufRead` and writes to any `Write`, so the loop
//! runs the same against a terminal or a scripted test. A query may span
//! several lines and ends at a blank line; lines starting with `:` are
//! commands when no query is pending.

use crate::table;
use anyhow::Result;
use shared::lab::{Curriculum, Lesson, Session};
use shared::query::run_query;
use shared::storage::DatasetStore;
use std::io::{BufRead, Write};

const HELP: &str = "Commands: :hint :next :prev :progress :help :quit. End a query with a blank line.";

/// What the loop should do after a command.
enum Flow {
    Continue,
    Quit,
}

/// A practice session bound to its input and output.
pub struct Practice<'a, R, W> {
    curriculum: &'a Curriculum,
    store: &'a dyn DatasetStore,
    session: Session,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Practice<'a, R, W> {
    /// Creates a practice loop starting at the session's current lesson.
    pub fn new(
        curriculum: &'a Curriculum,
        store: &'a dyn DatasetStore,
        session: Session,
        input: R,
        output: W,
    ) -> Self {
        Self {
            curriculum,
            store,
            session,
            input,
            output,
        }
    }

    /// Runs until `:quit` or end of input and returns the final session.
    ///
    /// A query left pending at end of input is still graded.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(mut self) -> Result<Session> {
        writeln!(self.output, "{HELP}")?;
        self.show_lesson()?;

        let mut pending = String::new();
        let mut line = String::new();
        loop {
            if pending.is_empty() {
                write!(self.output, "> ")?;
                self.output.flush()?;
            }

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                if !pending.trim().is_empty() {
                    self.attempt(&pending)?;
                }
                break;
            }
            let trimmed = line.trim();

            if pending.is_empty() && trimmed.starts_with(':') {
                if let Flow::Quit = self.command(trimmed)? {
                    break;
                }
            } else if trimmed.is_empty() {
                if !pending.is_empty() {
                    self.attempt(&pending)?;
                    pending.clear();
                }
            } else {
                pending.push_str(&line);
            }
        }

        writeln!(self.output, "{}", self.session.progress(self.curriculum))?;
        Ok(self.session)
    }

    fn command(&mut self, command: &str) -> Result<Flow> {
        match command {
            ":quit" | ":q" => return Ok(Flow::Quit),
            ":help" => writeln!(self.output, "{HELP}")?,
            ":hint" => match self.lesson().and_then(|l| l.hint.as_deref()) {
                Some(hint) => writeln!(self.output, "Hint: {hint}")?,
                None => writeln!(self.output, "No hint for this lesson.")?,
            },
            ":next" => {
                if self.session.next_lesson(self.curriculum) {
                    self.show_lesson()?;
                } else {
                    writeln!(self.output, "Already at the last lesson.")?;
                }
            }
            ":prev" => {
                if self.session.previous_lesson() {
                    self.show_lesson()?;
                } else {
                    writeln!(self.output, "Already at the first lesson.")?;
                }
            }
            ":progress" => writeln!(self.output, "{}", self.session.progress(self.curriculum))?,
            other => writeln!(self.output, "Unknown command {other}. {HELP}")?,
        }
        Ok(Flow::Continue)
    }

    fn lesson(&self) -> Option<&'a Lesson> {
        self.curriculum
            .lesson(self.session.dialect(), self.session.lesson_index())
            .ok()
    }

    fn show_lesson(&mut self) -> Result<()> {
        let Some(lesson) = self.lesson() else {
            return Ok(());
        };
        let dialect = self.session.dialect();
        let index = self.session.lesson_index();
        let done = if self.session.is_completed(self.session.current()) {
            " (completed)"
        } else {
            ""
        };

        writeln!(self.output)?;
        writeln!(
            self.output,
            "== {} lesson {}/{} [{}] {}{done}",
            dialect.tag().to_uppercase(),
            index + 1,
            self.curriculum.len(dialect),
            lesson.kind,
            lesson.title
        )?;
        writeln!(self.output, "{}", lesson.description)?;
        for paragraph in &lesson.theory {
            writeln!(self.output, "\n{paragraph}")?;
        }
        for example in &lesson.examples {
            writeln!(self.output, "\n  {}\n    {}", example.description, example.query)?;
        }
        if let Some(task) = &lesson.task {
            writeln!(self.output, "\nTask: {task}")?;
        }
        if let Some(source) = lesson.data_source {
            writeln!(self.output, "Data source: {source}")?;
        }
        if let Some(starter) = &lesson.starter_query {
            writeln!(self.output, "Starter: {starter}")?;
        }
        if !lesson.kind.is_exercise() {
            writeln!(self.output, "\nType :next to continue.")?;
        }
        Ok(())
    }

    /// Runs and grades one query against the current lesson.
    fn attempt(&mut self, query: &str) -> Result<()> {
        let dialect = self.session.dialect();
        let exercise = match self.curriculum.exercise(dialect, self.session.lesson_index()) {
            Ok(exercise) => exercise,
            Err(e) => {
                writeln!(self.output, "{e}. Type :next to continue.")?;
                return Ok(());
            }
        };

        let data = self.store.get(exercise.data_source)?;
        let result = match run_query(query, &data, dialect) {
            Ok(result) => result,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(());
            }
        };

        write!(self.output, "{}", table::render(&result.results))?;
        writeln!(self.output, "({} rows)", result.returned_count())?;

        let outcome = self.session.record_attempt(self.curriculum, &result.results)?;
        if outcome.passed {
            writeln!(self.output, "Passed! {}", self.session.progress(self.curriculum))?;
            if outcome.newly_completed {
                writeln!(self.output, "Type :next for the next lesson.")?;
            }
        } else {
            writeln!(self.output, "Not yet. Type :hint for a hint.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Dialect;
    use shared::storage::InMemoryDatasetStore;
    use std::io::Cursor;

    fn practice(session: Session, script: &str) -> (Session, String) {
        let curriculum = Curriculum::builtin().unwrap();
        let store = InMemoryDatasetStore::with_samples();
        let mut output = Vec::new();
        let session = Practice::new(
            &curriculum,
            &store,
            session,
            Cursor::new(script.as_bytes()),
            &mut output,
        )
        .run()
        .unwrap();
        (session, String::from_utf8(output).unwrap())
    }

    fn at_lesson(dialect: Dialect, index: usize) -> Session {
        let curriculum = Curriculum::builtin().unwrap();
        let mut session = Session::new(dialect);
        session.select_lesson(&curriculum, index).unwrap();
        session
    }

    #[test]
    fn test_passing_attempt_completes_the_lesson() {
        let script = "search action=failed_login\n\
                      | stats count by username | sort -count | head 1\n\
                      \n\
                      :progress\n\
                      :quit\n";
        let (session, output) = practice(at_lesson(Dialect::Spl, 7), script);

        assert!(output.contains("admin"));
        assert!(output.contains("Passed! 14% Complete (1/7)"));
        assert!(session.is_completed(session.current()));
    }

    #[test]
    fn test_failing_attempt_suggests_hint() {
        let (session, output) = practice(at_lesson(Dialect::Spl, 7), "search action=logout\n\n:hint\n");

        assert!(output.contains("Not yet"));
        assert!(output.contains("Hint: "));
        assert!(!session.is_completed(session.current()));
    }

    #[test]
    fn test_navigation_commands() {
        let (session, output) = practice(Session::new(Dialect::Kql), ":prev\n:next\n:next\n:prev\n");

        assert!(output.contains("Already at the first lesson."));
        assert!(output.contains("== KQL lesson 2/"));
        assert!(output.contains("== KQL lesson 3/"));
        assert_eq!(session.lesson_index(), 1);
    }

    #[test]
    fn test_theory_lesson_is_not_graded() {
        let (_, output) = practice(Session::new(Dialect::Sql), "SELECT * FROM auth_logs\n\n");
        assert!(output.contains("has no exercise"));
    }

    #[test]
    fn test_parse_error_keeps_the_loop_running() {
        let (_, output) = practice(at_lesson(Dialect::Sql, 1), "FROM auth_logs\n\n:bogus\n:quit\n");
        assert!(output.contains("Error: Query must start with SELECT"));
        assert!(output.contains("Unknown command :bogus"));
    }

    #[test]
    fn test_pending_query_is_graded_at_end_of_input() {
        let (session, _) = practice(
            at_lesson(Dialect::Sql, 1),
            "SELECT username, source_ip FROM auth_logs",
        );
        assert!(session.is_completed(session.current()));
    }
}
