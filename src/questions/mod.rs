//! Question Bank
//!
//! Loads the two-option question pool from a plain-text file and picks the
//! next question per room, avoiding an immediate repeat.
//!
//! File format: one question per line, `left option / right option`, with an
//! optional `N. ` numeric prefix. Blank lines are skipped.

use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::rounds::RoomId;

/// Separator between the two options on a question line.
const OPTION_SEPARATOR: &str = " / ";

/// Errors raised while loading or parsing the question file.
#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("cannot read question file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question on line {line}: expected 'left / right'")]
    MalformedLine { line: usize },

    #[error("question file contains no questions")]
    EmptyPool,
}

/// One two-option question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Text of the first option.
    pub option_a: String,
    /// Text of the second option.
    pub option_b: String,
}

/// Immutable pool of questions, fixed at startup.
#[derive(Debug)]
pub struct QuestionPool {
    entries: Vec<Question>,
}

impl QuestionPool {
    /// Parse a pool from raw file contents.
    ///
    /// Fails on the first malformed line and on an empty result.
    pub fn parse(raw: &str) -> Result<Self, QuestionError> {
        let mut entries = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }
            // Drop the optional "N. " numbering prefix.
            let rest = match stripped.split_once(". ") {
                Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest,
                _ => stripped,
            };
            let (left, right) = rest
                .split_once(OPTION_SEPARATOR)
                .ok_or(QuestionError::MalformedLine { line: idx + 1 })?;
            entries.push(Question {
                option_a: left.trim().to_string(),
                option_b: right.trim().to_string(),
            });
        }
        if entries.is_empty() {
            return Err(QuestionError::EmptyPool);
        }
        Ok(Self { entries })
    }

    /// Load and parse a pool from a file on disk.
    pub fn load(path: &Path) -> Result<Self, QuestionError> {
        let raw = std::fs::read_to_string(path).map_err(|source| QuestionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Number of questions in the pool.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool is empty. Never true for a constructed pool.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a question by index.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.entries.get(index)
    }
}

/// A question chosen for a new round.
#[derive(Debug, Clone)]
pub struct PickedQuestion {
    /// Index of the question within the pool.
    pub index: usize,
    /// Text of the first option.
    pub option_a: String,
    /// Text of the second option.
    pub option_b: String,
}

/// Picks questions per room, never repeating a room's previous question
/// unless the pool has exactly one entry.
#[derive(Debug)]
pub struct QuestionPicker {
    pool: Arc<QuestionPool>,
    last_used: Mutex<HashMap<RoomId, usize>>,
}

impl QuestionPicker {
    /// Create a picker over a loaded pool.
    pub fn new(pool: Arc<QuestionPool>) -> Self {
        Self {
            pool,
            last_used: Mutex::new(HashMap::new()),
        }
    }

    /// The pool this picker draws from.
    pub fn pool(&self) -> &Arc<QuestionPool> {
        &self.pool
    }

    /// Pick the next question for a room and record it as the room's latest.
    pub fn pick(&self, room_id: RoomId) -> PickedQuestion {
        let total = self.pool.len();
        let mut last_used = self.last_used.lock();

        let mut candidates: Vec<usize> = (0..total).collect();
        if total > 1 {
            if let Some(last) = last_used.get(&room_id) {
                candidates.retain(|idx| idx != last);
            }
        }

        let mut rng = rand::rng();
        let index = candidates[rng.random_range(0..candidates.len())];
        last_used.insert(room_id, index);

        let question = &self.pool.entries[index];
        PickedQuestion {
            index,
            option_a: question.option_a.clone(),
            option_b: question.option_b.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pool_from(raw: &str) -> Arc<QuestionPool> {
        Arc::new(QuestionPool::parse(raw).unwrap())
    }

    #[test]
    fn test_parse_numbered_and_bare_lines() {
        let pool = QuestionPool::parse(
            "1. fly / turn invisible\n\nread minds / stop time\n2. be rich / be famous\n",
        )
        .unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(0).unwrap().option_a, "fly");
        assert_eq!(pool.get(1).unwrap().option_a, "read minds");
        assert_eq!(pool.get(2).unwrap().option_b, "be famous");
    }

    #[test]
    fn test_parse_keeps_non_numeric_prefix() {
        // "vs. " is not a numbering prefix, the line must still split on " / "
        let pool = QuestionPool::parse("vs. everyone / no one\n").unwrap();
        assert_eq!(pool.get(0).unwrap().option_a, "vs. everyone");
    }

    #[test]
    fn test_parse_malformed_line_reports_number() {
        let err = QuestionPool::parse("1. fly / swim\nno separator here\n").unwrap_err();
        match err {
            QuestionError::MalformedLine { line } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_empty_file() {
        let err = QuestionPool::parse("\n\n").unwrap_err();
        assert!(matches!(err, QuestionError::EmptyPool));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1. coffee / tea").unwrap();
        writeln!(file, "2. cats / dogs").unwrap();

        let pool = QuestionPool::load(file.path()).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = QuestionPool::load(Path::new("/nonexistent/questions.txt")).unwrap_err();
        assert!(matches!(err, QuestionError::Io { .. }));
    }

    #[test]
    fn test_pick_never_repeats_consecutively() {
        let picker = QuestionPicker::new(pool_from("a / b\nc / d\n"));
        let mut previous = picker.pick(1).index;
        for _ in 0..50 {
            let picked = picker.pick(1).index;
            assert_ne!(picked, previous);
            previous = picked;
        }
    }

    #[test]
    fn test_pick_single_question_pool_repeats() {
        let picker = QuestionPicker::new(pool_from("a / b\n"));
        assert_eq!(picker.pick(1).index, 0);
        assert_eq!(picker.pick(1).index, 0);
    }

    #[test]
    fn test_pick_tracks_rooms_independently() {
        let picker = QuestionPicker::new(pool_from("a / b\nc / d\n"));
        let first = picker.pick(1).index;
        // Picks in another room must not disturb room 1's last-used entry.
        for _ in 0..10 {
            picker.pick(2);
        }
        assert_ne!(picker.pick(1).index, first);
    }
}
