//! The canonical human-editable text form of a task.
//!
//! A task renders to a small fixed line-oriented layout:
//!
//! ```text
//! NAME: write the report
//! ESTIMATE: 3
//! STATUS: In Progress
//! DESCRIPTION: None
//!
//! HISTORY
//! Start	2024-05-01 09:00:00
//! Stop	2024-05-01 11:30:00
//! ```
//!
//! [`render`] produces that layout, [`parse`] recovers a [`TaskRecord`]
//! from a (possibly hand-edited) buffer, and [`validate`] gates the record
//! against the history state-machine invariants. Parsing is strict and
//! never repairs input; validation never mutates. For every valid record
//! `parse(render(record))` reproduces the record, modulo collapsing of
//! whitespace runs inside phrases.
//!
//! Known format limitation, kept for compatibility: the literal token
//! `None` marks an absent estimate/description, so a description whose
//! entire text is exactly `None` cannot be represented.

mod parse;
mod render;
mod validate;

pub use parse::parse;
pub use render::render;
pub use validate::validate;

use crate::error::AppError;
use crate::model::{HistoryEvent, Task, TaskStatus};

/// Applies the grammar's phrase rule to free-form input: one or more words
/// of `[0-9A-Za-z.!?&_-]`, whitespace runs collapsed to single spaces.
///
/// Anything that goes into a NAME or DESCRIPTION field must pass this, or
/// the rendered task text would no longer parse.
pub fn normalize_phrase(value: &str) -> Result<String, AppError> {
    let mut words = Vec::new();
    for word in value.split([' ', '\t']).filter(|word| !word.is_empty()) {
        if !word.bytes().all(is_word_byte) {
            return Err(AppError::parse(
                "may only contain word characters [0-9A-Za-z.!?&_-]",
            ));
        }
        words.push(word);
    }

    if words.is_empty() {
        return Err(AppError::parse("must not be empty"));
    }

    Ok(words.join(" "))
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'!' | b'?' | b'&' | b'_' | b'-')
}

/// The structured record carried by the text format.
///
/// This is transient data: the output of [`parse`] (unvalidated until
/// [`validate`] accepts it) or the input to [`render`]. Persistence works
/// on [`Task`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub estimate: Option<u32>,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub history: Vec<HistoryEvent>,
}

impl TaskRecord {
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            estimate: task.estimate,
            description: task.description.clone(),
            status: task.status,
            history: task.history.clone(),
        }
    }
}
