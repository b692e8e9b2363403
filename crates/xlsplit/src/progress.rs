//! Progress notifications
//!
//! Observers are plain callbacks receiving a status line. They run inline on
//! the splitting thread, in no particular order relative to each other.

use std::fmt;

/// A progress step of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent<'a> {
    /// The row stream is being opened
    ReadingRows,
    /// A data row is being grouped; the number is the sheet row number minus one
    ProcessingRow(u32),
    /// The workbook for a group is about to be built and saved
    WritingGroup(&'a str),
}

impl fmt::Display for ProgressEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::ReadingRows => f.write_str("Reading rows"),
            ProgressEvent::ProcessingRow(n) => write!(f, "Processing row {}", n),
            ProgressEvent::WritingGroup(value) => write!(f, "Writing sheet for value \"{}\"", value),
        }
    }
}

type Observer = Box<dyn FnMut(&str) + Send>;

/// Observers keyed by id
#[derive(Default)]
pub(crate) struct ProgressRegistry {
    observers: Vec<(String, Observer)>,
}

impl ProgressRegistry {
    /// Add an observer; an existing observer with the same id is replaced
    pub(crate) fn register(&mut self, id: String, observer: Observer) {
        match self.observers.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = observer,
            None => self.observers.push((id, observer)),
        }
    }

    pub(crate) fn emit(&mut self, event: ProgressEvent<'_>) {
        if self.observers.is_empty() {
            return;
        }
        let status = event.to_string();
        for (_, observer) in &mut self.observers {
            observer(&status);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl fmt::Debug for ProgressRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|(id, _)| id))
            .finish()
    }
}
