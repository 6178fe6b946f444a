// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Ordered file selection with a bounds-checked cursor.

use crate::io::document::LoadedDocument;
use std::sync::Arc;

/// A picked PDF file and the outcome of loading it.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub bytes: Arc<Vec<u8>>,
    /// Page geometry, or the message shown when the file would not load
    pub document: Result<LoadedDocument, String>,
}

impl SelectedFile {
    /// Size in megabytes, for display.
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0 / 1024.0
    }
}

/// The current selection and which entry is being viewed.
///
/// `current` is `None` exactly when the selection is empty.
#[derive(Debug, Clone)]
pub struct SelectionSet<F> {
    files: Vec<F>,
    current: Option<usize>,
}

impl<F> Default for SelectionSet<F> {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            current: None,
        }
    }
}

impl<F> SelectionSet<F> {
    /// Replace the whole selection; the cursor moves to the first entry.
    pub fn replace(files: Vec<F>) -> Self {
        let current = if files.is_empty() { None } else { Some(0) };
        Self { files, current }
    }

    pub fn files(&self) -> &[F] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&F> {
        self.current.and_then(|i| self.files.get(i))
    }

    /// Move to the next file, staying on the last one at the end.
    pub fn next(&mut self) {
        self.select(self.current.map_or(0, |i| i.saturating_add(1)));
    }

    /// Move to the previous file, staying on the first one at the start.
    pub fn previous(&mut self) {
        self.select(self.current.map_or(0, |i| i.saturating_sub(1)));
    }

    /// Jump to an index, clamped into range. Does nothing when empty.
    pub fn select(&mut self, index: usize) {
        if self.files.is_empty() {
            self.current = None;
        } else {
            self.current = Some(index.min(self.files.len() - 1));
        }
    }

    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|i| i + 1 < self.files.len())
    }

    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_has_no_cursor() {
        let mut set: SelectionSet<&str> = SelectionSet::default();
        assert_eq!(set.current_index(), None);
        set.next();
        set.previous();
        set.select(3);
        assert_eq!(set.current_index(), None);
        assert!(set.current().is_none());
    }

    #[test]
    fn test_replace_starts_at_first() {
        let set = SelectionSet::replace(vec!["a.pdf", "b.pdf"]);
        assert_eq!(set.current_index(), Some(0));
        assert_eq!(set.current(), Some(&"a.pdf"));
        assert_eq!(SelectionSet::<&str>::replace(vec![]).current_index(), None);
    }

    #[test]
    fn test_next_clamps_at_last() {
        let mut set = SelectionSet::replace(vec!["a", "b", "c"]);
        set.select(2);
        assert_eq!(set.current_index(), Some(2));
        set.next();
        assert_eq!(set.current_index(), Some(2));
        assert!(!set.has_next());
    }

    #[test]
    fn test_previous_clamps_at_first() {
        let mut set = SelectionSet::replace(vec!["a", "b", "c"]);
        set.next();
        assert!(set.has_previous());
        set.previous();
        set.previous();
        assert_eq!(set.current_index(), Some(0));
        assert!(!set.has_previous());
    }

    #[test]
    fn test_select_out_of_range_clamps() {
        let mut set = SelectionSet::replace(vec!["a", "b"]);
        set.select(10);
        assert_eq!(set.current(), Some(&"b"));
    }

    #[test]
    fn test_size_mb() {
        let file = SelectedFile {
            name: "statement.pdf".into(),
            size: 2 * 1024 * 1024,
            bytes: Arc::new(Vec::new()),
            document: Err("not loaded".into()),
        };
        assert!((file.size_mb() - 2.0).abs() < f64::EPSILON);
    }
}
