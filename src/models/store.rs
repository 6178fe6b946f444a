// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-file, per-page annotation bookkeeping.
//!
//! The store maps a file index (position in the current selection) to a map
//! from 1-based page number to the boxes drawn on that page, in creation
//! order. Every operation returns a new store; page lists are shared between
//! versions and only the list being touched is copied.

use super::annotation::AnnotationBox;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Composite key of one page's box list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    /// 0-based index into the file selection
    pub file: usize,
    /// 1-based page number
    pub page: u32,
}

impl PageKey {
    pub fn new(file: usize, page: u32) -> Self {
        Self { file, page }
    }
}

type PageBoxes = BTreeMap<u32, Arc<Vec<AnnotationBox>>>;

/// Immutable annotation store.
///
/// Serializes as `{"<file>": {"<page>": [box, ...]}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationStore {
    files: BTreeMap<usize, PageBoxes>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarantee that an (empty) list exists for the page.
    pub fn ensure_page(&self, key: PageKey) -> Self {
        if self.page(key).is_some() {
            return self.clone();
        }
        self.with_page(key, |_| {})
    }

    /// Append a box to the end of the page's list.
    pub fn add_box(&self, key: PageKey, b: AnnotationBox) -> Self {
        self.with_page(key, |boxes| boxes.push(b))
    }

    /// Remove the box at `index`; out-of-range indices leave the store as is.
    pub fn remove_box_at(&self, key: PageKey, index: usize) -> Self {
        match self.page(key) {
            Some(boxes) if index < boxes.len() => self.with_page(key, |boxes| {
                boxes.remove(index);
            }),
            _ => self.clone(),
        }
    }

    /// Boxes on the page, or an empty slice if nothing was drawn there.
    pub fn boxes_for(&self, key: PageKey) -> &[AnnotationBox] {
        self.page(key).map(|boxes| boxes.as_slice()).unwrap_or(&[])
    }

    /// Whether a list exists for the page, even an empty one.
    pub fn has_page(&self, key: PageKey) -> bool {
        self.page(key).is_some()
    }

    /// Total number of boxes across all files and pages.
    pub fn box_count(&self) -> usize {
        self.files
            .values()
            .flat_map(|pages| pages.values())
            .map(|boxes| boxes.len())
            .sum()
    }

    /// Number of boxes drawn on any page of one file.
    pub fn file_box_count(&self, file: usize) -> usize {
        self.files
            .get(&file)
            .map_or(0, |pages| pages.values().map(|boxes| boxes.len()).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.box_count() == 0
    }

    /// Iterate over every page list of one file, in page order.
    pub fn pages_of(&self, file: usize) -> impl Iterator<Item = (u32, &[AnnotationBox])> {
        self.files
            .get(&file)
            .into_iter()
            .flat_map(|pages| pages.iter().map(|(page, boxes)| (*page, boxes.as_slice())))
    }

    fn page(&self, key: PageKey) -> Option<&Arc<Vec<AnnotationBox>>> {
        self.files.get(&key.file).and_then(|pages| pages.get(&key.page))
    }

    /// Copy-on-write update of a single page list.
    fn with_page(&self, key: PageKey, update: impl FnOnce(&mut Vec<AnnotationBox>)) -> Self {
        let mut next = self.clone();
        let boxes = next
            .files
            .entry(key.file)
            .or_default()
            .entry(key.page)
            .or_default();
        update(Arc::make_mut(boxes));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box(n: f64) -> AnnotationBox {
        AnnotationBox::new(n, n, 10.0, 10.0)
    }

    #[test]
    fn test_boxes_for_absent_page_is_empty() {
        let store = AnnotationStore::new();
        assert!(store.boxes_for(PageKey::new(0, 1)).is_empty());
        assert!(!store.has_page(PageKey::new(0, 1)));
    }

    #[test]
    fn test_ensure_page_creates_empty_list_once() {
        let key = PageKey::new(2, 3);
        let store = AnnotationStore::new().ensure_page(key);
        assert!(store.has_page(key));
        assert!(store.boxes_for(key).is_empty());

        let with_box = store.add_box(key, sample_box(1.0));
        let again = with_box.ensure_page(key);
        assert_eq!(again.boxes_for(key), &[sample_box(1.0)]);
    }

    #[test]
    fn test_add_box_appends_at_end() {
        let key = PageKey::new(0, 1);
        let store = AnnotationStore::new()
            .add_box(key, sample_box(1.0))
            .add_box(key, sample_box(2.0));
        let before = store.boxes_for(key).len();

        let next = store.add_box(key, sample_box(3.0));
        let boxes = next.boxes_for(key);
        assert_eq!(boxes.len(), before + 1);
        assert_eq!(boxes.last(), Some(&sample_box(3.0)));
        assert_eq!(boxes, &[sample_box(1.0), sample_box(2.0), sample_box(3.0)]);
    }

    #[test]
    fn test_operations_leave_previous_value_untouched() {
        let key = PageKey::new(0, 1);
        let first = AnnotationStore::new().add_box(key, sample_box(1.0));
        let second = first.add_box(key, sample_box(2.0));
        let third = second.remove_box_at(key, 0);

        assert_eq!(first.boxes_for(key), &[sample_box(1.0)]);
        assert_eq!(second.boxes_for(key).len(), 2);
        assert_eq!(third.boxes_for(key), &[sample_box(2.0)]);
    }

    #[test]
    fn test_untouched_pages_are_shared() {
        let a = PageKey::new(0, 1);
        let b = PageKey::new(0, 2);
        let store = AnnotationStore::new()
            .add_box(a, sample_box(1.0))
            .add_box(b, sample_box(2.0));
        let next = store.add_box(b, sample_box(3.0));

        let shared = |s: &AnnotationStore, k: PageKey| s.page(k).cloned().unwrap();
        assert!(Arc::ptr_eq(&shared(&store, a), &shared(&next, a)));
        assert!(!Arc::ptr_eq(&shared(&store, b), &shared(&next, b)));
    }

    #[test]
    fn test_remove_box_at_removes_exactly_one() {
        let key = PageKey::new(1, 4);
        let store = AnnotationStore::new()
            .add_box(key, sample_box(1.0))
            .add_box(key, sample_box(2.0))
            .add_box(key, sample_box(3.0));

        let next = store.remove_box_at(key, 1);
        assert_eq!(next.boxes_for(key), &[sample_box(1.0), sample_box(3.0)]);
    }

    #[test]
    fn test_remove_box_at_out_of_range_is_noop() {
        let key = PageKey::new(0, 1);
        let store = AnnotationStore::new().add_box(key, sample_box(1.0));

        assert_eq!(store.remove_box_at(key, 1), store);
        assert_eq!(store.remove_box_at(PageKey::new(5, 5), 0), store);
        assert!(!store.remove_box_at(PageKey::new(5, 5), 0).has_page(PageKey::new(5, 5)));
    }

    #[test]
    fn test_counts() {
        let store = AnnotationStore::new()
            .add_box(PageKey::new(0, 1), sample_box(1.0))
            .add_box(PageKey::new(0, 2), sample_box(2.0))
            .add_box(PageKey::new(1, 1), sample_box(3.0))
            .ensure_page(PageKey::new(2, 1));
        assert_eq!(store.box_count(), 3);
        assert_eq!(store.file_box_count(0), 2);
        assert_eq!(store.file_box_count(2), 0);
        assert!(!store.is_empty());
        assert!(AnnotationStore::new().ensure_page(PageKey::new(0, 1)).is_empty());
    }

    #[test]
    fn test_serializes_as_nested_string_keyed_maps() {
        let store = AnnotationStore::new()
            .add_box(PageKey::new(0, 1), AnnotationBox::new(10.0, 10.0, 40.0, 30.0))
            .ensure_page(PageKey::new(1, 2));
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "0": {"1": [{"x": 10.0, "y": 10.0, "width": 40.0, "height": 30.0}]},
                "1": {"2": []}
            })
        );

        let back: AnnotationStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }
}
