// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Exportable snapshot of an annotation session.
//!
//! Captures the selected files and their boxes in both page-pixel and PDF
//! user-space coordinates, plus the raw store as it is sent to the backend.

use super::annotation::{AnnotationBox, PdfRect};
use super::selection::{SelectedFile, SelectionSet};
use super::store::AnnotationStore;
use crate::util::geometry::to_pdf_space;
use serde::{Deserialize, Serialize};

/// Complete export data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub files: Vec<FileAnnotations>,
    pub store: AnnotationStore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnnotations {
    pub index: usize,
    pub name: String,
    /// `None` when the document failed to load
    pub page_count: Option<u32>,
    pub pages: Vec<PageAnnotations>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAnnotations {
    pub page: u32,
    pub boxes: Vec<AnnotationBox>,
    /// Present when the page height is known
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pdf_boxes: Vec<PdfRect>,
}

impl ProjectData {
    /// Snapshot the selection and store. Pages without boxes are left out.
    pub fn capture(selection: &SelectionSet<SelectedFile>, store: &AnnotationStore) -> Self {
        let files = selection
            .files()
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let document = file.document.as_ref().ok();
                let pages = store
                    .pages_of(index)
                    .filter(|(_, boxes)| !boxes.is_empty())
                    .map(|(page, boxes)| {
                        let pdf_boxes = document
                            .and_then(|doc| doc.page_size(page))
                            .map(|size| boxes.iter().map(|b| to_pdf_space(b, size.height)).collect())
                            .unwrap_or_default();
                        PageAnnotations {
                            page,
                            boxes: boxes.to_vec(),
                            pdf_boxes,
                        }
                    })
                    .collect();
                FileAnnotations {
                    index,
                    name: file.name.clone(),
                    page_count: document.map(|doc| doc.page_count()),
                    pages,
                }
            })
            .collect();

        Self {
            files,
            store: store.clone(),
        }
    }

    pub fn box_count(&self) -> usize {
        self.store.box_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::document::{LoadedDocument, PageSize};
    use crate::models::store::PageKey;
    use std::sync::Arc;

    fn selection() -> SelectionSet<SelectedFile> {
        let letter = LoadedDocument::new(vec![
            PageSize {
                width: 612.0,
                height: 792.0,
            };
            2
        ])
        .unwrap();
        SelectionSet::replace(vec![
            SelectedFile {
                name: "statement.pdf".into(),
                size: 10,
                bytes: Arc::new(Vec::new()),
                document: Ok(letter),
            },
            SelectedFile {
                name: "broken.pdf".into(),
                size: 5,
                bytes: Arc::new(Vec::new()),
                document: Err("Failed to load PDF".into()),
            },
        ])
    }

    #[test]
    fn test_capture_converts_known_pages() {
        let store = AnnotationStore::new()
            .add_box(PageKey::new(0, 2), AnnotationBox::new(10.0, 10.0, 40.0, 30.0))
            .ensure_page(PageKey::new(0, 1))
            .add_box(PageKey::new(1, 1), AnnotationBox::new(0.0, 0.0, 5.0, 5.0));

        let project = ProjectData::capture(&selection(), &store);
        assert_eq!(project.box_count(), 2);

        let first = &project.files[0];
        assert_eq!(first.page_count, Some(2));
        assert_eq!(first.pages.len(), 1);
        assert_eq!(first.pages[0].page, 2);
        assert_eq!(first.pages[0].pdf_boxes[0].to_string(), "10,782,50,752");

        let second = &project.files[1];
        assert_eq!(second.page_count, None);
        assert_eq!(second.pages[0].boxes.len(), 1);
        assert!(second.pages[0].pdf_boxes.is_empty());
    }
}
