// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PDF document loading.
//!
//! Only the page geometry is needed to annotate: the number of pages and
//! each page's intrinsic size at scale 1.0, taken from its MediaBox.

use lopdf::{Dictionary, Document, Object};

/// US Letter, used when a page carries no usable MediaBox.
const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// MediaBox lookups follow `Parent` links at most this far.
const MAX_INHERIT_DEPTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("PDF has no pages")]
    NoPages,
}

/// Intrinsic page size in pixels at scale 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Page geometry of a loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pages: Vec<PageSize>,
}

impl LoadedDocument {
    pub fn new(pages: Vec<PageSize>) -> Result<Self, DocumentError> {
        if pages.is_empty() {
            return Err(DocumentError::NoPages);
        }
        Ok(Self { pages })
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Size of a 1-based page number.
    pub fn page_size(&self, page: u32) -> Option<PageSize> {
        let index = usize::try_from(page).ok()?.checked_sub(1)?;
        self.pages.get(index).copied()
    }
}

/// The rendering surface collaborator: turns file bytes into page geometry.
pub trait DocumentRenderer {
    fn load(&self, bytes: &[u8]) -> Result<LoadedDocument, DocumentError>;
}

/// [`DocumentRenderer`] backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfRenderer;

impl DocumentRenderer for LopdfRenderer {
    fn load(&self, bytes: &[u8]) -> Result<LoadedDocument, DocumentError> {
        let document = Document::load_mem(bytes).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let pages = document
            .get_pages()
            .values()
            .map(|id| {
                document
                    .get_object(*id)
                    .ok()
                    .and_then(|obj| obj.as_dict().ok())
                    .and_then(|dict| media_box_size(&document, dict))
                    .unwrap_or(DEFAULT_PAGE_SIZE)
            })
            .collect();

        LoadedDocument::new(pages)
    }
}

/// Resolve the page's MediaBox, walking up inherited page-tree attributes.
fn media_box_size(document: &Document, page: &Dictionary) -> Option<PageSize> {
    let mut node = page;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(media_box) = node.get(b"MediaBox") {
            return rect_size(document, media_box);
        }
        let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = document.get_object(parent_id).ok()?.as_dict().ok()?;
    }
    None
}

fn rect_size(document: &Document, object: &Object) -> Option<PageSize> {
    let array = match object {
        Object::Reference(id) => document.get_object(*id).ok()?.as_array().ok()?,
        Object::Array(array) => array,
        _ => return None,
    };

    let bounds: Vec<f64> = array
        .iter()
        .filter_map(|obj| match obj {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(f) => Some(f64::from(*f)),
            _ => None,
        })
        .collect();

    if bounds.len() != 4 {
        return None;
    }
    let width = (bounds[2] - bounds[0]).abs();
    let height = (bounds[3] - bounds[1]).abs();
    if width == 0.0 || height == 0.0 {
        return None;
    }
    Some(PageSize { width, height })
}
