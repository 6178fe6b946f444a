// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides box construction from pointer positions, hit
//! testing, and the conversion from page pixels to PDF user space.

use crate::models::annotation::{AnnotationBox, PdfRect, Point};

/// Build a box from two pointer positions, in either order.
pub fn normalize(p0: Point, p1: Point) -> AnnotationBox {
    AnnotationBox {
        x: p0.x.min(p1.x),
        y: p0.y.min(p1.y),
        width: (p0.x - p1.x).abs(),
        height: (p0.y - p1.y).abs(),
    }
}

/// Index of the earliest box containing `point`, if any.
pub fn hit_test(boxes: &[AnnotationBox], point: Point) -> Option<usize> {
    boxes.iter().position(|b| b.contains(point))
}

/// Convert a top-left-origin box into PDF user space for a page of the
/// given height. Values are rounded to two decimals.
pub fn to_pdf_space(b: &AnnotationBox, page_height: f64) -> PdfRect {
    PdfRect {
        x1: round2(b.x),
        y1: round2(page_height - b.y),
        x2: round2(b.x + b.width),
        y2: round2(page_height - b.y - b.height),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
