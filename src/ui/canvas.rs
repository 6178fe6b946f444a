// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Page viewport for box annotation.
//!
//! This module paints the current page at its native size (scale 1.0),
//! overlays the stored boxes and the live preview, and turns raw pointer
//! input into page-local [`PointerEvent`]s for the drawing controller.

use crate::controller::PointerEvent;
use crate::io::document::PageSize;
use crate::models::annotation::{AnnotationBox, Point};

/// What the viewport needs to paint one page.
pub struct PageView<'a> {
    pub file_name: &'a str,
    pub page: u32,
    pub size: PageSize,
    pub boxes: &'a [AnnotationBox],
    pub preview: Option<&'a AnnotationBox>,
    pub drawing: bool,
}

const BOX_STROKE: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
const BOX_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(30, 65, 123, 40);
const PREVIEW_STROKE: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const PREVIEW_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(60, 0, 0, 25);

/// Translate a screen position to page-local pixels.
///
/// Positions outside the page still translate (a drag may end past the
/// edge); non-finite input yields `None`.
pub fn to_page_point(pos: egui::Pos2, page_rect: egui::Rect) -> Option<Point> {
    if !pos.x.is_finite() || !pos.y.is_finite() || !page_rect.min.x.is_finite() || !page_rect.min.y.is_finite() {
        return None;
    }
    Some(Point::new(
        f64::from(pos.x - page_rect.min.x),
        f64::from(pos.y - page_rect.min.y),
    ))
}

/// Screen rectangle of a page-local box.
fn to_screen_rect(b: &AnnotationBox, page_rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        page_rect.min + egui::vec2(b.x as f32, b.y as f32),
        egui::vec2(b.width as f32, b.height as f32),
    )
}

/// Display the page and collect this frame's pointer events.
pub fn show(ui: &mut egui::Ui, view: &PageView<'_>) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let page_size = egui::vec2(view.size.width as f32, view.size.height as f32);

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let (page_rect, response) = ui.allocate_exact_size(page_size, egui::Sense::click_and_drag());
            let painter = ui.painter_at(page_rect.expand(2.0));

            // Page surface
            painter.rect_filled(page_rect, 0.0, egui::Color32::WHITE);
            painter.rect_stroke(page_rect, 0.0, egui::Stroke::new(1.0, egui::Color32::from_gray(200)));
            painter.text(
                page_rect.left_bottom() + egui::vec2(8.0, -8.0),
                egui::Align2::LEFT_BOTTOM,
                format!("{} - page {}", view.file_name, view.page),
                egui::FontId::proportional(11.0),
                egui::Color32::from_gray(160),
            );

            for b in view.boxes {
                draw_box(&painter, b, page_rect, BOX_STROKE, BOX_FILL);
            }
            if let Some(preview) = view.preview {
                draw_box(&painter, preview, page_rect, PREVIEW_STROKE, PREVIEW_FILL);
            }

            if response.hovered() || view.drawing {
                ui.ctx().set_cursor_icon(egui::CursorIcon::Crosshair);
            }

            let input = ui.input(|i| PointerInput {
                pressed: i.pointer.primary_pressed(),
                released: i.pointer.primary_released(),
                hovered: response.hovered(),
                modifier: i.modifiers.alt,
                point: i
                    .pointer
                    .interact_pos()
                    .or(i.pointer.latest_pos())
                    .and_then(|p| to_page_point(p, page_rect)),
            });
            events = pointer_events(&input, view.drawing);
        });

    events
}

/// One frame of raw pointer state, already in page coordinates.
struct PointerInput {
    pressed: bool,
    released: bool,
    hovered: bool,
    modifier: bool,
    point: Option<Point>,
}

/// Turn one frame of pointer state into controller events.
///
/// A release without a usable position cancels the drag instead of
/// leaving it open.
fn pointer_events(input: &PointerInput, drawing: bool) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let Some(point) = input.point else {
        if input.released && drawing {
            events.push(PointerEvent::Cancel);
        }
        return events;
    };

    if input.pressed && input.hovered {
        events.push(PointerEvent::Down {
            point,
            modifier: input.modifier,
        });
    }
    if drawing || input.pressed {
        events.push(PointerEvent::Move(point));
    }
    if input.released {
        events.push(PointerEvent::Up(point));
    }
    events
}

/// Draw one box on the page.
fn draw_box(
    painter: &egui::Painter,
    b: &AnnotationBox,
    page_rect: egui::Rect,
    stroke: egui::Color32,
    fill: egui::Color32,
) {
    let rect = to_screen_rect(b, page_rect);
    painter.rect_filled(rect, 0.0, fill);
    painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, stroke));
}
