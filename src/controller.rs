// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven box drawing and deletion.
//!
//! Pointer-down with the draw modifier held starts a drag; the box is
//! committed on release. Pointer-down without the modifier deletes the
//! earliest box under the pointer. The controller only ever sees
//! page-local points; translating screen positions happens in the canvas.

use crate::models::annotation::{AnnotationBox, Point};
use crate::models::store::{AnnotationStore, PageKey};
use crate::util::geometry::{hit_test, normalize};

/// A pointer event in page-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// `modifier` is true while the draw modifier (Alt) is held
    Down { point: Point, modifier: bool },
    Move(Point),
    Up(Point),
    /// The pointer was released where no position is known
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    Drawing { anchor: Point },
}

#[derive(Debug, Default)]
pub struct DrawingController {
    state: DrawState,
    preview: Option<AnnotationBox>,
}

impl DrawingController {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    /// Live box between the anchor and the pointer while dragging.
    pub fn preview(&self) -> Option<&AnnotationBox> {
        self.preview.as_ref()
    }

    /// Feed one pointer event for the page at `key`.
    ///
    /// Returns the new store when the event changed it.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        store: &AnnotationStore,
        key: PageKey,
    ) -> Option<AnnotationStore> {
        match (self.state, event) {
            (_, PointerEvent::Cancel) => {
                self.cancel();
                None
            }
            (DrawState::Idle, PointerEvent::Down { point, modifier: true }) => {
                self.state = DrawState::Drawing { anchor: point };
                self.preview = Some(normalize(point, point));
                if store.has_page(key) {
                    None
                } else {
                    Some(store.ensure_page(key))
                }
            }
            (DrawState::Idle, PointerEvent::Down { point, modifier: false }) => {
                let index = hit_test(store.boxes_for(key), point)?;
                log::info!(
                    "Deleted box {} on file {} page {}",
                    index,
                    key.file,
                    key.page
                );
                Some(store.remove_box_at(key, index))
            }
            (DrawState::Drawing { anchor }, PointerEvent::Move(point)) => {
                self.preview = Some(normalize(anchor, point));
                None
            }
            (DrawState::Drawing { anchor }, PointerEvent::Up(point)) => {
                self.state = DrawState::Idle;
                self.preview = None;
                let new_box = normalize(anchor, point);
                if new_box.is_degenerate() {
                    log::debug!("Committing zero-area box at ({}, {})", new_box.x, new_box.y);
                }
                let next = store.add_box(key, new_box);
                log::info!(
                    "Added box on file {} page {}, total on page: {}",
                    key.file,
                    key.page,
                    next.boxes_for(key).len()
                );
                Some(next)
            }
            // A second press while dragging restarts nothing
            (DrawState::Drawing { .. }, PointerEvent::Down { .. }) => None,
            (DrawState::Idle, PointerEvent::Up(_)) => {
                self.preview = None;
                None
            }
            (DrawState::Idle, PointerEvent::Move(_)) => None,
        }
    }

    /// Drop an in-progress drag without committing it.
    pub fn cancel(&mut self) {
        if self.is_drawing() {
            log::info!("Cancelled box drawing");
        }
        self.state = DrawState::Idle;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: PageKey = PageKey { file: 0, page: 1 };

    fn down(x: f64, y: f64, modifier: bool) -> PointerEvent {
        PointerEvent::Down {
            point: Point::new(x, y),
            modifier,
        }
    }

    fn apply(controller: &mut DrawingController, store: &mut AnnotationStore, event: PointerEvent) {
        if let Some(next) = controller.handle(event, store, KEY) {
            *store = next;
        }
    }

    #[test]
    fn test_draw_box_scenario() {
        let mut controller = DrawingController::new();
        let mut store = AnnotationStore::new();

        apply(&mut controller, &mut store, down(10.0, 10.0, true));
        assert!(controller.is_drawing());
        assert!(store.has_page(KEY));

        apply(&mut controller, &mut store, PointerEvent::Move(Point::new(30.0, 25.0)));
        assert_eq!(
            controller.preview(),
            Some(&AnnotationBox::new(10.0, 10.0, 20.0, 15.0))
        );
        assert!(store.boxes_for(KEY).is_empty());

        apply(&mut controller, &mut store, PointerEvent::Up(Point::new(50.0, 40.0)));
        assert_eq!(controller.state(), DrawState::Idle);
        assert_eq!(controller.preview(), None);
        assert_eq!(store.boxes_for(KEY), &[AnnotationBox::new(10.0, 10.0, 40.0, 30.0)]);
    }

    #[test]
    fn test_click_inside_box_deletes_it() {
        let mut controller = DrawingController::new();
        let mut store = AnnotationStore::new().add_box(KEY, AnnotationBox::new(10.0, 10.0, 40.0, 30.0));

        apply(&mut controller, &mut store, down(20.0, 20.0, false));
        assert!(store.boxes_for(KEY).is_empty());
        assert_eq!(controller.state(), DrawState::Idle);
    }

    #[test]
    fn test_click_deletes_earliest_overlapping_box() {
        let mut controller = DrawingController::new();
        let big = AnnotationBox::new(0.0, 0.0, 100.0, 100.0);
        let small = AnnotationBox::new(10.0, 10.0, 10.0, 10.0);
        let mut store = AnnotationStore::new().add_box(KEY, big).add_box(KEY, small);

        apply(&mut controller, &mut store, down(15.0, 15.0, false));
        assert_eq!(store.boxes_for(KEY), &[small]);
    }

    #[test]
    fn test_click_outside_changes_nothing() {
        let mut controller = DrawingController::new();
        let store = AnnotationStore::new().add_box(KEY, AnnotationBox::new(10.0, 10.0, 5.0, 5.0));
        assert!(controller.handle(down(90.0, 90.0, false), &store, KEY).is_none());
        assert!(controller.handle(down(0.0, 0.0, false), &AnnotationStore::new(), KEY).is_none());
    }

    #[test]
    fn test_release_without_move_commits_zero_box() {
        let mut controller = DrawingController::new();
        let mut store = AnnotationStore::new();
        apply(&mut controller, &mut store, down(7.0, 8.0, true));
        apply(&mut controller, &mut store, PointerEvent::Up(Point::new(7.0, 8.0)));
        assert_eq!(store.boxes_for(KEY), &[AnnotationBox::new(7.0, 8.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_moves_and_releases_while_idle_are_ignored() {
        let mut controller = DrawingController::new();
        let store = AnnotationStore::new();
        assert!(controller.handle(PointerEvent::Move(Point::new(1.0, 1.0)), &store, KEY).is_none());
        assert!(controller.handle(PointerEvent::Up(Point::new(1.0, 1.0)), &store, KEY).is_none());
        assert_eq!(controller.preview(), None);
    }

    #[test]
    fn test_existing_page_is_not_recreated_on_draw_start() {
        let mut controller = DrawingController::new();
        let store = AnnotationStore::new().add_box(KEY, AnnotationBox::new(0.0, 0.0, 1.0, 1.0));
        assert!(controller.handle(down(50.0, 50.0, true), &store, KEY).is_none());
        assert!(controller.is_drawing());
    }

    #[test]
    fn test_cancel_discards_drag() {
        let mut controller = DrawingController::new();
        let mut store = AnnotationStore::new();
        apply(&mut controller, &mut store, down(10.0, 10.0, true));
        apply(&mut controller, &mut store, PointerEvent::Move(Point::new(20.0, 20.0)));
        controller.cancel();
        assert_eq!(controller.preview(), None);

        apply(&mut controller, &mut store, PointerEvent::Up(Point::new(20.0, 20.0)));
        assert!(store.boxes_for(KEY).is_empty());
    }

    #[test]
    fn test_cancel_event_lets_next_click_delete() {
        let mut controller = DrawingController::new();
        let existing = AnnotationBox::new(100.0, 100.0, 20.0, 20.0);
        let mut store = AnnotationStore::new().add_box(KEY, existing);

        apply(&mut controller, &mut store, down(10.0, 10.0, true));
        apply(&mut controller, &mut store, PointerEvent::Cancel);
        assert!(!controller.is_drawing());

        apply(&mut controller, &mut store, down(110.0, 110.0, false));
        apply(&mut controller, &mut store, PointerEvent::Up(Point::new(110.0, 110.0)));
        assert!(store.boxes_for(KEY).is_empty());
    }

    #[test]
    fn test_boxes_go_to_the_given_page() {
        let mut controller = DrawingController::new();
        let other = PageKey::new(1, 3);
        let store = AnnotationStore::new();
        let store = controller.handle(down(0.0, 0.0, true), &store, other).unwrap();
        let store = controller
            .handle(PointerEvent::Up(Point::new(5.0, 5.0)), &store, other)
            .unwrap();
        assert_eq!(store.boxes_for(other).len(), 1);
        assert!(store.boxes_for(KEY).is_empty());
    }
}
