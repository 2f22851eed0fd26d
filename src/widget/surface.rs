//! Pointer-driven direct manipulation of the selected layer
//!
//! This handles:
//! - Selecting layers by pointer press (or clearing the selection on empty canvas)
//! - Live move/scale/rotate previews while dragging, without touching the scene
//! - Committing the final transform once per released gesture

use crate::domain::{DragState, LayerId, Point, Size, Transform, normalize_angle};
use crate::render::geometry::{handle, handle_at};
use crate::session::state::Designer;

/// An in-flight drag on one layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub target: LayerId,
    pub drag: DragState,
    /// Pointer position at press
    pub origin: Point,
    /// Layer transform at press
    pub start: Transform,
    /// Unscaled layer size
    pub size: Size,
    /// Preview transform for the latest pointer position
    pub current: Transform,
}

impl Gesture {
    fn new(target: LayerId, drag: DragState, origin: Point, start: Transform, size: Size) -> Self {
        Self {
            target,
            drag,
            origin,
            start,
            size,
            current: start,
        }
    }

    /// Transform resulting from dragging the grabbed part to `pointer`
    pub fn transform_at(&self, pointer: Point) -> Transform {
        let center = self.start.center(self.size);
        match self.drag {
            DragState::None => self.start,
            DragState::Move => Transform {
                x: self.start.x + (pointer.x - self.origin.x),
                y: self.start.y + (pointer.y - self.origin.y),
                ..self.start
            },
            drag if drag.is_corner() => {
                let grabbed = center.distance(self.origin);
                if grabbed <= f32::EPSILON {
                    return self.start;
                }
                let factor = center.distance(pointer) / grabbed;
                let scale = (self.start.scale * factor).max(handle::MIN_SCALE);
                self.start.rescaled_about_center(self.size, scale)
            }
            _ => {
                let delta = center.angle_to(pointer) - center.angle_to(self.origin);
                self.start.with_angle(normalize_angle(self.start.angle + delta))
            }
        }
    }
}

impl Designer {
    /// Pointer pressed on the canvas
    ///
    /// Grabbing a grip of the selected layer starts a scale or rotate drag;
    /// pressing a content layer selects it and starts a move; pressing empty
    /// canvas (or a base layer) clears the selection.
    pub fn pointer_down(&mut self, point: Point) {
        self.gesture = None;

        if let Some(layer) = self.scene.resolve(&self.selection) {
            let size = layer.size();
            let transform = layer.transform();
            if let Some(drag) = handle_at(&transform, size, point) {
                log::debug!("Grabbed {:?} grip of {:?}", drag, layer.id());
                self.gesture = Some(Gesture::new(layer.id(), drag, point, transform, size));
                return;
            }
        }

        match self.scene.hit_test(point) {
            Some(id) => {
                if !self.selection.is_selected(id) {
                    log::debug!("Selected {:?}", id);
                }
                self.selection.select(id);
                if let Some(layer) = self.scene.get(id) {
                    self.gesture = Some(Gesture::new(
                        id,
                        DragState::Move,
                        point,
                        layer.transform(),
                        layer.size(),
                    ));
                }
            }
            None => {
                if !self.selection.is_empty() {
                    log::debug!("Selection cleared");
                }
                self.selection.clear();
            }
        }
    }

    /// Pointer moved; returns the preview transform while a drag is active
    ///
    /// The scene is not modified and nothing is exported.
    pub fn pointer_move(&mut self, point: Point) -> Option<Transform> {
        let gesture = self.gesture.as_mut()?;
        gesture.current = gesture.transform_at(point);
        Some(gesture.current)
    }

    /// Pointer released; commits the drag. Returns whether the scene changed.
    pub fn pointer_up(&mut self, point: Point) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        let transform = gesture.transform_at(point);
        self.commit_transform(gesture.target, transform)
    }

    /// The drag in progress, if any
    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Abandon the drag in progress without committing it
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
    }
}
