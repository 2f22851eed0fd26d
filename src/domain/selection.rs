//! Selection and drag state for the design canvas

use super::layer::LayerId;

/// Which part of the selected layer a pointer gesture grabbed
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    #[default]
    None,
    /// Body of the layer: translate
    Move,
    /// North-West corner: scale
    NW,
    /// North-East corner: scale
    NE,
    /// South-East corner: scale
    SE,
    /// South-West corner: scale
    SW,
    /// Handle above the top edge: rotate
    Rotate,
}

impl DragState {
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            DragState::NW | DragState::NE | DragState::SE | DragState::SW
        )
    }
}

/// The at-most-one active layer
///
/// Holds only the id; the layer itself is looked up in the scene store so a
/// removed layer can never be reached through a stale selection.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Empty,
    Selected(LayerId),
}

impl Selection {
    pub fn id(self) -> Option<LayerId> {
        match self {
            Selection::Empty => None,
            Selection::Selected(id) => Some(id),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Selection::Empty)
    }

    pub fn is_selected(self, id: LayerId) -> bool {
        self == Selection::Selected(id)
    }

    pub fn select(&mut self, id: LayerId) {
        *self = Selection::Selected(id);
    }

    pub fn clear(&mut self) {
        *self = Selection::Empty;
    }

    /// Drop the selection if it points at `id`
    pub fn forget(&mut self, id: LayerId) {
        if self.is_selected(id) {
            self.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forget_only_clears_matching_id() {
        let mut selection = Selection::default();
        assert!(selection.is_empty());

        selection.select(LayerId(7));
        selection.forget(LayerId(8));
        assert_eq!(selection.id(), Some(LayerId(7)));

        selection.forget(LayerId(7));
        assert_eq!(selection, Selection::Empty);
    }

    #[test]
    fn test_corner_states() {
        assert!(DragState::SE.is_corner());
        assert!(!DragState::Move.is_corner());
        assert!(!DragState::Rotate.is_corner());
        assert_eq!(DragState::default(), DragState::None);
    }
}
