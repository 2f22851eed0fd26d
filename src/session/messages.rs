//! Message types for a design session
//!
//! Control widgets and the canvas surface talk to the designer through these
//! messages; see [`super::handlers::handle_design_msg`].

use crate::domain::{Point, Rgba, StyleDelta, TextStyle};

/// Low-level pointer input on the canvas surface, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed
    Down(Point),
    /// Pointer moved (with or without a button held)
    Move(Point),
    /// Button released
    Up(Point),
}

/// All design messages
#[derive(Debug, Clone)]
pub enum DesignMsg {
    /// Add a text label with the given style
    AddText { content: String, style: TextStyle },
    /// Upload raw image bytes
    AddImage(Vec<u8>),
    /// Restyle the selected text label
    UpdateSelectedStyle(StyleDelta),
    /// Remove the selected layer
    DeleteSelected,
    /// Change the mat color
    SetBackingColor(Rgba),
    /// Remove every user layer
    ClearAll,
    /// Direct manipulation on the canvas
    Pointer(PointerEvent),
}
