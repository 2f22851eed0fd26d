//! Pure domain types with minimal dependencies
//!
//! This module contains the layer model shared by the scene store, the
//! renderer and the interaction surface. Types here carry no rendering
//! backend types beyond the decoded image buffer.

pub mod color;
pub mod geometry;
pub mod layer;
pub mod selection;

pub use color::*;
pub use geometry::*;
pub use layer::*;
pub use selection::*;
