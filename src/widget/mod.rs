//! Canvas interaction
//!
//! The designer draws onto whatever surface the host UI provides; this module
//! turns that surface's pointer input into selection changes and transform
//! commits.

pub mod surface;

pub use surface::Gesture;
