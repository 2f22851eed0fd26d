//! Design session management
//!
//! This module contains:
//! - Session state (scene, selection, fonts and the export consumer)
//! - Message types for control and pointer interactions
//! - Mutation handlers that keep the scene consistent and export on change

pub mod handlers;
pub mod messages;
pub mod state;

pub use handlers::handle_design_msg;
pub use messages::{DesignMsg, PointerEvent};
pub use state::Designer;
