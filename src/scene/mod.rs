//! Scene graph storage

pub mod store;

pub use store::{BASE_LAYER_COUNT, SceneStore};
