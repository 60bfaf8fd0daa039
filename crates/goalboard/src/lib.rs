//! Umbrella crate for goalboard.
//!
//! Re-exports the protocol, store and scene crates so downstream code can
//! depend on a single crate name (`goalboard`).

pub use goalboard_engine as engine;
pub use goalboard_protocol as protocol;
pub use goalboard_scene as scene;
