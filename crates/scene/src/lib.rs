//! Scene controller for the goalboard stage.
//!
//! The stage holds one movable actor, one fixed obstacle (the whiteboard) and
//! at most one goals dialog. Input events are applied to [`SceneState`] by
//! plain state transitions; [`render`] turns the state into a display list so
//! any front end can paint it. [`SceneController`] adds the one asynchronous
//! piece, fetching the goal list, and owns its cancellation.

mod controller;
mod geometry;
mod input;
mod render;
mod source;
mod state;

pub use controller::SceneController;
pub use geometry::{Bounds, Vec2, MOVE_STEP, PROXIMITY_THRESHOLD, STAGE_SIZE};
pub use input::{Key, SceneEvent};
pub use render::{render, Drawable, PANEL_BOUNDS};
pub use source::{FetchError, GoalFuture, GoalSource, HttpGoalSource};
pub use state::{
    Actor, Direction, Effect, FetchTicket, MoveOutcome, Obstacle, Overlay, OverlayState,
    SceneState, SpriteAsset,
};

#[cfg(test)]
pub(crate) use source::MockGoalSource;
