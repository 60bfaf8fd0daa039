use crate::geometry::{Bounds, Vec2, STAGE_SIZE};
use crate::state::{SceneState, SpriteAsset};

/// Goals dialog panel: 400x300 with its corner at a quarter of the stage.
pub const PANEL_BOUNDS: Bounds = Bounds::new(
    Vec2::new(STAGE_SIZE / 4.0 + 200.0, STAGE_SIZE / 4.0 + 150.0),
    Vec2::new(400.0, 300.0),
);
const PANEL_CORNER_RADIUS: f32 = 16.0;
const TEXT_INSET: f32 = 20.0;
const TEXT_WRAP_WIDTH: f32 = 350.0;
const BACKDROP_ALPHA: f32 = 0.5;

/// One paint operation, in stage coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Image {
        asset: SpriteAsset,
        bounds: Bounds,
    },
    /// Black dimming layer behind the dialog.
    Backdrop { bounds: Bounds, alpha: f32 },
    /// White rounded dialog panel.
    Panel { bounds: Bounds, corner_radius: f32 },
    Text {
        origin: Vec2,
        wrap_width: f32,
        body: String,
    },
}

fn stage_bounds() -> Bounds {
    Bounds::from_origin(Vec2::default(), Vec2::new(STAGE_SIZE, STAGE_SIZE))
}

/// Builds the display list for `state`, back to front.
pub fn render(state: &SceneState) -> Vec<Drawable> {
    let actor = state.actor();
    let mut frame = vec![
        Drawable::Image {
            asset: SpriteAsset::Background,
            bounds: stage_bounds(),
        },
        Drawable::Image {
            asset: SpriteAsset::Whiteboard,
            bounds: state.obstacle().bounds,
        },
        Drawable::Image {
            asset: actor.sprite(),
            bounds: actor.bounds(),
        },
    ];

    if let Some(overlay) = state.overlay() {
        frame.push(Drawable::Backdrop {
            bounds: stage_bounds(),
            alpha: BACKDROP_ALPHA,
        });
        frame.push(Drawable::Panel {
            bounds: PANEL_BOUNDS,
            corner_radius: PANEL_CORNER_RADIUS,
        });
        frame.push(Drawable::Text {
            origin: PANEL_BOUNDS.min().offset(TEXT_INSET, TEXT_INSET),
            wrap_width: TEXT_WRAP_WIDTH,
            body: overlay.text().to_string(),
        });
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Direction, Effect};
    use goalboard_protocol::messages;

    fn actor_drawable(frame: &[Drawable]) -> (SpriteAsset, Bounds) {
        frame
            .iter()
            .find_map(|d| match d {
                Drawable::Image {
                    asset: asset @ SpriteAsset::Actor(_),
                    bounds,
                } => Some((*asset, *bounds)),
                _ => None,
            })
            .expect("actor sprite")
    }

    fn near_scene() -> SceneState {
        SceneState::with_layout(
            Vec2::new(468.0, 400.0),
            Bounds::new(Vec2::new(400.0, 400.0), Vec2::new(96.0, 64.0)),
        )
    }

    #[test]
    fn panel_sits_at_quarter_stage() {
        assert_eq!(PANEL_BOUNDS.min(), Vec2::new(256.0, 256.0));
        assert_eq!(PANEL_BOUNDS.max(), Vec2::new(656.0, 556.0));
    }

    #[test]
    fn exactly_one_actor_sprite_is_drawn() {
        let frame = render(&SceneState::default());
        let sprites = frame
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Drawable::Image {
                        asset: SpriteAsset::Actor(_),
                        ..
                    }
                )
            })
            .count();
        assert_eq!(sprites, 1);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn blocked_turn_swaps_sprite_in_place() {
        let mut state = near_scene();
        let (before_asset, before_bounds) = actor_drawable(&render(&state));
        assert_eq!(before_asset, SpriteAsset::Actor(Direction::Down));

        state.step(Direction::Left);
        let (after_asset, after_bounds) = actor_drawable(&render(&state));
        assert_eq!(after_asset, SpriteAsset::Actor(Direction::Left));
        assert_eq!(after_asset.path(), "leftsprite.png");
        assert_eq!(after_bounds, before_bounds);
    }

    #[test]
    fn sprite_follows_actor_after_move() {
        let mut state = SceneState::default();
        state.step(Direction::Right);
        let (asset, bounds) = actor_drawable(&render(&state));
        assert_eq!(asset, SpriteAsset::Actor(Direction::Right));
        assert_eq!(bounds, state.actor().bounds());
    }

    #[test]
    fn overlay_adds_backdrop_panel_and_text_on_top() {
        let mut state = near_scene();
        assert!(matches!(state.interact(), Some(Effect::FetchGoals(_))));

        let frame = render(&state);
        assert_eq!(frame.len(), 6);
        assert!(matches!(frame[3], Drawable::Backdrop { alpha, .. } if alpha == 0.5));
        assert!(matches!(frame[4], Drawable::Panel { bounds, .. } if bounds == PANEL_BOUNDS));
        match &frame[5] {
            Drawable::Text { origin, body, .. } => {
                assert_eq!(*origin, Vec2::new(276.0, 276.0));
                assert_eq!(body, messages::LOADING);
            }
            other => panic!("unexpected drawable {other:?}"),
        }
    }

    #[test]
    fn dismissed_overlay_leaves_no_backdrop() {
        let mut state = near_scene();
        let Some(Effect::FetchGoals(ticket)) = state.interact() else {
            panic!("expected a fetch");
        };
        state.resolve_fetch(ticket, Ok(vec![]));
        state.pointer_down(PANEL_BOUNDS.center);

        let frame = render(&state);
        assert!(!frame
            .iter()
            .any(|d| matches!(d, Drawable::Backdrop { .. } | Drawable::Panel { .. })));
    }
}
