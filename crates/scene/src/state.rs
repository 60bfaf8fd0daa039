use crate::geometry::{Bounds, Vec2, MOVE_STEP, PROXIMITY_THRESHOLD, STAGE_SIZE};
use crate::input::{Key, SceneEvent};
use crate::render::PANEL_BOUNDS;
use crate::source::FetchError;
use goalboard_protocol::{messages, render_goals, Goal};

const ACTOR_SIZE: Vec2 = Vec2::new(32.0, 48.0);
const WHITEBOARD_SIZE: Vec2 = Vec2::new(96.0, 64.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::ArrowUp => Some(Self::Up),
            Key::ArrowDown => Some(Self::Down),
            Key::ArrowLeft => Some(Self::Left),
            Key::ArrowRight => Some(Self::Right),
            Key::Space => None,
        }
    }

    /// Unit step; y grows downward.
    pub const fn delta(self) -> (f32, f32) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// Images the stage paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteAsset {
    Background,
    Whiteboard,
    Actor(Direction),
}

impl SpriteAsset {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Background => "stage1background.png",
            Self::Whiteboard => "whiteboard.png",
            Self::Actor(Direction::Up) => "upsprite.png",
            Self::Actor(Direction::Down) => "downsprite.png",
            Self::Actor(Direction::Left) => "leftsprite.png",
            Self::Actor(Direction::Right) => "rightsprite.png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    pub position: Vec2,
    pub facing: Direction,
    pub size: Vec2,
}

impl Actor {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.position, self.size)
    }

    /// The sprite that is on stage. Derived from `facing`, so only one
    /// direction sprite is ever active.
    pub fn sprite(&self) -> SpriteAsset {
        SpriteAsset::Actor(self.facing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayState {
    Loading,
    Loaded(String),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub ticket: FetchTicket,
    pub state: OverlayState,
}

impl Overlay {
    pub fn text(&self) -> &str {
        match &self.state {
            OverlayState::Loading => messages::LOADING,
            OverlayState::Loaded(text) => text,
            OverlayState::Failed => messages::LOAD_FAILED,
        }
    }

    /// Loading dialogs cannot be dismissed yet.
    pub fn is_settled(&self) -> bool {
        !matches!(self.state, OverlayState::Loading)
    }
}

/// Work the state asks its owner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchGoals(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    actor: Actor,
    obstacle: Obstacle,
    overlay: Option<Overlay>,
    next_ticket: u64,
}

impl Default for SceneState {
    fn default() -> Self {
        let third = STAGE_SIZE / 3.0;
        Self::with_layout(
            Vec2::new(STAGE_SIZE / 2.0, STAGE_SIZE / 2.0),
            Bounds::from_origin(Vec2::new(third, third), WHITEBOARD_SIZE),
        )
    }
}

impl SceneState {
    /// Actor facing down at `actor_position` next to a fixed obstacle.
    pub fn with_layout(actor_position: Vec2, obstacle: Bounds) -> Self {
        Self {
            actor: Actor {
                position: actor_position,
                facing: Direction::Down,
                size: ACTOR_SIZE,
            },
            obstacle: Obstacle { bounds: obstacle },
            overlay: None,
            next_ticket: 1,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn obstacle(&self) -> &Obstacle {
        &self.obstacle
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn apply(&mut self, event: SceneEvent) -> Option<Effect> {
        match event {
            SceneEvent::KeyDown(Key::Space) => self.interact(),
            SceneEvent::KeyDown(key) => {
                if let Some(direction) = Direction::from_key(key) {
                    self.step(direction);
                }
                None
            }
            SceneEvent::PointerDown(point) => {
                self.pointer_down(point);
                None
            }
        }
    }

    /// One movement step. A step into the obstacle is dropped, but the actor
    /// still turns to face `direction`.
    pub fn step(&mut self, direction: Direction) -> MoveOutcome {
        let (dx, dy) = direction.delta();
        let tentative = Bounds::new(
            self.actor.position.offset(dx * MOVE_STEP, dy * MOVE_STEP),
            self.actor.size,
        );
        self.actor.facing = direction;
        if tentative.intersects(&self.obstacle.bounds) {
            return MoveOutcome::Blocked;
        }
        self.actor.position = tentative.center;
        MoveOutcome::Moved
    }

    pub fn is_near_obstacle(&self) -> bool {
        let distance = self.actor.position.distance(self.obstacle.bounds.center);
        tracing::debug!(distance, "distance from whiteboard");
        distance < PROXIMITY_THRESHOLD
    }

    /// Opens the goals dialog when the actor stands near the whiteboard and
    /// no dialog is open.
    pub fn interact(&mut self) -> Option<Effect> {
        if self.overlay.is_some() || !self.is_near_obstacle() {
            return None;
        }
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.overlay = Some(Overlay {
            ticket,
            state: OverlayState::Loading,
        });
        Some(Effect::FetchGoals(ticket))
    }

    /// Applies a finished fetch. Returns `false` when nothing is waiting for
    /// `ticket` any more.
    pub fn resolve_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Goal>, FetchError>,
    ) -> bool {
        let Some(overlay) = self.overlay.as_mut() else {
            return false;
        };
        if overlay.ticket != ticket || overlay.is_settled() {
            return false;
        }
        overlay.state = match result {
            Ok(goals) => OverlayState::Loaded(render_goals(&goals)),
            Err(err) => {
                tracing::error!(error = %err, "failed to load goals");
                OverlayState::Failed
            }
        };
        true
    }

    /// Closes a settled dialog when the press lands on its panel.
    pub fn pointer_down(&mut self, point: Vec2) -> bool {
        let hit = self
            .overlay
            .as_ref()
            .is_some_and(|o| o.is_settled() && PANEL_BOUNDS.contains(point));
        if hit {
            self.overlay = None;
        }
        hit
    }
}
