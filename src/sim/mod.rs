//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Timers run on the simulated clock advanced by `tick`
//! - Stable iteration order (by pool slot)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod effects;
pub mod events;
pub mod glitch;
pub mod hydrate;
pub mod lanes;
pub mod pool;
pub mod rule;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod warp;

pub use collision::{Contact, resolve_collisions};
pub use effects::{EffectFlags, EffectMachine, EffectState, PowerUpKind, PowerUpSet};
pub use events::{FloatingText, GameEvent, TextStyle};
pub use hydrate::{CrateItem, LaneItem, StroopItem};
pub use lanes::{LanePlan, LaneTransition};
pub use pool::{ObstaclePool, Row, RowKind};
pub use rule::{ALL_COLORS, Color, Rule, RuleHistory, RuleKind, generate_rule};
pub use snapshot::{RowView, Snapshot};
pub use spawn::{SpawnCursor, Spawner};
pub use state::{GamePhase, GameState, Progression};
pub use tick::{TickInput, tick};
pub use warp::{WarpPhase, WarpState};
