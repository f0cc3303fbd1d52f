//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod chapter;
pub mod placement;
pub mod rng;
pub mod rotation;
pub mod state;
pub mod tick;

pub use chapter::{Campaign, ChapterData, ConfigError, StageSettings};
pub use placement::{AngularPlacementSolver, GapConstraint, Placement};
pub use rng::RngState;
pub use rotation::{RotationConfig, RotationController, RotationState};
pub use state::{FlyingKnife, GameEvent, GamePhase, GameState, StuckKnife, TargetPoint};
pub use tick::{TickInput, tick};
