//! Gameplay tuning shared by every stage
//!
//! Stage-specific values (rotation, quotas, counts) live in chapter data;
//! everything here is constant for a whole run.

use serde::{Deserialize, Serialize};

use crate::sim::placement::DEFAULT_MAX_ATTEMPTS;

/// Which ruleset a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Walk the campaign stage by stage
    #[default]
    Story,
    /// One endless stage, score is knives stuck
    Infinite,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Story => "Story",
            GameMode::Infinite => "Infinite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "story" => Some(GameMode::Story),
            "infinite" | "endless" => Some(GameMode::Infinite),
            _ => None,
        }
    }
}

/// Run-wide tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing (seconds) ===
    /// Time a thrown knife takes to reach the target
    pub throw_flight_time: f32,
    /// Delay before the next knife is ready after a throw
    pub spawn_delay: f32,
    /// Pause between clearing a stage and loading the next
    pub stage_transition_delay: f32,
    /// Pause between a knife collision and game over
    pub game_over_delay: f32,

    // === Contact (degrees, target-local) ===
    /// A landing knife this close to a stuck knife or obstacle collides
    pub knife_contact_gap: f32,
    /// A stuck knife this close to a target-point completes it
    pub point_hit_gap: f32,

    // === Geometry (world units) ===
    pub target_radius: f32,
    /// Extra distance from the rim for stuck knives and obstacles
    pub stick_offset: f32,
    /// Extra distance from the rim for target-points
    pub point_offset: f32,

    /// Draws per placement before accepting a crowded angle
    pub max_placement_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            throw_flight_time: 0.12,
            spawn_delay: 0.5,
            stage_transition_delay: 0.15,
            game_over_delay: 0.5,

            knife_contact_gap: 10.0,
            point_hit_gap: 12.0,

            target_radius: 1.0,
            stick_offset: 0.3,
            point_offset: 2.0,

            max_placement_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Distance from the target center to a stuck knife or obstacle
    pub fn stick_radius(&self) -> f32 {
        self.target_radius + self.stick_offset
    }

    /// Distance from the target center to a target-point
    pub fn point_radius(&self) -> f32 {
        self.target_radius + self.point_offset
    }
}
