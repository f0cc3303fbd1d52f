//! Game state and stage setup
//!
//! `GameState` is the stage coordinator: it owns the target, the knives and
//! the placed items, and is passed explicitly to `tick` and the presentation
//! layer. Nothing here is global.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::chapter::{Campaign, StageSettings};
use super::placement::AngularPlacementSolver;
use super::rng::RngState;
use super::rotation::RotationController;
use crate::records::Records;
use crate::settings::{GameMode, Settings};
use crate::slot_position;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Target spinning, knives can be thrown
    Playing,
    /// Stage cleared, waiting to load the next one
    Transition,
    /// A knife hit a stuck knife, waiting to end the run
    Dying,
    /// Game is paused
    Paused,
    /// Run ended by a collision
    GameOver,
    /// Every story stage cleared
    Cleared,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Stage set up (global index, 0-based)
    StageStarted { stage: usize },
    KnifeReady { id: u32 },
    KnifeThrown { id: u32 },
    /// Knife stuck at a target-local angle
    KnifeStuck { id: u32, angle: f32 },
    TargetPointCompleted { id: u32, remaining: usize },
    /// Knife landed on a stuck knife or obstacle
    KnifeCollision { id: u32, angle: f32 },
    StageCleared { stage: usize },
    AllStagesCleared,
    GameOver,
    Paused,
    Resumed,
}

/// A knife on its way to the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlyingKnife {
    pub id: u32,
    /// Seconds until it reaches the target
    pub time_left: f32,
}

/// A knife stuck in the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StuckKnife {
    pub id: u32,
    /// Target-local angle (degrees)
    pub angle: f32,
    /// Pre-placed at stage start rather than thrown
    pub obstacle: bool,
}

/// A collectible marker ringing the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetPoint {
    pub id: u32,
    /// Target-local angle (degrees)
    pub angle: f32,
    pub completed: bool,
}

/// Complete game state (deterministic for a given seed and input stream, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub mode: GameMode,
    pub campaign: Campaign,
    pub settings: Settings,
    /// Current phase
    pub phase: GamePhase,
    /// Phase to return to when unpausing
    pub paused_from: GamePhase,
    /// Seconds left before a pending Transition or Dying phase resolves
    pub phase_timer: f32,
    /// Global story stage index (0-based)
    pub stage_index: usize,
    /// Knives needed to clear the current stage
    pub required_knives: u32,
    /// Knives stuck this stage (story)
    pub stuck_count: u32,
    /// Knives stuck this run (infinite)
    pub infinite_count: u32,
    /// Target rotation in degrees, [0, 360)
    pub target_angle: f32,
    pub rotation: RotationController,
    /// Knife waiting to be thrown
    pub ready_knife: Option<u32>,
    /// Seconds until the next knife is ready
    pub respawn_timer: Option<f32>,
    pub flying: Vec<FlyingKnife>,
    /// Stuck knives and obstacles (sorted by id)
    pub knives: Vec<StuckKnife>,
    pub points: Vec<TargetPoint>,
    /// Angles claimed by obstacles and points this stage
    pub occupied: Vec<f32>,
    pub records: Records,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub events: Vec<GameEvent>,
    /// Live RNG stream; serialized so a restored run draws the same values
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a run and set up its first stage
    pub fn new(campaign: Campaign, settings: Settings, mode: GameMode, seed: u64) -> Self {
        let mut state = Self {
            seed,
            mode,
            campaign,
            settings,
            phase: GamePhase::Playing,
            paused_from: GamePhase::Playing,
            phase_timer: 0.0,
            stage_index: 0,
            required_knives: 0,
            stuck_count: 0,
            infinite_count: 0,
            target_angle: 0.0,
            rotation: RotationController::default(),
            ready_knife: None,
            respawn_timer: None,
            flying: Vec::new(),
            knives: Vec::new(),
            points: Vec::new(),
            occupied: Vec::new(),
            records: Records::new(),
            time_ticks: 0,
            events: Vec::new(),
            rng: RngState::new(seed).to_rng(),
            next_id: 1,
        };

        log::info!("{} run starting with seed {}", mode.as_str(), seed);
        state.setup_stage();
        state.spawn_knife();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Settings of the stage being played
    pub fn stage_settings(&self) -> &StageSettings {
        match self.mode {
            GameMode::Story => self.campaign.stage(self.stage_index),
            GameMode::Infinite => self.campaign.infinite_settings(),
        }
    }

    /// Configure rotation and place obstacles and points for the current stage
    pub fn setup_stage(&mut self) {
        let stage = self.stage_settings().clone();

        self.required_knives = stage.required_knives;
        self.stuck_count = 0;
        self.target_angle = 0.0;
        self.rotation.initialize(stage.rotation.clone(), &mut self.rng);

        self.occupied.clear();
        self.spawn_obstacles(&stage);
        if self.mode == GameMode::Story {
            self.spawn_target_points(&stage);
        }

        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::StageStarted {
            stage: self.stage_index,
        });
        log::info!(
            "Stage {} ready: {} knives, {} obstacles, {} points",
            self.stage_index + 1,
            self.required_knives,
            stage.obstacle_count,
            self.points.len()
        );
    }

    fn solver(&self) -> AngularPlacementSolver {
        AngularPlacementSolver::new(self.settings.max_placement_attempts)
    }

    fn spawn_obstacles(&mut self, stage: &StageSettings) {
        let angles = self.solver().place_many(
            &mut self.rng,
            stage.obstacle_count as usize,
            &mut self.occupied,
            stage.min_angle_gap,
        );
        for angle in angles {
            let id = self.next_entity_id();
            self.knives.push(StuckKnife {
                id,
                angle,
                obstacle: true,
            });
        }
        log::debug!("Obstacles placed at {:?}", self.occupied);
    }

    fn spawn_target_points(&mut self, stage: &StageSettings) {
        let mut reserved = Vec::new();
        let angles = self.solver().place_many_reserved(
            &mut self.rng,
            stage.target_point_count as usize,
            &mut self.occupied,
            stage.min_angle_gap,
            &mut reserved,
            stage.target_point_gap,
        );
        for angle in angles {
            let id = self.next_entity_id();
            self.points.push(TargetPoint {
                id,
                angle,
                completed: false,
            });
        }
        log::debug!("Target points placed at {:?}", reserved);
    }

    /// Make a new knife ready to throw
    pub fn spawn_knife(&mut self) {
        if self.phase != GamePhase::Playing || self.ready_knife.is_some() {
            return;
        }
        let id = self.next_entity_id();
        self.ready_knife = Some(id);
        self.events.push(GameEvent::KnifeReady { id });
    }

    /// Remove every knife, obstacle and point and cancel pending timers
    pub fn clear_stage(&mut self) {
        self.ready_knife = None;
        self.respawn_timer = None;
        self.flying.clear();
        self.knives.clear();
        self.points.clear();
        self.occupied.clear();
        self.phase_timer = 0.0;
    }

    /// Target-points not yet hit
    pub fn points_remaining(&self) -> usize {
        self.points.iter().filter(|p| !p.completed).count()
    }

    pub fn all_points_completed(&self) -> bool {
        self.points_remaining() == 0
    }

    /// Resume the current stage from scratch after a game over
    pub fn continue_run(&mut self) {
        if self.phase != GamePhase::GameOver {
            return;
        }
        log::info!("Continuing at stage {}", self.stage_index + 1);
        self.reload_stage();
    }

    /// Replay the current stage
    pub fn restart_stage(&mut self) {
        if self.mode == GameMode::Infinite {
            self.infinite_count = 0;
        }
        self.reload_stage();
    }

    /// Replay from the first stage
    pub fn restart_chapter(&mut self) {
        self.stage_index = 0;
        self.restart_stage();
    }

    pub(crate) fn reload_stage(&mut self) {
        self.clear_stage();
        self.phase = GamePhase::Playing;
        self.setup_stage();
        self.spawn_knife();
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// World-space angle of a target-local angle
    pub fn world_angle(&self, local: f32) -> f32 {
        crate::normalize_degrees(self.target_angle + local)
    }

    /// World positions of stuck knives and obstacles around `center`
    pub fn knife_positions(&self, center: Vec2) -> Vec<Vec2> {
        let radius = self.settings.stick_radius();
        self.knives
            .iter()
            .map(|k| slot_position(center, self.world_angle(k.angle), radius))
            .collect()
    }

    /// World positions of target-points not yet hit around `center`
    pub fn point_positions(&self, center: Vec2) -> Vec<Vec2> {
        let radius = self.settings.point_radius();
        self.points
            .iter()
            .filter(|p| !p.completed)
            .map(|p| slot_position(center, self.world_angle(p.angle), radius))
            .collect()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.knives.sort_by_key(|k| k.id);
        self.points.sort_by_key(|p| p.id);
        self.flying.sort_by_key(|k| k.id);
    }
}
