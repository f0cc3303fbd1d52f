//! Target rotation controller
//!
//! The target does not spin at a constant rate. Each cycle it accelerates to a
//! randomly drawn top speed, holds it for a random time, brakes to a stop,
//! waits, and then starts again, optionally in the other direction:
//!
//! ```text
//! Accelerating -> Holding -> Decelerating -> Waiting -> Accelerating ...
//! ```
//!
//! Speeds are in degrees/second. Positive angular velocity turns the target
//! counter-clockwise.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rng::{coin, uniform};
use crate::move_toward;

/// Lower bound of the random acceleration ratio
pub const MIN_ACCELERATION_RATIO: f32 = 0.3;
/// Accelerating ends once speed is this close to the target speed
pub const ACCELERATION_SNAP: f32 = 0.5;
/// Decelerating ends once speed drops to this value
pub const STOP_THRESHOLD: f32 = 0.1;

/// Phase of the rotation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationState {
    Accelerating,
    Holding,
    Decelerating,
    Waiting,
}

/// Rotation parameters for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub min_start_speed: f32,
    pub max_start_speed: f32,
    /// Range the per-cycle top speed is drawn from
    pub min_max_speed: f32,
    pub max_max_speed: f32,
    /// Upper bound of the acceleration ratio (0-1); the lower bound is fixed
    pub acceleration_ratio: f32,
    pub rotate_clockwise: bool,

    pub min_hold_time: f32,
    pub max_hold_time: f32,
    /// Braking rate (degrees/second²)
    pub reverse_deceleration: f32,
    /// Time spent stopped between cycles (seconds)
    pub reverse_wait_time: f32,
    /// Whether each new cycle may flip direction
    pub reverse_direction: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            min_start_speed: 0.0,
            max_start_speed: 80.0,
            min_max_speed: 80.0,
            max_max_speed: 200.0,
            acceleration_ratio: 0.3,
            rotate_clockwise: true,
            min_hold_time: 1.0,
            max_hold_time: 3.0,
            reverse_deceleration: 100.0,
            reverse_wait_time: 0.3,
            reverse_direction: true,
        }
    }
}

/// Per-target rotation state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationController {
    config: RotationConfig,
    state: RotationState,
    current_speed: f32,
    target_speed: f32,
    /// +1 counter-clockwise, -1 clockwise
    direction: f32,
    speed_change_rate: f32,
    hold_timer: f32,
    hold_duration: f32,
    wait_timer: f32,
    running: bool,
    angular_velocity: f32,
}

impl Default for RotationController {
    fn default() -> Self {
        Self {
            config: RotationConfig::default(),
            state: RotationState::Waiting,
            current_speed: 0.0,
            target_speed: 0.0,
            direction: 1.0,
            speed_change_rate: 0.0,
            hold_timer: 0.0,
            hold_duration: 0.0,
            wait_timer: 0.0,
            running: false,
            angular_velocity: 0.0,
        }
    }
}

impl RotationController {
    /// Create a controller already initialized for a stage
    pub fn new<R: Rng>(config: RotationConfig, rng: &mut R) -> Self {
        let mut controller = Self::default();
        controller.initialize(config, rng);
        controller
    }

    /// Start a fresh cycle with the given stage parameters
    pub fn initialize<R: Rng>(&mut self, config: RotationConfig, rng: &mut R) {
        self.config = config;
        self.roll_cycle(rng);

        self.direction = if self.config.rotate_clockwise { -1.0 } else { 1.0 };
        if coin(rng) {
            self.direction = -self.direction;
        }

        self.state = RotationState::Accelerating;
        self.hold_timer = 0.0;
        self.hold_duration = 0.0;
        self.wait_timer = 0.0;
        self.running = true;
        self.angular_velocity = self.direction * self.current_speed;
    }

    /// Redraw start speed, top speed and acceleration for a new cycle
    fn roll_cycle<R: Rng>(&mut self, rng: &mut R) {
        let cfg = &self.config;
        self.target_speed = uniform(rng, cfg.min_max_speed, cfg.max_max_speed).max(0.0);
        self.current_speed = uniform(rng, cfg.min_start_speed, cfg.max_start_speed).max(0.0);
        let ratio = uniform(rng, MIN_ACCELERATION_RATIO, cfg.acceleration_ratio);
        self.speed_change_rate = self.target_speed * ratio;
    }

    /// Advance one timestep and return the angular velocity for it
    pub fn tick<R: Rng>(&mut self, dt: f32, rng: &mut R) -> f32 {
        if !self.running {
            self.angular_velocity = 0.0;
            return 0.0;
        }

        match self.state {
            RotationState::Accelerating => {
                self.current_speed =
                    move_toward(self.current_speed, self.target_speed, self.speed_change_rate * dt);
                self.angular_velocity = self.direction * self.current_speed;

                if (self.current_speed - self.target_speed).abs() < ACCELERATION_SNAP {
                    self.state = RotationState::Holding;
                    self.hold_duration =
                        uniform(rng, self.config.min_hold_time, self.config.max_hold_time);
                    self.hold_timer = 0.0;
                }
            }

            RotationState::Holding => {
                self.angular_velocity = self.direction * self.target_speed;
                self.hold_timer += dt;

                if self.hold_timer >= self.hold_duration {
                    self.state = RotationState::Decelerating;
                }
            }

            RotationState::Decelerating => {
                self.current_speed =
                    move_toward(self.current_speed, 0.0, self.config.reverse_deceleration * dt);
                self.angular_velocity = self.direction * self.current_speed;

                if self.current_speed <= STOP_THRESHOLD {
                    self.state = RotationState::Waiting;
                    self.current_speed = 0.0;
                    self.angular_velocity = 0.0;
                    self.wait_timer = 0.0;
                }
            }

            RotationState::Waiting => {
                self.angular_velocity = 0.0;
                self.wait_timer += dt;

                if self.wait_timer >= self.config.reverse_wait_time {
                    if self.config.reverse_direction && coin(rng) {
                        self.direction = -self.direction;
                    }
                    self.roll_cycle(rng);
                    self.state = RotationState::Accelerating;
                }
            }
        }

        self.angular_velocity
    }

    /// Halt rotation. Safe to call from any state, any number of times.
    pub fn stop(&mut self) {
        self.running = false;
        self.angular_velocity = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn speed_change_rate(&self) -> f32 {
        self.speed_change_rate
    }

    /// Velocity emitted by the last tick (0 when stopped)
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::RngState;
    use proptest::prelude::*;

    fn scenario_config() -> RotationConfig {
        RotationConfig {
            min_start_speed: 10.0,
            max_start_speed: 10.0,
            min_max_speed: 100.0,
            max_max_speed: 100.0,
            acceleration_ratio: 1.0,
            rotate_clockwise: true,
            min_hold_time: 1.0,
            max_hold_time: 1.0,
            reverse_deceleration: 50.0,
            reverse_wait_time: 0.5,
            reverse_direction: false,
        }
    }

    /// Seed whose first coin flip keeps the base direction
    fn unflipped_seed() -> u64 {
        (0..1000u64)
            .find(|&seed| {
                let mut rng = RngState::new(seed).to_rng();
                RotationController::new(scenario_config(), &mut rng).direction() < 0.0
            })
            .expect("some seed keeps the base direction")
    }

    #[test]
    fn test_initialize_scenario() {
        let mut rng = RngState::new(unflipped_seed()).to_rng();
        let ctrl = RotationController::new(scenario_config(), &mut rng);

        assert_eq!(ctrl.state(), RotationState::Accelerating);
        assert_eq!(ctrl.current_speed(), 10.0);
        assert_eq!(ctrl.target_speed(), 100.0);
        assert_eq!(ctrl.direction(), -1.0);
        assert!(ctrl.speed_change_rate() >= 30.0 && ctrl.speed_change_rate() <= 100.0);
    }

    #[test]
    fn test_reaches_hold_within_expected_time() {
        let mut rng = RngState::new(3).to_rng();
        let mut ctrl = RotationController::new(scenario_config(), &mut rng);
        let bound = (100.0 - 10.0) / ctrl.speed_change_rate();

        let dt = 0.1;
        let mut elapsed = 0.0;
        while ctrl.state() == RotationState::Accelerating {
            ctrl.tick(dt, &mut rng);
            elapsed += dt;
            assert!(elapsed <= bound + dt + 1e-3, "took {elapsed}s, bound {bound}s");
        }
        assert_eq!(ctrl.state(), RotationState::Holding);
        assert!((ctrl.current_speed() - 100.0).abs() < ACCELERATION_SNAP);
    }

    #[test]
    fn test_full_cycle_returns_to_accelerating() {
        let mut rng = RngState::new(11).to_rng();
        let mut ctrl = RotationController::new(scenario_config(), &mut rng);
        let mut seen = vec![ctrl.state()];

        for _ in 0..200 {
            ctrl.tick(0.1, &mut rng);
            if seen.last() != Some(&ctrl.state()) {
                seen.push(ctrl.state());
            }
        }

        assert_eq!(
            &seen[..5],
            &[
                RotationState::Accelerating,
                RotationState::Holding,
                RotationState::Decelerating,
                RotationState::Waiting,
                RotationState::Accelerating,
            ]
        );
    }

    /// Ticks that start in Holding and in Waiting during the first cycle
    fn first_cycle_ticks(dt: f32) -> (u32, u32) {
        let mut rng = RngState::new(11).to_rng();
        let mut ctrl = RotationController::new(scenario_config(), &mut rng);
        let (mut holding, mut waiting) = (0, 0);

        for _ in 0..1000 {
            let before = ctrl.state();
            ctrl.tick(dt, &mut rng);
            match before {
                RotationState::Holding => holding += 1,
                RotationState::Waiting => waiting += 1,
                _ => {}
            }
            if before == RotationState::Waiting && ctrl.state() == RotationState::Accelerating {
                break;
            }
        }
        (holding, waiting)
    }

    #[test]
    fn test_hold_and_wait_durations() {
        // hold 1.0s, wait 0.5s
        let (holding, waiting) = first_cycle_ticks(0.1);
        assert!((9..=11).contains(&holding), "held for {holding} ticks");
        assert!((4..=6).contains(&waiting), "waited for {waiting} ticks");

        // Exact in binary, so the threshold tick is not blurred by rounding
        assert_eq!(first_cycle_ticks(0.25), (4, 2));
    }

    #[test]
    fn test_holding_uses_target_speed() {
        let mut rng = RngState::new(5).to_rng();
        let mut ctrl = RotationController::new(scenario_config(), &mut rng);
        while ctrl.state() != RotationState::Holding {
            ctrl.tick(0.1, &mut rng);
        }
        let v = ctrl.tick(0.1, &mut rng);
        assert_eq!(v, ctrl.direction() * 100.0);
    }

    #[test]
    fn test_no_direction_flip_when_disabled() {
        let mut rng = RngState::new(9).to_rng();
        let mut ctrl = RotationController::new(scenario_config(), &mut rng);
        let dir = ctrl.direction();
        for _ in 0..2000 {
            ctrl.tick(0.05, &mut rng);
            assert_eq!(ctrl.direction(), dir);
        }
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut rng = RngState::new(1).to_rng();
        let mut ctrl = RotationController::new(RotationConfig::default(), &mut rng);
        ctrl.tick(0.02, &mut rng);

        ctrl.stop();
        assert_eq!(ctrl.angular_velocity(), 0.0);
        ctrl.stop();
        assert_eq!(ctrl.angular_velocity(), 0.0);
        assert!(!ctrl.is_running());

        let state = ctrl.state();
        assert_eq!(ctrl.tick(0.02, &mut rng), 0.0);
        assert_eq!(ctrl.state(), state);
    }

    #[test]
    fn test_default_controller_is_idle() {
        let mut rng = RngState::new(1).to_rng();
        let mut ctrl = RotationController::default();
        assert_eq!(ctrl.tick(0.02, &mut rng), 0.0);
    }

    #[test]
    fn test_inverted_config_does_not_panic() {
        let config = RotationConfig {
            min_start_speed: 90.0,
            max_start_speed: 10.0,
            min_max_speed: 300.0,
            max_max_speed: 100.0,
            min_hold_time: 2.0,
            max_hold_time: 0.5,
            ..RotationConfig::default()
        };
        let mut rng = RngState::new(21).to_rng();
        let mut ctrl = RotationController::new(config, &mut rng);
        assert!((10.0..=90.0).contains(&ctrl.current_speed()));
        assert!((100.0..=300.0).contains(&ctrl.target_speed()));
        for _ in 0..1000 {
            ctrl.tick(0.02, &mut rng);
        }
    }

    proptest! {
        #[test]
        fn prop_speed_invariants(
            seed in any::<u64>(),
            min_start in 0.0f32..100.0,
            start_span in 0.0f32..100.0,
            min_max in 1.0f32..300.0,
            max_span in 0.0f32..200.0,
            ratio in 0.0f32..1.0,
            decel in 10.0f32..400.0,
            wait in 0.0f32..1.0,
        ) {
            let config = RotationConfig {
                min_start_speed: min_start,
                max_start_speed: min_start + start_span,
                min_max_speed: min_max,
                max_max_speed: min_max + max_span,
                acceleration_ratio: ratio,
                min_hold_time: 0.1,
                max_hold_time: 0.5,
                reverse_deceleration: decel,
                reverse_wait_time: wait,
                ..RotationConfig::default()
            };
            let mut rng = RngState::new(seed).to_rng();
            let mut ctrl = RotationController::new(config, &mut rng);
            let dt = crate::consts::SIM_DT;

            for _ in 0..600 {
                let before_state = ctrl.state();
                let before_gap = (ctrl.current_speed() - ctrl.target_speed()).abs();
                let v = ctrl.tick(dt, &mut rng);

                prop_assert!(ctrl.current_speed() >= 0.0);
                if before_state == RotationState::Waiting || ctrl.state() == RotationState::Waiting {
                    prop_assert_eq!(v, 0.0);
                }
                if before_state == RotationState::Accelerating
                    && ctrl.state() == RotationState::Accelerating
                {
                    let after_gap = (ctrl.current_speed() - ctrl.target_speed()).abs();
                    prop_assert!(after_gap <= before_gap + 1e-3);
                }
            }
        }
    }
}
