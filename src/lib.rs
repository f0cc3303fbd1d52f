//! Knife Spin - a knife-throwing arcade game around a rotating target
//!
//! Core modules:
//! - `sim`: Deterministic simulation (rotation, placement, stage lifecycle)
//! - `settings`: Gameplay tuning shared by every stage
//! - `records`: Best stage / best infinite run

pub mod records;
pub mod settings;
pub mod sim;

pub use records::Records;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics step)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World angle (degrees) where thrown knives meet the target: straight down
    pub const IMPACT_ANGLE: f32 = 180.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest signed difference `b - a` in degrees, in (-180, 180]
#[inline]
pub fn delta_angle(a: f32, b: f32) -> f32 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Shortest-arc distance between two angles in degrees, in [0, 180]
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    delta_angle(a, b).abs()
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Position of a slot on the circle around `center`.
///
/// Angle 0 points up and positive angles turn counter-clockwise, matching how
/// the target's rotation is integrated.
#[inline]
pub fn slot_position(center: Vec2, angle_deg: f32, radius: f32) -> Vec2 {
    let theta = angle_deg.to_radians();
    center + Vec2::new(-theta.sin(), theta.cos()) * radius
}
