//! Non-overlapping angular placement around the target
//!
//! Obstacles and target-points are scattered around the disc by rejection
//! sampling: draw a random angle, reject it if it sits closer than the minimum
//! gap to anything already placed, and retry a bounded number of times. When
//! the circle is too crowded the last draw is accepted anyway so stage setup
//! always completes.

use rand::Rng;

use super::rng::uniform;
use crate::angular_distance;

/// Default number of draws per placement
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// A set of occupied slots and the gap a new angle must keep from them
#[derive(Debug, Clone, Copy)]
pub struct GapConstraint<'a> {
    pub slots: &'a [f32],
    pub min_gap: f32,
}

impl<'a> GapConstraint<'a> {
    pub fn new(slots: &'a [f32], min_gap: f32) -> Self {
        Self { slots, min_gap }
    }

    /// True if `angle` keeps at least `min_gap` from every slot
    pub fn admits(&self, angle: f32) -> bool {
        self.slots
            .iter()
            .all(|&slot| angular_distance(angle, slot) >= self.min_gap)
    }
}

/// Outcome of a single placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Chosen angle in degrees, [0, 360)
    pub angle: f32,
    /// Number of draws used
    pub attempts: u32,
    /// False when the retry budget ran out and the gap may be violated
    pub satisfied: bool,
}

/// Bounded rejection sampler for angles on a circle
#[derive(Debug, Clone, Copy)]
pub struct AngularPlacementSolver {
    max_attempts: u32,
}

impl Default for AngularPlacementSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl AngularPlacementSolver {
    /// A budget of 0 still draws once
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw an angle that satisfies every constraint, or the last draw when
    /// none does within the budget
    pub fn place_one_constrained<R: Rng>(
        &self,
        rng: &mut R,
        constraints: &[GapConstraint<'_>],
    ) -> Placement {
        let mut angle = 0.0;
        for attempt in 1..=self.max_attempts {
            angle = draw_angle(rng);
            if constraints.iter().all(|c| c.admits(angle)) {
                return Placement {
                    angle,
                    attempts: attempt,
                    satisfied: true,
                };
            }
        }

        log::warn!(
            "No angle cleared the gap after {} attempts, accepting {:.1}°",
            self.max_attempts,
            angle
        );
        Placement {
            angle,
            attempts: self.max_attempts,
            satisfied: false,
        }
    }

    /// Single placement against one occupied set
    pub fn place_one<R: Rng>(&self, rng: &mut R, occupied: &[f32], min_gap: f32) -> f32 {
        self.place_one_constrained(rng, &[GapConstraint::new(occupied, min_gap)])
            .angle
    }

    /// Place `count` angles, appending each to `occupied` before the next draw.
    ///
    /// Returns the new angles in placement order.
    pub fn place_many<R: Rng>(
        &self,
        rng: &mut R,
        count: usize,
        occupied: &mut Vec<f32>,
        min_gap: f32,
    ) -> Vec<f32> {
        let mut placed = Vec::with_capacity(count);
        for _ in 0..count {
            let angle = self.place_one(rng, occupied.as_slice(), min_gap);
            occupied.push(angle);
            placed.push(angle);
        }
        placed
    }

    /// Place `count` angles that keep `min_gap` from `occupied` and
    /// `reserved_gap` from `reserved`.
    ///
    /// Each new angle is appended to both sets, so later angles in the batch
    /// keep the reserved gap from earlier ones.
    pub fn place_many_reserved<R: Rng>(
        &self,
        rng: &mut R,
        count: usize,
        occupied: &mut Vec<f32>,
        min_gap: f32,
        reserved: &mut Vec<f32>,
        reserved_gap: f32,
    ) -> Vec<f32> {
        let mut placed = Vec::with_capacity(count);
        for _ in 0..count {
            let placement = self.place_one_constrained(
                rng,
                &[
                    GapConstraint::new(occupied.as_slice(), min_gap),
                    GapConstraint::new(reserved.as_slice(), reserved_gap),
                ],
            );
            occupied.push(placement.angle);
            reserved.push(placement.angle);
            placed.push(placement.angle);
        }
        placed
    }
}

fn draw_angle<R: Rng>(rng: &mut R) -> f32 {
    crate::normalize_degrees(uniform(rng, 0.0, 360.0))
}
