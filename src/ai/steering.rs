//! Steering forces for agent movement
//!
//! Classic per-agent force primitives: seek, arrive, the flocking trio
//! (separate/align/cohere), and whisker-based wall avoidance. Forces are
//! planar (the y component is dropped) and clamped to the configured
//! maximum before they ever reach an agent's acceleration.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Wall-probe query supplied by the collision layer built on the same grid:
/// does a ray from `position` along `direction` hit a wall within
/// `max_distance`?
pub trait WallProbe {
    fn is_wall_nearby(&self, position: Vec3, direction: Vec3, max_distance: f32) -> bool;
}

impl WallProbe for crate::world::GameMap {
    fn is_wall_nearby(&self, position: Vec3, direction: Vec3, max_distance: f32) -> bool {
        crate::world::GameMap::is_wall_nearby(self, position, direction, max_distance)
    }
}

/// Position/velocity snapshot of a nearby agent
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Result of the whisker avoidance pass
#[derive(Debug, Clone, Copy)]
pub struct Avoidance {
    /// Clamped steering force away from the detected walls
    pub force: Vec3,
    /// Whether any probe ray hit a wall
    pub is_avoiding: bool,
}

impl Avoidance {
    const NONE: Self = Self {
        force: Vec3::ZERO,
        is_avoiding: false,
    };
}

/// Steering tuning shared by a group of agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Steering {
    /// Top speed agents steer toward
    pub max_speed: f32,
    /// Cap applied to every force this solver returns
    pub max_force: f32,
    /// Distance at which arrive starts decelerating
    pub arrival_radius: f32,
    /// Neighbour distance considered "too close"
    pub separation_radius: f32,
    /// Neighbour distance for alignment and cohesion
    pub perception_radius: f32,
    pub seek_weight: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub avoidance_weight: f32,
    /// Center probe ray length
    pub look_ahead: f32,
    /// Angle of the outer whisker pair, radians
    pub whisker_angle: f32,
    /// Outer whisker ray length
    pub whisker_length: f32,
}

impl Default for Steering {
    fn default() -> Self {
        Self {
            max_speed: 15.0,
            max_force: 10.0,
            arrival_radius: 10.0,
            separation_radius: 5.0,
            perception_radius: 20.0,
            seek_weight: 1.2,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            avoidance_weight: 0.8,
            look_ahead: 12.0,
            whisker_angle: PI / 4.0,
            whisker_length: 8.0,
        }
    }
}

fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

impl Steering {
    fn clamp_force(&self, force: Vec3) -> Vec3 {
        force.clamp_length_max(self.max_force)
    }

    /// Steer toward a target at top speed
    #[must_use]
    pub fn seek(&self, position: Vec3, velocity: Vec3, target: Vec3) -> Vec3 {
        let desired = planar(target - position).normalize_or_zero() * self.max_speed;
        self.clamp_force(desired - planar(velocity))
    }

    /// Seek that decelerates linearly inside the arrival radius
    #[must_use]
    pub fn arrive(&self, position: Vec3, velocity: Vec3, target: Vec3) -> Vec3 {
        let offset = planar(target - position);
        let distance = offset.length();
        let speed = if distance < self.arrival_radius {
            self.max_speed * (distance / self.arrival_radius)
        } else {
            self.max_speed
        };
        let desired = offset.normalize_or_zero() * speed;
        self.clamp_force(desired - planar(velocity))
    }

    /// Push away from neighbours inside the separation radius, weighted
    /// inversely by distance. Exactly zero when none are in range.
    #[must_use]
    pub fn separate(&self, position: Vec3, velocity: Vec3, neighbors: &[Neighbor]) -> Vec3 {
        let mut steering = Vec3::ZERO;
        let mut count = 0;
        for neighbor in neighbors {
            let offset = planar(position - neighbor.position);
            let distance = offset.length();
            if distance > 0.0 && distance < self.separation_radius {
                steering += offset.normalize_or_zero() / distance;
                count += 1;
            }
        }
        if count == 0 {
            return Vec3::ZERO;
        }
        steering /= count as f32;
        let desired = steering.normalize_or_zero() * self.max_speed;
        self.clamp_force(desired - planar(velocity))
    }

    /// Match the mean velocity of neighbours inside the perception radius
    #[must_use]
    pub fn align(&self, position: Vec3, velocity: Vec3, neighbors: &[Neighbor]) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut count = 0;
        for neighbor in neighbors {
            if planar(position - neighbor.position).length() < self.perception_radius {
                sum += planar(neighbor.velocity);
                count += 1;
            }
        }
        if count == 0 {
            return Vec3::ZERO;
        }
        let desired = (sum / count as f32).normalize_or_zero() * self.max_speed;
        self.clamp_force(desired - planar(velocity))
    }

    /// Steer toward the mean position of neighbours inside the perception
    /// radius
    #[must_use]
    pub fn cohere(&self, position: Vec3, velocity: Vec3, neighbors: &[Neighbor]) -> Vec3 {
        let mut sum = Vec3::ZERO;
        let mut count = 0;
        for neighbor in neighbors {
            if planar(position - neighbor.position).length() < self.perception_radius {
                sum += planar(neighbor.position);
                count += 1;
            }
        }
        if count == 0 {
            return Vec3::ZERO;
        }
        let toward = sum / count as f32 - planar(position);
        let desired = toward.normalize_or_zero() * self.max_speed;
        self.clamp_force(desired - planar(velocity))
    }

    /// The full flocking mix: separation, alignment, cohesion, and seek,
    /// weighted and clamped
    #[must_use]
    pub fn flock(
        &self,
        position: Vec3,
        velocity: Vec3,
        target: Vec3,
        neighbors: &[Neighbor],
    ) -> Vec3 {
        let force = self.separate(position, velocity, neighbors) * self.separation_weight
            + self.align(position, velocity, neighbors) * self.alignment_weight
            + self.cohere(position, velocity, neighbors) * self.cohesion_weight
            + self.seek(position, velocity, target) * self.seek_weight;
        self.clamp_force(force)
    }

    /// Probe ahead with a center ray and four whiskers and steer away from
    /// whatever they hit. A center hit contributes a doubled force
    /// perpendicular to the heading; side hits subtract their whisker's
    /// direction. Returns zero force and `is_avoiding == false` when every
    /// ray is clear.
    #[must_use]
    pub fn avoid_walls(&self, position: Vec3, velocity: Vec3, probe: &impl WallProbe) -> Avoidance {
        let heading = planar(velocity).normalize_or_zero();
        if heading == Vec3::ZERO {
            return Avoidance::NONE;
        }

        let center = heading * self.look_ahead;
        let rotated = |angle: f32| Quat::from_rotation_y(angle) * heading;
        let whiskers = [
            (rotated(self.whisker_angle) * self.whisker_length, 1.5),
            (rotated(-self.whisker_angle) * self.whisker_length, 1.5),
            (rotated(self.whisker_angle / 2.0) * (self.look_ahead * 0.8), 1.2),
            (rotated(-self.whisker_angle / 2.0) * (self.look_ahead * 0.8), 1.2),
        ];

        let mut force = Vec3::ZERO;
        let mut hit = false;

        if probe.is_wall_nearby(position, heading, self.look_ahead) {
            force += Vec3::new(-center.z, 0.0, center.x) * 2.0;
            hit = true;
        }
        for (ray, weight) in whiskers {
            let length = ray.length();
            if probe.is_wall_nearby(position, ray / length, length) {
                force -= ray * weight;
                hit = true;
            }
        }

        if !hit {
            return Avoidance::NONE;
        }
        Avoidance {
            force: force.normalize_or_zero() * self.max_force,
            is_avoiding: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoWalls;
    impl WallProbe for NoWalls {
        fn is_wall_nearby(&self, _: Vec3, _: Vec3, _: f32) -> bool {
            false
        }
    }

    /// Infinite wall plane at the given x, seen from the -x side
    struct WallAt(f32);
    impl WallProbe for WallAt {
        fn is_wall_nearby(&self, position: Vec3, direction: Vec3, max_distance: f32) -> bool {
            direction.x > 0.0 && (self.0 - position.x) / direction.x <= max_distance
        }
    }

    #[test]
    fn test_seek_points_at_target_and_is_clamped() {
        let steering = Steering::default();
        let force = steering.seek(Vec3::ZERO, Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        assert!(force.x > 0.0);
        assert!(force.length() <= steering.max_force + 1e-4);
    }

    #[test]
    fn test_arrive_decelerates_inside_radius() {
        let steering = Steering::default();
        let near = steering.arrive(Vec3::ZERO, Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let far = steering.arrive(Vec3::ZERO, Vec3::ZERO, Vec3::new(200.0, 0.0, 0.0));
        assert!(near.length() < far.length());
    }

    #[test]
    fn test_separation_with_no_neighbors_is_exactly_zero() {
        let steering = Steering::default();
        let out = steering.separate(Vec3::new(3.0, 0.0, 4.0), Vec3::X, &[]);
        assert_eq!(out, Vec3::ZERO);

        // a neighbour outside the radius also contributes nothing
        let distant = [Neighbor {
            position: Vec3::new(100.0, 0.0, 0.0),
            velocity: Vec3::ZERO,
        }];
        assert_eq!(
            steering.separate(Vec3::ZERO, Vec3::ZERO, &distant),
            Vec3::ZERO
        );
    }

    #[test]
    fn test_separation_pushes_apart() {
        let steering = Steering::default();
        let crowding = [Neighbor {
            position: Vec3::new(1.0, 0.0, 0.0),
            velocity: Vec3::ZERO,
        }];
        let force = steering.separate(Vec3::ZERO, Vec3::ZERO, &crowding);
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_align_matches_mean_velocity() {
        let steering = Steering::default();
        let flock = [
            Neighbor {
                position: Vec3::new(1.0, 0.0, 0.0),
                velocity: Vec3::new(0.0, 0.0, 5.0),
            },
            Neighbor {
                position: Vec3::new(-1.0, 0.0, 0.0),
                velocity: Vec3::new(0.0, 0.0, 3.0),
            },
        ];
        let force = steering.align(Vec3::ZERO, Vec3::ZERO, &flock);
        assert!(force.z > 0.0);
        assert!(force.x.abs() < 1e-4);
    }

    #[test]
    fn test_cohere_steers_toward_group_center() {
        let steering = Steering::default();
        let flock = [
            Neighbor {
                position: Vec3::new(10.0, 0.0, 2.0),
                velocity: Vec3::ZERO,
            },
            Neighbor {
                position: Vec3::new(10.0, 0.0, -2.0),
                velocity: Vec3::ZERO,
            },
        ];
        let force = steering.cohere(Vec3::ZERO, Vec3::ZERO, &flock);
        assert!(force.x > 0.0);
        assert!(force.z.abs() < 1e-4);
    }

    #[test]
    fn test_avoidance_clear_returns_zero() {
        let steering = Steering::default();
        let out = steering.avoid_walls(Vec3::ZERO, Vec3::X * 5.0, &NoWalls);
        assert!(!out.is_avoiding);
        assert_eq!(out.force, Vec3::ZERO);
    }

    #[test]
    fn test_avoidance_detects_wall_ahead() {
        let steering = Steering::default();
        let out = steering.avoid_walls(Vec3::ZERO, Vec3::X * 5.0, &WallAt(6.0));
        assert!(out.is_avoiding);
        assert!(out.force.length() > 0.0);
    }

    #[test]
    fn test_avoidance_with_zero_velocity() {
        // no heading means no probes to cast
        let steering = Steering::default();
        let out = steering.avoid_walls(Vec3::ZERO, Vec3::ZERO, &WallAt(1.0));
        assert!(!out.is_avoiding);
    }

    #[test]
    fn test_flock_is_clamped() {
        let steering = Steering::default();
        let crowd: Vec<Neighbor> = (0..8)
            .map(|k| Neighbor {
                position: Vec3::new(k as f32 * 0.5 + 0.5, 0.0, 0.0),
                velocity: Vec3::new(0.0, 0.0, 10.0),
            })
            .collect();
        let force = steering.flock(Vec3::ZERO, Vec3::ZERO, Vec3::new(50.0, 0.0, 50.0), &crowd);
        assert!(force.length() <= steering.max_force + 1e-4);
    }
}
