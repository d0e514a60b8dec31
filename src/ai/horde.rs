//! Agent manager
//!
//! Owns the live set of NPC agents in a hecs world and drives the whole
//! per-tick pipeline: recompute the path to the target, step each agent's
//! behavior machine, apply steering, and remove agents whose death timer
//! has elapsed. Single-threaded and frame-stepped: the map is read-only
//! here and every agent owns its own mutable state.

use glam::Vec3;
use hecs::Entity;
use rand::Rng;

use crate::ai::behavior::{BehaviorConfig, BehaviorState, BehaviorStateMachine};
use crate::ai::steering::{Neighbor, Steering};
use crate::nav::{Path, find_path};
use crate::world::GameMap;

/// Position and velocity of one agent
#[derive(Debug, Clone, Copy)]
pub struct AgentBody {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Per-agent movement caps
#[derive(Debug, Clone, Copy)]
pub struct Locomotion {
    pub max_speed: f32,
    pub max_force: f32,
}

/// Hit-point counter, mutated by damage events
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub hit_points: i32,
}

/// This tick's route to the target, recomputed every tick
#[derive(Debug, Clone, Default)]
pub struct CachedPath(pub Option<Path>);

/// What the horde is reacting to this tick
#[derive(Debug, Clone, Copy)]
pub struct TargetState {
    pub position: Vec3,
    pub attacking: bool,
}

/// Signals the manager raises for its external collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HordeEvent {
    /// An attacking agent's damage tick landed on the target
    DamageTarget { agent: Entity, amount: f32 },
    /// An agent entered Death; its path visualization should be dropped
    PathCleared { agent: Entity },
    /// An agent entered the terminal Death state
    AgentDied { agent: Entity },
    /// A dead agent's exit timer elapsed and it left the live set
    AgentRemoved { agent: Entity },
}

/// The live set of agents and the logic that drives them
pub struct Horde {
    world: hecs::World,
    steering: Steering,
    behavior: BehaviorConfig,
    /// Distance at which the current waypoint counts as reached
    pub waypoint_tolerance: f32,
    /// Hit points given to newly spawned agents
    pub spawn_hit_points: i32,
}

impl Horde {
    #[must_use]
    pub fn new(steering: Steering, behavior: BehaviorConfig) -> Self {
        Self {
            world: hecs::World::new(),
            steering,
            behavior,
            waypoint_tolerance: 2.0,
            spawn_hit_points: 200,
        }
    }

    /// Number of live agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Spawn an agent at a world position
    pub fn spawn(&mut self, position: Vec3) -> Entity {
        log::debug!("spawning agent at {position}");
        self.world.spawn((
            AgentBody {
                position,
                velocity: Vec3::X,
            },
            Locomotion {
                max_speed: self.steering.max_speed,
                max_force: self.steering.max_force,
            },
            Health {
                hit_points: self.spawn_hit_points,
            },
            BehaviorStateMachine::new(self.behavior.clone()),
            CachedPath::default(),
        ))
    }

    /// Spawn on a uniformly random traversable tile. Retries are bounded;
    /// if they all miss, the first traversable tile is used. Returns `None`
    /// only when the map has no ground at all.
    pub fn spawn_at_random_ground<R: Rng>(&mut self, map: &GameMap, rng: &mut R) -> Option<Entity> {
        let graph = map.graph();
        if graph.is_empty() {
            return None;
        }
        for _ in 0..32 {
            let id = rng.gen_range(0..graph.len());
            if graph.get(id).is_some_and(|n| n.is_traversable()) {
                return Some(self.spawn(map.localize(id)));
            }
        }
        let fallback = graph.nodes().iter().find(|n| n.is_traversable())?.id;
        Some(self.spawn(map.localize(fallback)))
    }

    /// Entity ids of every live agent
    #[must_use]
    pub fn agents(&self) -> Vec<Entity> {
        self.world.iter().map(|agent| agent.entity()).collect()
    }

    /// External damage event; returns false for unknown entities
    pub fn damage(&mut self, agent: Entity, amount: i32) -> bool {
        match self.world.get::<&mut Health>(agent) {
            Ok(mut health) => {
                health.hit_points -= amount;
                true
            }
            Err(_) => false,
        }
    }

    /// Current behavior state of an agent
    #[must_use]
    pub fn state_of(&self, agent: Entity) -> Option<BehaviorState> {
        self.world
            .get::<&BehaviorStateMachine>(agent)
            .ok()
            .map(|fsm| fsm.state())
    }

    /// Current position of an agent
    #[must_use]
    pub fn position_of(&self, agent: Entity) -> Option<Vec3> {
        self.world
            .get::<&AgentBody>(agent)
            .ok()
            .map(|body| body.position)
    }

    /// Advance every agent by one frame
    pub fn tick(&mut self, map: &GameMap, target: &TargetState, dt: f32) -> Vec<HordeEvent> {
        let mut events = Vec::new();

        // flocking reads everyone's state as of the start of the tick
        let snapshot: Vec<(Entity, Neighbor)> = self
            .world
            .query::<&AgentBody>()
            .iter()
            .map(|(entity, body)| {
                (
                    entity,
                    Neighbor {
                        position: body.position,
                        velocity: body.velocity,
                    },
                )
            })
            .collect();

        let mut removals = Vec::new();

        for (entity, (body, locomotion, health, fsm, cached)) in self.world.query_mut::<(
            &mut AgentBody,
            &Locomotion,
            &mut Health,
            &mut BehaviorStateMachine,
            &mut CachedPath,
        )>() {
            if fsm.death_finished() {
                removals.push(entity);
                continue;
            }

            let was_dead = fsm.is_dead();
            if !was_dead {
                cached.0 = find_path(map, body.position, target.position);
            }

            let update = fsm.update(
                &mut health.hit_points,
                target.attacking,
                cached.0.as_ref(),
                dt,
            );

            if fsm.is_dead() && !was_dead {
                events.push(HordeEvent::AgentDied { agent: entity });
            }
            if update.clear_path && cached.0.take().is_some() {
                events.push(HordeEvent::PathCleared { agent: entity });
            }
            if let Some(amount) = update.attack_damage {
                events.push(HordeEvent::DamageTarget {
                    agent: entity,
                    amount,
                });
            }

            if !update.should_move {
                continue;
            }

            let mut force = Vec3::ZERO;

            if update.should_path_find {
                if let Some(path) = cached.0.as_mut() {
                    while let Some(waypoint) = path.next_waypoint() {
                        if (waypoint - body.position).length() < self.waypoint_tolerance {
                            path.advance();
                        } else {
                            break;
                        }
                    }
                    if let Some(waypoint) = path.next_waypoint() {
                        force += self.steering.seek(body.position, body.velocity, waypoint)
                            * self.steering.seek_weight;
                    }
                }
            }

            let neighbors: Vec<Neighbor> = snapshot
                .iter()
                .filter(|(other, _)| *other != entity)
                .map(|(_, n)| *n)
                .collect();
            force += self.steering.separate(body.position, body.velocity, &neighbors)
                * self.steering.separation_weight;

            let avoidance = self.steering.avoid_walls(body.position, body.velocity, map);
            if avoidance.is_avoiding {
                force += avoidance.force * self.steering.avoidance_weight;
            }

            body.velocity += force.clamp_length_max(locomotion.max_force) * dt;
            body.velocity = body.velocity.clamp_length_max(locomotion.max_speed);
            body.position = map.resolve_move(body.position, body.velocity, dt);
        }

        for entity in removals {
            if self.world.despawn(entity).is_ok() {
                log::debug!("agent {entity:?} removed after death timer");
                events.push(HordeEvent::AgentRemoved { agent: entity });
            }
        }

        events
    }
}
