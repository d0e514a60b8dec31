//! Finite state machine for agent behavior
//!
//! A tagged enum over {Idle, Approach, Attack, Death} with a single update
//! function dispatching on the tag, so transitions are exhaustively
//! checkable. All range thresholds compare against *path* distance (the sum
//! of remaining waypoint segments), so walls are respected: a target ten
//! meters away through a wall is still far away.

use serde::{Deserialize, Serialize};

use crate::nav::Path;

/// Behavior tag. Death is terminal: it has no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    Idle,
    Approach,
    Attack,
    Death,
}

impl BehaviorState {
    /// Animation the renderer should play for this state
    #[must_use]
    pub fn animation(self) -> AnimationKey {
        match self {
            BehaviorState::Idle => AnimationKey::Idle,
            BehaviorState::Approach => AnimationKey::Walk,
            BehaviorState::Attack => AnimationKey::Attack,
            BehaviorState::Death => AnimationKey::Death,
        }
    }
}

/// Animation clip names understood by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKey {
    Idle,
    Walk,
    Attack,
    Death,
}

impl AnimationKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationKey::Idle => "Idle",
            AnimationKey::Walk => "Walk",
            AnimationKey::Attack => "Attack",
            AnimationKey::Death => "Death",
        }
    }
}

/// Range thresholds and timing for the behavior machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Path distance at which an idle agent notices the target
    pub detection_range: f32,
    /// Path distance at which approach becomes attack (and back)
    pub attack_range: f32,
    /// Path distance past which an approaching agent loses interest
    pub max_chase_distance: f32,
    /// Seconds between damage ticks while attacking
    pub damage_cooldown: f32,
    /// Damage dealt to the target per tick of the cadence
    pub damage_per_hit: f32,
    /// Hit points this agent loses per update while being attacked in range
    pub incoming_damage_per_hit: i32,
    /// Seconds the death animation plays before the agent is removed
    pub death_duration: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            detection_range: 300.0,
            attack_range: 30.0,
            max_chase_distance: 200.0,
            damage_cooldown: 1.0,
            damage_per_hit: 5.0,
            incoming_damage_per_hit: 1,
            death_duration: 2.0,
        }
    }
}

/// Per-tick behavior decision handed back to the owning manager
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateUpdate {
    pub animation: AnimationKey,
    /// Whether steering forces should be applied this tick
    pub should_move: bool,
    /// Whether the cached path should be followed this tick
    pub should_path_find: bool,
    /// Path distance used for the transition checks (infinite when the
    /// target was unreachable)
    pub path_distance: f32,
    /// Tell the path-visualization collaborator to drop this agent's path
    pub clear_path: bool,
    /// Damage to signal to the external target this tick
    pub attack_damage: Option<f32>,
}

/// One agent's behavior machine
#[derive(Debug, Clone)]
pub struct BehaviorStateMachine {
    config: BehaviorConfig,
    state: BehaviorState,
    damage_timer: f32,
    death_elapsed: f32,
}

impl BehaviorStateMachine {
    #[must_use]
    pub fn new(config: BehaviorConfig) -> Self {
        Self {
            config,
            state: BehaviorState::Idle,
            damage_timer: 0.0,
            death_elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn state(&self) -> BehaviorState {
        self.state
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state == BehaviorState::Death
    }

    /// Whether the death animation has run its course and the owning
    /// manager should remove the agent
    #[must_use]
    pub fn death_finished(&self) -> bool {
        self.is_dead() && self.death_elapsed >= self.config.death_duration
    }

    /// Advance the machine by one tick.
    ///
    /// `path` is this tick's route to the target; `None` means the target is
    /// unreachable right now, which is never fatal: the machine simply treats
    /// the target as infinitely far away.
    pub fn update(
        &mut self,
        hit_points: &mut i32,
        target_attacking: bool,
        path: Option<&Path>,
        dt: f32,
    ) -> StateUpdate {
        let path_distance = path.map_or(f32::INFINITY, Path::distance);

        if self.damage_timer > 0.0 {
            self.damage_timer -= dt;
        }

        // Incoming damage lands only while the target is attacking inside
        // attack range; depletion forces Death from any live state.
        if !self.is_dead() && target_attacking && path_distance <= self.config.attack_range {
            *hit_points -= self.config.incoming_damage_per_hit;
        }
        if !self.is_dead()
            && *hit_points <= 0
            && target_attacking
            && path_distance <= self.config.attack_range
        {
            self.transition(BehaviorState::Death);
            return self.describe(path_distance);
        }

        match self.state {
            BehaviorState::Idle => {
                if path_distance <= self.config.detection_range {
                    self.transition(BehaviorState::Approach);
                }
            }
            BehaviorState::Approach => {
                if path_distance <= self.config.attack_range {
                    self.transition(BehaviorState::Attack);
                } else if path_distance > self.config.max_chase_distance {
                    self.transition(BehaviorState::Idle);
                }
            }
            BehaviorState::Attack => {
                if path_distance > self.config.attack_range {
                    self.transition(BehaviorState::Approach);
                }
            }
            BehaviorState::Death => {
                self.death_elapsed += dt;
            }
        }

        let mut update = self.describe(path_distance);
        if self.state == BehaviorState::Attack && self.damage_timer <= 0.0 {
            update.attack_damage = Some(self.config.damage_per_hit);
            self.damage_timer = self.config.damage_cooldown;
        }
        update
    }

    fn describe(&self, path_distance: f32) -> StateUpdate {
        StateUpdate {
            animation: self.state.animation(),
            should_move: self.state == BehaviorState::Approach,
            should_path_find: self.state == BehaviorState::Approach,
            path_distance,
            clear_path: self.state == BehaviorState::Death,
            attack_damage: None,
        }
    }

    fn transition(&mut self, next: BehaviorState) {
        log::debug!("behavior: {:?} -> {:?}", self.state, next);
        if next == BehaviorState::Death {
            self.death_elapsed = 0.0;
        }
        self.state = next;
    }
}
