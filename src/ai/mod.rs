//! NPC behavior and movement
//!
//! Steering forces, the per-agent behavior state machine, and the hecs-backed
//! manager that runs the whole horde each frame.

mod behavior;
mod horde;
mod steering;

pub use behavior::{
    AnimationKey, BehaviorConfig, BehaviorState, BehaviorStateMachine, StateUpdate,
};
pub use horde::{
    AgentBody, CachedPath, Health, Horde, HordeEvent, Locomotion, TargetState,
};
pub use steering::{Avoidance, Neighbor, Steering, WallProbe};
