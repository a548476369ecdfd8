use glam::{Quat, Vec3};

use crate::entity::EntityId;

/// Receives each entity's new transform at the end of a tick.
///
/// The core owns position and velocity; a sink only mirrors them into
/// whatever draws or records the swarm.
pub trait TransformSink {
    fn update_transform(&mut self, entity: EntityId, position: Vec3, orientation: Quat);

    /// Called once after every entity of a tick has been reported.
    fn end_tick(&mut self, _tick: u64) {}
}

/// Sink for hosts with nothing attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TransformSink for NullSink {
    fn update_transform(&mut self, _entity: EntityId, _position: Vec3, _orientation: Quat) {}
}
