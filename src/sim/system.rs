use std::time::Duration;

use rand::RngCore;

use super::context::TickContext;
use crate::config::Cadence;
use crate::model::World;

/// A pluggable simulation system that the session runs on its own cadence.
///
/// Object-safe so systems can be stored as `Box<dyn SimSystem>`. Each system
/// is rescheduled after every tick using `next_delay`.
pub trait SimSystem: Send {
    fn name(&self) -> &str;
    fn cadence(&self) -> Cadence;

    /// Delay until the next tick. Default: a fresh draw from `cadence()`.
    fn next_delay(&self, world: &World, rng: &mut dyn RngCore) -> Duration {
        let _ = world;
        self.cadence().sample(rng)
    }

    fn tick(&mut self, ctx: &mut TickContext);
}
