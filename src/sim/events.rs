//! Random world events and the generic catalog effect applier.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use super::context::{Job, TickContext};
use super::system::SimSystem;
use crate::catalog::{Effect, EventSpec, render};
use crate::config::Cadence;
use crate::model::nation::{TECH_MAX, TROOP_CEILING, saturating_apply, scaled};
use crate::model::world::TENSION_MAX;
use crate::model::{LogKind, NationId, World};

/// At full tension the event delay shrinks by this fraction.
const TENSION_SPEEDUP: f64 = 0.6;
/// Population never drops below this from a catalog effect.
const POPULATION_FLOOR: u32 = 100;

/// Apply catalog effects to one nation. Dead nations are untouched, except
/// for world-level `Tension` effects.
pub fn apply_effects(world: &mut World, nation: NationId, effects: &[Effect]) {
    for &effect in effects {
        if let Effect::Tension(delta) = effect {
            world.adjust_tension(delta);
            continue;
        }
        let Some(n) = world.nation_mut(nation).filter(|n| n.alive) else {
            continue;
        };
        match effect {
            Effect::Grain(d) => n.grain = saturating_apply(n.grain, d),
            Effect::Gold(d) => n.gold = saturating_apply(n.gold, d),
            Effect::Morale(d) => n.adjust_morale(d),
            Effect::Troops(d) => n.troops = saturating_apply(n.troops, d).min(TROOP_CEILING),
            Effect::TroopsPct(p) => n.troops = scaled(n.troops, pct(p)).min(TROOP_CEILING),
            Effect::PopulationPct(p) => {
                n.population = scaled(n.population, pct(p)).max(POPULATION_FLOOR.min(n.population));
            }
            Effect::GoldPct(p) => n.gold = scaled(n.gold, pct(p)),
            Effect::Tech(d) => n.tech = saturating_apply(n.tech, d).min(TECH_MAX),
            Effect::Trust(d) => {
                let delta = d.clamp(-200, 200) as i32;
                for rel in n.relations.values_mut() {
                    rel.adjust(delta);
                }
            }
            Effect::Tension(_) => {}
        }
    }
}

fn pct(p: i64) -> f64 {
    (1.0 + p as f64 / 100.0).max(0.0)
}

/// Fire catalog event `event_id` on `nation`, scheduling its cascade.
/// Unknown events and dead nations no-op.
pub fn fire_event(ctx: &mut TickContext, event_id: &str, nation: NationId) -> bool {
    if !ctx.world.is_alive(nation) {
        return false;
    }
    let Some(spec) = ctx.catalog.event(event_id) else {
        return false;
    };
    let spec: EventSpec = spec.clone();
    apply_effects(ctx.world, nation, &spec.effects);
    ctx.world.add_memory(nation, render(&spec.text, "my realm"));
    ctx.record(render(&spec.text, nation.name()), LogKind::Event, Some(nation));
    debug!(event = %spec.id, %nation, "world event");

    if let Some(cascade) = spec.cascade {
        ctx.maybe_schedule(
            cascade.chance,
            Duration::from_secs(cascade.delay_secs),
            Job::Cascade {
                event: cascade.event,
                nation,
            },
        );
    }
    true
}

pub struct EventSystem {
    cadence: Cadence,
}

impl EventSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

/// Higher tension shortens the wait: `base × (1 − 0.6·tension/100)`.
pub fn tension_scaled(base: Duration, tension: u32) -> Duration {
    let t = f64::from(tension.min(TENSION_MAX)) / f64::from(TENSION_MAX);
    base.mul_f64(1.0 - TENSION_SPEEDUP * t)
}

impl SimSystem for EventSystem {
    fn name(&self) -> &str {
        "events"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn next_delay(&self, world: &World, rng: &mut dyn RngCore) -> Duration {
        tension_scaled(self.cadence.sample(rng), world.tension)
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let living = ctx.world.living();
        let Some(&nation) = living.choose(ctx.rng) else {
            return;
        };
        let idx = ctx.rng.random_range(0..ctx.catalog.events.len().max(1));
        let Some(id) = ctx.catalog.events.get(idx).map(|e| e.id.clone()) else {
            return;
        };
        fire_event(ctx, &id, nation);
    }
}
