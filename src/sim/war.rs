use rand::Rng;
use tracing::debug;

use super::context::TickContext;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::{Nation, NationId};
use crate::store::{self, DESTRUCTION_FLOOR};

// --- Constants ---

const TECH_POWER: f64 = 0.1;
/// Damage a side takes when its opponent holds all of the combined power.
const DAMAGE_SCALE: f64 = 80.0;
/// Upper bound (exclusive) of the random extra damage per side.
const DAMAGE_JITTER: f64 = 20.0;

/// `troops × (1 + tech·k) × (morale/100)`, with troops floored at 1.
pub fn power(n: &Nation) -> f64 {
    f64::from(n.troops.max(1)) * (1.0 + f64::from(n.tech) * TECH_POWER) * (f64::from(n.morale) / 100.0)
}

/// Every war pair once, lower id first.
fn war_pairs(ctx: &TickContext) -> Vec<(NationId, NationId)> {
    let mut pairs = Vec::new();
    for (&a, n) in &ctx.world.nations {
        if !n.alive {
            continue;
        }
        pairs.extend(n.wars.iter().filter(|&&b| a < b).map(|&b| (a, b)));
    }
    pairs
}

/// Resolves one battle per active war each tick.
pub struct WarSystem {
    cadence: Cadence,
}

impl WarSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for WarSystem {
    fn name(&self) -> &str {
        "war"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        for (a, b) in war_pairs(ctx) {
            let still_fighting = ctx.world.is_alive(a)
                && ctx.world.is_alive(b)
                && ctx.world.nation(a).is_some_and(|n| n.wars.contains(&b));
            if !still_fighting {
                continue;
            }
            battle(ctx, a, b);
        }
    }
}

fn battle(ctx: &mut TickContext, a: NationId, b: NationId) {
    let (Some(pa), Some(pb)) = (ctx.world.nation(a).map(power), ctx.world.nation(b).map(power)) else {
        return;
    };
    let total = pa + pb;
    let (share_a, share_b) = if total > 0.0 { (pa / total, pb / total) } else { (0.5, 0.5) };
    let damage_a = (share_b * DAMAGE_SCALE + ctx.rng.random_range(0.0..DAMAGE_JITTER)).round() as u32;
    let damage_b = (share_a * DAMAGE_SCALE + ctx.rng.random_range(0.0..DAMAGE_JITTER)).round() as u32;

    for (side, damage, lost) in [(a, damage_a, damage_a > damage_b), (b, damage_b, damage_b > damage_a)] {
        if let Some(n) = ctx.world.nation_mut(side) {
            n.troops = n.troops.saturating_sub(damage);
            if lost {
                n.outcomes.war_losses += 1;
            }
        }
    }
    debug!(%a, %b, damage_a, damage_b, "battle");
    ctx.touch();

    for (loser, winner) in [(a, b), (b, a)] {
        let broken = ctx
            .world
            .nation(loser)
            .is_some_and(|n| n.alive && n.troops <= DESTRUCTION_FLOOR);
        if broken {
            store::destroy_nation(ctx, loser, Some(winner));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Harness;

    fn at_war(seed: u64) -> Harness {
        let mut h = Harness::new(seed);
        h.with_ctx(|ctx| store::declare_war(ctx, NationId::Rex, NationId::Vera));
        h
    }

    #[test]
    fn power_formula() {
        let mut n = Nation::at_start(NationId::Rex);
        n.troops = 1000;
        n.tech = 2;
        n.morale = 50;
        assert!((power(&n) - 600.0).abs() < 1e-9);
        n.troops = 0;
        assert!(power(&n) > 0.0);
    }

    #[test]
    fn battle_costs_both_sides_troops() {
        let mut h = at_war(1);
        let rex = h.world.nation(NationId::Rex).unwrap().troops;
        let vera = h.world.nation(NationId::Vera).unwrap().troops;
        h.tick(&mut WarSystem::new(Cadence::every(15)));
        let rex_after = h.world.nation(NationId::Rex).unwrap().troops;
        let vera_after = h.world.nation(NationId::Vera).unwrap().troops;
        assert!(rex_after < rex && rex - rex_after <= 100);
        assert!(vera_after < vera && vera - vera_after <= 100);
    }

    #[test]
    fn each_pair_resolves_once_per_tick() {
        let mut h = at_war(2);
        let before = h.world.nation(NationId::Vera).unwrap().troops;
        h.tick(&mut WarSystem::new(Cadence::every(15)));
        let lost = before - h.world.nation(NationId::Vera).unwrap().troops;
        assert!(lost <= (DAMAGE_SCALE + DAMAGE_JITTER) as u32);
    }

    #[test]
    fn side_at_floor_is_destroyed_exactly_once() {
        let mut h = at_war(3);
        h.world.nation_mut(NationId::Vera).unwrap().troops = 60;
        let mut war = WarSystem::new(Cadence::every(15));
        h.tick(&mut war);
        let vera = h.world.nation(NationId::Vera).unwrap();
        assert!(!vera.alive);
        assert!(h.world.nation(NationId::Rex).unwrap().wars.is_empty());
        let troops_after = h.world.nation(NationId::Rex).unwrap().troops;

        h.tick(&mut war);
        assert_eq!(h.world.nation(NationId::Rex).unwrap().troops, troops_after);
        let falls = h
            .world
            .log
            .iter()
            .filter(|e| e.text.contains("DESTROYED"))
            .count();
        assert_eq!(falls, 1);
        assert!(h.world.check_invariants().is_ok());
    }
}
