use std::time::Duration;

use rand::seq::IndexedRandom;
use tracing::info;

use super::live_pair;
use crate::model::nation::{Mood, Relation, TROOP_CEILING, fresh_cities, scaled};
use crate::model::{LogKind, NationId, Notice, persona};
use crate::sim::context::{Job, TickContext};

// --- Constants ---

const MOBILIZE_COST: u32 = 200;
const MOBILIZE_FACTOR: f64 = 1.2;

const NUKE_TENSION: u32 = 35;
/// Time between launch and impact.
pub const NUKE_FLIGHT: Duration = Duration::from_secs(8);
const NUKE_POPULATION_FACTOR: f64 = 0.7;
const NUKE_TROOP_FACTOR: f64 = 0.6;
const NUKE_MORALE_LOSS: i64 = 30;
const FALLOUT_PLAGUE_CHANCE: f64 = 0.5;
const FALLOUT_PLAGUE_DELAY: Duration = Duration::from_secs(45);
const BACKLASH_REBELLION_CHANCE: f64 = 0.25;
const BACKLASH_REBELLION_DELAY: Duration = Duration::from_secs(60);

/// A nation at or under this many troops is destroyed.
pub const DESTRUCTION_FLOOR: u32 = 50;
const VACUUM_CHANCE: f64 = 0.5;
const VACUUM_DELAY: Duration = Duration::from_secs(20);
pub const SUCCESSION_DELAY: Duration = Duration::from_secs(30);
/// Fraction of starting stats a successor inherits.
const SUCCESSION_FRACTION: f64 = 0.4;
const SUCCESSION_MORALE: i64 = 50;

/// Spend gold to raise troops. No-op without enough gold.
pub fn mobilize(ctx: &mut TickContext, a: NationId) -> bool {
    let Some(n) = ctx.world.nation_mut(a).filter(|n| n.alive) else {
        return false;
    };
    if n.gold < MOBILIZE_COST {
        return false;
    }
    n.gold -= MOBILIZE_COST;
    n.troops = scaled(n.troops, MOBILIZE_FACTOR).min(TROOP_CEILING);
    let troops = n.troops;
    ctx.world.add_memory(a, "I mobilized my armies.");
    ctx.record(
        format!("🪖 {} MOBILIZES. Troops now {troops}.", a.name()),
        LogKind::War,
        Some(a),
    );
    true
}

/// Fire one warhead; impact lands after `NUKE_FLIGHT`.
pub fn launch_nuke(ctx: &mut TickContext, attacker: NationId, target: NationId) -> bool {
    if !live_pair(ctx.world, attacker, target) {
        return false;
    }
    let Some(n) = ctx.world.nation_mut(attacker).filter(|n| n.nukes > 0) else {
        return false;
    };
    n.nukes -= 1;
    ctx.world.raise_tension(NUKE_TENSION);
    ctx.world.add_memory(attacker, format!("I launched a nuclear strike at {}.", target.name()));
    ctx.out.broadcast(Notice::NukeIncoming {
        from: attacker,
        to: target,
    });
    ctx.record(
        format!("☢️ {} LAUNCHES A NUCLEAR STRIKE at {}!", attacker.name(), target.name()),
        LogKind::Nuke,
        Some(attacker),
    );
    info!(%attacker, %target, "nuke launched");
    ctx.out.schedule(NUKE_FLIGHT, Job::NukeImpact { attacker, target });
    true
}

/// Land a warhead on `target`. No-op if the target died in the meantime.
pub fn nuke_impact(ctx: &mut TickContext, attacker: NationId, target: NationId) -> bool {
    if !ctx.world.is_alive(target) {
        return false;
    }
    let standing: Vec<usize> = ctx
        .world
        .nation(target)
        .map(|n| {
            n.cities
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.destroyed)
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default();
    let hit = standing.choose(ctx.rng).copied();

    let Some(n) = ctx.world.nation_mut(target) else {
        return false;
    };
    let city = match hit {
        Some(i) => {
            let c = &mut n.cities[i];
            c.destroyed = true;
            c.population = 0;
            n.outcomes.cities_lost += 1;
            c.name.clone()
        }
        None => String::new(),
    };
    n.population = scaled(n.population, NUKE_POPULATION_FACTOR);
    n.troops = scaled(n.troops, NUKE_TROOP_FACTOR);
    n.adjust_morale(-NUKE_MORALE_LOSS);
    let collapsed = n.troops <= DESTRUCTION_FLOOR || n.all_cities_destroyed();

    let where_ = if city.is_empty() { target.name().to_string() } else { city.clone() };
    ctx.world.add_memory(target, format!("{} nuked {where_}.", attacker.name()));
    ctx.out.broadcast(Notice::NukeImpact {
        from: attacker,
        to: target,
        city: city.clone(),
    });
    ctx.record(
        format!("💥 Nuclear impact on {where_} in {}! Cities burn.", target.name()),
        LogKind::Nuke,
        Some(target),
    );

    ctx.maybe_schedule(
        FALLOUT_PLAGUE_CHANCE,
        FALLOUT_PLAGUE_DELAY,
        Job::Cascade {
            event: "plague".into(),
            nation: target,
        },
    );
    ctx.maybe_schedule(
        BACKLASH_REBELLION_CHANCE,
        BACKLASH_REBELLION_DELAY,
        Job::Cascade {
            event: "rebellion".into(),
            nation: attacker,
        },
    );
    if collapsed {
        destroy_nation(ctx, target, Some(attacker));
    }
    true
}

/// Mark `loser` dead and strip every edge to it. Schedules succession.
pub fn destroy_nation(ctx: &mut TickContext, loser: NationId, winner: Option<NationId>) -> bool {
    let Some(n) = ctx.world.nation_mut(loser).filter(|n| n.alive) else {
        return false;
    };
    n.alive = false;
    n.troops = 0;
    n.wars.clear();
    n.allies.clear();
    n.mood = Mood::Grieving;
    n.mood_reason = "The realm has fallen.".to_string();
    for other in loser.others() {
        if let Some(o) = ctx.world.nation_mut(other) {
            o.wars.remove(&loser);
            o.allies.remove(&loser);
        }
    }
    let text = match winner {
        Some(w) => {
            ctx.world.add_memory(w, format!("I destroyed {}.", loser.name()));
            format!("💀 {} has been DESTROYED by {}!", loser.name(), w.name())
        }
        None => format!("💀 {} has collapsed!", loser.name()),
    };
    ctx.record(text, LogKind::War, Some(loser));
    info!(nation = %loser, winner = ?winner, "nation destroyed");

    ctx.maybe_schedule(VACUUM_CHANCE, VACUUM_DELAY, Job::PowerVacuum { nation: loser });
    ctx.out.schedule(SUCCESSION_DELAY, Job::Succession { nation: loser });
    true
}

/// A new ruler restores a fallen nation at a fraction of its starting
/// strength with neutral relations. No-op if the nation is alive.
pub fn succession(ctx: &mut TickContext, nation: NationId) -> bool {
    let Some(n) = ctx.world.nation_mut(nation).filter(|n| !n.alive) else {
        return false;
    };
    let start = persona(nation).start;
    n.alive = true;
    n.troops = scaled(start.troops, SUCCESSION_FRACTION);
    n.nukes = scaled(start.nukes, SUCCESSION_FRACTION);
    n.gold = scaled(start.gold, SUCCESSION_FRACTION);
    n.grain = scaled(start.grain, SUCCESSION_FRACTION);
    n.population = scaled(start.population, SUCCESSION_FRACTION);
    n.set_morale(SUCCESSION_MORALE);
    n.tech = start.tech;
    n.mood = Mood::Anxious;
    n.mood_reason = "A new ruler takes the throne.".to_string();
    n.cities = fresh_cities(nation);
    n.memory.clear();
    n.rumors.clear();
    n.wars.clear();
    n.allies.clear();
    for other in nation.others() {
        n.relations.insert(other, Relation::neutral());
    }
    for other in nation.others() {
        if let Some(o) = ctx.world.nation_mut(other) {
            o.relations.insert(nation, Relation::neutral());
        }
    }
    ctx.world.add_memory(nation, "I rose from the ashes of my fallen predecessor.");
    ctx.record(
        format!("👑 A new ruler rises in {}. The realm is reborn.", persona(nation).territory),
        LogKind::Event,
        Some(nation),
    );
    info!(%nation, "succession");
    true
}
