use tracing::debug;

use super::context::TickContext;
use super::mood::refresh_moods;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::LogKind;
use crate::model::nation::{TECH_MAX, saturating_apply};
use crate::model::persona;

// --- Constants ---

const BASE_GOLD: i64 = 50;
const GOLD_PER_TECH: i64 = 20;
const GOLD_PER_ALLY: i64 = 15;
const BASE_GRAIN: i64 = 60;
/// Extra grain for nations past this tech level.
const GRAIN_TECH_LEVEL: u32 = 2;
const GRAIN_TECH_BONUS: i64 = 20;
/// One grain eaten per this many people.
const PEOPLE_PER_GRAIN: u32 = 100;
/// One gold of upkeep per this many troops.
const TROOPS_PER_GOLD: u32 = 100;

const WAR_GOLD_UPKEEP: i64 = 30;
const WAR_GRAIN_UPKEEP: i64 = 20;
const WAR_MORALE_DRAIN: i64 = 2;

const FAMINE_LINE: u32 = 200;
const FAMINE_MORALE: i64 = -5;
const PROSPERITY_LINE: u32 = 500;
const PROSPERITY_MORALE: i64 = 2;

/// Treasury needed before a tech advance can happen.
const TECH_GOLD_LINE: u32 = 800;
const TENSION_DECAY: u32 = 1;

/// Income, upkeep, morale drift, and occasional tech advances.
pub struct EconomySystem {
    cadence: Cadence,
}

impl EconomySystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for EconomySystem {
    fn name(&self) -> &str {
        "economy"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        for id in ctx.world.living() {
            let living_allies = ctx.world.nation(id).map_or(0, |n| {
                n.allies.iter().filter(|&&a| ctx.world.is_alive(a)).count() as i64
            });
            let advance = ctx.roll(persona(id).tech_affinity);
            let Some(n) = ctx.world.nation_mut(id) else {
                continue;
            };
            let wars = n.wars.len() as i64;
            let tech = i64::from(n.tech);

            let mut gold = BASE_GOLD + GOLD_PER_TECH * tech + GOLD_PER_ALLY * living_allies;
            let mut grain = BASE_GRAIN - i64::from(n.population / PEOPLE_PER_GRAIN);
            if n.tech > GRAIN_TECH_LEVEL {
                grain += GRAIN_TECH_BONUS;
            }
            gold -= WAR_GOLD_UPKEEP * wars + i64::from(n.troops / TROOPS_PER_GOLD);
            grain -= WAR_GRAIN_UPKEEP * wars;
            n.gold = saturating_apply(n.gold, gold);
            n.grain = saturating_apply(n.grain, grain);
            n.adjust_morale(-WAR_MORALE_DRAIN * wars);

            if n.grain < FAMINE_LINE {
                n.adjust_morale(FAMINE_MORALE);
            } else if n.gold > PROSPERITY_LINE && wars == 0 {
                n.adjust_morale(PROSPERITY_MORALE);
            }

            if advance && n.gold > TECH_GOLD_LINE && n.tech < TECH_MAX {
                n.tech += 1;
                let tech = n.tech;
                ctx.world.add_memory(id, format!("My scholars reached tech level {tech}."));
                ctx.record(
                    format!("⚡ {} advanced to Tech Level {tech}", id.name()),
                    LogKind::Event,
                    Some(id),
                );
            }
        }
        ctx.world.lower_tension(TENSION_DECAY);
        refresh_moods(ctx.world);
        ctx.touch();
        debug!(tension = ctx.world.tension, "economy tick");
    }
}
