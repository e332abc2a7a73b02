//! Viewer-safe projection of the canonical world.
//!
//! Snapshots are rebuilt on every broadcast and never cached. Secrets,
//! rumors, promises, and raw trust numbers never leave the engine; nations
//! whose trust toward the viewer is below `FOG_THRESHOLD` have their
//! military and economic stats fuzzed.

use std::collections::BTreeMap;

use rand::{Rng, RngCore};
use serde::Serialize;

use crate::id::SessionId;
use crate::model::nation::{MORALE_MAX, USER_TRUST_DEFAULT};
use crate::model::{BreakingNews, City, Crisis, Intercept, Mood, Nation, NationId, Prophecy, RelationLabel, World};

/// Nations with `user_trust` strictly below this are obscured.
pub const FOG_THRESHOLD: u8 = 45;
/// Fuzz factors are drawn from `[LOW.0, LOW.1]` or `[HIGH.0, HIGH.1]`.
const FUZZ_LOW: (f64, f64) = (0.80, 0.95);
const FUZZ_HIGH: (f64, f64) = (1.05, 1.20);

/// Recent intercepts included in a snapshot.
const SNAPSHOT_INTERCEPTS: usize = 10;
const SNAPSHOT_NEWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationView {
    pub alive: bool,
    pub troops: u32,
    pub nukes: u32,
    pub gold: u32,
    pub grain: u32,
    pub morale: u32,
    pub population: u32,
    pub tech: u32,
    pub mood: Mood,
    pub mood_emoji: &'static str,
    pub mood_reason: String,
    pub wars: Vec<NationId>,
    pub allies: Vec<NationId>,
    pub relations: BTreeMap<NationId, RelationLabel>,
    pub cities: Vec<City>,
    /// This nation's standing toward the requesting viewer.
    pub user_trust: u8,
    pub obscured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub year: u32,
    pub season: &'static str,
    pub season_index: u8,
    pub tension: u32,
    pub nations: BTreeMap<NationId, NationView>,
    pub crises: Vec<Crisis>,
    pub intercepts: Vec<Intercept>,
    pub breaking_news: Vec<BreakingNews>,
    pub prophecy: Option<Prophecy>,
}

/// Project `world` for one viewer session, or for an anonymous viewer when
/// `session` is `None` (default trust, so everything is obscured).
pub fn project(world: &World, session: Option<&SessionId>, rng: &mut dyn RngCore) -> WorldSnapshot {
    let nations = world
        .nations
        .iter()
        .map(|(&id, nation)| {
            let trust = session.map_or(USER_TRUST_DEFAULT, |s| nation.user_trust(s));
            (id, view(nation, trust, rng))
        })
        .collect();

    WorldSnapshot {
        year: world.year,
        season: world.season_name(),
        season_index: world.season_index,
        tension: world.tension,
        nations,
        crises: world.active_crises().cloned().collect(),
        intercepts: world.intercept_feed.recent(SNAPSHOT_INTERCEPTS).cloned().collect(),
        breaking_news: world.breaking_news_history.recent(SNAPSHOT_NEWS).cloned().collect(),
        prophecy: world.active_prophecy.clone(),
    }
}

fn view(nation: &Nation, user_trust: u8, rng: &mut dyn RngCore) -> NationView {
    let mut v = NationView {
        alive: nation.alive,
        troops: nation.troops,
        nukes: nation.nukes,
        gold: nation.gold,
        grain: nation.grain,
        morale: nation.morale,
        population: nation.population,
        tech: nation.tech,
        mood: nation.mood,
        mood_emoji: nation.mood.emoji(),
        mood_reason: nation.mood_reason.clone(),
        wars: nation.wars.iter().copied().collect(),
        allies: nation.allies.iter().copied().collect(),
        relations: nation
            .relations
            .iter()
            .map(|(&other, rel)| (other, rel.label()))
            .collect(),
        cities: nation.cities.clone(),
        user_trust,
        obscured: false,
    };
    if user_trust < FOG_THRESHOLD {
        v.troops = fuzz(nation.troops, fuzz_factor(rng), u32::MAX);
        v.gold = fuzz(nation.gold, fuzz_factor(rng), u32::MAX);
        v.grain = fuzz(nation.grain, fuzz_factor(rng), u32::MAX);
        v.nukes = fuzz(nation.nukes, fuzz_factor(rng), u32::MAX);
        v.morale = fuzz(nation.morale, fuzz_factor(rng), MORALE_MAX);
        v.obscured = true;
    }
    v
}

fn fuzz_factor(rng: &mut dyn RngCore) -> f64 {
    let (lo, hi) = if rng.random_bool(0.5) { FUZZ_LOW } else { FUZZ_HIGH };
    rng.random_range(lo..=hi)
}

/// Scale `value` by `factor`, capped at `cap`, and never equal to `value`.
///
/// Rounding small stocks (a handful of nukes) or hitting the cap can land
/// back on the exact figure; those cases step one unit away instead.
fn fuzz(value: u32, factor: f64, cap: u32) -> u32 {
    let scaled = (f64::from(value) * factor).round().clamp(0.0, f64::from(cap)) as u32;
    if scaled != value {
        return scaled;
    }
    let up = factor > 1.0 || value == 0;
    if up && value < cap {
        value + 1
    } else {
        value.saturating_sub(1)
    }
}
