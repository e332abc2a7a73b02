use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chronicle::{BreakingNews, ChronicleEntry, Crisis, Intercept, LogEntry, LogKind, Prophecy};
use super::influence::PlayerInfluence;
use super::mission::Mission;
use super::nation::{Nation, Relation, fresh_cities};
use super::persona::NationId;
use super::ring::BoundedLog;
use crate::id::{IdGenerator, SessionId};

pub const SEASONS: [&str; 4] = ["Spring", "Summer", "Autumn", "Winter"];
pub const TENSION_MAX: u32 = 100;
pub const GENESIS_TENSION: u32 = 10;

pub type WorldLog = BoundedLog<LogEntry, 200>;
pub type Chronicle = BoundedLog<ChronicleEntry, 20>;
pub type InterceptFeed = BoundedLog<Intercept, 50>;
pub type NewsHistory = BoundedLog<BreakingNews, 20>;

/// The canonical state of one realm.
///
/// Fields are public for reading; writes that touch more than one nation go
/// through the mutators in `crate::store` so the war/alliance symmetry holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct World {
    pub year: u32,
    pub season_index: u8,
    pub tension: u32,
    pub nations: BTreeMap<NationId, Nation>,
    pub log: WorldLog,
    pub chronicle: Chronicle,
    pub crises: Vec<Crisis>,
    pub missions: BTreeMap<SessionId, Mission>,
    pub players: BTreeMap<SessionId, PlayerInfluence>,
    pub intercept_feed: InterceptFeed,
    pub breaking_news_history: NewsHistory,
    pub active_prophecy: Option<Prophecy>,
    pub id_gen: IdGenerator,
}

impl Default for World {
    /// An empty world with no nations. Used as the serde fallback; call
    /// `backfill` to populate missing nations.
    fn default() -> Self {
        Self {
            year: 1,
            season_index: 0,
            tension: GENESIS_TENSION,
            nations: BTreeMap::new(),
            log: WorldLog::new(),
            chronicle: Chronicle::new(),
            crises: Vec::new(),
            missions: BTreeMap::new(),
            players: BTreeMap::new(),
            intercept_feed: InterceptFeed::new(),
            breaking_news_history: NewsHistory::new(),
            active_prophecy: None,
            id_gen: IdGenerator::new(),
        }
    }
}

impl World {
    /// A fresh world at year 1 with every persona at its starting stats.
    pub fn genesis(rng: &mut (impl Rng + ?Sized)) -> Self {
        let mut world = Self::default();
        for id in NationId::ALL {
            world.nations.insert(id, Nation::genesis(id, rng));
        }
        world
    }

    /// Decode a persisted blob, backfilling anything older versions lacked.
    pub fn restore(blob: &str, rng: &mut (impl Rng + ?Sized)) -> Result<Self, serde_json::Error> {
        let mut world: World = serde_json::from_str(blob)?;
        world.backfill(rng);
        Ok(world)
    }

    /// Fill in missing nations, relations, and cities, and repair any
    /// asymmetric war/alliance edges left by older blobs.
    pub fn backfill(&mut self, rng: &mut (impl Rng + ?Sized)) {
        for id in NationId::ALL {
            let nation = self
                .nations
                .entry(id)
                .or_insert_with(|| Nation::genesis(id, rng));
            for other in id.others() {
                nation.relations.entry(other).or_insert_with(Relation::neutral);
            }
            nation.relations.remove(&id);
            if nation.cities.is_empty() {
                nation.cities = fresh_cities(id);
            }
            nation.wars.remove(&id);
            nation.allies.remove(&id);
        }
        self.season_index %= SEASONS.len() as u8;
        self.tension = self.tension.min(TENSION_MAX);

        let mut wars = Vec::new();
        let mut alliances = Vec::new();
        for (&id, nation) in &self.nations {
            wars.extend(nation.wars.iter().map(|&o| (id, o)));
            alliances.extend(nation.allies.iter().map(|&o| (id, o)));
        }
        for (a, b) in wars {
            if let Some(n) = self.nations.get_mut(&b) {
                n.wars.insert(a);
                n.allies.remove(&a);
            }
            if let Some(n) = self.nations.get_mut(&a) {
                n.allies.remove(&b);
            }
        }
        for (a, b) in alliances {
            let at_war = self.nations.get(&a).is_some_and(|n| n.wars.contains(&b));
            if at_war {
                continue;
            }
            if let Some(n) = self.nations.get_mut(&b) {
                n.allies.insert(a);
            }
        }
    }

    pub fn nation(&self, id: NationId) -> Option<&Nation> {
        self.nations.get(&id)
    }

    pub fn nation_mut(&mut self, id: NationId) -> Option<&mut Nation> {
        self.nations.get_mut(&id)
    }

    pub fn is_alive(&self, id: NationId) -> bool {
        self.nations.get(&id).is_some_and(|n| n.alive)
    }

    /// Living nations in fixed id order.
    pub fn living(&self) -> Vec<NationId> {
        self.nations
            .iter()
            .filter(|(_, n)| n.alive)
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn season_name(&self) -> &'static str {
        SEASONS[usize::from(self.season_index) % SEASONS.len()]
    }

    pub fn raise_tension(&mut self, amount: u32) {
        self.tension = (self.tension + amount).min(TENSION_MAX);
    }

    pub fn lower_tension(&mut self, amount: u32) {
        self.tension = self.tension.saturating_sub(amount);
    }

    pub fn adjust_tension(&mut self, delta: i64) {
        self.tension = (i64::from(self.tension) + delta).clamp(0, i64::from(TENSION_MAX)) as u32;
    }

    pub fn add_log(&mut self, text: impl Into<String>, kind: LogKind, at_ms: u64) {
        let year = self.year;
        self.log.push(LogEntry {
            text: text.into(),
            kind,
            year,
            at_ms,
        });
    }

    pub fn add_memory(&mut self, id: NationId, text: impl Into<String>) {
        if let Some(n) = self.nations.get_mut(&id) {
            n.memory.push(text.into());
        }
    }

    pub fn active_crises(&self) -> impl Iterator<Item = &Crisis> {
        self.crises.iter().filter(|c| !c.resolved)
    }

    pub fn player_mut(&mut self, session: &SessionId) -> &mut PlayerInfluence {
        self.players.entry(session.clone()).or_default()
    }

    /// Structural checks over the whole world. Returns a description of the
    /// first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (&id, n) in &self.nations {
            for &other in &n.wars {
                let mirrored = self.nations.get(&other).is_some_and(|o| o.wars.contains(&id));
                if !mirrored {
                    return Err(format!("{id} at war with {other} but not vice versa"));
                }
                if n.allies.contains(&other) {
                    return Err(format!("{id} both allied and at war with {other}"));
                }
            }
            for &other in &n.allies {
                let mirrored = self.nations.get(&other).is_some_and(|o| o.allies.contains(&id));
                if !mirrored {
                    return Err(format!("{id} allied with {other} but not vice versa"));
                }
            }
            if n.wars.contains(&id) || n.allies.contains(&id) {
                return Err(format!("{id} has a self edge"));
            }
            if !n.alive && (!n.wars.is_empty() || !n.allies.is_empty()) {
                return Err(format!("{id} is dead but keeps relationship edges"));
            }
            if n.morale > super::nation::MORALE_MAX {
                return Err(format!("{id} morale {} out of range", n.morale));
            }
            for (other, rel) in &n.relations {
                if rel.label() != super::nation::RelationLabel::from_trust(rel.trust()) {
                    return Err(format!("{id} label toward {other} is stale"));
                }
            }
        }
        if self.tension > TENSION_MAX {
            return Err(format!("tension {} out of range", self.tension));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn genesis_has_every_nation() {
        let mut rng = SmallRng::seed_from_u64(1);
        let world = World::genesis(&mut rng);
        assert_eq!(world.nations.len(), 5);
        assert_eq!(world.year, 1);
        assert_eq!(world.tension, GENESIS_TENSION);
        assert!(world.check_invariants().is_ok());
    }

    #[test]
    fn restore_backfills_missing_fields() {
        let mut rng = SmallRng::seed_from_u64(2);
        let blob = r#"{
            "year": 4,
            "season_index": 2,
            "tension": 55,
            "nations": {
                "rex": {
                    "alive": true, "troops": 10, "nukes": 1, "gold": 5, "grain": 5,
                    "morale": 40, "population": 900, "tech": 3,
                    "mood": "angry", "mood_reason": "x",
                    "personality": {"aggression": 80, "greed": 90, "pride": 85, "paranoia": 70, "loyalty": 20},
                    "wars": ["vera"]
                }
            }
        }"#;
        let world = World::restore(blob, &mut rng).unwrap();
        assert_eq!(world.year, 4);
        assert_eq!(world.nations.len(), 5);
        let rex = world.nation(NationId::Rex).unwrap();
        assert_eq!(rex.troops, 10);
        assert_eq!(rex.relations.len(), 4);
        assert_eq!(rex.cities.len(), 3);
        assert!(world.nation(NationId::Vera).unwrap().wars.contains(&NationId::Rex));
        assert!(world.check_invariants().is_ok());
        assert!(world.missions.is_empty());
    }

    #[test]
    fn round_trip_preserves_state() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut world = World::genesis(&mut rng);
        world.add_log("hello", LogKind::Event, 5);
        world.add_memory(NationId::Sage, "remember");
        let blob = serde_json::to_string(&world).unwrap();
        let back = World::restore(&blob, &mut rng).unwrap();
        assert_eq!(back.log.len(), 1);
        assert_eq!(back.nation(NationId::Sage).unwrap().memory.latest().unwrap(), "remember");
        for id in NationId::ALL {
            assert_eq!(
                back.nation(id).unwrap().relations,
                world.nation(id).unwrap().relations
            );
        }
    }

    #[test]
    fn tension_clamps() {
        let mut world = World::default();
        world.raise_tension(500);
        assert_eq!(world.tension, TENSION_MAX);
        world.adjust_tension(-1000);
        assert_eq!(world.tension, 0);
    }

    #[test]
    fn invariant_check_catches_one_sided_war() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut world = World::genesis(&mut rng);
        world.nation_mut(NationId::Rex).unwrap().wars.insert(NationId::Sage);
        assert!(world.check_invariants().is_err());
    }
}
