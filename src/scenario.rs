use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::id::SessionId;
use crate::model::nation::{Nation, Relation};
use crate::model::world::TENSION_MAX;
use crate::model::*;
use crate::sim::Session;
use crate::testutil::Harness;

/// Typed reference to one nation in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::nation`]. Call [`.done()`](NationRef::done) to end the chain.
pub struct NationRef<'a> {
    scenario: &'a mut Scenario,
    id: NationId,
}

impl NationRef<'_> {
    fn data_mut(&mut self) -> &mut Nation {
        let id = self.id;
        self.scenario.world.nations.entry(id).or_insert_with(|| Nation::at_start(id))
    }

    pub fn troops(mut self, v: u32) -> Self { self.data_mut().troops = v; self }
    pub fn nukes(mut self, v: u32) -> Self { self.data_mut().nukes = v; self }
    pub fn gold(mut self, v: u32) -> Self { self.data_mut().gold = v; self }
    pub fn grain(mut self, v: u32) -> Self { self.data_mut().grain = v; self }
    pub fn morale(mut self, v: u32) -> Self { self.data_mut().set_morale(i64::from(v)); self }
    pub fn population(mut self, v: u32) -> Self { self.data_mut().population = v; self }
    pub fn tech(mut self, v: u32) -> Self { self.data_mut().tech = v; self }
    pub fn mood(mut self, v: Mood) -> Self { self.data_mut().mood = v; self }
    pub fn aggression(mut self, v: u8) -> Self { self.data_mut().personality.aggression = v; self }
    pub fn remember(mut self, text: &str) -> Self { self.data_mut().memory.push(text.to_string()); self }

    /// Directed trust toward `other`; the label follows.
    pub fn trust_toward(mut self, other: NationId, trust: i32) -> Self {
        self.data_mut().relation_mut(other).set_trust(trust);
        self
    }

    pub fn viewer_trust(mut self, session: &SessionId, v: u8) -> Self {
        self.data_mut().user_trust.insert(session.clone(), v.min(100));
        self
    }

    /// Escape hatch: apply an arbitrary closure to the nation.
    pub fn with(mut self, f: impl FnOnce(&mut Nation)) -> Self { f(self.data_mut()); self }

    pub fn done(self) -> NationId { self.id }
}

/// Fluent builder for world states used by tests and demo setups.
///
/// Starts from every persona at its starting stats with neutral relations, so
/// outcomes depend only on what the scenario changes.
pub struct Scenario {
    world: World,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    pub fn new() -> Self {
        let mut world = World::default();
        for id in NationId::ALL {
            world.nations.insert(id, Nation::at_start(id));
        }
        Self { world }
    }

    pub fn at_year(year: u32) -> Self {
        let mut s = Self::new();
        s.world.year = year;
        s
    }

    pub fn nation(&mut self, id: NationId) -> NationRef<'_> {
        NationRef { scenario: self, id }
    }

    pub fn tension(&mut self, v: u32) -> &mut Self {
        self.world.tension = v.min(TENSION_MAX);
        self
    }

    /// Symmetric war edge with hostile trust.
    pub fn at_war(&mut self, a: NationId, b: NationId) -> &mut Self {
        for (x, y) in [(a, b), (b, a)] {
            if let Some(n) = self.world.nation_mut(x) {
                n.allies.remove(&y);
                n.wars.insert(y);
                *n.relation_mut(y) = Relation::new(-60);
            }
        }
        self
    }

    /// Symmetric alliance edge with warm trust.
    pub fn allied(&mut self, a: NationId, b: NationId) -> &mut Self {
        for (x, y) in [(a, b), (b, a)] {
            if let Some(n) = self.world.nation_mut(x) {
                n.wars.remove(&y);
                n.allies.insert(y);
                *n.relation_mut(y) = Relation::new(70);
            }
        }
        self
    }

    /// Mark a nation dead, dropping its edges on both sides.
    pub fn dead(&mut self, id: NationId) -> &mut Self {
        for n in self.world.nations.values_mut() {
            n.wars.remove(&id);
            n.allies.remove(&id);
        }
        if let Some(n) = self.world.nation_mut(id) {
            n.alive = false;
            n.troops = 0;
            n.wars.clear();
            n.allies.clear();
        }
        self
    }

    /// Give a viewer session influence points, unlocking abilities.
    pub fn viewer_points(&mut self, session: &SessionId, points: u32) -> &mut Self {
        self.world.player_mut(session).award(points);
        self
    }

    pub fn mission(&mut self, mission: Mission) -> &mut Self {
        self.world.missions.insert(mission.session.clone(), mission);
        self
    }

    pub fn log(&mut self, text: &str) -> &mut Self {
        self.world.add_log(text, LogKind::Event, 0);
        self
    }

    /// Consume the builder. Panics if the setup broke a structural invariant.
    pub fn build(self) -> World {
        if let Err(e) = self.world.check_invariants() {
            panic!("scenario produced an invalid world: {e}");
        }
        self.world
    }

    pub fn harness(self, seed: u64) -> Harness {
        Harness::from_world(self.build(), seed)
    }

    /// A session over the built world with the standard systems.
    pub fn session(self, seed: u64, config: &EngineConfig) -> Session {
        Session::new(
            self.build(),
            config,
            Arc::new(Catalog::builtin()),
            SmallRng::seed_from_u64(seed),
        )
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_symmetric() {
        let mut s = Scenario::new();
        s.at_war(NationId::Rex, NationId::Vera).allied(NationId::Sage, NationId::Plato);
        let world = s.build();
        assert!(world.nation(NationId::Vera).unwrap().wars.contains(&NationId::Rex));
        assert!(world.nation(NationId::Plato).unwrap().allies.contains(&NationId::Sage));
        assert_eq!(
            world.nation(NationId::Rex).unwrap().relation(NationId::Vera).label(),
            RelationLabel::Enemy
        );
    }

    #[test]
    fn dead_nation_loses_edges() {
        let mut s = Scenario::new();
        s.at_war(NationId::Rex, NationId::Vera).dead(NationId::Vera);
        let world = s.build();
        assert!(!world.is_alive(NationId::Vera));
        assert!(world.nation(NationId::Rex).unwrap().wars.is_empty());
    }

    #[test]
    fn nation_ref_chains() {
        let mut s = Scenario::new();
        let id = s
            .nation(NationId::Diddy)
            .gold(5)
            .morale(500)
            .trust_toward(NationId::Sage, -90)
            .done();
        let world = s.build();
        let n = world.nation(id).unwrap();
        assert_eq!(n.gold, 5);
        assert_eq!(n.morale, 100);
        assert_eq!(n.relation(NationId::Sage).label(), RelationLabel::Enemy);
    }
}
