//! Helpers for driving systems, jobs, and commands by hand in tests.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::Catalog;
use crate::model::{Notice, World};
use crate::sim::context::{FollowUp, Outbox, TickContext};
use crate::sim::jobs::run_job;
use crate::sim::system::SimSystem;

/// Arbitrary wall-clock start so deadlines never sit at zero.
pub const START_MS: u64 = 1_000_000;

/// A world plus everything a `TickContext` borrows, owned in one place.
pub struct Harness {
    pub world: World,
    pub rng: SmallRng,
    pub catalog: Catalog,
    pub out: Outbox,
    pub now_ms: u64,
}

impl Harness {
    /// A genesis world with the built-in catalog.
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let world = World::genesis(&mut rng);
        Self::with_rng(world, rng)
    }

    pub fn from_world(world: World, seed: u64) -> Self {
        Self::with_rng(world, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(world: World, rng: SmallRng) -> Self {
        Self {
            world,
            rng,
            catalog: Catalog::builtin(),
            out: Outbox::default(),
            now_ms: START_MS,
        }
    }

    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut TickContext) -> R) -> R {
        let mut ctx = TickContext {
            world: &mut self.world,
            rng: &mut self.rng,
            catalog: &self.catalog,
            now_ms: self.now_ms,
            out: &mut self.out,
        };
        f(&mut ctx)
    }

    pub fn tick(&mut self, system: &mut dyn SimSystem) {
        self.with_ctx(|ctx| system.tick(ctx));
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Run every queued follow-up immediately, including ones they schedule,
    /// up to a fixed number of rounds.
    pub fn run_followups(&mut self) -> usize {
        let mut ran = 0;
        for _ in 0..8 {
            let pending: Vec<FollowUp> = std::mem::take(&mut self.out.followups);
            if pending.is_empty() {
                break;
            }
            for FollowUp { delay, job } in pending {
                self.advance_ms(delay.as_millis() as u64);
                if self.with_ctx(|ctx| run_job(ctx, &job)) {
                    ran += 1;
                }
            }
        }
        ran
    }

    pub fn notices_of(&self, type_str: &str) -> usize {
        self.out
            .notices
            .iter()
            .filter(|(_, n)| n.type_str() == type_str)
            .count()
    }

    /// The most recent notice of a kind, as JSON.
    pub fn last_notice_json(&self, type_str: &str) -> Option<serde_json::Value> {
        self.out
            .notices
            .iter()
            .rev()
            .find(|(_, n)| n.type_str() == type_str)
            .and_then(|(_, n)| serde_json::to_value(n).ok())
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.out.notices.last().map(|(_, n)| n)
    }

    /// Drop collected effects, keeping the world.
    pub fn clear_out(&mut self) {
        self.out = Outbox::default();
    }

    pub fn assert_invariants(&self) {
        if let Err(e) = self.world.check_invariants() {
            panic!("world invariant violated: {e}");
        }
    }
}
