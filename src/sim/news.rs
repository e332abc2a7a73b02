use rand::seq::IndexedRandom;

use super::context::TickContext;
use super::events::apply_effects;
use super::system::SimSystem;
use crate::catalog::{Effect, NewsScope, render};
use crate::config::Cadence;
use crate::model::{BreakingNews, LogKind, Notice};

/// Applies a hand-authored headline effect, to one nation or to all.
pub struct NewsSystem {
    cadence: Cadence,
}

impl NewsSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for NewsSystem {
    fn name(&self) -> &str {
        "news"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let living = ctx.world.living();
        let Some(&subject) = living.choose(ctx.rng) else {
            return;
        };
        let Some(spec) = ctx.catalog.breaking_news.choose(ctx.rng).cloned() else {
            return;
        };

        let (world_fx, nation_fx): (Vec<Effect>, Vec<Effect>) = spec
            .effects
            .iter()
            .copied()
            .partition(|e| matches!(e, Effect::Tension(_)));
        let targets = match spec.scope {
            NewsScope::All => living.clone(),
            NewsScope::One => vec![subject],
        };
        for &t in &targets {
            apply_effects(ctx.world, t, &nation_fx);
        }
        apply_effects(ctx.world, subject, &world_fx);

        let news = BreakingNews {
            id: ctx.world.id_gen.next_tagged("news"),
            headline: render(&spec.headline, subject.name()),
            year: ctx.world.year,
            at_ms: ctx.now_ms,
        };
        ctx.world.breaking_news_history.push(news.clone());
        let nation = (spec.scope == NewsScope::One).then_some(subject);
        ctx.record(format!("📰 BREAKING: {}", news.headline), LogKind::Event, nation);
        ctx.out.broadcast(Notice::BreakingNews { news });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Harness;

    #[test]
    fn headline_is_recorded_and_capped() {
        let mut h = Harness::new(1);
        let mut system = NewsSystem::new(Cadence::every(600));
        for _ in 0..25 {
            h.tick(&mut system);
        }
        assert_eq!(h.world.breaking_news_history.len(), 20);
        assert_eq!(h.notices_of("breaking_news"), 25);
        assert!(h.world.check_invariants().is_ok());
    }

    #[test]
    fn tension_effect_applies_once_for_global_news() {
        let mut h = Harness::new(2);
        h.catalog.breaking_news.retain(|n| n.id == "comet");
        h.world.tension = 10;
        h.tick(&mut NewsSystem::new(Cadence::every(600)));
        assert_eq!(h.world.tension, 20);
    }
}
