use std::time::Duration;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::info;

use super::context::{Job, TickContext};
use super::events::fire_event;
use super::system::SimSystem;
use crate::catalog::render;
use crate::config::Cadence;
use crate::model::{LogKind, NationId, Notice, Prophecy};

/// Seconds between announcement and fulfilment.
pub const FULFIL_DELAY_SECS: std::ops::RangeInclusive<u64> = 90..=180;
const MAX_FORETOLD: usize = 2;

/// Announces a foreshadowed event and schedules its fulfilment.
pub struct ProphecySystem {
    cadence: Cadence,
}

impl ProphecySystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for ProphecySystem {
    fn name(&self) -> &str {
        "prophecy"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        if ctx.world.active_prophecy.is_some() {
            return;
        }
        let Some(spec) = ctx.catalog.prophecies.choose(ctx.rng).cloned() else {
            return;
        };
        let mut living = ctx.world.living();
        if living.is_empty() {
            return;
        }
        living.shuffle(ctx.rng);
        let count = ctx.rng.random_range(1..=MAX_FORETOLD).min(living.len());
        living.truncate(count);
        living.sort();

        let names: Vec<&str> = living.iter().map(|n| n.name()).collect();
        let prophecy = Prophecy {
            id: ctx.world.id_gen.next_tagged("prophecy"),
            text: render(&spec.text, &names.join(" and ")),
            event: spec.event,
            nations: living,
            announced_year: ctx.world.year,
        };
        ctx.world.active_prophecy = Some(prophecy.clone());
        ctx.record(prophecy.text.clone(), LogKind::Event, None);
        ctx.out.broadcast(Notice::Prophecy {
            prophecy: prophecy.clone(),
        });
        let delay = Duration::from_secs(ctx.rng.random_range(FULFIL_DELAY_SECS));
        ctx.out.schedule(delay, Job::FulfilProphecy { id: prophecy.id.clone() });
        info!(id = %prophecy.id, event = %prophecy.event, "prophecy announced");
    }
}

/// Fire the foretold event on every named nation still alive. Stale ids no-op.
pub fn fulfil(ctx: &mut TickContext, id: &str) -> bool {
    let matches = ctx.world.active_prophecy.as_ref().is_some_and(|p| p.id == id);
    if !matches {
        return false;
    }
    let Some(prophecy) = ctx.world.active_prophecy.take() else {
        return false;
    };
    let fired: Vec<NationId> = prophecy
        .nations
        .iter()
        .copied()
        .filter(|&n| fire_event(ctx, &prophecy.event, n))
        .collect();
    ctx.record(
        format!("🔮 The prophecy is fulfilled: {}", prophecy.text),
        LogKind::Event,
        fired.first().copied(),
    );
    ctx.out.broadcast(Notice::ProphecyFulfilled { prophecy });
    true
}
