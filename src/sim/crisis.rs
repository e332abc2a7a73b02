use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::info;

use super::context::TickContext;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::chronicle::CRISIS_TTL_MS;
use crate::model::{Crisis, LogKind, NationId, Notice};

const MIN_PARTICIPANTS: usize = 2;
const MAX_PARTICIPANTS: usize = 3;
/// Tension added by a new crisis is drawn from this range.
const CRISIS_TENSION: std::ops::Range<u32> = 20..40;

/// Open a crisis among `participants` and announce it.
pub fn open_crisis(ctx: &mut TickContext, text: String, participants: Vec<NationId>, tension: u32) -> Crisis {
    let crisis = Crisis {
        id: ctx.world.id_gen.next_tagged("crisis"),
        text,
        participants,
        deadline_ms: ctx.now_ms + CRISIS_TTL_MS,
        tension,
        resolved: false,
    };
    ctx.world.raise_tension(tension);
    ctx.world.crises.push(crisis.clone());
    for &p in &crisis.participants {
        ctx.world.add_memory(p, format!("A crisis involves me: {}", crisis.text));
    }
    let names: Vec<&str> = crisis.participants.iter().map(|p| p.name()).collect();
    ctx.record(
        format!("🚨 CRISIS: {} ({})", crisis.text, names.join(", ")),
        LogKind::Crisis,
        crisis.participants.first().copied(),
    );
    ctx.out.broadcast(Notice::Crisis {
        crisis: crisis.clone(),
    });
    info!(id = %crisis.id, tension = ctx.world.tension, "crisis opened");
    crisis
}

/// Pick `MIN..=MAX` living participants, excluding `exclude`.
pub fn pick_participants(ctx: &mut TickContext, exclude: Option<NationId>) -> Vec<NationId> {
    let mut living: Vec<NationId> = ctx
        .world
        .living()
        .into_iter()
        .filter(|&id| Some(id) != exclude)
        .collect();
    if living.len() < MIN_PARTICIPANTS {
        return Vec::new();
    }
    living.shuffle(ctx.rng);
    let count = ctx.rng.random_range(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).min(living.len());
    living.truncate(count);
    living.sort();
    living
}

/// Declares named crises from the catalog templates.
pub struct CrisisSystem {
    cadence: Cadence,
}

impl CrisisSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for CrisisSystem {
    fn name(&self) -> &str {
        "crisis"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let participants = pick_participants(ctx, None);
        if participants.is_empty() {
            return;
        }
        let Some(text) = ctx.catalog.crises.choose(ctx.rng).cloned() else {
            return;
        };
        let tension = ctx.rng.random_range(CRISIS_TENSION);
        open_crisis(ctx, text, participants, tension);
    }
}
