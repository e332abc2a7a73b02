use rand::seq::SliceRandom;
use tracing::debug;

use super::context::TickContext;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::{LogKind, Notice};
use crate::store;

/// Chance an expired crisis ends in war between two of its participants.
const CRISIS_WAR_CHANCE: f64 = 0.4;
/// Resolved crises are dropped from the world this long after their deadline.
const RESOLVED_RETENTION_MS: u64 = 30 * 60 * 1000;

/// Resolves crises and missions whose deadline has passed.
pub struct ExpirySystem {
    cadence: Cadence,
}

impl ExpirySystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for ExpirySystem {
    fn name(&self) -> &str {
        "expiry"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        expire_crises(ctx);
        expire_missions(ctx);
    }
}

fn expire_crises(ctx: &mut TickContext) {
    let now = ctx.now_ms;
    let due: Vec<usize> = ctx
        .world
        .crises
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.resolved && c.deadline_ms < now)
        .map(|(i, _)| i)
        .collect();
    for i in due {
        let crisis = {
            let c = &mut ctx.world.crises[i];
            c.resolved = true;
            c.clone()
        };
        ctx.record(
            format!("⏳ The crisis has passed: {}", crisis.text),
            LogKind::Crisis,
            None,
        );
        if ctx.roll(CRISIS_WAR_CHANCE) {
            let mut fighters: Vec<_> = crisis
                .participants
                .iter()
                .copied()
                .filter(|&p| ctx.world.is_alive(p))
                .collect();
            fighters.shuffle(ctx.rng);
            if let [a, b, ..] = fighters.as_slice() {
                store::declare_war(ctx, *a, *b);
            }
        }
        debug!(id = %crisis.id, "crisis expired");
    }
    ctx.world
        .crises
        .retain(|c| !c.resolved || c.deadline_ms + RESOLVED_RETENTION_MS > now);
}

fn expire_missions(ctx: &mut TickContext) {
    let now = ctx.now_ms;
    let overdue: Vec<_> = ctx
        .world
        .missions
        .values()
        .filter(|m| m.is_overdue(now))
        .map(|m| m.session.clone())
        .collect();
    for session in overdue {
        let Some(m) = ctx.world.missions.get_mut(&session) else {
            continue;
        };
        m.expired = true;
        let mission = m.clone();
        if let Some(issuer) = ctx.world.nation_mut(mission.issuer) {
            issuer.adjust_user_trust(&session, mission.penalty_trust);
        }
        ctx.out.to_session(&session, Notice::MissionExpired { mission });
        ctx.touch();
    }
}
