use rand::seq::IndexedRandom;
use tracing::debug;

use super::award;
use crate::id::SessionId;
use crate::model::mission::{
    MISSION_PENALTY_TRUST, MISSION_REWARD_GOLD, MISSION_REWARD_TRUST, MISSION_TTL_MS, MissionReward,
};
use crate::model::{Merit, Mission, MissionKind, NationId, Notice};
use crate::sim::context::TickContext;

fn describe(kind: MissionKind, issuer: NationId, target: Option<NationId>) -> String {
    match (kind, target) {
        (MissionKind::ConvincePeace, Some(t)) => {
            format!("Convince {} to make peace with {}.", t.name(), issuer.name())
        }
        (MissionKind::DeliverWarning, Some(t)) => {
            format!("Deliver a stern warning to {} from {}.", t.name(), issuer.name())
        }
        (_, target) => format!(
            "Secure a secret alliance between {} and {}.",
            issuer.name(),
            target.map_or("another ruler", NationId::name)
        ),
    }
}

/// Generate a fresh mission for `session`, replacing any previous one.
/// `None` when no ruler is alive to issue it.
pub fn assign(ctx: &mut TickContext, session: &SessionId) -> Option<Mission> {
    let living = ctx.world.living();
    let &issuer = living.choose(ctx.rng)?;
    let others: Vec<NationId> = living.iter().copied().filter(|&n| n != issuer).collect();
    let target = others.choose(ctx.rng).copied();
    let kind = match target {
        Some(_) => *MissionKind::ALL.choose(ctx.rng)?,
        None => MissionKind::SecureAlliance,
    };
    let mission = Mission {
        id: ctx.world.id_gen.next_tagged("mission"),
        session: session.clone(),
        issuer,
        target,
        kind,
        description: describe(kind, issuer, target),
        deadline_ms: ctx.now_ms + MISSION_TTL_MS,
        reward: MissionReward {
            trust: MISSION_REWARD_TRUST,
            gold: MISSION_REWARD_GOLD,
        },
        penalty_trust: MISSION_PENALTY_TRUST,
        completed: false,
        expired: false,
    };
    ctx.world.missions.insert(session.clone(), mission.clone());
    ctx.touch();
    debug!(%session, kind = %mission.kind, "mission assigned");
    Some(mission)
}

/// The session's active mission, assigning one if it has none.
pub fn ensure(ctx: &mut TickContext, session: &SessionId) -> Option<Mission> {
    match ctx.world.missions.get(session) {
        Some(m) if m.is_active() => Some(m.clone()),
        _ => assign(ctx, session),
    }
}

/// Keyword co-occurrence in the combined whisper and reply.
pub fn is_satisfied(mission: &Mission, addressed: NationId, combined_lower: &str) -> bool {
    match mission.kind {
        MissionKind::ConvincePeace => combined_lower.contains("peace") && combined_lower.contains("agree"),
        MissionKind::DeliverWarning => combined_lower.contains("warning") && mission.issuer == addressed,
        MissionKind::SecureAlliance => combined_lower.contains("alliance") && combined_lower.contains("agree"),
    }
}

/// Complete the session's active mission if the exchange satisfies it.
/// Rewards apply at most once.
pub fn check_completion(
    ctx: &mut TickContext,
    session: &SessionId,
    addressed: NationId,
    whisper: &str,
    reply: &str,
) -> bool {
    let combined = format!("{} {}", reply.to_lowercase(), whisper.to_lowercase());
    let Some(m) = ctx.world.missions.get_mut(session) else {
        return false;
    };
    if !m.is_active() || !is_satisfied(m, addressed, &combined) {
        return false;
    }
    m.completed = true;
    let mission = m.clone();
    if let Some(issuer) = ctx.world.nation_mut(mission.issuer) {
        issuer.adjust_user_trust(session, mission.reward.trust);
    }
    ctx.out.to_session(session, Notice::MissionCompleted { mission });
    award(ctx, session, Merit::MissionCompleted);
    true
}
