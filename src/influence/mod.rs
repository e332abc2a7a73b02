//! Viewer progression: influence points, level-gated abilities, missions,
//! and the whisper exchange that drives them.

pub mod missions;
pub mod whisper;

use tracing::info;

use crate::id::SessionId;
use crate::model::{Ability, Merit, Notice};
use crate::sim::context::TickContext;

/// Award `merit` to a session. Fires one `LevelUp` notice when a threshold is
/// crossed, listing every ability unlocked on the way to the new level.
pub fn award(ctx: &mut TickContext, session: &SessionId, merit: Merit) -> Option<u8> {
    let player = ctx.world.player_mut(session);
    let before = player.level;
    let level = player.award(merit.points());
    ctx.touch();
    if let Some(level) = level {
        let abilities: Vec<Ability> = (before + 1..=level).filter_map(Ability::unlocked_at).collect();
        info!(%session, level, %merit, unlocked = abilities.len(), "level up");
        ctx.out.to_session(
            session,
            Notice::LevelUp {
                level,
                ability: abilities.last().copied(),
                abilities,
            },
        );
    }
    level
}

/// Whether the session may use `ability`; otherwise notify it and return false.
pub fn require(ctx: &mut TickContext, session: &SessionId, ability: Ability) -> bool {
    if ctx.world.player_mut(session).has(ability) {
        return true;
    }
    ctx.out.to_session(
        session,
        Notice::AbilityLocked {
            ability,
            required_level: ability.required_level(),
        },
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Harness;

    #[test]
    fn level_up_fires_once_per_threshold() {
        let mut h = Harness::new(1);
        let s = SessionId::from("s1");
        assert_eq!(h.with_ctx(|ctx| award(ctx, &s, Merit::MissionCompleted)), None);
        assert_eq!(h.with_ctx(|ctx| award(ctx, &s, Merit::AmbientSuccess)), None);
        assert_eq!(h.with_ctx(|ctx| award(ctx, &s, Merit::SecretDiscovered)), Some(2));
        assert_eq!(h.with_ctx(|ctx| award(ctx, &s, Merit::AmbientSuccess)), None);
        assert_eq!(h.notices_of("level_up"), 1);
        let json = h.last_notice_json("level_up").unwrap();
        assert_eq!(json["ability"], "rumor_planting");
        assert_eq!(json["abilities"], serde_json::json!(["rumor_planting"]));
    }

    #[test]
    fn multi_level_jump_names_every_unlocked_ability() {
        let mut h = Harness::new(3);
        let s = SessionId::from("s1");
        h.world.player_mut(&s).points = 295;
        assert_eq!(h.with_ctx(|ctx| award(ctx, &s, Merit::TradeBrokered)), Some(5));
        assert_eq!(h.notices_of("level_up"), 1);
        let json = h.last_notice_json("level_up").unwrap();
        assert_eq!(json["level"], 5);
        assert_eq!(json["ability"], "event_triggering");
        assert_eq!(
            json["abilities"],
            serde_json::json!(["rumor_planting", "memory_reading", "suggestion_weight", "event_triggering"])
        );
    }

    #[test]
    fn locked_ability_notifies() {
        let mut h = Harness::new(2);
        let s = SessionId::from("s1");
        assert!(!h.with_ctx(|ctx| require(ctx, &s, Ability::EventTriggering)));
        assert_eq!(h.notices_of("ability_locked"), 1);
    }
}
