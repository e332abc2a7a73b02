use serde::Serialize;

use super::chronicle::{BreakingNews, ChronicleEntry, Crisis, Intercept, LogEntry, LogKind, Prophecy};
use super::influence::{Ability, PlayerInfluence};
use super::mission::Mission;
use super::persona::{NationId, Persona};
use crate::fog::WorldSnapshot;
use crate::id::{SessionId, ViewerId};

/// Who an outbound notice is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    All,
    /// Every live viewer attached to this session.
    Session(SessionId),
    Viewer(ViewerId),
}

/// A message the engine emits toward viewers. Wire encoding is the
/// transport's concern; this serializes with a `type` tag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    WorldUpdate {
        world: Box<WorldSnapshot>,
    },
    Init {
        personas: &'static [Persona],
        world: Box<WorldSnapshot>,
        log: Vec<LogEntry>,
        chronicle: Vec<ChronicleEntry>,
        mission: Option<Mission>,
        influence: PlayerInfluence,
        is_new: bool,
    },
    WorldEvent {
        text: String,
        kind: LogKind,
        nation: Option<NationId>,
    },
    NukeIncoming {
        from: NationId,
        to: NationId,
    },
    NukeImpact {
        from: NationId,
        to: NationId,
        city: String,
    },
    Crisis {
        crisis: Crisis,
    },
    Chronicle {
        entry: ChronicleEntry,
    },
    Prophecy {
        prophecy: Prophecy,
    },
    ProphecyFulfilled {
        prophecy: Prophecy,
    },
    BreakingNews {
        news: BreakingNews,
    },
    YearUpdate {
        year: u32,
        season: &'static str,
        season_index: u8,
    },
    Message {
        nation: NationId,
        text: String,
    },
    Intercept {
        entry: Intercept,
    },
    Typing {
        nation: NationId,
    },
    WhisperReply {
        nation: NationId,
        text: String,
    },
    MissionAssigned {
        mission: Mission,
    },
    MissionCompleted {
        mission: Mission,
    },
    MissionExpired {
        mission: Mission,
    },
    LevelUp {
        level: u8,
        /// Highest ability unlocked by this level up.
        ability: Option<Ability>,
        abilities: Vec<Ability>,
    },
    SecretRevealed {
        nation: NationId,
        secret: String,
    },
    RumorPlanted {
        nation: NationId,
        text: String,
    },
    LeverageUsed {
        nation: NationId,
        against: NationId,
    },
    MemoryRead {
        nation: NationId,
        memory: Vec<String>,
    },
    AbilityLocked {
        ability: Ability,
        required_level: u8,
    },
    WorldReset,
}

impl Notice {
    pub fn event(text: impl Into<String>, kind: LogKind, nation: Option<NationId>) -> Self {
        Notice::WorldEvent {
            text: text.into(),
            kind,
            nation,
        }
    }

    pub fn type_str(&self) -> &'static str {
        match self {
            Notice::WorldUpdate { .. } => "world_update",
            Notice::Init { .. } => "init",
            Notice::WorldEvent { .. } => "world_event",
            Notice::NukeIncoming { .. } => "nuke_incoming",
            Notice::NukeImpact { .. } => "nuke_impact",
            Notice::Crisis { .. } => "crisis",
            Notice::Chronicle { .. } => "chronicle",
            Notice::Prophecy { .. } => "prophecy",
            Notice::ProphecyFulfilled { .. } => "prophecy_fulfilled",
            Notice::BreakingNews { .. } => "breaking_news",
            Notice::YearUpdate { .. } => "year_update",
            Notice::Message { .. } => "message",
            Notice::Intercept { .. } => "intercept",
            Notice::Typing { .. } => "typing",
            Notice::WhisperReply { .. } => "whisper_reply",
            Notice::MissionAssigned { .. } => "mission_assigned",
            Notice::MissionCompleted { .. } => "mission_completed",
            Notice::MissionExpired { .. } => "mission_expired",
            Notice::LevelUp { .. } => "level_up",
            Notice::SecretRevealed { .. } => "secret_revealed",
            Notice::RumorPlanted { .. } => "rumor_planted",
            Notice::LeverageUsed { .. } => "leverage_used",
            Notice::MemoryRead { .. } => "memory_read",
            Notice::AbilityLocked { .. } => "ability_locked",
            Notice::WorldReset => "world_reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tag_matches_serde() {
        let notices = [
            Notice::event("x", LogKind::War, Some(NationId::Rex)),
            Notice::NukeIncoming {
                from: NationId::Rex,
                to: NationId::Vera,
            },
            Notice::LevelUp {
                level: 2,
                ability: Some(Ability::RumorPlanting),
                abilities: vec![Ability::RumorPlanting],
            },
            Notice::WorldReset,
        ];
        for notice in notices {
            let json = serde_json::to_value(&notice).unwrap();
            assert_eq!(json["type"], notice.type_str());
        }
    }

    #[test]
    fn level_up_names_ability() {
        let json = serde_json::to_value(Notice::LevelUp {
            level: 3,
            ability: Some(Ability::MemoryReading),
            abilities: vec![Ability::RumorPlanting, Ability::MemoryReading],
        })
        .unwrap();
        assert_eq!(json["ability"], "memory_reading");
        assert_eq!(json["abilities"][0], "rumor_planting");
    }
}
