use serde::{Deserialize, Serialize};

use super::persona::NationId;
use crate::id::SessionId;

pub const MISSION_TTL_MS: u64 = 15 * 60 * 1000;
pub const MISSION_REWARD_TRUST: i32 = 15;
pub const MISSION_REWARD_GOLD: u32 = 200;
pub const MISSION_PENALTY_TRUST: i32 = -10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MissionKind {
    ConvincePeace,
    DeliverWarning,
    SecureAlliance,
}

string_enum!(MissionKind {
    ConvincePeace => "convince_peace",
    DeliverWarning => "deliver_warning",
    SecureAlliance => "secure_alliance",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionReward {
    pub trust: i32,
    pub gold: u32,
}

/// A short-lived objective scoped to one viewer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub session: SessionId,
    pub issuer: NationId,
    pub target: Option<NationId>,
    pub kind: MissionKind,
    pub description: String,
    pub deadline_ms: u64,
    pub reward: MissionReward,
    pub penalty_trust: i32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub expired: bool,
}

impl Mission {
    pub fn is_active(&self) -> bool {
        !self.completed && !self.expired
    }

    pub fn is_overdue(&self, now_ms: u64) -> bool {
        self.is_active() && self.deadline_ms < now_ms
    }
}
