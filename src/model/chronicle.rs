//! Crises, prophecies, and the auxiliary feeds shown to viewers.

use serde::{Deserialize, Serialize};

use super::persona::NationId;

pub const CRISIS_TTL_MS: u64 = 10 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crisis {
    pub id: String,
    pub text: String,
    pub participants: Vec<NationId>,
    pub deadline_ms: u64,
    pub tension: u32,
    #[serde(default)]
    pub resolved: bool,
}

/// A foreshadowed event, fulfilled by a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prophecy {
    pub id: String,
    pub text: String,
    pub event: String,
    pub nations: Vec<NationId>,
    pub announced_year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingNews {
    pub id: String,
    pub headline: String,
    pub year: u32,
    pub at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intercept {
    pub from: NationId,
    pub to: NationId,
    pub text: String,
    pub at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    pub year: u32,
    pub text: String,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LogKind {
    Event,
    War,
    Alliance,
    Peace,
    Nuke,
    Crisis,
    Speech,
}

string_enum!(LogKind {
    Event => "event",
    War => "war",
    Alliance => "alliance",
    Peace => "peace",
    Nuke => "nuke",
    Crisis => "crisis",
    Speech => "speech",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub kind: LogKind,
    pub year: u32,
    pub at_ms: u64,
}
