//! Structured diplomatic intents.
//!
//! Free text from rulers and viewers is parsed into `Action`s; the action
//! engine applies them through the store mutators and records `ActionResult`s.

use serde::Serialize;

use super::persona::NationId;
use crate::id::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSource {
    /// A ruler decided on its own during a scheduled decision call.
    Autonomous,
    /// A ruler's reply to a viewer's whisper.
    Whisper { session: SessionId },
    /// A viewer command (rumor, leverage) acting on a ruler.
    Viewer { session: SessionId },
}

impl ActionSource {
    pub fn session(&self) -> Option<&SessionId> {
        match self {
            ActionSource::Autonomous => None,
            ActionSource::Whisper { session } | ActionSource::Viewer { session } => Some(session),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub actor: NationId,
    pub source: ActionSource,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    DeclareWar { target: NationId },
    FormAlliance { target: NationId },
    MakePeace { target: NationId },
    BetrayAlly { target: NationId },
    LaunchNuke { target: NationId },
    ProposeTrade { target: NationId },
    Mobilize,
    /// Lower the actor's trust toward `toward`. Only produced by viewer commands.
    SowDistrust { toward: NationId, amount: i32 },
}

impl ActionKind {
    pub fn target(&self) -> Option<NationId> {
        match *self {
            ActionKind::DeclareWar { target }
            | ActionKind::FormAlliance { target }
            | ActionKind::MakePeace { target }
            | ActionKind::BetrayAlly { target }
            | ActionKind::LaunchNuke { target }
            | ActionKind::ProposeTrade { target } => Some(target),
            ActionKind::SowDistrust { toward, .. } => Some(toward),
            ActionKind::Mobilize => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub actor: NationId,
    pub source: ActionSource,
    pub kind: ActionKind,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Preconditions did not hold (dead participant, duplicate edge, no gold).
    Ignored,
}

impl ActionResult {
    pub fn applied(&self) -> bool {
        self.outcome == ActionOutcome::Applied
    }
}
