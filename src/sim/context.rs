use std::time::Duration;

use rand::{Rng, RngCore};

use crate::catalog::Catalog;
use crate::id::{SessionId, ViewerId};
use crate::model::{ActionResult, Audience, LogKind, NationId, Notice, World};

/// One-shot work scheduled for later on the same timeline.
///
/// Jobs carry only ids; the world is re-read when they run, so a job aimed at
/// a nation that has since died no-ops through the mutators' liveness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    NukeImpact { attacker: NationId, target: NationId },
    Succession { nation: NationId },
    Cascade { event: String, nation: NationId },
    PowerVacuum { nation: NationId },
    FulfilProphecy { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub delay: Duration,
    pub job: Job,
}

/// What a completion is for; routes the reply back when it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purpose {
    Decision {
        speaker: NationId,
    },
    Ambient {
        speaker: NationId,
    },
    Intercept {
        from: NationId,
        to: NationId,
    },
    Chronicle {
        year: u32,
    },
    Whisper {
        viewer: ViewerId,
        session: SessionId,
        to: NationId,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub purpose: Purpose,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

/// Effects collected while the world is borrowed. Drained by the session
/// once the step finishes.
#[derive(Debug, Default)]
pub struct Outbox {
    pub notices: Vec<(Audience, Notice)>,
    pub followups: Vec<FollowUp>,
    pub requests: Vec<CompletionRequest>,
    pub results: Vec<ActionResult>,
    /// Set when canonical state changed and a fresh snapshot is due.
    pub dirty: bool,
}

impl Outbox {
    pub fn broadcast(&mut self, notice: Notice) {
        self.notices.push((Audience::All, notice));
    }

    pub fn to_session(&mut self, session: &SessionId, notice: Notice) {
        self.notices.push((Audience::Session(session.clone()), notice));
    }

    pub fn to_viewer(&mut self, viewer: ViewerId, notice: Notice) {
        self.notices.push((Audience::Viewer(viewer), notice));
    }

    pub fn schedule(&mut self, delay: Duration, job: Job) {
        self.followups.push(FollowUp { delay, job });
    }

    pub fn request(&mut self, request: CompletionRequest) {
        self.requests.push(request);
    }
}

/// Context passed to each system, job, and command handler.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut dyn RngCore,
    pub catalog: &'a Catalog,
    /// Wall-clock milliseconds; persisted deadlines compare against this.
    pub now_ms: u64,
    pub out: &'a mut Outbox,
}

impl TickContext<'_> {
    /// Append to the world log and broadcast it as a world event.
    pub fn record(&mut self, text: impl Into<String>, kind: LogKind, nation: Option<NationId>) {
        let text = text.into();
        self.world.add_log(text.clone(), kind, self.now_ms);
        self.out.broadcast(Notice::event(text, kind, nation));
        self.out.dirty = true;
    }

    pub fn roll(&mut self, chance: f64) -> bool {
        self.rng.random_bool(chance.clamp(0.0, 1.0))
    }

    /// Schedule `job` with probability `chance`. Returns whether it was scheduled.
    pub fn maybe_schedule(&mut self, chance: f64, delay: Duration, job: Job) -> bool {
        if self.roll(chance) {
            self.out.schedule(delay, job);
            true
        } else {
            false
        }
    }

    pub fn touch(&mut self) {
        self.out.dirty = true;
    }
}
