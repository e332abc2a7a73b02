//! The synchronous core of one realm.
//!
//! A `Session` owns its world and drives it one step at a time: either a
//! command from outside (join, whisper, completion reply) or the next due item
//! on its agenda. Every step returns the effects it produced as `Outbound`
//! values; the async shell in `crate::engine` delivers them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::rngs::SmallRng;
use tracing::{debug, info, trace, warn};

use super::agenda::{Agenda, Scheduled};
use super::context::{CompletionRequest, FollowUp, Job, Outbox, Purpose, TickContext};
use super::jobs::run_job;
use super::prophecy::FULFIL_DELAY_SECS;
use super::system::SimSystem;
use super::{default_systems, oracle};
use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::fog;
use crate::id::{RealmId, SessionId, ViewerId};
use crate::influence::{missions, whisper};
use crate::model::persona::all_personas;
use crate::model::{Audience, LogKind, Notice, World};

/// Log entries included in a joining viewer's `Init`.
const INIT_LOG_ENTRIES: usize = 30;
const RESET_TEXT: &str = "🔄 The world has been reset. A new era begins.";

/// Input to a session from outside its own timeline.
#[derive(Debug, Clone)]
pub enum Command {
    Join {
        viewer: ViewerId,
        session: SessionId,
    },
    Leave {
        viewer: ViewerId,
    },
    Whisper {
        viewer: ViewerId,
        session: SessionId,
        to: String,
        text: String,
        name: Option<String>,
    },
    RequestMission {
        viewer: ViewerId,
        session: SessionId,
    },
    Reset,
    /// A completion finished (or failed, with empty text).
    Completed {
        purpose: Purpose,
        text: String,
    },
}

/// An effect for the async shell to carry out.
#[derive(Debug, Clone)]
pub enum Outbound {
    Broadcast(Notice),
    Direct(ViewerId, Notice),
    Complete(CompletionRequest),
    /// Serialized world, ready for the durable store.
    Persist(String),
}

pub struct Session {
    realm: RealmId,
    world: World,
    systems: Vec<Box<dyn SimSystem>>,
    rng: SmallRng,
    catalog: Arc<Catalog>,
    time_scale: f64,
    viewers: BTreeMap<ViewerId, SessionId>,
    agenda: Agenda,
}

impl Session {
    /// A session running the standard system set at `config`'s cadences.
    pub fn new(world: World, config: &EngineConfig, catalog: Arc<Catalog>, rng: SmallRng) -> Self {
        Self::with_systems(world, config, catalog, rng, default_systems(&config.cadences))
    }

    pub fn with_systems(
        world: World,
        config: &EngineConfig,
        catalog: Arc<Catalog>,
        rng: SmallRng,
        systems: Vec<Box<dyn SimSystem>>,
    ) -> Self {
        Self {
            realm: config.realm.clone(),
            world,
            systems,
            rng,
            catalog,
            time_scale: config.time_scale,
            viewers: BTreeMap::new(),
            agenda: Agenda::new(),
        }
    }

    pub fn realm(&self) -> &RealmId {
        &self.realm
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Due time of the next agenda item, if any.
    pub fn next_due(&self) -> Option<u64> {
        self.agenda.next_due()
    }

    /// Pending one-shot jobs, in no particular order.
    pub fn pending_jobs(&self) -> Vec<Job> {
        self.agenda.jobs().cloned().collect()
    }

    fn delay_ms(&self, delay: Duration) -> u64 {
        delay.mul_f64(self.time_scale).as_millis() as u64
    }

    /// Put every system on the agenda. A prophecy restored from the store
    /// gets a fresh fulfilment job since jobs are not persisted.
    pub fn start(&mut self, now_ms: u64) {
        for i in 0..self.systems.len() {
            let delay = self.systems[i].next_delay(&self.world, &mut self.rng);
            let due = now_ms + self.delay_ms(delay);
            self.agenda.push(due, Scheduled::System(i));
        }
        if let Some(p) = &self.world.active_prophecy {
            let id = p.id.clone();
            let delay = Duration::from_secs(self.rng.random_range(FULFIL_DELAY_SECS));
            let due = now_ms + self.delay_ms(delay);
            self.agenda.push(due, Scheduled::Job(Job::FulfilProphecy { id }));
        }
        info!(realm = %self.realm, systems = self.systems.len(), "session started");
    }

    fn with_ctx<R>(
        &mut self,
        now_ms: u64,
        f: impl FnOnce(&mut TickContext, &mut [Box<dyn SimSystem>]) -> R,
    ) -> (R, Outbox) {
        let mut out = Outbox::default();
        let mut ctx = TickContext {
            world: &mut self.world,
            rng: &mut self.rng,
            catalog: self.catalog.as_ref(),
            now_ms,
            out: &mut out,
        };
        let result = f(&mut ctx, &mut self.systems);
        (result, out)
    }

    /// Run every agenda item due at or before `now_ms`, each as its own step.
    pub fn run_due(&mut self, now_ms: u64) -> Vec<Outbound> {
        let mut outbound = Vec::new();
        while let Some((due_ms, item)) = self.agenda.pop_due(now_ms) {
            trace!(due_ms, ?item, "agenda");
            match item {
                Scheduled::System(i) => {
                    let (delay, out) = self.with_ctx(now_ms, |ctx, systems| {
                        let system = systems.get_mut(i)?;
                        debug!(system = system.name(), "tick");
                        system.tick(ctx);
                        Some(system.next_delay(ctx.world, ctx.rng))
                    });
                    if let Some(delay) = delay {
                        let next = now_ms + self.delay_ms(delay);
                        self.agenda.push(next, Scheduled::System(i));
                    }
                    outbound.extend(self.finish(now_ms, out));
                }
                Scheduled::Job(job) => {
                    let (ran, out) = self.with_ctx(now_ms, |ctx, _| run_job(ctx, &job));
                    debug!(?job, ran, "job");
                    outbound.extend(self.finish(now_ms, out));
                }
            }
        }
        outbound
    }

    /// Apply one external command.
    pub fn handle(&mut self, command: Command, now_ms: u64) -> Vec<Outbound> {
        let out = match command {
            Command::Join { viewer, session } => {
                self.viewers.insert(viewer, session.clone());
                let is_new = self.world.log.is_empty();
                let ((), out) = self.with_ctx(now_ms, |ctx, _| {
                    ctx.world.player_mut(&session);
                    let mission = missions::ensure(ctx, &session);
                    let init = Notice::Init {
                        personas: all_personas(),
                        world: Box::new(fog::project(ctx.world, Some(&session), ctx.rng)),
                        log: ctx.world.log.recent(INIT_LOG_ENTRIES).cloned().collect(),
                        chronicle: ctx.world.chronicle.to_vec(),
                        mission,
                        influence: ctx.world.player_mut(&session).clone(),
                        is_new,
                    };
                    ctx.out.to_viewer(viewer, init);
                });
                info!(realm = %self.realm, %viewer, %session, "viewer joined");
                out
            }
            Command::Leave { viewer } => {
                if self.viewers.remove(&viewer).is_some() {
                    info!(realm = %self.realm, %viewer, "viewer left");
                }
                return Vec::new();
            }
            Command::Whisper {
                viewer,
                session,
                to,
                text,
                name,
            } => {
                let ((), out) = self.with_ctx(now_ms, |ctx, _| {
                    whisper::handle(ctx, viewer, &session, &to, &text, name.as_deref());
                });
                out
            }
            Command::RequestMission { viewer, session } => {
                let ((), out) = self.with_ctx(now_ms, |ctx, _| {
                    if let Some(mission) = missions::assign(ctx, &session) {
                        ctx.out.to_viewer(viewer, Notice::MissionAssigned { mission });
                    }
                });
                out
            }
            Command::Reset => {
                self.world = World::genesis(&mut self.rng);
                self.agenda.clear_jobs();
                let sessions: Vec<(ViewerId, SessionId)> =
                    self.viewers.iter().map(|(&v, s)| (v, s.clone())).collect();
                let ((), out) = self.with_ctx(now_ms, |ctx, _| {
                    ctx.out.broadcast(Notice::WorldReset);
                    ctx.record(RESET_TEXT, LogKind::Event, None);
                    for (viewer, session) in &sessions {
                        if let Some(mission) = missions::ensure(ctx, session) {
                            ctx.out.to_viewer(*viewer, Notice::MissionAssigned { mission });
                        }
                    }
                });
                info!(realm = %self.realm, "world reset");
                out
            }
            Command::Completed { purpose, text } => {
                let ((), out) = self.with_ctx(now_ms, |ctx, _| match &purpose {
                    Purpose::Whisper {
                        viewer,
                        session,
                        to,
                        text: whispered,
                    } => whisper::on_reply(ctx, *viewer, session, *to, whispered, &text),
                    other => oracle::on_completion(ctx, other, &text),
                });
                out
            }
        };
        self.finish(now_ms, out)
    }

    /// Turn a step's outbox into outbound effects. A dirty step also yields a
    /// fogged snapshot for each viewer and a persist blob.
    fn finish(&mut self, now_ms: u64, out: Outbox) -> Vec<Outbound> {
        let Outbox {
            notices,
            followups,
            requests,
            dirty,
            ..
        } = out;
        for FollowUp { delay, job } in followups {
            let due = now_ms + self.delay_ms(delay);
            self.agenda.push(due, Scheduled::Job(job));
        }

        let mut outbound = Vec::with_capacity(notices.len() + requests.len());
        for (audience, notice) in notices {
            match audience {
                Audience::All => outbound.push(Outbound::Broadcast(notice)),
                Audience::Viewer(viewer) => outbound.push(Outbound::Direct(viewer, notice)),
                Audience::Session(session) => {
                    for (&viewer, s) in &self.viewers {
                        if *s == session {
                            outbound.push(Outbound::Direct(viewer, notice.clone()));
                        }
                    }
                }
            }
        }
        outbound.extend(requests.into_iter().map(Outbound::Complete));

        if dirty {
            for (&viewer, session) in &self.viewers {
                let world = fog::project(&self.world, Some(session), &mut self.rng);
                outbound.push(Outbound::Direct(
                    viewer,
                    Notice::WorldUpdate {
                        world: Box::new(world),
                    },
                ));
            }
            match serde_json::to_string(&self.world) {
                Ok(blob) => outbound.push(Outbound::Persist(blob)),
                Err(e) => warn!(realm = %self.realm, error = %e, "failed to serialize world"),
            }
        }
        outbound
    }
}
