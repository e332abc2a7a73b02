//! The async shell around `Session`: one tokio task per realm.
//!
//! The task selects on its command queue and on the next agenda deadline,
//! runs one step at a time, and hands the resulting effects to the
//! collaborators. Completions and saves run off the task so a slow service
//! never stalls the timeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::CompletionError;
use crate::id::{RealmId, SessionId, ViewerId};
use crate::model::World;
use crate::service::{Broadcaster, TextCompletion, WorldStore};
use crate::sim::context::CompletionRequest;
use crate::sim::{Command, Outbound, Session};

/// Everything outside the simulation a realm talks to.
#[derive(Clone)]
pub struct Services {
    pub completion: Arc<dyn TextCompletion>,
    pub store: Arc<dyn WorldStore>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub completion_timeout: Duration,
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Wall-clock milliseconds advanced by the monotonic clock, so paused tokio
/// time drives the agenda in tests.
#[derive(Debug, Clone, Copy)]
struct Clock {
    base_ms: u64,
    start: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            base_ms: wall_clock_ms(),
            start: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.base_ms + self.start.elapsed().as_millis() as u64
    }

    fn instant_at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms.saturating_sub(self.base_ms))
    }
}

/// Cheap, cloneable sender into a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    realm: RealmId,
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    pub fn realm(&self) -> &RealmId {
        &self.realm
    }

    /// Queue a command. False once the session task has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn join(&self, viewer: ViewerId, session: SessionId) -> bool {
        self.send(Command::Join { viewer, session })
    }

    pub fn leave(&self, viewer: ViewerId) -> bool {
        self.send(Command::Leave { viewer })
    }

    pub fn whisper(
        &self,
        viewer: ViewerId,
        session: SessionId,
        to: impl Into<String>,
        text: impl Into<String>,
        name: Option<String>,
    ) -> bool {
        self.send(Command::Whisper {
            viewer,
            session,
            to: to.into(),
            text: text.into(),
            name,
        })
    }

    pub fn request_mission(&self, viewer: ViewerId, session: SessionId) -> bool {
        self.send(Command::RequestMission { viewer, session })
    }

    pub fn reset(&self) -> bool {
        self.send(Command::Reset)
    }
}

/// Run `session` on its own task until every handle is dropped. The task
/// returns the session after the last snapshot has been written.
pub fn spawn_session(session: Session, services: Services) -> (SessionHandle, JoinHandle<Session>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = SessionHandle {
        realm: session.realm().clone(),
        tx,
    };
    let task = tokio::spawn(run(session, services, rx));
    (handle, task)
}

struct Shell {
    realm: RealmId,
    services: Services,
    replies: mpsc::UnboundedSender<Command>,
    persist: watch::Sender<Option<String>>,
}

async fn run(mut session: Session, services: Services, mut commands: mpsc::UnboundedReceiver<Command>) -> Session {
    let clock = Clock::new();
    let (replies_tx, mut replies) = mpsc::unbounded_channel();
    let (persist_tx, persist_rx) = watch::channel(None);
    let saver = tokio::spawn(save_latest(
        session.realm().clone(),
        services.store.clone(),
        persist_rx,
    ));
    let shell = Shell {
        realm: session.realm().clone(),
        services,
        replies: replies_tx,
        persist: persist_tx,
    };

    session.start(clock.now_ms());
    loop {
        let deadline = session.next_due().map(|ms| clock.instant_at(ms));
        let command = tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(cmd) => Some(cmd),
                None => break,
            },
            Some(cmd) = replies.recv() => Some(cmd),
            () = sleep_until_due(deadline) => None,
        };
        if let Some(command) = command {
            let out = session.handle(command, clock.now_ms());
            shell.deliver(out);
        }
        let out = session.run_due(clock.now_ms());
        shell.deliver(out);
    }

    info!(realm = %shell.realm, "session stopping");
    drop(shell);
    if let Err(e) = saver.await {
        warn!(error = %e, "snapshot writer panicked");
    }
    session
}

async fn sleep_until_due(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl Shell {
    fn deliver(&self, out: Vec<Outbound>) {
        for effect in out {
            match effect {
                Outbound::Broadcast(notice) => self.services.broadcaster.send_to_all(&self.realm, &notice),
                Outbound::Direct(viewer, notice) => {
                    if let Err(e) = self.services.broadcaster.send_to_one(viewer, &notice) {
                        debug!(%viewer, error = %e, "direct send failed");
                        let _ = self.replies.send(Command::Leave { viewer });
                    }
                }
                Outbound::Complete(request) => self.complete(request),
                Outbound::Persist(blob) => {
                    self.persist.send_replace(Some(blob));
                }
            }
        }
    }

    /// Ask the completion service off-task. Failures and timeouts come back as
    /// an empty reply so the waiting purpose still resolves.
    fn complete(&self, request: CompletionRequest) {
        let completion = self.services.completion.clone();
        let timeout = self.services.completion_timeout;
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let CompletionRequest {
                purpose,
                system,
                user,
                max_tokens,
            } = request;
            let result = tokio::time::timeout(timeout, completion.complete(&system, &user, max_tokens))
                .await
                .unwrap_or(Err(CompletionError::Timeout));
            let text = result.unwrap_or_else(|e| {
                warn!(?purpose, error = %e, "completion failed");
                String::new()
            });
            let _ = replies.send(Command::Completed { purpose, text });
        });
    }
}

/// Write the newest blob whenever it changes. Intermediate blobs that arrive
/// during a slow write are skipped.
async fn save_latest(realm: RealmId, store: Arc<dyn WorldStore>, mut rx: watch::Receiver<Option<String>>) {
    while rx.changed().await.is_ok() {
        let blob = rx.borrow_and_update().clone();
        if let Some(blob) = blob {
            if let Err(e) = store.save(&realm, &blob).await {
                warn!(%realm, error = %e, "snapshot save failed; world stays in memory");
            }
        }
    }
}

/// Restore a realm's world from the store, or start a fresh one when nothing
/// usable is stored.
pub async fn load_world(store: &dyn WorldStore, realm: &RealmId, rng: &mut SmallRng) -> World {
    match store.load(realm).await {
        Ok(Some(blob)) => match World::restore(&blob, rng) {
            Ok(world) => {
                info!(%realm, year = world.year, "world restored");
                world
            }
            Err(e) => {
                warn!(%realm, error = %e, "stored world unreadable; starting fresh");
                World::genesis(rng)
            }
        },
        Ok(None) => {
            info!(%realm, "new world");
            World::genesis(rng)
        }
        Err(e) => {
            warn!(%realm, error = %e, "store unavailable; starting fresh");
            World::genesis(rng)
        }
    }
}

/// Registry of running realms. Realms share nothing but the catalog and
/// the collaborators.
pub struct Realms {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    services: Services,
    running: Mutex<HashMap<RealmId, (SessionHandle, JoinHandle<Session>)>>,
}

impl Realms {
    pub fn new(config: EngineConfig, catalog: Arc<Catalog>, services: Services) -> Self {
        Self {
            config,
            catalog,
            services,
            running: Mutex::new(HashMap::new()),
        }
    }

    /// The handle for `realm`, loading and starting it on first use.
    pub async fn open(&self, realm: &RealmId) -> SessionHandle {
        let mut running = self.running.lock().await;
        if let Some((handle, _)) = running.get(realm) {
            if !handle.is_closed() {
                return handle.clone();
            }
        }
        let mut rng = SmallRng::from_os_rng();
        let world = load_world(self.services.store.as_ref(), realm, &mut rng).await;
        let config = EngineConfig {
            realm: realm.clone(),
            ..self.config.clone()
        };
        let session = Session::new(world, &config, self.catalog.clone(), rng);
        let (handle, task) = spawn_session(session, self.services.clone());
        running.insert(realm.clone(), (handle.clone(), task));
        handle
    }

    pub async fn realms(&self) -> Vec<RealmId> {
        self.running.lock().await.keys().cloned().collect()
    }

    /// Stop every realm and wait for its final snapshot. Handles cloned out
    /// of the registry keep their realm alive until dropped.
    pub async fn shutdown(&self) {
        let running: Vec<_> = self.running.lock().await.drain().collect();
        for (realm, (handle, task)) in running {
            drop(handle);
            match task.await {
                Ok(session) => debug!(%realm, year = session.world().year, "realm stopped"),
                Err(e) => warn!(%realm, error = %e, "realm task failed"),
            }
        }
    }
}
