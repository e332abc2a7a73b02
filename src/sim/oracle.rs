//! Systems that ask the text-completion service to speak for a ruler, and
//! the handlers that apply the replies.
//!
//! A tick only enqueues a `CompletionRequest`; the reply arrives later as a
//! separate step on the same timeline, so no state is held across the call.

use std::fmt::Write as _;

use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;

use super::context::{CompletionRequest, Purpose, TickContext};
use super::system::SimSystem;
use crate::actions::{apply_text, is_abstention};
use crate::config::Cadence;
use crate::model::{ActionSource, ChronicleEntry, Intercept, LogKind, NationId, Notice, World, persona};

pub const DECISION_TOKENS: u32 = 30;
pub const AMBIENT_TOKENS: u32 = 80;
pub const INTERCEPT_TOKENS: u32 = 80;
pub const CHRONICLE_TOKENS: u32 = 200;
pub const WHISPER_TOKENS: u32 = 150;

const CONTEXT_MEMORIES: usize = 6;
const CONTEXT_RUMORS: usize = 3;
const CONTEXT_PROMISES: usize = 3;
const CHRONICLE_LOG_LINES: usize = 12;

/// The ruler's system prompt: persona voice plus everything it knows.
pub fn build_context(world: &World, id: NationId, extra: Option<&str>) -> String {
    let p = persona(id);
    let mut ctx = String::from(p.system_prompt);
    let Some(n) = world.nation(id) else {
        return ctx;
    };
    let _ = write!(
        ctx,
        "\n\nYear {}, {}. Global tension: {}/100.",
        world.year,
        world.season_name(),
        world.tension
    );
    let _ = write!(
        ctx,
        "\nYour realm: troops {}, nukes {}, gold {}, grain {}, morale {}, population {}, tech {}.",
        n.troops, n.nukes, n.gold, n.grain, n.morale, n.population, n.tech
    );
    let _ = write!(ctx, "\nMood: {} ({}).", n.mood, n.mood_reason);
    let _ = write!(ctx, "\nAt war with: {}.", name_list(n.wars.iter().copied()));
    let _ = write!(ctx, "\nAllies: {}.", name_list(n.allies.iter().copied()));
    let relations: Vec<String> = n
        .relations
        .iter()
        .map(|(o, r)| format!("{} {} ({})", o.name(), r.label(), r.trust()))
        .collect();
    let _ = write!(ctx, "\nRelations: {}.", relations.join("; "));
    let crises: Vec<&str> = world
        .active_crises()
        .filter(|c| c.participants.contains(&id))
        .map(|c| c.text.as_str())
        .collect();
    if !crises.is_empty() {
        let _ = write!(ctx, "\nActive crises involving you: {}.", crises.join(" | "));
    }
    let _ = write!(ctx, "\nYour ambition: {}.", p.ambition);
    let t = n.personality;
    let _ = write!(
        ctx,
        "\nPersonality: aggression {}, greed {}, pride {}, paranoia {}, loyalty {}.",
        t.aggression, t.greed, t.pride, t.paranoia, t.loyalty
    );
    if !n.memory.is_empty() {
        let recent: Vec<&str> = n.memory.recent(CONTEXT_MEMORIES).map(String::as_str).collect();
        let _ = write!(ctx, "\nRecent memories: {}", recent.join(" "));
    }
    if !n.rumors.is_empty() {
        let heard: Vec<&str> = n.rumors.recent(CONTEXT_RUMORS).map(|r| r.text.as_str()).collect();
        let _ = write!(ctx, "\nRumors you have heard: {}", heard.join(" | "));
    }
    if !n.promises.is_empty() {
        let made: Vec<&str> = n.promises.recent(CONTEXT_PROMISES).map(|p| p.text.as_str()).collect();
        let _ = write!(ctx, "\nPromises strangers made you: {}", made.join(" | "));
    }
    if let Some(prophecy) = &world.active_prophecy {
        let _ = write!(ctx, "\nA prophecy circulates: {}", prophecy.text);
    }
    if let Some(extra) = extra {
        ctx.push('\n');
        ctx.push_str(extra);
    }
    ctx
}

fn name_list(ids: impl Iterator<Item = NationId>) -> String {
    let names: Vec<&str> = ids.map(NationId::name).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn decision_prompt(id: NationId) -> String {
    let ids: Vec<&str> = id.others().map(|o| o.as_str()).collect();
    format!(
        "Decide your next move. Reply with exactly one of: DECLARE_WAR:<id>, FORM_ALLIANCE:<id>, \
         MAKE_PEACE:<id>, BETRAY_ALLY:<id>, LAUNCH_NUKE:<id>, PROPOSE_TRADE:<id>, MOBILIZE, or NONE. \
         Valid ids: {}.",
        ids.join(", ")
    )
}

/// Request for a chronicle of `year`, built from the recent world log.
pub fn chronicle_request(world: &World, year: u32) -> CompletionRequest {
    let lines: Vec<&str> = world
        .log
        .recent(CHRONICLE_LOG_LINES)
        .map(|e| e.text.as_str())
        .collect();
    CompletionRequest {
        purpose: Purpose::Chronicle { year },
        system: "You are the royal chronicler of a world of five rival rulers. Write in a grand, \
                 archaic voice. Two sentences at most."
            .to_string(),
        user: format!("Chronicle the year {year}. Recent events: {}", lines.join(" ")),
        max_tokens: CHRONICLE_TOKENS,
    }
}

/// A random living ruler decides on an action.
pub struct DecisionSystem {
    cadence: Cadence,
}

impl DecisionSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for DecisionSystem {
    fn name(&self) -> &str {
        "decision"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let Some(&speaker) = ctx.world.living().choose(ctx.rng) else {
            return;
        };
        ctx.out.request(CompletionRequest {
            purpose: Purpose::Decision { speaker },
            system: build_context(ctx.world, speaker, None),
            user: decision_prompt(speaker),
            max_tokens: DECISION_TOKENS,
        });
    }
}

/// A random living ruler makes a public proclamation.
pub struct AmbientSystem {
    cadence: Cadence,
}

impl AmbientSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for AmbientSystem {
    fn name(&self) -> &str {
        "ambient"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let Some(&speaker) = ctx.world.living().choose(ctx.rng) else {
            return;
        };
        ctx.out.request(CompletionRequest {
            purpose: Purpose::Ambient { speaker },
            system: build_context(ctx.world, speaker, None),
            user: "Make a short public proclamation to the other rulers about your current situation. \
                   One or two sentences."
                .to_string(),
            max_tokens: AMBIENT_TOKENS,
        });
    }
}

/// Two living rulers exchange a private message that spies intercept.
pub struct InterceptSystem {
    cadence: Cadence,
}

impl InterceptSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for InterceptSystem {
    fn name(&self) -> &str {
        "intercept"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let mut living = ctx.world.living();
        living.shuffle(ctx.rng);
        let &[from, to, ..] = living.as_slice() else {
            return;
        };
        ctx.out.request(CompletionRequest {
            purpose: Purpose::Intercept { from, to },
            system: build_context(ctx.world, from, None),
            user: format!(
                "Write a short private message to {}. Be candid: you believe no one else will ever read it.",
                to.name()
            ),
            max_tokens: INTERCEPT_TOKENS,
        });
    }
}

/// Apply a finished completion. Whisper replies are handled by
/// `influence::whisper`.
pub fn on_completion(ctx: &mut TickContext, purpose: &Purpose, text: &str) {
    let text = text.trim();
    match *purpose {
        Purpose::Decision { speaker } => {
            if is_abstention(text) || !ctx.world.is_alive(speaker) {
                debug!(%speaker, "ruler abstained");
                return;
            }
            apply_text(ctx, speaker, ActionSource::Autonomous, text);
        }
        Purpose::Ambient { speaker } => {
            if text.is_empty() || !ctx.world.is_alive(speaker) {
                return;
            }
            let p = persona(speaker);
            ctx.world
                .add_log(format!("{} {}: {text}", p.emoji, p.name), LogKind::Speech, ctx.now_ms);
            ctx.out.broadcast(Notice::Message {
                nation: speaker,
                text: text.to_string(),
            });
            ctx.touch();
        }
        Purpose::Intercept { from, to } => {
            if text.is_empty() {
                return;
            }
            let entry = Intercept {
                from,
                to,
                text: text.to_string(),
                at_ms: ctx.now_ms,
            };
            ctx.world.intercept_feed.push(entry.clone());
            ctx.out.broadcast(Notice::Intercept { entry });
            ctx.touch();
        }
        Purpose::Chronicle { year } => {
            let text = if text.is_empty() {
                format!("Year {year} passed into history.")
            } else {
                text.to_string()
            };
            let entry = ChronicleEntry {
                year,
                text,
                at_ms: ctx.now_ms,
            };
            ctx.world.chronicle.push(entry.clone());
            ctx.out.broadcast(Notice::Chronicle { entry });
            ctx.touch();
        }
        Purpose::Whisper { .. } => {}
    }
}
