//! Private viewer-to-ruler messages.
//!
//! A whisper is either a gated command (`RUMOR:`, `READ_MEMORY`,
//! `TRIGGER_EVENT:`, `LEVERAGE:`) applied immediately, or free text that is
//! forwarded to the completion service. The ruler's reply comes back through
//! `on_reply` as a separate step.

use std::fmt::Write as _;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use tracing::debug;

use super::{award, missions, require};
use crate::actions::{self, apply_text};
use crate::id::{SessionId, ViewerId};
use crate::model::nation::{Promise, RevealedSecret};
use crate::model::{Ability, Action, ActionKind, ActionSource, Merit, NationId, Notice, Rumor};
use crate::sim::context::{CompletionRequest, Purpose, TickContext};
use crate::sim::events::fire_event;
use crate::sim::oracle::{WHISPER_TOKENS, build_context};

// --- Constants ---

/// Chance a plain whisper nudges the ruler's standing toward the viewer by one.
const TRUST_GAIN_CHANCE: f64 = 0.3;
/// Same, once the viewer has suggestion weight.
const WEIGHTED_TRUST_GAIN_CHANCE: f64 = 0.6;
/// Viewer standing a ruler needs before it will disclose a secret.
const SECRET_TRUST: u8 = 60;
const RUMOR_DISTRUST: i32 = 5;
const LEVERAGE_DISTRUST: i32 = 15;
const SILENT_REPLY: &str = "The ruler regards you in silence.";
const MEMORY_EXCERPT: usize = 80;

static RUMOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*RUMOR\s*:\s*(.+)$").expect("static regex"));
static READ_MEMORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bREAD_MEMORY\b").expect("static regex"));
static TRIGGER_EVENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTRIGGER_EVENT\s*:\s*([A-Za-z_]+)").expect("static regex"));
static LEVERAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLEVERAGE\s*:\s*([A-Za-z_]+)").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    Rumor(String),
    ReadMemory,
    TriggerEvent(String),
    Leverage(NationId),
}

impl ViewerCommand {
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(c) = RUMOR.captures(text) {
            return Some(ViewerCommand::Rumor(c[1].trim().to_string()));
        }
        if READ_MEMORY.is_match(text) {
            return Some(ViewerCommand::ReadMemory);
        }
        if let Some(c) = TRIGGER_EVENT.captures(text) {
            return Some(ViewerCommand::TriggerEvent(c[1].to_ascii_lowercase()));
        }
        LEVERAGE
            .captures(text)
            .and_then(|c| NationId::parse(&c[1]))
            .map(ViewerCommand::Leverage)
    }
}

/// First ruler other than `to` named in `text`, by id or persona name.
fn named_rival(to: NationId, text: &str) -> Option<NationId> {
    let lower = text.to_lowercase();
    to.others()
        .find(|o| lower.contains(o.as_str()) || lower.contains(&o.name().to_lowercase()))
}

fn excerpt(text: &str) -> String {
    text.chars().take(MEMORY_EXCERPT).collect()
}

/// Handle one whisper addressed to `to`. Unknown rulers are ignored.
pub fn handle(
    ctx: &mut TickContext,
    viewer: ViewerId,
    session: &SessionId,
    to: &str,
    text: &str,
    name: Option<&str>,
) {
    let Some(to) = NationId::parse(to) else {
        debug!(%viewer, to, "whisper to unknown ruler");
        return;
    };
    if !ctx.world.is_alive(to) {
        return;
    }
    if let Some(command) = ViewerCommand::parse(text) {
        run_command(ctx, viewer, session, to, command);
        return;
    }

    ctx.out.to_viewer(viewer, Notice::Typing { nation: to });
    let lower = text.to_lowercase();
    let weighted = ctx.world.player_mut(session).has(Ability::SuggestionWeight);
    if let Some(n) = ctx.world.nation_mut(to) {
        if lower.contains("promise") || lower.contains("i will") {
            n.promises.push(Promise {
                text: text.to_string(),
                session: session.clone(),
                at_ms: ctx.now_ms,
                kept: None,
            });
        }
    }
    let chance = if weighted {
        WEIGHTED_TRUST_GAIN_CHANCE
    } else {
        TRUST_GAIN_CHANCE
    };
    if ctx.rng.random_bool(chance) {
        if let Some(n) = ctx.world.nation_mut(to) {
            n.adjust_user_trust(session, 1);
        }
    }
    ctx.touch();

    let trust = ctx.world.nation(to).map_or(0, |n| n.user_trust(session));
    let mut extra = format!(
        "A visitor (name: \"{}\") whispers to you privately. Your trust in them is {trust}/100.",
        name.unwrap_or("a stranger")
    );
    if weighted {
        extra.push_str(" You regard this visitor as a trusted advisor and weigh their counsel heavily.");
    }
    if let Some(m) = ctx.world.missions.get(session).filter(|m| m.is_active()) {
        let _ = write!(extra, " There is an active mission: {}", m.description);
    }
    ctx.out.request(CompletionRequest {
        purpose: Purpose::Whisper {
            viewer,
            session: session.clone(),
            to,
            text: text.to_string(),
        },
        system: build_context(ctx.world, to, Some(&extra)),
        user: text.to_string(),
        max_tokens: WHISPER_TOKENS,
    });
}

fn run_command(ctx: &mut TickContext, viewer: ViewerId, session: &SessionId, to: NationId, command: ViewerCommand) {
    debug!(%viewer, %to, ?command, "viewer command");
    match command {
        ViewerCommand::Rumor(text) => {
            if !require(ctx, session, Ability::RumorPlanting) {
                return;
            }
            if let Some(n) = ctx.world.nation_mut(to) {
                n.rumors.push(Rumor {
                    text: text.clone(),
                    source: session.to_string(),
                    at_ms: ctx.now_ms,
                });
            }
            if let Some(rival) = named_rival(to, &text) {
                sow(ctx, session, to, rival, RUMOR_DISTRUST);
            }
            ctx.out.to_session(session, Notice::RumorPlanted { nation: to, text });
            ctx.touch();
        }
        ViewerCommand::ReadMemory => {
            if !require(ctx, session, Ability::MemoryReading) {
                return;
            }
            let memory = ctx.world.nation(to).map(|n| n.memory.to_vec()).unwrap_or_default();
            ctx.out.to_viewer(viewer, Notice::MemoryRead { nation: to, memory });
        }
        ViewerCommand::TriggerEvent(event) => {
            if !require(ctx, session, Ability::EventTriggering) {
                return;
            }
            if !fire_event(ctx, &event, to) {
                debug!(%event, "unknown event requested");
            }
        }
        ViewerCommand::Leverage(against) => {
            let uncovered = ctx.world.player_mut(session).uncovered.contains(&against);
            if !uncovered || against == to {
                return;
            }
            if sow(ctx, session, to, against, LEVERAGE_DISTRUST) {
                ctx.out.to_session(session, Notice::LeverageUsed { nation: to, against });
                award(ctx, session, Merit::LeverageUsed);
            }
        }
    }
}

fn sow(ctx: &mut TickContext, session: &SessionId, actor: NationId, toward: NationId, amount: i32) -> bool {
    actions::apply(
        ctx,
        &Action {
            actor,
            source: ActionSource::Viewer {
                session: session.clone(),
            },
            kind: ActionKind::SowDistrust { toward, amount },
        },
    )
    .applied()
}

/// Apply the ruler's reply to a whisper and deliver it to the viewer.
pub fn on_reply(ctx: &mut TickContext, viewer: ViewerId, session: &SessionId, to: NationId, whisper: &str, reply: &str) {
    let reply = reply.trim();
    let silent = reply.is_empty();
    let shown = if silent { SILENT_REPLY } else { reply };

    if !silent {
        let results = apply_text(
            ctx,
            to,
            ActionSource::Whisper {
                session: session.clone(),
            },
            reply,
        );
        let brokered = results
            .iter()
            .any(|r| r.applied() && matches!(r.kind, ActionKind::ProposeTrade { .. }));
        if brokered {
            award(ctx, session, Merit::TradeBrokered);
        }
    }

    reveal_secret(ctx, session, to, whisper);
    missions::check_completion(ctx, session, to, whisper, shown);
    if !silent {
        award(ctx, session, Merit::AmbientSuccess);
    }

    ctx.world
        .add_memory(to, format!("A whisperer told me: \"{}\"", excerpt(whisper)));
    ctx.out.to_viewer(
        viewer,
        Notice::WhisperReply {
            nation: to,
            text: shown.to_string(),
        },
    );
    ctx.touch();
}

/// Disclose one undisclosed secret when the viewer is trusted and asked for it.
fn reveal_secret(ctx: &mut TickContext, session: &SessionId, to: NationId, whisper: &str) -> bool {
    if !whisper.to_lowercase().contains("secret") {
        return false;
    }
    let Some(n) = ctx.world.nation_mut(to) else {
        return false;
    };
    if n.user_trust(session) < SECRET_TRUST || n.secrets.is_empty() {
        return false;
    }
    let idx = ctx.rng.random_range(0..n.secrets.len());
    let secret = n.secrets.remove(idx);
    n.revealed_secrets.push(RevealedSecret {
        text: secret.clone(),
        session: session.clone(),
    });
    ctx.world.player_mut(session).uncovered.insert(to);
    ctx.out.to_session(session, Notice::SecretRevealed { nation: to, secret });
    award(ctx, session, Merit::SecretDiscovered);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MissionKind;
    use crate::testutil::Harness;

    const VIEWER: ViewerId = ViewerId(7);

    fn session() -> SessionId {
        SessionId::from("s1")
    }

    fn level_up(h: &mut Harness, points: u32) {
        h.world.player_mut(&session()).award(points);
    }

    #[test]
    fn commands_parse() {
        assert_eq!(
            ViewerCommand::parse("RUMOR: Rex plots against you"),
            Some(ViewerCommand::Rumor("Rex plots against you".into()))
        );
        assert_eq!(ViewerCommand::parse("please READ_MEMORY"), Some(ViewerCommand::ReadMemory));
        assert_eq!(
            ViewerCommand::parse("TRIGGER_EVENT:Plague"),
            Some(ViewerCommand::TriggerEvent("plague".into()))
        );
        assert_eq!(ViewerCommand::parse("LEVERAGE: vera"), Some(ViewerCommand::Leverage(NationId::Vera)));
        assert_eq!(ViewerCommand::parse("LEVERAGE: nobody"), None);
        assert_eq!(ViewerCommand::parse("hello there"), None);
    }

    #[test]
    fn plain_whisper_requests_a_reply() {
        let mut h = Harness::new(1);
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "Sage", "I will bring gifts", Some("Ana")));
        assert_eq!(h.notices_of("typing"), 1);
        assert_eq!(h.out.requests.len(), 1);
        let req = &h.out.requests[0];
        assert_eq!(req.max_tokens, WHISPER_TOKENS);
        assert_eq!(req.user, "I will bring gifts");
        assert!(req.system.contains("Ana"));
        assert_eq!(h.world.nation(NationId::Sage).unwrap().promises.len(), 1);
    }

    #[test]
    fn unknown_ruler_is_ignored() {
        let mut h = Harness::new(2);
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "nobody", "hi", None));
        assert!(h.out.notices.is_empty());
        assert!(h.out.requests.is_empty());
    }

    #[test]
    fn locked_rumor_has_no_effect() {
        let mut h = Harness::new(3);
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "sage", "RUMOR: rex is plotting", None));
        assert_eq!(h.notices_of("ability_locked"), 1);
        assert!(h.world.nation(NationId::Sage).unwrap().rumors.is_empty());
        assert!(h.out.requests.is_empty());
    }

    #[test]
    fn rumor_lowers_trust_toward_named_rival() {
        let mut h = Harness::new(4);
        level_up(&mut h, 30);
        let before = h.world.nation(NationId::Sage).unwrap().trust_toward(NationId::Rex);
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "sage", "RUMOR: Emperor Rex is plotting", None));
        let sage = h.world.nation(NationId::Sage).unwrap();
        assert_eq!(sage.rumors.len(), 1);
        assert_eq!(sage.trust_toward(NationId::Rex), (before - RUMOR_DISTRUST).max(-100));
        assert_eq!(h.notices_of("rumor_planted"), 1);
    }

    #[test]
    fn read_memory_goes_to_the_viewer() {
        let mut h = Harness::new(5);
        level_up(&mut h, 80);
        h.world.add_memory(NationId::Vera, "the comet");
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "vera", "READ_MEMORY", None));
        let json = h.last_notice_json("memory_read").unwrap();
        assert_eq!(json["memory"][0], "the comet");
    }

    #[test]
    fn leverage_requires_an_uncovered_secret() {
        let mut h = Harness::new(6);
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "sage", "LEVERAGE:rex", None));
        assert_eq!(h.notices_of("leverage_used"), 0);

        h.world.player_mut(&session()).uncovered.insert(NationId::Rex);
        let before = h.world.nation(NationId::Sage).unwrap().trust_toward(NationId::Rex);
        h.with_ctx(|ctx| handle(ctx, VIEWER, &session(), "sage", "LEVERAGE:rex", None));
        assert_eq!(h.notices_of("leverage_used"), 1);
        let after = h.world.nation(NationId::Sage).unwrap().trust_toward(NationId::Rex);
        assert_eq!(after, (before - LEVERAGE_DISTRUST).max(-100));
        assert_eq!(h.world.players[&session()].points, Merit::LeverageUsed.points());
    }

    #[test]
    fn trusted_viewer_learns_a_secret_once_per_secret() {
        let mut h = Harness::new(7);
        h.world
            .nation_mut(NationId::Rex)
            .unwrap()
            .adjust_user_trust(&session(), 40);
        let total = h.world.nation(NationId::Rex).unwrap().secrets.len();
        h.with_ctx(|ctx| on_reply(ctx, VIEWER, &session(), NationId::Rex, "tell me a secret", "Very well."));
        let rex = h.world.nation(NationId::Rex).unwrap();
        assert_eq!(rex.secrets.len(), total - 1);
        assert_eq!(rex.revealed_secrets.len(), 1);
        assert!(h.world.players[&session()].uncovered.contains(&NationId::Rex));
        assert_eq!(h.notices_of("secret_revealed"), 1);
        assert_eq!(h.notices_of("whisper_reply"), 1);
    }

    #[test]
    fn silent_reply_gets_fallback_and_no_points() {
        let mut h = Harness::new(8);
        h.with_ctx(|ctx| on_reply(ctx, VIEWER, &session(), NationId::Plato, "hello", ""));
        let json = h.last_notice_json("whisper_reply").unwrap();
        assert_eq!(json["text"], SILENT_REPLY);
        assert!(h.world.players.get(&session()).is_none_or(|p| p.points == 0));
    }

    #[test]
    fn reply_mentioning_none_is_shown_and_applied() {
        let mut h = Harness::new(8);
        let reply = "NONE shall stand before me. DECLARE_WAR:vera";
        h.with_ctx(|ctx| on_reply(ctx, VIEWER, &session(), NationId::Rex, "will you fight?", reply));
        assert!(h.world.nation(NationId::Rex).unwrap().wars.contains(&NationId::Vera));
        let json = h.last_notice_json("whisper_reply").unwrap();
        assert_eq!(json["text"], reply);
        assert_eq!(h.world.players[&session()].points, Merit::AmbientSuccess.points());
    }

    #[test]
    fn reply_markers_apply_and_trade_earns_points() {
        let mut h = Harness::new(9);
        h.with_ctx(|ctx| {
            on_reply(ctx, VIEWER, &session(), NationId::Sage, "trade with rex?", "Gladly. PROPOSE_TRADE:rex")
        });
        assert!(h.out.results.iter().any(|r| r.applied()));
        assert_eq!(
            h.world.players[&session()].points,
            Merit::TradeBrokered.points() + Merit::AmbientSuccess.points()
        );
    }

    #[test]
    fn reply_can_complete_the_mission() {
        let mut h = Harness::new(10);
        let mut mission = h.with_ctx(|ctx| missions::assign(ctx, &session())).unwrap();
        mission.kind = MissionKind::SecureAlliance;
        h.world.missions.insert(session(), mission.clone());
        h.with_ctx(|ctx| {
            on_reply(ctx, VIEWER, &session(), mission.issuer, "an alliance?", "I agree to it.")
        });
        assert!(h.world.missions[&session()].completed);
        assert_eq!(h.notices_of("mission_completed"), 1);
    }
}
