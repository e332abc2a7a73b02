//! Lenient tokenizer for action markers embedded in free text.
//!
//! Recognized markers are `DECLARE_WAR:<id>`, `FORM_ALLIANCE:<id>`,
//! `MAKE_PEACE:<id>`, `BETRAY_ALLY:<id>`, `LAUNCH_NUKE:<id>`,
//! `PROPOSE_TRADE:<id>`, and the bare `MOBILIZE`. Targeted markers and their
//! ids match in any case. The bare `MOBILIZE` must be upper case so prose like
//! "mobilize our hearts" stays inert. Only the first occurrence of each
//! marker counts. Unknown targets and self-targets are dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ActionKind, NationId};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?i:(DECLARE_WAR|FORM_ALLIANCE|MAKE_PEACE|BETRAY_ALLY|LAUNCH_NUKE|PROPOSE_TRADE))\s*:\s*([A-Za-z_]+)|\b(MOBILIZE)\b",
    )
    .expect("marker pattern compiles")
});

/// Every distinct action `speaker` asked for in `text`, in order of appearance.
pub fn parse_actions(speaker: NationId, text: &str) -> Vec<ActionKind> {
    let mut seen: Vec<String> = Vec::new();
    let mut actions = Vec::new();
    for caps in MARKER.captures_iter(text) {
        let (marker, target) = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(m), Some(t), _) => (m.as_str().to_ascii_uppercase(), Some(t.as_str())),
            (_, _, Some(m)) => (m.as_str().to_string(), None),
            _ => continue,
        };
        if seen.contains(&marker) {
            continue;
        }
        if let Some(kind) = to_action(speaker, &marker, target) {
            actions.push(kind);
        }
        seen.push(marker);
    }
    actions
}

fn to_action(speaker: NationId, marker: &str, target: Option<&str>) -> Option<ActionKind> {
    if marker == "MOBILIZE" {
        return Some(ActionKind::Mobilize);
    }
    let target = NationId::parse(target?).filter(|&t| t != speaker)?;
    let kind = match marker {
        "DECLARE_WAR" => ActionKind::DeclareWar { target },
        "FORM_ALLIANCE" => ActionKind::FormAlliance { target },
        "MAKE_PEACE" => ActionKind::MakePeace { target },
        "BETRAY_ALLY" => ActionKind::BetrayAlly { target },
        "LAUNCH_NUKE" => ActionKind::LaunchNuke { target },
        "PROPOSE_TRADE" => ActionKind::ProposeTrade { target },
        _ => return None,
    };
    Some(kind)
}

/// A decision reply that opts out of acting: empty, contains `NONE`, or
/// carries a bracketed placeholder anywhere.
pub fn is_abstention(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.contains('[') || trimmed.contains("NONE")
}
