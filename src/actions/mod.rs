//! The diplomatic action engine: the single path by which parsed intents
//! reach the store.

mod parse;

pub use parse::{is_abstention, parse_actions};

use tracing::debug;

use crate::model::{Action, ActionKind, ActionOutcome, ActionResult, ActionSource, NationId};
use crate::sim::context::TickContext;
use crate::store;

/// Apply one structured intent through the store mutators.
pub fn apply(ctx: &mut TickContext, action: &Action) -> ActionResult {
    let a = action.actor;
    let applied = match action.kind {
        ActionKind::DeclareWar { target } => store::declare_war(ctx, a, target),
        ActionKind::FormAlliance { target } => store::form_alliance(ctx, a, target),
        ActionKind::MakePeace { target } => store::make_peace(ctx, a, target),
        ActionKind::BetrayAlly { target } => store::betray_ally(ctx, a, target),
        ActionKind::LaunchNuke { target } => store::launch_nuke(ctx, a, target),
        ActionKind::ProposeTrade { target } => store::propose_trade(ctx, a, target),
        ActionKind::Mobilize => store::mobilize(ctx, a),
        ActionKind::SowDistrust { toward, amount } => store::sow_distrust(ctx, a, toward, amount),
    };
    let outcome = if applied {
        ActionOutcome::Applied
    } else {
        ActionOutcome::Ignored
    };
    debug!(actor = %a, kind = ?action.kind, ?outcome, "action");
    let result = ActionResult {
        actor: a,
        source: action.source.clone(),
        kind: action.kind,
        outcome,
    };
    ctx.out.results.push(result.clone());
    result
}

/// Parse `text` spoken by `actor` and apply every marker found.
pub fn apply_text(ctx: &mut TickContext, actor: NationId, source: ActionSource, text: &str) -> Vec<ActionResult> {
    parse_actions(actor, text)
        .into_iter()
        .map(|kind| {
            apply(
                ctx,
                &Action {
                    actor,
                    source: source.clone(),
                    kind,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Harness;

    #[test]
    fn text_routes_through_store() {
        let mut h = Harness::new(1);
        let results = h.with_ctx(|ctx| {
            apply_text(
                ctx,
                NationId::Rex,
                ActionSource::Autonomous,
                "You leave me no choice. DECLARE_WAR:plato MOBILIZE",
            )
        });
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(ActionResult::applied));
        assert!(h.world.nation(NationId::Plato).unwrap().wars.contains(&NationId::Rex));
        assert_eq!(h.out.results.len(), 2);
    }

    #[test]
    fn illegal_intents_are_recorded_as_ignored() {
        let mut h = Harness::new(2);
        h.world.nation_mut(NationId::Vera).unwrap().alive = false;
        let results = h.with_ctx(|ctx| {
            apply_text(ctx, NationId::Sage, ActionSource::Autonomous, "MAKE_PEACE:rex FORM_ALLIANCE:vera")
        });
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.outcome == ActionOutcome::Ignored));
        assert!(h.world.check_invariants().is_ok());
    }

    #[test]
    fn abstaining_text_changes_nothing() {
        let mut h = Harness::new(3);
        let before = serde_json::to_string(&h.world).unwrap();
        let results = h.with_ctx(|ctx| apply_text(ctx, NationId::Diddy, ActionSource::Autonomous, "NONE"));
        assert!(results.is_empty());
        assert_eq!(serde_json::to_string(&h.world).unwrap(), before);
    }
}
