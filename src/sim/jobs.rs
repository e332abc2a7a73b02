use tracing::debug;

use super::context::{Job, TickContext};
use super::crisis::{open_crisis, pick_participants};
use super::events::fire_event;
use super::prophecy::fulfil;
use crate::catalog::render;
use crate::model::persona;
use crate::store;

/// Tension added by the crisis that follows a nation's fall.
const VACUUM_TENSION: u32 = 15;

/// Run a delayed job against the current world. Returns whether it applied.
pub fn run_job(ctx: &mut TickContext, job: &Job) -> bool {
    let applied = match job {
        Job::NukeImpact { attacker, target } => store::nuke_impact(ctx, *attacker, *target),
        Job::Succession { nation } => store::succession(ctx, *nation),
        Job::Cascade { event, nation } => fire_event(ctx, event, *nation),
        Job::PowerVacuum { nation } => {
            let participants = pick_participants(ctx, Some(*nation));
            if participants.is_empty() {
                false
            } else {
                let text = render(&ctx.catalog.power_vacuum, persona(*nation).territory);
                open_crisis(ctx, text, participants, VACUUM_TENSION);
                true
            }
        }
        Job::FulfilProphecy { id } => fulfil(ctx, id),
    };
    debug!(?job, applied, "job");
    applied
}
