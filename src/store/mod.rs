//! Invariant-preserving mutators over `World`.
//!
//! Every change to wars, alliances, trust between nations, or nation liveness
//! goes through these functions. Each one checks its preconditions (both sides
//! alive, edge not already present, enough resources) and silently no-ops when
//! they fail, returning `false`. They are driven by untrusted free text, so an
//! illegal request is never an error.

mod diplomacy;
mod military;

pub use diplomacy::{betray_ally, declare_war, form_alliance, make_peace, propose_trade, sow_distrust};
pub use military::{
    DESTRUCTION_FLOOR, NUKE_FLIGHT, SUCCESSION_DELAY, destroy_nation, launch_nuke, mobilize, nuke_impact, succession,
};

use crate::model::{NationId, World};

/// Both sides exist, are distinct, and are alive.
fn live_pair(world: &World, a: NationId, b: NationId) -> bool {
    a != b && world.is_alive(a) && world.is_alive(b)
}

/// Apply `f` to the directed relation of `from` toward `to`.
fn with_trust(world: &mut World, from: NationId, to: NationId, f: impl FnOnce(i32) -> i32) {
    if let Some(n) = world.nation_mut(from) {
        let rel = n.relation_mut(to);
        let next = f(rel.trust());
        rel.set_trust(next);
    }
}
