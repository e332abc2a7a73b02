use std::time::Duration;

use tracing::info;

use super::{live_pair, with_trust};
use crate::model::{LogKind, NationId};
use crate::sim::context::{Job, TickContext};

// --- Constants ---

/// Trust both ways is forced at or below this on a declaration of war.
const WAR_TRUST_CEILING: i32 = -50;
const WAR_TENSION: u32 = 20;
/// Chance that a new war starves one of the belligerents later.
const WAR_FAMINE_CHANCE: f64 = 0.25;
const WAR_FAMINE_DELAY: Duration = Duration::from_secs(120);

const ALLIANCE_TRUST_FLOOR: i32 = 65;
const ALLIANCE_TENSION_RELIEF: u32 = 5;

const PEACE_TRUST_BONUS: i32 = 20;
const PEACE_TRUST_FLOOR: i32 = -20;
const PEACE_TENSION_RELIEF: u32 = 10;

const BETRAYAL_VICTIM_TRUST: i32 = -40;
const BETRAYAL_BETRAYER_TRUST: i32 = -20;
/// Chance the betrayed ally answers with war.
const BETRAYAL_WAR_CHANCE: f64 = 0.6;

const TRADE_GOLD: u32 = 60;
const TRADE_TRUST: i32 = 10;
const TRADE_TENSION_RELIEF: u32 = 2;

/// `a` and `b` go to war. No-op if either is dead or they already fight.
pub fn declare_war(ctx: &mut TickContext, a: NationId, b: NationId) -> bool {
    if !live_pair(ctx.world, a, b) {
        return false;
    }
    if ctx.world.nation(a).is_some_and(|n| n.wars.contains(&b)) {
        return false;
    }
    for (x, y) in [(a, b), (b, a)] {
        if let Some(n) = ctx.world.nation_mut(x) {
            n.wars.insert(y);
            n.allies.remove(&y);
        }
        with_trust(ctx.world, x, y, |t| t.min(WAR_TRUST_CEILING));
    }
    ctx.world.raise_tension(WAR_TENSION);
    ctx.world.add_memory(a, format!("I declared war on {}.", b.name()));
    ctx.world.add_memory(b, format!("{} declared war on me.", a.name()));
    ctx.record(
        format!("⚔️ {} declares WAR on {}!", a.name(), b.name()),
        LogKind::War,
        Some(a),
    );
    info!(aggressor = %a, defender = %b, tension = ctx.world.tension, "war declared");

    let starving = if ctx.roll(0.5) { a } else { b };
    ctx.maybe_schedule(
        WAR_FAMINE_CHANCE,
        WAR_FAMINE_DELAY,
        Job::Cascade {
            event: "famine".into(),
            nation: starving,
        },
    );
    true
}

/// No-op if already allied or at war.
pub fn form_alliance(ctx: &mut TickContext, a: NationId, b: NationId) -> bool {
    if !live_pair(ctx.world, a, b) {
        return false;
    }
    let blocked = ctx
        .world
        .nation(a)
        .is_some_and(|n| n.allies.contains(&b) || n.wars.contains(&b));
    if blocked {
        return false;
    }
    for (x, y) in [(a, b), (b, a)] {
        if let Some(n) = ctx.world.nation_mut(x) {
            n.allies.insert(y);
            n.outcomes.new_alliances += 1;
        }
        with_trust(ctx.world, x, y, |t| t.max(ALLIANCE_TRUST_FLOOR));
    }
    ctx.world.lower_tension(ALLIANCE_TENSION_RELIEF);
    ctx.world.add_memory(a, format!("I formed an alliance with {}.", b.name()));
    ctx.world.add_memory(b, format!("{} offered alliance and I accepted.", a.name()));
    ctx.record(
        format!("🤝 {} and {} form an ALLIANCE!", a.name(), b.name()),
        LogKind::Alliance,
        Some(a),
    );
    true
}

/// Ends an existing war. No-op unless the pair is at war.
pub fn make_peace(ctx: &mut TickContext, a: NationId, b: NationId) -> bool {
    if !live_pair(ctx.world, a, b) {
        return false;
    }
    if !ctx.world.nation(a).is_some_and(|n| n.wars.contains(&b)) {
        return false;
    }
    for (x, y) in [(a, b), (b, a)] {
        if let Some(n) = ctx.world.nation_mut(x) {
            n.wars.remove(&y);
        }
        with_trust(ctx.world, x, y, |t| (t + PEACE_TRUST_BONUS).max(PEACE_TRUST_FLOOR));
    }
    ctx.world.lower_tension(PEACE_TENSION_RELIEF);
    ctx.world.add_memory(a, format!("I made peace with {}.", b.name()));
    ctx.world.add_memory(b, format!("{} and I made peace.", a.name()));
    ctx.record(
        format!("🕊️ {} and {} sign a PEACE treaty.", a.name(), b.name()),
        LogKind::Peace,
        Some(a),
    );
    true
}

/// `betrayer` breaks its alliance with `victim`, who may answer with war.
pub fn betray_ally(ctx: &mut TickContext, betrayer: NationId, victim: NationId) -> bool {
    if !live_pair(ctx.world, betrayer, victim) {
        return false;
    }
    if !ctx.world.nation(betrayer).is_some_and(|n| n.allies.contains(&victim)) {
        return false;
    }
    for (x, y) in [(betrayer, victim), (victim, betrayer)] {
        if let Some(n) = ctx.world.nation_mut(x) {
            n.allies.remove(&y);
        }
    }
    with_trust(ctx.world, victim, betrayer, |t| t + BETRAYAL_VICTIM_TRUST);
    with_trust(ctx.world, betrayer, victim, |t| t + BETRAYAL_BETRAYER_TRUST);
    ctx.world.add_memory(betrayer, format!("I betrayed my ally {}.", victim.name()));
    ctx.world.add_memory(victim, format!("{} BETRAYED me.", betrayer.name()));
    ctx.record(
        format!("🗡️ {} BETRAYS their ally {}!", betrayer.name(), victim.name()),
        LogKind::War,
        Some(betrayer),
    );
    if ctx.roll(BETRAYAL_WAR_CHANCE) {
        declare_war(ctx, victim, betrayer);
    }
    true
}

/// A mutually profitable exchange. Requires both alive and not at war.
pub fn propose_trade(ctx: &mut TickContext, a: NationId, b: NationId) -> bool {
    if !live_pair(ctx.world, a, b) {
        return false;
    }
    if ctx.world.nation(a).is_some_and(|n| n.wars.contains(&b)) {
        return false;
    }
    for (x, y) in [(a, b), (b, a)] {
        if let Some(n) = ctx.world.nation_mut(x) {
            n.gold = n.gold.saturating_add(TRADE_GOLD);
        }
        with_trust(ctx.world, x, y, |t| t + TRADE_TRUST);
    }
    ctx.world.lower_tension(TRADE_TENSION_RELIEF);
    ctx.world.add_memory(a, format!("I traded with {}.", b.name()));
    ctx.world.add_memory(b, format!("{} traded with me.", a.name()));
    ctx.record(
        format!("💱 {} and {} complete a trade. Both gain {TRADE_GOLD} gold.", a.name(), b.name()),
        LogKind::Event,
        Some(a),
    );
    true
}

/// Lower `actor`'s trust toward `toward` by `amount`. Only viewer commands
/// (rumors, leverage) produce this.
pub fn sow_distrust(ctx: &mut TickContext, actor: NationId, toward: NationId, amount: i32) -> bool {
    if actor == toward || !ctx.world.is_alive(actor) || ctx.world.nation(toward).is_none() {
        return false;
    }
    with_trust(ctx.world, actor, toward, |t| t - amount.abs());
    ctx.touch();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::nation::Relation;
    use crate::testutil::Harness;

    fn zero_trust(h: &mut Harness, a: NationId, b: NationId) {
        for (x, y) in [(a, b), (b, a)] {
            *h.world.nation_mut(x).unwrap().relation_mut(y) = Relation::new(0);
        }
    }

    #[test]
    fn war_is_symmetric_and_raises_tension() {
        let mut h = Harness::new(1);
        zero_trust(&mut h, NationId::Rex, NationId::Vera);
        let before = h.world.tension;
        let log_before = h.world.log.len();

        assert!(h.with_ctx(|ctx| declare_war(ctx, NationId::Rex, NationId::Vera)));

        let rex = h.world.nation(NationId::Rex).unwrap();
        let vera = h.world.nation(NationId::Vera).unwrap();
        assert!(rex.wars.contains(&NationId::Vera));
        assert!(vera.wars.contains(&NationId::Rex));
        assert!(rex.trust_toward(NationId::Vera) <= -50);
        assert!(vera.trust_toward(NationId::Rex) <= -50);
        assert_eq!(h.world.tension, before + WAR_TENSION);
        assert_eq!(h.world.log.len(), log_before + 1);
        assert!(h.world.check_invariants().is_ok());
    }

    #[test]
    fn declare_war_twice_is_idempotent() {
        let mut h = Harness::new(2);
        h.with_ctx(|ctx| declare_war(ctx, NationId::Rex, NationId::Vera));
        let tension = h.world.tension;
        let log_len = h.world.log.len();
        let rex_trust = h.world.nation(NationId::Rex).unwrap().trust_toward(NationId::Vera);

        assert!(!h.with_ctx(|ctx| declare_war(ctx, NationId::Rex, NationId::Vera)));
        assert!(!h.with_ctx(|ctx| declare_war(ctx, NationId::Vera, NationId::Rex)));

        assert_eq!(h.world.tension, tension);
        assert_eq!(h.world.log.len(), log_len);
        assert_eq!(
            h.world.nation(NationId::Rex).unwrap().trust_toward(NationId::Vera),
            rex_trust
        );
    }

    #[test]
    fn war_strips_alliance() {
        let mut h = Harness::new(3);
        h.with_ctx(|ctx| form_alliance(ctx, NationId::Sage, NationId::Plato));
        assert!(h.with_ctx(|ctx| declare_war(ctx, NationId::Sage, NationId::Plato)));
        assert!(!h.world.nation(NationId::Plato).unwrap().allies.contains(&NationId::Sage));
        assert!(h.world.check_invariants().is_ok());
    }

    #[test]
    fn dead_nations_cannot_go_to_war() {
        let mut h = Harness::new(4);
        h.world.nation_mut(NationId::Diddy).unwrap().alive = false;
        assert!(!h.with_ctx(|ctx| declare_war(ctx, NationId::Rex, NationId::Diddy)));
        assert!(!h.with_ctx(|ctx| declare_war(ctx, NationId::Rex, NationId::Rex)));
        assert!(h.world.nation(NationId::Rex).unwrap().wars.is_empty());
    }

    #[test]
    fn alliance_requires_peace() {
        let mut h = Harness::new(5);
        h.with_ctx(|ctx| declare_war(ctx, NationId::Sage, NationId::Rex));
        assert!(!h.with_ctx(|ctx| form_alliance(ctx, NationId::Sage, NationId::Rex)));

        assert!(h.with_ctx(|ctx| form_alliance(ctx, NationId::Sage, NationId::Vera)));
        assert!(!h.with_ctx(|ctx| form_alliance(ctx, NationId::Vera, NationId::Sage)));
        let sage = h.world.nation(NationId::Sage).unwrap();
        assert!(sage.trust_toward(NationId::Vera) >= ALLIANCE_TRUST_FLOOR);
        assert_eq!(sage.outcomes.new_alliances, 1);
    }

    #[test]
    fn peace_lifts_trust_floor() {
        let mut h = Harness::new(6);
        assert!(!h.with_ctx(|ctx| make_peace(ctx, NationId::Sage, NationId::Rex)));
        h.with_ctx(|ctx| declare_war(ctx, NationId::Sage, NationId::Rex));
        h.world.nation_mut(NationId::Sage).unwrap().relation_mut(NationId::Rex).set_trust(-90);
        assert!(h.with_ctx(|ctx| make_peace(ctx, NationId::Sage, NationId::Rex)));
        let sage = h.world.nation(NationId::Sage).unwrap();
        assert!(sage.wars.is_empty());
        assert_eq!(sage.trust_toward(NationId::Rex), PEACE_TRUST_FLOOR);
        assert_eq!(
            h.world.nation(NationId::Rex).unwrap().trust_toward(NationId::Sage),
            PEACE_TRUST_FLOOR
        );
    }

    #[test]
    fn betrayal_breaks_alliance_and_hurts_trust() {
        let mut h = Harness::new(7);
        h.with_ctx(|ctx| form_alliance(ctx, NationId::Rex, NationId::Diddy));
        assert!(h.with_ctx(|ctx| betray_ally(ctx, NationId::Rex, NationId::Diddy)));
        let diddy = h.world.nation(NationId::Diddy).unwrap();
        assert!(!diddy.allies.contains(&NationId::Rex));
        assert!(diddy.trust_toward(NationId::Rex) <= ALLIANCE_TRUST_FLOOR + BETRAYAL_VICTIM_TRUST);
        assert!(h.world.check_invariants().is_ok());
        assert!(!h.with_ctx(|ctx| betray_ally(ctx, NationId::Rex, NationId::Diddy)));
    }

    #[test]
    fn trade_pays_both_sides() {
        let mut h = Harness::new(8);
        let sage_gold = h.world.nation(NationId::Sage).unwrap().gold;
        let vera_gold = h.world.nation(NationId::Vera).unwrap().gold;
        assert!(h.with_ctx(|ctx| propose_trade(ctx, NationId::Sage, NationId::Vera)));
        assert_eq!(h.world.nation(NationId::Sage).unwrap().gold, sage_gold + TRADE_GOLD);
        assert_eq!(h.world.nation(NationId::Vera).unwrap().gold, vera_gold + TRADE_GOLD);

        h.with_ctx(|ctx| declare_war(ctx, NationId::Sage, NationId::Vera));
        assert!(!h.with_ctx(|ctx| propose_trade(ctx, NationId::Sage, NationId::Vera)));
    }

    #[test]
    fn distrust_only_moves_one_direction() {
        let mut h = Harness::new(9);
        zero_trust(&mut h, NationId::Plato, NationId::Rex);
        assert!(h.with_ctx(|ctx| sow_distrust(ctx, NationId::Plato, NationId::Rex, 15)));
        assert_eq!(h.world.nation(NationId::Plato).unwrap().trust_toward(NationId::Rex), -15);
        assert_eq!(h.world.nation(NationId::Rex).unwrap().trust_toward(NationId::Plato), 0);
    }
}
