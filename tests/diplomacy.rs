mod common;

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use realm_sim::actions::{apply, apply_text};
use realm_sim::config::Cadence;
use realm_sim::model::{Action, ActionKind, ActionSource, NationId, RelationLabel};
use realm_sim::scenario::Scenario;
use realm_sim::sim::war::WarSystem;
use realm_sim::store::{DESTRUCTION_FLOOR, NUKE_FLIGHT};
use realm_sim::testutil::Harness;

fn random_kind(rng: &mut SmallRng, actor: NationId) -> ActionKind {
    let target = *NationId::ALL.choose(rng).unwrap();
    match rng.random_range(0..8) {
        0 => ActionKind::DeclareWar { target },
        1 => ActionKind::FormAlliance { target },
        2 => ActionKind::MakePeace { target },
        3 => ActionKind::BetrayAlly { target },
        4 => ActionKind::LaunchNuke { target },
        5 => ActionKind::ProposeTrade { target },
        6 => ActionKind::Mobilize,
        _ => ActionKind::SowDistrust {
            toward: if target == actor { actor.others().next().unwrap() } else { target },
            amount: 7,
        },
    }
}

#[test]
fn random_action_sequences_preserve_invariants() {
    for seed in 0..20 {
        let mut h = Harness::new(seed);
        let mut driver = SmallRng::seed_from_u64(seed + 1000);
        let mut war = WarSystem::new(Cadence::every(15));
        for step in 0..200 {
            let actor = *NationId::ALL.choose(&mut driver).unwrap();
            let kind = random_kind(&mut driver, actor);
            h.with_ctx(|ctx| {
                apply(
                    ctx,
                    &Action {
                        actor,
                        source: ActionSource::Autonomous,
                        kind,
                    },
                )
            });
            if step % 10 == 0 {
                h.tick(&mut war);
            }
            if step % 25 == 0 {
                h.run_followups();
            }
            if let Err(e) = h.world.check_invariants() {
                panic!("seed {seed} step {step} after {kind:?} by {actor}: {e}");
            }
        }
    }
}

#[test]
fn self_targeted_and_dead_targets_are_ignored() {
    let mut s = Scenario::new();
    s.dead(NationId::Plato);
    let mut h = s.harness(1);
    let results = h.with_ctx(|ctx| {
        apply_text(
            ctx,
            NationId::Rex,
            ActionSource::Autonomous,
            "DECLARE_WAR:rex DECLARE_WAR:plato FORM_ALLIANCE:plato",
        )
    });
    assert!(results.iter().all(|r| !r.applied()));
    assert!(h.world.nation(NationId::Rex).unwrap().wars.is_empty());
}

#[test]
fn war_then_peace_restores_a_floor_of_trust() {
    let mut h = Scenario::new().harness(2);
    h.with_ctx(|ctx| apply_text(ctx, NationId::Rex, ActionSource::Autonomous, "DECLARE_WAR:vera"));
    let rex = h.world.nation(NationId::Rex).unwrap();
    assert!(rex.wars.contains(&NationId::Vera));
    assert!(rex.trust_toward(NationId::Vera) <= -50);

    h.with_ctx(|ctx| apply_text(ctx, NationId::Vera, ActionSource::Autonomous, "MAKE_PEACE:rex"));
    for (a, b) in [(NationId::Rex, NationId::Vera), (NationId::Vera, NationId::Rex)] {
        let n = h.world.nation(a).unwrap();
        assert!(!n.wars.contains(&b));
        assert!(n.trust_toward(b) >= -20);
    }
    h.assert_invariants();
}

#[test]
fn alliance_is_refused_while_at_war() {
    let mut s = Scenario::new();
    s.at_war(NationId::Sage, NationId::Diddy);
    let mut h = s.harness(3);
    h.with_ctx(|ctx| apply_text(ctx, NationId::Sage, ActionSource::Autonomous, "FORM_ALLIANCE:diddy"));
    assert!(!h.world.nation(NationId::Sage).unwrap().allies.contains(&NationId::Diddy));
}

#[test]
fn betrayal_breaks_alliance_and_sours_both_sides() {
    let mut s = Scenario::new();
    s.allied(NationId::Sage, NationId::Plato);
    let mut h = s.harness(4);
    h.with_ctx(|ctx| apply_text(ctx, NationId::Sage, ActionSource::Autonomous, "BETRAY_ALLY:plato"));
    let sage = h.world.nation(NationId::Sage).unwrap();
    let plato = h.world.nation(NationId::Plato).unwrap();
    assert!(!sage.allies.contains(&NationId::Plato));
    assert!(!plato.allies.contains(&NationId::Sage));
    if plato.wars.contains(&NationId::Sage) {
        assert!(plato.trust_toward(NationId::Sage) <= -50);
        assert!(sage.trust_toward(NationId::Plato) <= -50);
    } else {
        assert_eq!(plato.trust_toward(NationId::Sage), 70 - 40);
        assert_eq!(sage.trust_toward(NationId::Plato), 70 - 20);
    }
    h.assert_invariants();
}

#[test]
fn nuke_lands_after_flight_and_can_destroy() {
    let mut s = Scenario::new();
    s.at_war(NationId::Rex, NationId::Diddy);
    s.nation(NationId::Diddy).troops(DESTRUCTION_FLOOR + 10).done();
    let mut h = s.harness(5);
    let nukes = h.world.nation(NationId::Rex).unwrap().nukes;

    h.with_ctx(|ctx| apply_text(ctx, NationId::Rex, ActionSource::Autonomous, "LAUNCH_NUKE:diddy"));
    assert_eq!(h.world.nation(NationId::Rex).unwrap().nukes, nukes - 1);
    assert_eq!(h.notices_of("nuke_incoming"), 1);
    assert_eq!(h.out.followups[0].delay, NUKE_FLIGHT);
    assert!(h.world.is_alive(NationId::Diddy));

    let followups = std::mem::take(&mut h.out.followups);
    for f in followups {
        h.with_ctx(|ctx| realm_sim::sim::jobs::run_job(ctx, &f.job));
    }
    assert_eq!(h.notices_of("nuke_impact"), 1);
    let diddy = h.world.nation(NationId::Diddy).unwrap();
    assert!(!diddy.alive);
    assert!(diddy.cities.iter().any(|c| c.destroyed));
    assert!(!h.world.nation(NationId::Rex).unwrap().wars.contains(&NationId::Diddy));
    h.assert_invariants();

    h.run_followups();
    let diddy = h.world.nation(NationId::Diddy).unwrap();
    assert!(diddy.alive);
    assert!(diddy.cities.iter().all(|c| !c.destroyed));
    for other in NationId::Diddy.others() {
        assert_eq!(diddy.relation(other).label(), RelationLabel::Neutral);
    }
    h.assert_invariants();
}

#[test]
fn mobilize_needs_gold() {
    let mut s = Scenario::new();
    s.nation(NationId::Vera).gold(199).troops(1000).done();
    let mut h = s.harness(6);
    let r = h.with_ctx(|ctx| apply_text(ctx, NationId::Vera, ActionSource::Autonomous, "MOBILIZE"));
    assert!(!r[0].applied());
    h.world.nation_mut(NationId::Vera).unwrap().gold = 200;
    let r = h.with_ctx(|ctx| apply_text(ctx, NationId::Vera, ActionSource::Autonomous, "MOBILIZE"));
    assert!(r[0].applied());
    let vera = h.world.nation(NationId::Vera).unwrap();
    assert_eq!(vera.troops, 1200);
    assert_eq!(vera.gold, 0);
}
