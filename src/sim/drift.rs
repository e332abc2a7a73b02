use super::context::TickContext;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::nation::Outcomes;

const AGGRESSION_SWING: i32 = 5;
const LOYALTY_PER_ALLIANCE: i32 = 3;
const PARANOIA_RELIEF_PER_ALLIANCE: i32 = 3;
const PARANOIA_PER_CITY_LOST: i32 = 5;

fn nudge(trait_value: &mut u8, delta: i32) {
    *trait_value = (i32::from(*trait_value) + delta).clamp(0, 100) as u8;
}

/// Slowly reshapes each ruler's personality from recent outcomes.
pub struct DriftSystem {
    cadence: Cadence,
}

impl DriftSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for DriftSystem {
    fn name(&self) -> &str {
        "drift"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        for id in ctx.world.living() {
            let hardened = ctx.roll(0.5);
            let Some(n) = ctx.world.nation_mut(id) else {
                continue;
            };
            let o = std::mem::take(&mut n.outcomes);
            if o == Outcomes::default() {
                continue;
            }
            let p = &mut n.personality;
            if o.war_losses > 0 {
                let swing = if hardened { AGGRESSION_SWING } else { -AGGRESSION_SWING };
                nudge(&mut p.aggression, swing);
            }
            let alliances = o.new_alliances.min(10) as i32;
            nudge(&mut p.loyalty, LOYALTY_PER_ALLIANCE * alliances);
            nudge(&mut p.paranoia, -PARANOIA_RELIEF_PER_ALLIANCE * alliances);
            let lost = o.cities_lost.min(10) as i32;
            nudge(&mut p.paranoia, PARANOIA_PER_CITY_LOST * lost);
        }
        ctx.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NationId;
    use crate::testutil::Harness;

    #[test]
    fn alliances_build_loyalty_and_calm_paranoia() {
        let mut h = Harness::new(1);
        let before = h.world.nation(NationId::Vera).unwrap().personality;
        h.world.nation_mut(NationId::Vera).unwrap().outcomes.new_alliances = 2;
        h.tick(&mut DriftSystem::new(Cadence::every(240)));
        let after = h.world.nation(NationId::Vera).unwrap();
        assert_eq!(after.personality.loyalty, before.loyalty + 6);
        assert_eq!(after.personality.paranoia, before.paranoia - 6);
        assert_eq!(after.outcomes, Outcomes::default());
    }

    #[test]
    fn traits_stay_bounded() {
        let mut h = Harness::new(2);
        let mut system = DriftSystem::new(Cadence::every(240));
        for _ in 0..50 {
            for n in h.world.nations.values_mut() {
                n.outcomes.cities_lost = 3;
                n.outcomes.war_losses = 1;
            }
            h.tick(&mut system);
        }
        for n in h.world.nations.values() {
            assert_eq!(n.personality.paranoia, 100);
            assert!(n.personality.aggression <= 100);
        }
    }
}
