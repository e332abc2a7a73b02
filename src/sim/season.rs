use tracing::info;

use super::context::TickContext;
use super::oracle::chronicle_request;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::world::SEASONS;
use crate::model::{LogKind, Notice};

/// Advances the season; on wrap, starts a new year and asks for a chronicle
/// of the year just ended.
pub struct SeasonSystem {
    cadence: Cadence,
}

impl SeasonSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for SeasonSystem {
    fn name(&self) -> &str {
        "season"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        let world = &mut *ctx.world;
        world.season_index = (world.season_index + 1) % SEASONS.len() as u8;
        let wrapped = world.season_index == 0;
        if wrapped {
            let ended = world.year;
            world.year += 1;
            let request = chronicle_request(world, ended);
            ctx.out.request(request);
            let year = ctx.world.year;
            ctx.record(format!("📅 Year {year} begins."), LogKind::Event, None);
            info!(year, "new year");
        }
        ctx.out.broadcast(Notice::YearUpdate {
            year: ctx.world.year,
            season: ctx.world.season_name(),
            season_index: ctx.world.season_index,
        });
        ctx.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::context::Purpose;
    use crate::testutil::Harness;

    #[test]
    fn four_seasons_make_a_year() {
        let mut h = Harness::new(1);
        let mut system = SeasonSystem::new(Cadence::every(180));
        for _ in 0..3 {
            h.tick(&mut system);
        }
        assert_eq!(h.world.year, 1);
        assert_eq!(h.world.season_name(), "Winter");
        assert!(h.out.requests.is_empty());

        h.tick(&mut system);
        assert_eq!(h.world.year, 2);
        assert_eq!(h.world.season_index, 0);
        assert_eq!(h.out.requests.len(), 1);
        assert_eq!(h.out.requests[0].purpose, Purpose::Chronicle { year: 1 });
        assert_eq!(h.notices_of("year_update"), 4);
    }
}
