use super::context::TickContext;
use super::system::SimSystem;
use crate::config::Cadence;
use crate::model::{Mood, Nation, World, persona};

/// First matching rule wins.
pub fn compute_mood(n: &Nation, tension: u32, start_troops: u32) -> (Mood, String) {
    let wars = n.wars.len();
    if wars >= 2 {
        return (Mood::Angry, format!("Fighting {wars} wars at once."));
    }
    if wars == 1 {
        return if n.personality.aggression > 60 {
            (Mood::Emboldened, "War suits me.".to_string())
        } else {
            (Mood::Anxious, "At war and uneasy.".to_string())
        };
    }
    if n.grain < 200 {
        return (Mood::Fearful, "The granaries are nearly empty.".to_string());
    }
    if n.gold < 100 {
        return (Mood::Anxious, "The treasury is running dry.".to_string());
    }
    if n.morale > 85 {
        return (Mood::Content, "My people are happy.".to_string());
    }
    if n.allies.len() >= 2 {
        return (Mood::Emboldened, "Strong alliances behind me.".to_string());
    }
    if tension > 70 {
        return (Mood::Suspicious, "The world is on edge.".to_string());
    }
    if f64::from(n.troops) > 1.5 * f64::from(start_troops) {
        return (Mood::Emboldened, "My armies have never been larger.".to_string());
    }
    (Mood::Calm, "The realm is stable.".to_string())
}

/// Recompute the mood of every living nation.
pub fn refresh_moods(world: &mut World) {
    let tension = world.tension;
    for (&id, n) in world.nations.iter_mut().filter(|(_, n)| n.alive) {
        let (mood, reason) = compute_mood(n, tension, persona(id).start.troops);
        n.mood = mood;
        n.mood_reason = reason;
    }
}

pub struct MoodSystem {
    cadence: Cadence,
}

impl MoodSystem {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }
}

impl SimSystem for MoodSystem {
    fn name(&self) -> &str {
        "mood"
    }

    fn cadence(&self) -> Cadence {
        self.cadence
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        refresh_moods(ctx.world);
        ctx.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NationId;

    fn calm(id: NationId) -> Nation {
        let mut n = Nation::at_start(id);
        n.grain = 500;
        n.gold = 500;
        n.morale = 60;
        n
    }

    #[test]
    fn priority_order() {
        let mut n = calm(NationId::Plato);
        assert_eq!(compute_mood(&n, 10, 1000).0, Mood::Calm);

        n.troops = 2000;
        assert_eq!(compute_mood(&n, 10, 1000).0, Mood::Emboldened);
        assert_eq!(compute_mood(&n, 80, 1000).0, Mood::Suspicious);

        n.morale = 90;
        assert_eq!(compute_mood(&n, 80, 1000).0, Mood::Content);

        n.gold = 50;
        assert_eq!(compute_mood(&n, 80, 1000).0, Mood::Anxious);

        n.grain = 10;
        assert_eq!(compute_mood(&n, 80, 1000).0, Mood::Fearful);

        n.wars.insert(NationId::Rex);
        assert_eq!(compute_mood(&n, 80, 1000).0, Mood::Anxious);
        n.wars.insert(NationId::Sage);
        assert_eq!(compute_mood(&n, 80, 1000).0, Mood::Angry);
    }

    #[test]
    fn aggressive_rulers_relish_war() {
        let mut n = calm(NationId::Rex);
        n.wars.insert(NationId::Vera);
        assert_eq!(compute_mood(&n, 10, 2000).0, Mood::Emboldened);
    }

    #[test]
    fn two_allies_embolden() {
        let mut n = calm(NationId::Sage);
        n.allies.insert(NationId::Vera);
        n.allies.insert(NationId::Plato);
        assert_eq!(compute_mood(&n, 10, 1200).0, Mood::Emboldened);
    }
}
