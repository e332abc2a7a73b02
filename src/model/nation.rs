use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::persona::{CityRole, NationId, Personality, persona};
use super::ring::BoundedLog;
use crate::id::SessionId;

pub const TRUST_MIN: i32 = -100;
pub const TRUST_MAX: i32 = 100;
pub const USER_TRUST_DEFAULT: u8 = 30;
pub const MORALE_MAX: u32 = 100;
pub const TECH_MAX: u32 = 5;
pub const TROOP_CEILING: u32 = 50_000;

pub type Memory = BoundedLog<String, 12>;
pub type Rumors = BoundedLog<Rumor, 8>;
pub type Promises = BoundedLog<Promise, 10>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RelationLabel {
    Ally,
    Friendly,
    Neutral,
    Rival,
    Enemy,
}

string_enum!(RelationLabel {
    Ally => "ally",
    Friendly => "friendly",
    Neutral => "neutral",
    Rival => "rival",
    Enemy => "enemy",
});

impl RelationLabel {
    /// Fixed trust bands: >60 ally, >20 friendly, >-20 neutral, >-60 rival, else enemy.
    pub fn from_trust(trust: i32) -> Self {
        if trust > 60 {
            RelationLabel::Ally
        } else if trust > 20 {
            RelationLabel::Friendly
        } else if trust > -20 {
            RelationLabel::Neutral
        } else if trust > -60 {
            RelationLabel::Rival
        } else {
            RelationLabel::Enemy
        }
    }
}

/// Directed standing of one nation toward another.
///
/// The label is never stored independently: every write goes through
/// `set_trust`, and deserialization recomputes it from the trust value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RelationRepr")]
pub struct Relation {
    trust: i32,
    label: RelationLabel,
}

#[derive(Deserialize)]
struct RelationRepr {
    #[serde(default)]
    trust: i32,
}

impl From<RelationRepr> for Relation {
    fn from(repr: RelationRepr) -> Self {
        Relation::new(repr.trust)
    }
}

impl Relation {
    pub fn new(trust: i32) -> Self {
        let trust = trust.clamp(TRUST_MIN, TRUST_MAX);
        Self {
            trust,
            label: RelationLabel::from_trust(trust),
        }
    }

    pub fn neutral() -> Self {
        Self::new(0)
    }

    pub fn trust(&self) -> i32 {
        self.trust
    }

    pub fn label(&self) -> RelationLabel {
        self.label
    }

    pub fn set_trust(&mut self, trust: i32) {
        *self = Self::new(trust);
    }

    pub fn adjust(&mut self, delta: i32) {
        self.set_trust(self.trust.saturating_add(delta));
    }
}

impl Default for Relation {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Mood {
    Calm,
    Content,
    Anxious,
    Angry,
    Emboldened,
    Fearful,
    Suspicious,
    Grieving,
    Triumphant,
}

string_enum!(Mood {
    Calm => "calm",
    Content => "content",
    Anxious => "anxious",
    Angry => "angry",
    Emboldened => "emboldened",
    Fearful => "fearful",
    Suspicious => "suspicious",
    Grieving => "grieving",
    Triumphant => "triumphant",
});

impl Mood {
    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Calm => "😐",
            Mood::Content => "😊",
            Mood::Anxious => "😰",
            Mood::Angry => "😡",
            Mood::Emboldened => "😤",
            Mood::Fearful => "😨",
            Mood::Suspicious => "🤨",
            Mood::Grieving => "😢",
            Mood::Triumphant => "🏆",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub role: CityRole,
    pub population: u32,
    #[serde(default)]
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rumor {
    pub text: String,
    pub source: String,
    pub at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promise {
    pub text: String,
    pub session: SessionId,
    pub at_ms: u64,
    #[serde(default)]
    pub kept: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedSecret {
    pub text: String,
    pub session: SessionId,
}

/// Outcomes accumulated since the last personality drift pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcomes {
    pub war_losses: u32,
    pub new_alliances: u32,
    pub cities_lost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nation {
    pub alive: bool,
    pub troops: u32,
    pub nukes: u32,
    pub gold: u32,
    pub grain: u32,
    pub morale: u32,
    pub population: u32,
    pub tech: u32,
    pub mood: Mood,
    pub mood_reason: String,
    #[serde(default)]
    pub wars: BTreeSet<NationId>,
    #[serde(default)]
    pub allies: BTreeSet<NationId>,
    #[serde(default)]
    pub relations: BTreeMap<NationId, Relation>,
    /// Standing toward each viewer session; absent sessions read as the default.
    #[serde(default)]
    pub user_trust: BTreeMap<SessionId, u8>,
    #[serde(default)]
    pub memory: Memory,
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub secrets: Vec<String>,
    #[serde(default)]
    pub revealed_secrets: Vec<RevealedSecret>,
    #[serde(default)]
    pub rumors: Rumors,
    #[serde(default)]
    pub promises: Promises,
    pub personality: Personality,
    #[serde(default)]
    pub outcomes: Outcomes,
}

impl Nation {
    /// A nation at its persona's starting stats, with random initial trust toward
    /// every other nation drawn from `[-20, 19]`.
    pub fn genesis(id: NationId, rng: &mut (impl Rng + ?Sized)) -> Self {
        let mut nation = Self::at_start(id);
        for other in id.others() {
            nation
                .relations
                .insert(other, Relation::new(rng.random_range(-20..20)));
        }
        nation
    }

    /// Starting stats with neutral relations.
    pub fn at_start(id: NationId) -> Self {
        let p = persona(id);
        let s = p.start;
        Self {
            alive: true,
            troops: s.troops,
            nukes: s.nukes,
            gold: s.gold,
            grain: s.grain,
            morale: s.morale,
            population: s.population,
            tech: s.tech,
            mood: Mood::Calm,
            mood_reason: "The realm is stable.".to_string(),
            wars: BTreeSet::new(),
            allies: BTreeSet::new(),
            relations: id.others().map(|o| (o, Relation::neutral())).collect(),
            user_trust: BTreeMap::new(),
            memory: Memory::new(),
            cities: fresh_cities(id),
            secrets: p.secrets.iter().map(|s| s.to_string()).collect(),
            revealed_secrets: Vec::new(),
            rumors: Rumors::new(),
            promises: Promises::new(),
            personality: p.personality,
            outcomes: Outcomes::default(),
        }
    }

    pub fn relation(&self, other: NationId) -> Relation {
        self.relations.get(&other).copied().unwrap_or_default()
    }

    pub fn trust_toward(&self, other: NationId) -> i32 {
        self.relation(other).trust()
    }

    pub fn relation_mut(&mut self, other: NationId) -> &mut Relation {
        self.relations.entry(other).or_default()
    }

    pub fn user_trust(&self, session: &SessionId) -> u8 {
        self.user_trust
            .get(session)
            .copied()
            .unwrap_or(USER_TRUST_DEFAULT)
    }

    /// Shift this nation's standing toward a viewer, clamped to `[0, 100]`.
    pub fn adjust_user_trust(&mut self, session: &SessionId, delta: i32) -> u8 {
        let current = i32::from(self.user_trust(session));
        let next = (current + delta).clamp(0, 100) as u8;
        self.user_trust.insert(session.clone(), next);
        next
    }

    pub fn standing_cities(&self) -> impl Iterator<Item = &City> {
        self.cities.iter().filter(|c| !c.destroyed)
    }

    pub fn all_cities_destroyed(&self) -> bool {
        self.cities.iter().all(|c| c.destroyed)
    }

    pub fn set_morale(&mut self, morale: i64) {
        self.morale = morale.clamp(0, i64::from(MORALE_MAX)) as u32;
    }

    pub fn adjust_morale(&mut self, delta: i64) {
        self.set_morale(i64::from(self.morale) + delta);
    }
}

pub fn fresh_cities(id: NationId) -> Vec<City> {
    persona(id)
        .cities
        .iter()
        .map(|c| City {
            name: c.name.to_string(),
            role: c.role,
            population: c.population,
            destroyed: false,
        })
        .collect()
}

/// Add a signed delta to an unsigned stock, flooring at zero.
pub fn saturating_apply(value: u32, delta: i64) -> u32 {
    (i64::from(value) + delta).clamp(0, i64::from(u32::MAX)) as u32
}

/// Scale an unsigned stock by a factor, rounding to nearest.
pub fn scaled(value: u32, factor: f64) -> u32 {
    (f64::from(value) * factor).round().max(0.0) as u32
}
