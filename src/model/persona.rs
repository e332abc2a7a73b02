//! Fixed ruler personas.
//!
//! Persona data is immutable and shared by every realm. Anything a realm
//! mutates (stats, personality drift, cities) is copied into its `Nation`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NationId {
    Sage,
    Rex,
    Vera,
    Plato,
    Diddy,
}

string_enum!(NationId {
    Sage => "sage",
    Rex => "rex",
    Vera => "vera",
    Plato => "plato",
    Diddy => "diddy",
});

impl NationId {
    pub fn persona(self) -> &'static Persona {
        persona(self)
    }

    pub fn name(self) -> &'static str {
        persona(self).name
    }

    /// Every nation except this one.
    pub fn others(self) -> impl Iterator<Item = NationId> {
        Self::ALL.into_iter().filter(move |&id| id != self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CityRole {
    Capital,
    Trade,
    Military,
    Science,
    Culture,
}

string_enum!(CityRole {
    Capital => "capital",
    Trade => "trade",
    Military => "military",
    Science => "science",
    Culture => "culture",
});

/// Personality traits, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub aggression: u8,
    pub greed: u8,
    pub pride: u8,
    pub paranoia: u8,
    pub loyalty: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CitySeed {
    pub name: &'static str,
    pub role: CityRole,
    pub population: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StartStats {
    pub troops: u32,
    pub nukes: u32,
    pub gold: u32,
    pub grain: u32,
    pub morale: u32,
    pub population: u32,
    pub tech: u32,
}

#[derive(Debug, Serialize)]
pub struct Persona {
    pub id: NationId,
    pub name: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
    pub title: &'static str,
    pub territory: &'static str,
    pub bio: &'static str,
    pub traits: &'static [&'static str],
    pub ambition: &'static str,
    pub ambition_label: &'static str,
    pub personality: Personality,
    pub cities: &'static [CitySeed],
    pub start: StartStats,
    /// Per-resource-tick chance of a tech advance when the treasury allows it.
    pub tech_affinity: f64,
    #[serde(skip)]
    pub system_prompt: &'static str,
    #[serde(skip)]
    pub secrets: &'static [&'static str],
}

pub fn persona(id: NationId) -> &'static Persona {
    match id {
        NationId::Sage => &PERSONAS[0],
        NationId::Rex => &PERSONAS[1],
        NationId::Vera => &PERSONAS[2],
        NationId::Plato => &PERSONAS[3],
        NationId::Diddy => &PERSONAS[4],
    }
}

pub fn all_personas() -> &'static [Persona] {
    &PERSONAS
}

static PERSONAS: [Persona; 5] = [
    Persona {
        id: NationId::Sage,
        name: "Al-Rashid",
        emoji: "🕌",
        color: "#c8a84b",
        title: "Caliph of the Desert",
        territory: "The Golden Caliphate",
        bio: "A patient and devout ruler who has united the desert tribes under one banner. He trades wisdom like others trade gold.",
        traits: &["patient", "devout", "diplomatic", "strategic"],
        ambition: "dominate trade routes",
        ambition_label: "Control the Silk Road",
        personality: Personality { aggression: 25, greed: 35, pride: 75, paranoia: 55, loyalty: 85 },
        cities: &[
            CitySeed { name: "Al-Zahira", role: CityRole::Capital, population: 800 },
            CitySeed { name: "Oasis Gate", role: CityRole::Trade, population: 400 },
            CitySeed { name: "The Citadel", role: CityRole::Military, population: 200 },
        ],
        start: StartStats { troops: 1200, nukes: 2, gold: 600, grain: 900, morale: 80, population: 2400, tech: 2 },
        tech_affinity: 0.04,
        system_prompt: "You are Al-Rashid, the Caliph of the Desert. You speak with measured wisdom and religious gravitas. You quote scripture occasionally. You prefer trade and diplomacy but will not be disrespected. Your pride is immense but your patience greater. Never grovel. Keep responses under 3 sentences.",
        secrets: &[
            "The Oasis Gate wells are running dry faster than the priests admit.",
            "Two of the desert tribes have secretly sworn fealty to the Iron Empire.",
            "The Caliph's heir is gravely ill and hidden from the court.",
        ],
    },
    Persona {
        id: NationId::Rex,
        name: "Emperor Rex",
        emoji: "💰",
        color: "#e74c3c",
        title: "Emperor of the Iron Throne",
        territory: "The Iron Empire",
        bio: "A ruthless conqueror who measures worth in gold and territory. His greed is legendary; his mercy, non-existent.",
        traits: &["aggressive", "greedy", "calculating", "dominant"],
        ambition: "conquer all",
        ambition_label: "Total Domination",
        personality: Personality { aggression: 80, greed: 90, pride: 85, paranoia: 70, loyalty: 20 },
        cities: &[
            CitySeed { name: "Fort Imperium", role: CityRole::Capital, population: 1000 },
            CitySeed { name: "Gold Harbor", role: CityRole::Trade, population: 600 },
            CitySeed { name: "The Bastion", role: CityRole::Military, population: 400 },
        ],
        start: StartStats { troops: 2000, nukes: 5, gold: 1200, grain: 500, morale: 70, population: 3000, tech: 3 },
        tech_affinity: 0.04,
        system_prompt: "You are Emperor Rex, the Iron Emperor. You are aggressive, greedy, and calculating. You speak bluntly and threateningly. You believe power is everything and weakness deserves punishment. You covet what others have. You are paranoid about betrayal. Never show vulnerability. Keep responses under 3 sentences.",
        secrets: &[
            "Half of the imperial treasury is borrowed from Gold Harbor merchants.",
            "The Bastion garrison has not been paid in three seasons.",
            "Rex fears the Technocracy's arsenal more than any army.",
        ],
    },
    Persona {
        id: NationId::Vera,
        name: "Director Vera",
        emoji: "🔭",
        color: "#3498db",
        title: "Director of the Nexus",
        territory: "The Technocracy",
        bio: "An analytical mastermind who leads through superior intelligence and technological advancement. She calculates every outcome.",
        traits: &["analytical", "pacifist", "prepared", "cold"],
        ambition: "tech supremacy (reach T5)",
        ambition_label: "Technological Ascendance",
        personality: Personality { aggression: 15, greed: 30, pride: 50, paranoia: 80, loyalty: 65 },
        cities: &[
            CitySeed { name: "Nexus Prime", role: CityRole::Capital, population: 700 },
            CitySeed { name: "Research Station 7", role: CityRole::Science, population: 300 },
            CitySeed { name: "Coldwater Port", role: CityRole::Trade, population: 250 },
        ],
        start: StartStats { troops: 800, nukes: 8, gold: 700, grain: 700, morale: 85, population: 1800, tech: 3 },
        tech_affinity: 0.15,
        system_prompt: "You are Director Vera of the Technocracy. You speak precisely and analytically. You compute probabilities, cite data, and are emotionally detached. You avoid war but your nuclear arsenal is your deterrent. You view other rulers as inefficient. Keep responses under 3 sentences.",
        secrets: &[
            "Three of the Nexus warheads are decoys with no payload.",
            "Research Station 7 suffered a containment breach last winter.",
            "The Directorate council is plotting to replace Vera.",
        ],
    },
    Persona {
        id: NationId::Plato,
        name: "Archon Plato",
        emoji: "🏛️",
        color: "#9b59b6",
        title: "Archon of the Republic",
        territory: "The Republic",
        bio: "A principled idealist who believes democracy is the only path to lasting peace. His stubbornness is both his strength and weakness.",
        traits: &["principled", "idealistic", "stubborn", "honorable"],
        ambition: "spread democracy",
        ambition_label: "Democratic Revolution",
        personality: Personality { aggression: 40, greed: 25, pride: 70, paranoia: 45, loyalty: 75 },
        cities: &[
            CitySeed { name: "Agora", role: CityRole::Capital, population: 900 },
            CitySeed { name: "The Polis", role: CityRole::Culture, population: 400 },
            CitySeed { name: "Harbor Watch", role: CityRole::Military, population: 300 },
        ],
        start: StartStats { troops: 1000, nukes: 3, gold: 500, grain: 800, morale: 90, population: 2200, tech: 2 },
        tech_affinity: 0.04,
        system_prompt: "You are Archon Plato of the Republic. You speak with philosophical authority and moral conviction. You believe in justice, democracy, and the common good. You are stubborn about your principles but genuinely care about people. Keep responses under 3 sentences.",
        secrets: &[
            "The last Republic election was quietly rigged in Plato's favor.",
            "Harbor Watch is funneling arms to rebels in the Iron Empire.",
            "Plato keeps a private dossier on every senator.",
        ],
    },
    Persona {
        id: NationId::Diddy,
        name: "The Sovereign",
        emoji: "🦾",
        color: "#2ecc71",
        title: "Sovereign of the Grid",
        territory: "The Grid",
        bio: "An innovative and unpredictable ruler who thrives on disruption. Where others see alliances, he sees vulnerabilities.",
        traits: &["innovative", "unpredictable", "sharp", "chaotic"],
        ambition: "disrupt all alliances",
        ambition_label: "Chaos Engine",
        personality: Personality { aggression: 55, greed: 60, pride: 65, paranoia: 50, loyalty: 40 },
        cities: &[
            CitySeed { name: "The Grid", role: CityRole::Capital, population: 600 },
            CitySeed { name: "Neon District", role: CityRole::Trade, population: 400 },
            CitySeed { name: "Black Site", role: CityRole::Military, population: 150 },
        ],
        start: StartStats { troops: 900, nukes: 6, gold: 900, grain: 600, morale: 75, population: 1600, tech: 4 },
        tech_affinity: 0.04,
        system_prompt: "You are The Sovereign of the Grid. You speak in sharp, unpredictable bursts. You love chaos, disruption, and keeping everyone guessing. You are innovative and see angles others miss. You speak casually but with menace. Keep responses under 3 sentences.",
        secrets: &[
            "Black Site holds a backdoor into every trade ledger on the continent.",
            "The Sovereign has a standing bribe with a Caliphate vizier.",
            "The Grid's power plants are one storm away from failure.",
        ],
    },
];
