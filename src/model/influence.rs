use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::persona::NationId;

/// Cumulative points required for levels 1 through 5.
pub const LEVEL_THRESHOLDS: [u32; 5] = [0, 30, 80, 160, 300];
pub const MAX_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Ability {
    RumorPlanting,
    MemoryReading,
    SuggestionWeight,
    EventTriggering,
}

string_enum!(Ability {
    RumorPlanting => "rumor_planting",
    MemoryReading => "memory_reading",
    SuggestionWeight => "suggestion_weight",
    EventTriggering => "event_triggering",
});

impl Ability {
    pub fn required_level(self) -> u8 {
        match self {
            Ability::RumorPlanting => 2,
            Ability::MemoryReading => 3,
            Ability::SuggestionWeight => 4,
            Ability::EventTriggering => 5,
        }
    }

    /// The ability unlocked on reaching exactly `level`, if any.
    pub fn unlocked_at(level: u8) -> Option<Ability> {
        match level {
            2 => Some(Ability::RumorPlanting),
            3 => Some(Ability::MemoryReading),
            4 => Some(Ability::SuggestionWeight),
            5 => Some(Ability::EventTriggering),
            _ => None,
        }
    }
}

/// Why points were awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Merit {
    MissionCompleted,
    SecretDiscovered,
    TradeBrokered,
    LeverageUsed,
    AmbientSuccess,
}

string_enum!(Merit {
    MissionCompleted => "mission_completed",
    SecretDiscovered => "secret_discovered",
    TradeBrokered => "trade_brokered",
    LeverageUsed => "leverage_used",
    AmbientSuccess => "ambient_success",
});

impl Merit {
    pub fn points(self) -> u32 {
        match self {
            Merit::MissionCompleted => 25,
            Merit::SecretDiscovered => 15,
            Merit::TradeBrokered => 10,
            Merit::LeverageUsed => 8,
            Merit::AmbientSuccess => 2,
        }
    }
}

pub fn level_for(points: u32) -> u8 {
    LEVEL_THRESHOLDS
        .iter()
        .rposition(|&t| points >= t)
        .map_or(1, |idx| idx as u8 + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfluence {
    pub points: u32,
    pub level: u8,
    /// Nations whose secrets this session has uncovered.
    #[serde(default)]
    pub uncovered: BTreeSet<NationId>,
}

impl Default for PlayerInfluence {
    fn default() -> Self {
        Self {
            points: 0,
            level: 1,
            uncovered: BTreeSet::new(),
        }
    }
}

impl PlayerInfluence {
    /// Add points; returns the new level if this crossed a threshold.
    pub fn award(&mut self, points: u32) -> Option<u8> {
        self.points = self.points.saturating_add(points);
        let level = level_for(self.points);
        if level > self.level {
            self.level = level;
            Some(level)
        } else {
            None
        }
    }

    pub fn has(&self, ability: Ability) -> bool {
        self.level >= ability.required_level()
    }

    pub fn abilities(&self) -> Vec<Ability> {
        (2..=self.level).filter_map(Ability::unlocked_at).collect()
    }
}
