//! Designer-tunable content: world events, cascades, breaking news, crisis
//! templates, and prophecies.
//!
//! The built-in catalog is compiled in from `data/catalog.json`; a replacement
//! file can be loaded at startup. Every effect is applied by the single generic
//! applier in `sim::events`.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One numeric effect on a nation (or on the world, for `Tension`).
///
/// Percent variants take a signed percentage, e.g. `{"population_pct": -15}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Grain(i64),
    Gold(i64),
    Morale(i64),
    Troops(i64),
    TroopsPct(i64),
    PopulationPct(i64),
    GoldPct(i64),
    Tech(i64),
    Tension(i64),
    /// Shift the nation's trust toward every other nation.
    Trust(i64),
}

/// A delayed follow-up event fired with fixed probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeSpec {
    pub event: String,
    pub chance: f64,
    pub delay_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSpec {
    pub id: String,
    /// Log line; `{name}` is replaced with the nation's display name.
    pub text: String,
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub cascade: Option<CascadeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsScope {
    All,
    One,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSpec {
    pub id: String,
    pub headline: String,
    pub scope: NewsScope,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProphecySpec {
    /// Catalog event fired on fulfilment.
    pub event: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub events: Vec<EventSpec>,
    pub breaking_news: Vec<NewsSpec>,
    pub crises: Vec<String>,
    pub power_vacuum: String,
    pub prophecies: Vec<ProphecySpec>,
}

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../data/catalog.json"))
        .expect("built-in catalog is valid JSON")
});

impl Catalog {
    pub fn builtin() -> Catalog {
        BUILTIN.clone()
    }

    pub fn from_path(path: &Path) -> Result<Catalog, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Catalog = serde_json::from_str(&raw).map_err(|source| ConfigError::Catalog {
            path: path.to_path_buf(),
            source,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn event(&self, id: &str) -> Option<&EventSpec> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Every cascade and prophecy must reference a known event, and every
    /// chance must be a probability.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.is_empty() {
            return Err(ConfigError::Invalid("catalog has no events".into()));
        }
        for spec in &self.events {
            if let Some(cascade) = &spec.cascade {
                if self.event(&cascade.event).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "event {} cascades into unknown event {}",
                        spec.id, cascade.event
                    )));
                }
                if !(0.0..=1.0).contains(&cascade.chance) {
                    return Err(ConfigError::Invalid(format!(
                        "event {} has cascade chance {} outside [0, 1]",
                        spec.id, cascade.chance
                    )));
                }
            }
        }
        for prophecy in &self.prophecies {
            if self.event(&prophecy.event).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "prophecy references unknown event {}",
                    prophecy.event
                )));
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Substitute `{name}` in a catalog template.
pub fn render(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_consistent() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.events.len(), 12);
        assert!(!catalog.breaking_news.is_empty());
        assert!(!catalog.crises.is_empty());
    }

    #[test]
    fn famine_cascades_into_rebellion() {
        let catalog = Catalog::builtin();
        let famine = catalog.event("famine").unwrap();
        let cascade = famine.cascade.as_ref().unwrap();
        assert_eq!(cascade.event, "rebellion");
        assert!(cascade.chance > 0.0);
    }

    #[test]
    fn effect_wire_format() {
        let effect: Effect = serde_json::from_str(r#"{"population_pct": -15}"#).unwrap();
        assert_eq!(effect, Effect::PopulationPct(-15));
    }

    #[test]
    fn validate_rejects_dangling_cascade() {
        let mut catalog = Catalog::builtin();
        catalog.events[0].cascade = Some(CascadeSpec {
            event: "nope".into(),
            chance: 0.5,
            delay_secs: 1,
        });
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, include_str!("../data/catalog.json")).unwrap();
        let catalog = Catalog::from_path(&path).unwrap();
        assert!(catalog.event("plague").is_some());
    }

    #[test]
    fn render_substitutes_name() {
        assert_eq!(render("Plague in {name}!", "Rex"), "Plague in Rex!");
    }
}
