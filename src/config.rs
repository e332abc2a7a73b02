use std::path::PathBuf;
use std::time::Duration;

use rand::{Rng, RngCore};

use crate::error::ConfigError;
use crate::id::RealmId;

/// A repeat interval: fixed when `min == max`, otherwise drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub min: Duration,
    pub max: Duration,
}

impl Cadence {
    pub const fn every(secs: u64) -> Self {
        Self {
            min: Duration::from_secs(secs),
            max: Duration::from_secs(secs),
        }
    }

    pub const fn between(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min: Duration::from_secs(min_secs),
            max: Duration::from_secs(max_secs),
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rng.random_range(min..max))
    }
}

/// Intervals of every scheduled system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadences {
    pub economy: Cadence,
    pub war: Cadence,
    pub mood: Cadence,
    pub season: Cadence,
    pub expiry: Cadence,
    /// Base delay before tension scaling.
    pub events: Cadence,
    pub crisis: Cadence,
    pub prophecy: Cadence,
    pub news: Cadence,
    pub drift: Cadence,
    pub decision: Cadence,
    pub ambient: Cadence,
    pub intercept: Cadence,
}

impl Default for Cadences {
    fn default() -> Self {
        Self {
            economy: Cadence::every(45),
            war: Cadence::every(15),
            mood: Cadence::every(30),
            season: Cadence::every(180),
            expiry: Cadence::every(30),
            events: Cadence::between(300, 540),
            crisis: Cadence::between(420, 900),
            prophecy: Cadence::between(600, 900),
            news: Cadence::between(480, 960),
            drift: Cadence::every(240),
            decision: Cadence::between(80, 130),
            ambient: Cadence::between(28, 50),
            intercept: Cadence::between(90, 150),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

/// Configuration for one engine process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub realm: RealmId,
    /// Multiplies every scheduled delay. Values below 1 speed the world up.
    pub time_scale: f64,
    pub cadences: Cadences,
    pub snapshot_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub completion: CompletionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            realm: RealmId::from("main"),
            time_scale: 1.0,
            cadences: Cadences::default(),
            snapshot_dir: None,
            database_url: None,
            catalog_path: None,
            completion: CompletionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(realm) = lookup("REALM_ID") {
            config.realm = RealmId(realm);
        }
        if let Some(raw) = lookup("REALM_TIME_SCALE") {
            config.time_scale = match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => v,
                _ => {
                    return Err(ConfigError::BadValue {
                        key: "REALM_TIME_SCALE",
                        value: raw,
                    });
                }
            };
        }
        config.snapshot_dir = lookup("REALM_SNAPSHOT_DIR").map(PathBuf::from);
        config.catalog_path = lookup("REALM_CATALOG").map(PathBuf::from);
        config.database_url = lookup("DATABASE_URL");
        config.completion.api_key = lookup("COMPLETION_API_KEY").or_else(|| lookup("GROQ_API_KEY"));
        if let Some(url) = lookup("COMPLETION_BASE_URL") {
            config.completion.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("COMPLETION_MODEL") {
            config.completion.model = model;
        }
        if let Some(raw) = lookup("COMPLETION_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::BadValue {
                key: "COMPLETION_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.completion.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
