//! Enemy stats keyed by enemy name.

use std::{collections::HashMap, fs, path::Path};

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

/// Failure to read an enemy stats file.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The file could not be read.
    #[error("failed to read enemy stats: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid stats document.
    #[error("malformed enemy stats: {0}")]
    Json(#[from] serde_json::Error),
}

/// Combat and movement numbers of one enemy type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Health on spawn.
    pub max_health: i32,
    /// Damage dealt by the enemy's attacks.
    pub attack: i32,
    /// Movement speed. Units depend on the behaviour.
    pub speed: f32,
    /// Preferred spawn position, if the data names one.
    pub spawn_position: Option<Vec2>,
}

impl EnemyStats {
    /// Stats used for names without an entry.
    pub const DEFAULT: EnemyStats = EnemyStats::new(1, 1, 2.0);

    /// Creates stats without a spawn position.
    #[must_use]
    pub const fn new(max_health: i32, attack: i32, speed: f32) -> Self {
        Self {
            max_health,
            attack,
            speed,
            spawn_position: None,
        }
    }
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsRecord {
    max_health: i32,
    attack: i32,
    speed: f32,
    #[serde(default)]
    spawn_position: Option<PositionRecord>,
}

#[derive(Debug, Deserialize)]
struct PositionRecord {
    x: f32,
    y: f32,
}

impl From<StatsRecord> for EnemyStats {
    fn from(record: StatsRecord) -> Self {
        Self {
            max_health: record.max_health,
            attack: record.attack,
            speed: record.speed,
            spawn_position: record
                .spawn_position
                .map(|position| Vec2::new(position.x, position.y)),
        }
    }
}

/// Immutable lookup of enemy stats by name.
#[derive(Clone, Debug)]
pub struct EnemyStatsCache {
    entries: HashMap<String, EnemyStats>,
}

impl EnemyStatsCache {
    /// Cache holding the built-in entries only.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = [
            ("Chaser", EnemyStats::new(2, 1, 80.0)),
            ("Shooter", EnemyStats::new(1, 1, 1.5)),
            ("Spider", EnemyStats::new(1, 1, 2.0)),
        ]
        .into_iter()
        .map(|(name, stats)| (name.to_owned(), stats))
        .collect();

        Self { entries }
    }

    /// Builds a cache from a JSON object keyed by enemy name.
    ///
    /// File entries replace built-in entries of the same name.
    pub fn from_json_str(json: &str) -> Result<Self, StatsError> {
        let records: HashMap<String, StatsRecord> = serde_json::from_str(json)?;
        let mut cache = Self::builtin();
        for (name, record) in records {
            let _ = cache.entries.insert(name, record.into());
        }
        Ok(cache)
    }

    /// Reads and parses a stats file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StatsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let cache = Self::from_json_str(&json)?;
        log::info!(
            "loaded {} enemy stats entries from {}",
            cache.entries.len(),
            path.as_ref().display()
        );
        Ok(cache)
    }

    /// Stats registered under `name`, or [`EnemyStats::DEFAULT`].
    #[must_use]
    pub fn get(&self, name: &str) -> EnemyStats {
        match self.entries.get(name) {
            Some(stats) => *stats,
            None => {
                log::warn!("no stats for enemy {name:?}; using defaults");
                EnemyStats::DEFAULT
            }
        }
    }

    /// Whether an entry exists for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl Default for EnemyStatsCache {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_fall_back_to_defaults() {
        let cache = EnemyStatsCache::builtin();

        assert_eq!(cache.get("Dragon"), EnemyStats::new(1, 1, 2.0));
        assert_eq!(cache.get("Chaser"), EnemyStats::new(2, 1, 80.0));
    }

    #[test]
    fn file_entries_replace_builtins() {
        let cache = EnemyStatsCache::from_json_str(
            r#"{
                "Shooter": { "maxHealth": 3, "attack": 2, "speed": 2.5 },
                "Bat": { "maxHealth": 1, "attack": 1, "speed": 4, "spawnPosition": { "x": 64, "y": 288 } }
            }"#,
        )
        .expect("valid stats");

        assert_eq!(cache.get("Shooter"), EnemyStats::new(3, 2, 2.5));
        assert_eq!(cache.get("Spider"), EnemyStats::new(1, 1, 2.0));
        assert_eq!(
            cache.get("Bat").spawn_position,
            Some(Vec2::new(64.0, 288.0))
        );
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = EnemyStatsCache::from_json_str("{ \"Shooter\": 3 }").expect_err("invalid");

        assert!(matches!(error, StatsError::Json(_)));
    }
}
