//! Progress that outlives a single scene, plus its save file format.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tilequest_core::{GridCoord, COINS_KEY};

const DEFAULT_PLAYER_HEALTH: i32 = 6;

/// Failure to persist or restore the game state.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the file failed.
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file content is not a valid save document.
    #[error("save file is malformed: {0}")]
    Json(#[from] serde_json::Error),
    /// No save file exists at the path.
    #[error("save file {} not found", .0.display())]
    Missing(PathBuf),
}

/// Where the player re-enters the next scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnEdge {
    /// Left border, keeping the vertical position.
    Left,
    /// Right border, keeping the vertical position.
    Right,
    /// Top border, keeping the horizontal position.
    Top,
    /// Bottom border, keeping the horizontal position.
    Bottom,
    /// Bottom centre, used when leaving through a door.
    FromDoor,
    /// In front of the door of the next scene.
    Door,
}

/// Pending arrival queued by the previous scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeTransition {
    /// Arrival side.
    pub edge: SpawnEdge,
    /// Player position when the transition was queued.
    pub position: Vec2,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveData {
    state: BTreeMap<String, Value>,
    current_scene_name: String,
    #[serde(default = "default_player_health")]
    player_health: i32,
    #[serde(default = "default_player_health")]
    player_max_health: i32,
    #[serde(default)]
    has_sword: bool,
    #[serde(default)]
    saved_at: u64,
}

fn default_player_health() -> i32 {
    DEFAULT_PLAYER_HEALTH
}

/// Flat key/value progress store with a few named scalars.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    values: BTreeMap<String, Value>,
    allow_player_control: bool,
    current_scene_name: String,
    player_health: i32,
    player_max_health: i32,
    has_sword: bool,
    edge_transition: Option<EdgeTransition>,
    collected: HashMap<String, HashSet<GridCoord>>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Fresh progress with zero coins and full health.
    #[must_use]
    pub fn new() -> Self {
        let mut values = BTreeMap::new();
        let _ = values.insert(COINS_KEY.to_owned(), Value::from(0));

        Self {
            values,
            allow_player_control: true,
            current_scene_name: String::new(),
            player_health: DEFAULT_PLAYER_HEALTH,
            player_max_health: DEFAULT_PLAYER_HEALTH,
            has_sword: false,
            edge_transition: None,
            collected: HashMap::new(),
        }
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let _ = self.values.insert(key.into(), value.into());
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Integer stored under `key`, or `default` when absent or not an integer.
    #[must_use]
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.value(key).and_then(Value::as_i64).unwrap_or(default)
    }

    /// Whether a value is stored under `key`.
    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes the value stored under `key`.
    pub fn remove_value(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Removes every stored value.
    pub fn clear_values(&mut self) {
        self.values.clear();
    }

    /// Coins collected so far.
    #[must_use]
    pub fn coins(&self) -> i64 {
        self.int_or(COINS_KEY, 0)
    }

    /// Adds `amount` coins and returns the new total.
    pub fn add_coins(&mut self, amount: i64) -> i64 {
        let total = self.coins().saturating_add(amount);
        self.set_value(COINS_KEY, total);
        total
    }

    /// Whether the player currently accepts input.
    #[must_use]
    pub const fn allow_player_control(&self) -> bool {
        self.allow_player_control
    }

    /// Enables or disables player input.
    pub fn set_allow_player_control(&mut self, allowed: bool) {
        self.allow_player_control = allowed;
    }

    /// Name of the scene the player is in.
    #[must_use]
    pub fn current_scene_name(&self) -> &str {
        &self.current_scene_name
    }

    /// Records the scene the player is in.
    pub fn set_current_scene_name(&mut self, name: impl Into<String>) {
        self.current_scene_name = name.into();
    }

    /// Player health carried between scenes.
    #[must_use]
    pub const fn player_health(&self) -> i32 {
        self.player_health
    }

    /// Player maximum health carried between scenes.
    #[must_use]
    pub const fn player_max_health(&self) -> i32 {
        self.player_max_health
    }

    /// Records the player's health.
    pub fn set_player_health(&mut self, health: i32, max_health: i32) {
        self.player_health = health;
        self.player_max_health = max_health;
    }

    /// Whether the sword has been picked up.
    #[must_use]
    pub const fn has_sword(&self) -> bool {
        self.has_sword
    }

    /// Records sword ownership.
    pub fn set_has_sword(&mut self, has_sword: bool) {
        self.has_sword = has_sword;
    }

    /// Queues where the player appears in the next scene.
    pub fn queue_edge_transition(&mut self, edge: SpawnEdge, position: Vec2) {
        self.edge_transition = Some(EdgeTransition { edge, position });
    }

    /// Pending arrival, if any.
    #[must_use]
    pub const fn edge_transition(&self) -> Option<EdgeTransition> {
        self.edge_transition
    }

    /// Removes and returns the pending arrival.
    pub fn take_edge_transition(&mut self) -> Option<EdgeTransition> {
        self.edge_transition.take()
    }

    /// Remembers that the item resting on `coord` of `scene` was picked up.
    pub fn mark_item_collected(&mut self, scene: &str, coord: GridCoord) {
        let _ = self
            .collected
            .entry(scene.to_owned())
            .or_default()
            .insert(coord);
    }

    /// Whether the item resting on `coord` of `scene` was picked up.
    #[must_use]
    pub fn is_item_collected(&self, scene: &str, coord: GridCoord) -> bool {
        self.collected
            .get(scene)
            .map_or(false, |cells| cells.contains(&coord))
    }

    /// Writes the state as pretty JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let saved_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let data = SaveData {
            state: self.values.clone(),
            current_scene_name: self.current_scene_name.clone(),
            player_health: self.player_health,
            player_max_health: self.player_max_health,
            has_sword: self.has_sword,
            saved_at,
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        log::info!("game saved to {}", path.display());
        Ok(())
    }

    /// Replaces the stored values and scalars with the content of a save file.
    ///
    /// On any failure the state is left untouched.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PersistError::Missing(path.to_path_buf()));
        }

        let json = fs::read_to_string(path)?;
        let data: SaveData = serde_json::from_str(&json)?;

        self.values = data.state;
        self.current_scene_name = data.current_scene_name;
        self.player_health = data.player_health;
        self.player_max_health = data.player_max_health;
        self.has_sword = data.has_sword;
        log::info!(
            "game loaded from {} (saved at {})",
            path.display(),
            data.saved_at
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coins_start_at_zero_and_accumulate() {
        let mut state = GameState::new();

        assert_eq!(state.coins(), 0);
        assert_eq!(state.add_coins(3), 3);
        assert_eq!(state.int_or(COINS_KEY, -1), 3);
    }

    #[test]
    fn collected_items_are_scoped_by_scene() {
        let mut state = GameState::new();
        state.mark_item_collected("Underworld", GridCoord::new(7, 9));

        assert!(state.is_item_collected("Underworld", GridCoord::new(7, 9)));
        assert!(!state.is_item_collected("Zelda12", GridCoord::new(7, 9)));
    }

    #[test]
    fn edge_transition_is_consumed_once() {
        let mut state = GameState::new();
        state.queue_edge_transition(SpawnEdge::FromDoor, Vec2::new(10.0, 20.0));

        assert_eq!(
            state.take_edge_transition().map(|transition| transition.edge),
            Some(SpawnEdge::FromDoor)
        );
        assert!(state.take_edge_transition().is_none());
    }
}
