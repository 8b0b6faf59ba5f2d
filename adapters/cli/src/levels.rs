//! Level files read on demand from a directory of CSV layouts.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tilequest_world::level::LevelLayout;

/// Parsed layouts keyed by level name, loaded from `<dir>/<level>.csv`.
#[derive(Debug)]
pub(crate) struct LevelLibrary {
    dir: PathBuf,
    cache: HashMap<String, LevelLayout>,
}

impl LevelLibrary {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: HashMap::new(),
        }
    }

    /// Layout of `level`. A missing or unreadable file yields an empty layout.
    pub(crate) fn layout(&mut self, level: &str) -> &LevelLayout {
        let dir = &self.dir;
        self.cache
            .entry(level.to_owned())
            .or_insert_with(|| read_layout(dir, level))
    }
}

fn read_layout(dir: &Path, level: &str) -> LevelLayout {
    let path = dir.join(format!("{level}.csv"));
    match fs::read_to_string(&path) {
        Ok(text) => {
            log::debug!("loaded level {}", path.display());
            LevelLayout::parse(&text)
        }
        Err(error) => {
            log::warn!("could not read level {}: {error}", path.display());
            LevelLayout::default()
        }
    }
}
