//! `DataSource` backed by a directory of JSON files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use wave_defence_core::{DataError, DataSource, EnemyTable, LevelDefinition, TowerTable};

/// Reads `tables/<name>.json` and `levels/<name>.json` below a root directory.
///
/// Files are read on every call so edits between reloads are picked up.
#[derive(Clone, Debug)]
pub(crate) struct JsonDirectory {
    root: PathBuf,
}

impl JsonDirectory {
    /// Creates a loader rooted at `root`.
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read<T: DeserializeOwned>(&self, relative: &Path) -> Result<T, DataError> {
        let path = self.root.join(relative);
        let resource = path.display().to_string();
        let contents = fs::read_to_string(&path).map_err(|source| DataError::Io {
            resource: resource.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|error| DataError::Malformed {
            resource,
            reason: error.to_string(),
        })
    }
}

impl DataSource for JsonDirectory {
    fn tower_table(&self) -> Result<TowerTable, DataError> {
        self.read(Path::new("tables/towers.json"))
    }

    fn enemy_table(&self) -> Result<EnemyTable, DataError> {
        self.read(Path::new("tables/enemies.json"))
    }

    fn level(&self, name: &str) -> Result<LevelDefinition, DataError> {
        self.read(&Path::new("levels").join(format!("{name}.json")))
    }
}
