//! Creature catalog backed by a directory of JSON files.
//!
//! Each `<id>.json` file in the creature directory describes one creature.
//! Discovery only collects the ids; full records are parsed on demand, one
//! at a time.

use crate::creature::CreatureRecord;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// List the stems of all `*.json` files in `dir`, sorted.
///
/// Returns `None` (after logging) when `dir` is missing or not a directory.
pub(crate) fn discover_json_ids(dir: &Path) -> Option<Vec<String>> {
    if !dir.exists() {
        tracing::error!("The directory {:?} does not exist", dir);
        return None;
    }
    if !dir.is_dir() {
        tracing::error!("The directory {:?} is not a directory", dir);
        return None;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Unable to list {:?}: {}", dir, e);
            return None;
        }
    };

    let mut ids: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
        .collect();
    ids.sort();
    Some(ids)
}

/// Read and parse a JSON file
pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Lazily discovered set of creatures with one "current" creature
#[derive(Debug)]
pub struct CreatureCatalog {
    dir: PathBuf,
    ids: Vec<String>,
    discovered: bool,
    current: Option<CreatureRecord>,
}

impl CreatureCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ids: Vec::new(),
            discovered: false,
            current: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scan the creature directory. No-op once it has succeeded.
    pub fn discover(&mut self) {
        if self.discovered {
            return;
        }

        if let Some(ids) = discover_json_ids(&self.dir) {
            tracing::info!("Found {} creatures in {:?}", ids.len(), self.dir);
            self.ids = ids;
            self.discovered = true;
        }
    }

    /// All known creature ids, discovering them first if needed
    pub fn list_ids(&mut self) -> &[String] {
        self.discover();
        &self.ids
    }

    fn contains(&mut self, id: &str) -> bool {
        self.list_ids().iter().any(|known| known == id)
    }

    /// Parse creature `id` and make it the current creature.
    ///
    /// On any failure the previous current creature is kept.
    pub fn load_by_id(&mut self, id: &str) -> Result<&CreatureRecord> {
        if !self.contains(id) {
            tracing::error!("Fish {{{}}} not found", id);
            return Err(Error::UnknownCreature(id.to_string()));
        }

        let path = self.dir.join(format!("{}.json", id));
        let json = read_json(&path).map_err(|e| {
            tracing::error!("Unable to read creature file {:?}: {}", path, e);
            e
        })?;

        let record = CreatureRecord::from_json(id, &json);
        tracing::debug!("Loaded creature {} ({})", record.name, id);
        Ok(self.current.insert(record))
    }

    pub fn current_creature(&self) -> Option<&CreatureRecord> {
        self.current.as_ref()
    }
}
