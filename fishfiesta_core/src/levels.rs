//! Level catalog: static level files plus persisted session state.
//!
//! Level rules and creature order are always re-read from
//! `<levels_dir>/<id>.json`. Only the session fields survive restarts, kept
//! in a [`KeyValueStore`] under `"<id>.<field>"`. Every write clears all of
//! a level's keys before setting the new ones, so no stale combination
//! (e.g. completed and in progress) can survive, and is flushed before the
//! call returns.

use crate::catalog::{discover_json_ids, read_json};
use crate::condition::parse_conditions;
use crate::level::{Level, LevelDefinition, LevelSession, LevelStatus, MISTAKE_LIMIT};
use crate::store::KeyValueStore;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

const COMPLETED: &str = "completed";
const FAILED: &str = "failed";
const IN_PROGRESS: &str = "in_progress";
const MISTAKES: &str = "mistakes";
const FISH_INDEX: &str = "fish_index";

const ALL_FIELDS: [&str; 5] = [COMPLETED, FAILED, IN_PROGRESS, MISTAKES, FISH_INDEX];

fn key(level_id: &str, field: &str) -> String {
    format!("{}.{}", level_id, field)
}

/// Session state of one level as found in the store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PersistedSession {
    pub completed: bool,
    pub failed: bool,
    pub in_progress: bool,
    pub mistakes: u32,
    pub fish_index: usize,
}

impl PersistedSession {
    /// Collapse the stored flags into one status.
    ///
    /// An attempt stored as in progress with [`MISTAKE_LIMIT`] or more
    /// mistakes counts as failed.
    pub fn status(&self) -> LevelStatus {
        if self.completed {
            LevelStatus::Completed
        } else if self.failed || (self.in_progress && self.mistakes >= MISTAKE_LIMIT) {
            LevelStatus::Failed
        } else if self.in_progress {
            LevelStatus::InProgress
        } else {
            LevelStatus::NotStarted
        }
    }
}

/// Discovers levels, loads them, and persists their progress
#[derive(Debug)]
pub struct LevelCatalog<S: KeyValueStore> {
    dir: PathBuf,
    store: S,
    ids: Vec<String>,
    discovered: bool,
    active: Option<Level>,
}

impl<S: KeyValueStore> LevelCatalog<S> {
    pub fn new(dir: impl Into<PathBuf>, store: S) -> Self {
        Self {
            dir: dir.into(),
            store,
            ids: Vec::new(),
            discovered: false,
            active: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Discovery and loading
    // ========================================================================

    /// Scan the level directory. No-op once it has succeeded.
    pub fn discover_levels(&mut self) {
        if self.discovered {
            return;
        }

        if let Some(ids) = discover_json_ids(&self.dir) {
            tracing::info!("Discovered {} levels in {:?}", ids.len(), self.dir);
            self.ids = ids;
            self.discovered = true;
        }
    }

    pub fn list_level_ids(&mut self) -> &[String] {
        self.discover_levels();
        &self.ids
    }

    /// Load level `id` fresh from disk, merge in its persisted session and
    /// make it the active level.
    ///
    /// Fails without touching the active level if the id is unknown, the
    /// file cannot be read, or its `conditions`/`fishIDs` blocks are
    /// missing or empty.
    pub fn load_level_by_id(&mut self, id: &str) -> Result<&mut Level> {
        if !self.list_level_ids().iter().any(|known| known == id) {
            tracing::error!("Level {{{}}} not found", id);
            return Err(Error::UnknownLevel(id.to_string()));
        }

        let definition = self.read_definition(id)?;
        let session = self.restore_session(id, definition.creature_ids.len());

        tracing::info!(
            "Loaded level {} ({} conditions, {} creatures, {:?})",
            id,
            definition.conditions.len(),
            definition.creature_ids.len(),
            session.status
        );
        Ok(self.active.insert(Level::new(definition, session)))
    }

    pub fn active_level(&self) -> Option<&Level> {
        self.active.as_ref()
    }

    pub fn active_level_mut(&mut self) -> Option<&mut Level> {
        self.active.as_mut()
    }

    fn read_definition(&self, id: &str) -> Result<LevelDefinition> {
        let path = self.dir.join(format!("{}.json", id));
        let json = read_json(&path).map_err(|e| {
            tracing::error!("Unable to read level file {:?}: {}", path, e);
            e
        })?;

        let Some(block) = json.get("conditions").filter(|v| v.is_object()) else {
            tracing::error!("{}.json has no valid 'conditions' block.", id);
            return Err(Error::MissingBlock {
                level: id.to_string(),
                block: "conditions",
            });
        };
        let conditions = parse_conditions(id, block);

        let Some(fish_json) = json.get("fishIDs").and_then(|v| v.as_array()) else {
            tracing::error!("{}.json has no valid fish array.", id);
            return Err(Error::MissingBlock {
                level: id.to_string(),
                block: "fishIDs",
            });
        };
        let creature_ids: Vec<String> = fish_json
            .iter()
            .filter_map(|v| match v.as_str() {
                Some(s) => Some(s.to_string()),
                None => {
                    tracing::warn!("Ignoring non-string fish id {} in {}", v, id);
                    None
                }
            })
            .collect();

        if conditions.is_empty() {
            tracing::error!("No conditions were loaded for level {{{}}}", id);
            return Err(Error::EmptyBlock {
                level: id.to_string(),
                block: "conditions",
            });
        }
        if creature_ids.is_empty() {
            tracing::error!("No fishes were loaded for level {{{}}}", id);
            return Err(Error::EmptyBlock {
                level: id.to_string(),
                block: "fishIDs",
            });
        }

        Ok(LevelDefinition {
            id: id.to_string(),
            conditions,
            creature_ids,
        })
    }

    /// Only an in-progress attempt is resumed; completed and failed flags
    /// always start over as false on a fresh load. A stored attempt that
    /// already reached the mistake limit comes back failed.
    fn restore_session(&self, id: &str, creature_count: usize) -> LevelSession {
        let persisted = self.persisted(id);
        if !persisted.in_progress {
            return LevelSession::default();
        }

        let mut fish_index = persisted.fish_index;
        if fish_index > creature_count {
            tracing::warn!(
                "Stored fish index {} for {} exceeds its {} creatures, clamping",
                fish_index,
                id,
                creature_count
            );
            fish_index = creature_count;
        }

        let status = persisted.status();
        if status == LevelStatus::Failed {
            tracing::warn!(
                "Stored attempt for {} already has {} mistakes, treating it as failed",
                id,
                persisted.mistakes
            );
        }

        LevelSession {
            status,
            mistakes: persisted.mistakes,
            fish_index,
        }
    }

    // ========================================================================
    // Persisted state
    // ========================================================================

    pub fn is_completed(&self, id: &str) -> bool {
        self.store.get_bool(&key(id, COMPLETED), false)
    }

    pub fn is_failed(&self, id: &str) -> bool {
        self.store.get_bool(&key(id, FAILED), false)
    }

    pub fn is_in_progress(&self, id: &str) -> bool {
        self.store.get_bool(&key(id, IN_PROGRESS), false)
    }

    pub fn get_mistakes(&self, id: &str) -> u32 {
        u32::try_from(self.store.get_int(&key(id, MISTAKES), 0)).unwrap_or(0)
    }

    pub fn get_fish_index(&self, id: &str) -> usize {
        usize::try_from(self.store.get_int(&key(id, FISH_INDEX), 0)).unwrap_or(0)
    }

    pub fn persisted(&self, id: &str) -> PersistedSession {
        PersistedSession {
            completed: self.is_completed(id),
            failed: self.is_failed(id),
            in_progress: self.is_in_progress(id),
            mistakes: self.get_mistakes(id),
            fish_index: self.get_fish_index(id),
        }
    }

    /// Persisted status of a level, for level selection
    pub fn status(&self, id: &str) -> LevelStatus {
        self.persisted(id).status()
    }

    pub fn mark_completed(&mut self, id: &str, mistakes: u32) -> Result<()> {
        self.remove_all(id);
        self.store.put_bool(&key(id, COMPLETED), true);
        self.store.put_int(&key(id, MISTAKES), i64::from(mistakes));
        self.store.flush()?;
        tracing::info!("Marked level {} completed with {} mistakes", id, mistakes);
        Ok(())
    }

    pub fn mark_failed(&mut self, id: &str, mistakes: u32) -> Result<()> {
        self.remove_all(id);
        self.store.put_bool(&key(id, FAILED), true);
        self.store.put_int(&key(id, MISTAKES), i64::from(mistakes));
        self.store.flush()?;
        tracing::info!("Marked level {} failed with {} mistakes", id, mistakes);
        Ok(())
    }

    /// The only write that keeps a level resumable.
    ///
    /// Refuses `mistakes` at or above [`MISTAKE_LIMIT`]; such an attempt
    /// has failed and belongs in [`mark_failed`](Self::mark_failed).
    pub fn save_progress(&mut self, id: &str, mistakes: u32, fish_index: usize) -> Result<()> {
        if mistakes >= MISTAKE_LIMIT {
            return Err(Error::State(format!(
                "cannot save level {} as in progress with {} mistakes",
                id, mistakes
            )));
        }
        self.remove_all(id);
        self.store.put_bool(&key(id, IN_PROGRESS), true);
        self.store.put_int(&key(id, MISTAKES), i64::from(mistakes));
        self.store.put_int(&key(id, FISH_INDEX), fish_index as i64);
        self.store.flush()?;
        tracing::info!(
            "Saved progress for level {}: fish {}, {} mistakes",
            id,
            fish_index,
            mistakes
        );
        Ok(())
    }

    pub fn clear(&mut self, id: &str) -> Result<()> {
        self.remove_all(id);
        self.store.put_int(&key(id, MISTAKES), 0);
        self.store.put_int(&key(id, FISH_INDEX), 0);
        self.store.put_bool(&key(id, FAILED), false);
        self.store.put_bool(&key(id, IN_PROGRESS), false);
        self.store.put_bool(&key(id, COMPLETED), false);
        self.store.flush()?;
        tracing::info!("Cleared level {}", id);
        Ok(())
    }

    /// Persist the active level according to its status.
    ///
    /// Returns the status that was written, or `None` when there is no
    /// active level. A level that was never started writes nothing.
    pub fn finish_active(&mut self) -> Result<Option<LevelStatus>> {
        let Some(level) = self.active.as_ref() else {
            return Ok(None);
        };
        let id = level.id().to_string();
        let session = *level.session();

        match session.status {
            LevelStatus::Completed => self.mark_completed(&id, session.mistakes)?,
            LevelStatus::Failed => self.mark_failed(&id, session.mistakes)?,
            LevelStatus::InProgress => {
                self.save_progress(&id, session.mistakes, session.fish_index)?
            }
            LevelStatus::NotStarted => {
                tracing::debug!("Level {} was not started, nothing to persist", id)
            }
        }
        Ok(Some(session.status))
    }

    fn remove_all(&mut self, id: &str) {
        for field in ALL_FIELDS {
            self.store.remove(&key(id, field));
        }
    }
}
