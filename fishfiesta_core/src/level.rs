//! Levels: a static rule set plus the player's progress through it.
//!
//! A [`Level`] pairs an immutable [`LevelDefinition`] (conditions and the
//! creature order, re-read from disk on every load) with a mutable
//! [`LevelSession`] that tracks how far the player got and how many
//! mistakes they made.
//!
//! Session state machine:
//!
//! ```text
//! NotStarted -> InProgress -> Completed
//!                          \-> Failed
//! ```
//!
//! `fish_index` and `mistakes` only ever grow within a session. Terminal
//! states are only left through a fresh load after the catalog clears or
//! overwrites the persisted state.

use crate::condition::{self, ConditionMap};
use crate::creature::CreatureRecord;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Mistakes that end an attempt
pub const MISTAKE_LIMIT: u32 = 3;

/// Where a level's session currently stands
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl LevelStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LevelStatus::Completed | LevelStatus::Failed)
    }
}

/// Static rules of a level
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDefinition {
    pub id: String,
    pub conditions: ConditionMap,
    pub creature_ids: Vec<String>,
}

impl LevelDefinition {
    /// Whether a creature satisfies every condition of this level
    pub fn meets_conditions(&self, creature: &CreatureRecord) -> Result<bool> {
        condition::meets_all(&self.conditions, creature)
    }
}

/// Mutable progress of one attempt at a level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LevelSession {
    pub status: LevelStatus,
    pub mistakes: u32,
    pub fish_index: usize,
}

/// Outcome of a single accept/deny decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    /// Whether the creature actually met the level's conditions
    pub matches: bool,
    /// Whether the player's call agreed with `matches`
    pub correct: bool,
    pub mistakes: u32,
    pub fish_index: usize,
    pub status: LevelStatus,
}

/// A loaded level: definition plus session
#[derive(Clone, Debug)]
pub struct Level {
    definition: LevelDefinition,
    session: LevelSession,
}

impl Level {
    pub fn new(definition: LevelDefinition, session: LevelSession) -> Self {
        Self {
            definition,
            session,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn definition(&self) -> &LevelDefinition {
        &self.definition
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    pub fn conditions(&self) -> &ConditionMap {
        &self.definition.conditions
    }

    pub fn creature_ids(&self) -> &[String] {
        &self.definition.creature_ids
    }

    pub fn status(&self) -> LevelStatus {
        self.session.status
    }

    pub fn mistakes(&self) -> u32 {
        self.session.mistakes
    }

    pub fn fish_index(&self) -> usize {
        self.session.fish_index
    }

    pub fn is_completed(&self) -> bool {
        self.session.status == LevelStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.session.status == LevelStatus::Failed
    }

    pub fn is_in_progress(&self) -> bool {
        self.session.status == LevelStatus::InProgress
    }

    /// Id of the creature the player has to judge next
    pub fn current_creature_id(&self) -> Option<&str> {
        self.definition
            .creature_ids
            .get(self.session.fish_index)
            .map(String::as_str)
    }

    pub fn meets_conditions(&self, creature: &CreatureRecord) -> Result<bool> {
        self.definition.meets_conditions(creature)
    }

    /// Mark the level as begun. No-op unless it has not started yet.
    pub fn start(&mut self) {
        if self.session.status == LevelStatus::NotStarted {
            self.session.status = LevelStatus::InProgress;
            tracing::debug!("Started level {}", self.definition.id);
        }
    }

    /// Apply the player's accept/deny call for `creature`.
    ///
    /// A wrong call costs a mistake; reaching [`MISTAKE_LIMIT`] fails the
    /// level without advancing. Otherwise the level moves on to the next
    /// creature. Completion is checked separately via
    /// [`check_completion`](Self::check_completion).
    pub fn record_decision(&mut self, creature: &CreatureRecord, accepted: bool) -> Result<Decision> {
        if self.session.status.is_terminal() {
            return Err(Error::State(format!(
                "level {} is already {:?}",
                self.definition.id, self.session.status
            )));
        }
        if self.session.fish_index >= self.definition.creature_ids.len() {
            return Err(Error::State(format!(
                "level {} has no creature left to judge",
                self.definition.id
            )));
        }

        let matches = self.meets_conditions(creature)?;
        self.start();

        let correct = accepted == matches;
        if correct {
            tracing::info!(
                "{} {}: {} the level conditions. Correct!",
                if accepted { "Accepted" } else { "Declined" },
                creature.name,
                if matches { "matches" } else { "doesn't match" }
            );
        } else {
            self.session.mistakes += 1;
            tracing::info!(
                "{} {}: {} the level conditions. Wrong! ({} mistakes)",
                if accepted { "Accepted" } else { "Declined" },
                creature.name,
                if matches { "matches" } else { "doesn't match" },
                self.session.mistakes
            );
        }

        if !correct && self.session.mistakes >= MISTAKE_LIMIT {
            self.session.status = LevelStatus::Failed;
            tracing::info!("Level {} failed", self.definition.id);
        } else {
            self.session.fish_index += 1;
        }

        Ok(Decision {
            matches,
            correct,
            mistakes: self.session.mistakes,
            fish_index: self.session.fish_index,
            status: self.session.status,
        })
    }

    /// Complete the level once every creature has been judged with fewer
    /// than [`MISTAKE_LIMIT`] mistakes. Returns the resulting status.
    pub fn check_completion(&mut self) -> LevelStatus {
        if !self.session.status.is_terminal()
            && self.session.fish_index == self.definition.creature_ids.len()
            && self.session.mistakes < MISTAKE_LIMIT
        {
            self.session.status = LevelStatus::Completed;
            tracing::info!(
                "Level {} completed with {} mistakes",
                self.definition.id,
                self.session.mistakes
            );
        }
        self.session.status
    }
}
