#![forbid(unsafe_code)]

//! Core game logic for Fish Fiesta.
//!
//! This crate provides:
//! - Creature records and habitat features
//! - The condition engine that decides whether a creature fits a level
//! - Levels and their session state machine
//! - Level and creature catalogs backed by JSON data directories
//! - Durable persistence of level progress

pub mod error;
pub mod config;
pub mod logging;
pub mod features;
pub mod creature;
pub mod condition;
pub mod level;
pub mod store;
pub mod catalog;
pub mod levels;

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::Config;
pub use features::{CreatureSize, SizeCategory, WaterSubtype, WaterTemperature, WaterType};
pub use creature::CreatureRecord;
pub use condition::{evaluate, ConditionKind, ConditionMap};
pub use level::{Decision, Level, LevelDefinition, LevelSession, LevelStatus, MISTAKE_LIMIT};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use catalog::CreatureCatalog;
pub use levels::{LevelCatalog, PersistedSession};
