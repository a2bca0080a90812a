//! Habitat conditions a level imposes on creatures.
//!
//! A level maps each [`ConditionKind`] it cares about to a list of accepted
//! uppercase tokens. A creature satisfies a kind when any accepted token
//! matches; a level is satisfied when every kind it lists is.

use crate::creature::CreatureRecord;
use crate::features::{Feature, SizeCategory, WaterSubtype, WaterTemperature, WaterType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Accepted values per condition kind, ordered by kind
pub type ConditionMap = BTreeMap<ConditionKind, Vec<String>>;

/// One axis of habitat requirement
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    WaterType,
    WaterSubtype,
    Size,
    Temperature,
}

impl ConditionKind {
    pub const ALL: [ConditionKind; 4] = [
        ConditionKind::WaterType,
        ConditionKind::WaterSubtype,
        ConditionKind::Size,
        ConditionKind::Temperature,
    ];

    /// Key of this kind inside a level's `conditions` block
    pub fn json_name(self) -> &'static str {
        match self {
            ConditionKind::WaterType => "water_type",
            ConditionKind::WaterSubtype => "water_subtype",
            ConditionKind::Size => "size",
            ConditionKind::Temperature => "temperature",
        }
    }

    /// Whether a level may list this kind as an array of accepted values
    pub fn allows_multiple_accepted_sets(self) -> bool {
        matches!(self, ConditionKind::Size)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}

/// Parse a level's raw `conditions` object.
///
/// Kinds that are absent impose no constraint and are left out. A kind that
/// only takes a single value but is written as an array is an authoring
/// error: it is logged and left out as well.
pub fn parse_conditions(level_id: &str, block: &Value) -> ConditionMap {
    let mut conditions = ConditionMap::new();

    for kind in ConditionKind::ALL {
        let Some(raw) = block.get(kind.json_name()) else {
            tracing::warn!("Condition type {} not found in {} JSON", kind, level_id);
            continue;
        };

        let values: Vec<String> = match raw {
            Value::Array(items) if kind.allows_multiple_accepted_sets() => items
                .iter()
                .filter_map(|item| match item.as_str() {
                    Some(s) => Some(s.to_uppercase()),
                    None => {
                        tracing::warn!("Ignoring non-string {} value {} in {}", kind, item, level_id);
                        None
                    }
                })
                .collect(),
            Value::Array(_) => {
                tracing::error!(
                    "Condition {} in {} should not be an array. Skipping condition",
                    kind,
                    level_id
                );
                continue;
            }
            Value::String(s) => vec![s.to_uppercase()],
            other => {
                tracing::error!(
                    "Condition {} in {} has unsupported value {}. Skipping condition",
                    kind,
                    level_id,
                    other
                );
                continue;
            }
        };

        if values.is_empty() {
            tracing::warn!("Condition {} in {} lists no values", kind, level_id);
            continue;
        }

        tracing::debug!("Parsed condition: {} = {:?}", kind, values);
        conditions.insert(kind, values);
    }

    conditions
}

/// Check one condition kind against a creature.
///
/// Any accepted token matching the creature is enough. A token that is not
/// a member of the kind's enum is an error rather than a non-match.
pub fn evaluate(kind: ConditionKind, creature: &CreatureRecord, accepted: &[String]) -> Result<bool> {
    let satisfied = match kind {
        ConditionKind::WaterType => {
            let wanted: Vec<WaterType> = parse_strict(kind, accepted)?;
            wanted.iter().any(|t| creature.water_types.contains(t))
        }
        ConditionKind::WaterSubtype => {
            let wanted: Vec<WaterSubtype> = parse_strict(kind, accepted)?;
            wanted.iter().any(|s| creature.water_subtypes.contains(s))
        }
        ConditionKind::Size => {
            let wanted: Vec<SizeCategory> = parse_strict(kind, accepted)?;
            let category = creature.size.category();
            wanted.contains(&category)
        }
        ConditionKind::Temperature => {
            let wanted: Vec<WaterTemperature> = parse_strict(kind, accepted)?;
            wanted.iter().any(|t| creature.water_temperatures.contains(t))
        }
    };

    tracing::debug!(
        "{} {} condition {} {:?}",
        creature.name,
        if satisfied { "meets" } else { "fails" },
        kind,
        accepted
    );
    Ok(satisfied)
}

/// Check a creature against every condition in the map
pub fn meets_all(conditions: &ConditionMap, creature: &CreatureRecord) -> Result<bool> {
    for (kind, accepted) in conditions {
        if !evaluate(*kind, creature, accepted)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn parse_strict<T: Feature>(kind: ConditionKind, accepted: &[String]) -> Result<Vec<T>> {
    accepted
        .iter()
        .map(|token| {
            T::from_token(token).ok_or_else(|| Error::InvalidConditionValue {
                kind,
                value: token.clone(),
            })
        })
        .collect()
}
