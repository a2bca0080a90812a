//! Creature records and their journal text.

use crate::features::{
    parse_feature_list, CreatureSize, Feature, WaterSubtype, WaterTemperature, WaterType,
};
use serde::Serialize;
use serde_json::Value;

/// Everything known about one water creature
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreatureRecord {
    pub name: String,
    pub description: String,
    pub notable_features: String,
    pub size: CreatureSize,
    pub water_types: Vec<WaterType>,
    pub water_subtypes: Vec<WaterSubtype>,
    pub water_temperatures: Vec<WaterTemperature>,
}

impl CreatureRecord {
    /// Build a record from a creature file's JSON.
    ///
    /// Missing keys fall back to empty values with a warning; unknown
    /// habitat tokens are dropped.
    pub fn from_json(id: &str, json: &Value) -> Self {
        Self {
            name: name_from_id(id),
            description: string_value(json, "description"),
            notable_features: string_value(json, "notableFeatures"),
            size: CreatureSize::new(int_value(json, "minSize"), int_value(json, "maxSize")),
            water_types: parse_feature_list(&string_list(json, "waterTypes")),
            water_subtypes: parse_feature_list(&string_list(json, "waterSubtypes")),
            water_temperatures: parse_feature_list(&string_list(json, "waterTemperatures")),
        }
    }

    /// Identifier derived from the display name
    pub fn id(&self) -> String {
        id_from_name(&self.name)
    }

    /// Prose summary of the creature for the journal
    pub fn journal_description(&self) -> String {
        let mut buffer = String::new();
        buffer.push_str(&self.description);
        buffer.push(' ');

        self.append_size(&mut buffer);
        self.append_habitat(&mut buffer);
        self.append_temperature(&mut buffer);

        buffer
    }

    fn append_size(&self, buffer: &mut String) {
        if !self.size.is_valid() {
            return;
        }

        let word = self.size.category().descriptive_word();
        if self.size.range_start() == self.size.range_end() {
            buffer.push_str(&format!(
                "It's around {} cm large, making it a {} fish. ",
                self.size.range_start(),
                word
            ));
        } else {
            buffer.push_str(&format!(
                "Its size ranges from {} cm to {} cm, making it a {} fish. ",
                self.size.range_start(),
                self.size.range_end(),
                word
            ));
        }
    }

    fn append_habitat(&self, buffer: &mut String) {
        if self.water_types.is_empty() {
            return;
        }

        buffer.push_str(&format!(
            "The {} can be found in ",
            self.name.to_lowercase()
        ));
        match self.water_types.as_slice() {
            [only] => buffer.push_str(&format!("{} water ", only.token().to_lowercase())),
            _ => buffer.push_str("both fresh and salt water "),
        }

        if self.water_subtypes.is_empty() {
            return;
        }

        let phrases: Vec<&str> = self
            .water_subtypes
            .iter()
            .map(|subtype| subtype.habitat_phrase())
            .collect();
        buffer.push_str("and it typically inhabits ");
        buffer.push_str(&join_with_and(&phrases));
        buffer.push_str(". ");
    }

    fn append_temperature(&self, buffer: &mut String) {
        if self.water_temperatures.is_empty() {
            return;
        }

        buffer.push_str("In addition this fish ");
        if self.water_temperatures.len() == WaterTemperature::ALL.len() {
            buffer.push_str("enjoys any type of water temperature. ");
        } else {
            let names: Vec<String> = self
                .water_temperatures
                .iter()
                .map(|t| t.token().to_lowercase())
                .collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            buffer.push_str(&format!(
                "prefers {} water temperatures. ",
                join_with_and(&names)
            ));
        }
    }
}

/// `great_white_shark` -> `Great White Shark`
pub fn name_from_id(id: &str) -> String {
    id.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Great White Shark` -> `great_white_shark`
pub fn id_from_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// "a", "a and b", "a, b and c"
fn join_with_and(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

// ============================================================================
// Tolerant JSON accessors
// ============================================================================

fn string_value(json: &Value, key: &str) -> String {
    match json.get(key) {
        None => {
            tracing::warn!("No value \"{}\" was found in json", key);
            String::new()
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            tracing::error!("Json value for {} is not a string: {}", key, other);
            String::new()
        }
    }
}

fn int_value(json: &Value, key: &str) -> u32 {
    match json.get(key) {
        None => {
            tracing::warn!("No value \"{}\" was found in json", key);
            0
        }
        Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => n,
            None => {
                tracing::error!("Json value for {} is not a size in cm: {}", key, value);
                0
            }
        },
    }
}

fn string_list(json: &Value, key: &str) -> Vec<String> {
    match json.get(key) {
        None => {
            tracing::warn!("No value \"{}\" was found in json", key);
            Vec::new()
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => {
                    tracing::warn!("Ignoring non-string entry {} in {}", other, key);
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracing::error!("Json value for {} is not an array: {}", key, other);
            Vec::new()
        }
    }
}
