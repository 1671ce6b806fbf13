//! Plan model: an ordered mapping of narrative units parsed from plan JSON.
//!
//! A plan is a flat JSON object of string keys to string values. Keys of the
//! form `s<i>` name slide units, keys of the form `v<i>` name the transition
//! between slide `i` and slide `i+1`. Any other key is ignored with a warning.

use crate::error::PlanError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// The two disjoint unit families of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitFamily {
    Slide,
    Transition,
}

impl UnitFamily {
    /// Canonical single-letter key prefix for the family.
    pub fn prefix(&self) -> char {
        match self {
            UnitFamily::Slide => 's',
            UnitFamily::Transition => 'v',
        }
    }
}

/// One addressable unit of generation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitKey {
    pub family: UnitFamily,
    pub index: u32,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.index)
    }
}

/// Numeric index following `prefix` in `name`, or `None` when the remainder
/// is empty or not all ASCII digits.
///
/// This is the single ordering rule shared by plan keys and artifact file
/// names; both sides sort by this index, never lexicographically. Malformed
/// suffixes are rejected rather than silently mapped to index 0.
pub fn index_after_prefix(name: &str, prefix: &str) -> Option<u32> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

fn parse_unit_key(key: &str) -> Option<UnitKey> {
    for (family, prefixes) in [
        (UnitFamily::Slide, ["s", "S"]),
        (UnitFamily::Transition, ["v", "V"]),
    ] {
        for prefix in prefixes {
            if let Some(index) = index_after_prefix(key, prefix) {
                return Some(UnitKey { family, index });
            }
        }
    }
    None
}

/// Extract the JSON payload from a model response that may wrap it in a
/// fenced markdown block.
pub fn extract_json_block(response: &str) -> &str {
    if let Some(start) = response.find("```") {
        let after = &response[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }
    response.trim()
}

/// An ordered mapping from unit key to narrative content.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    units: BTreeMap<UnitKey, String>,
}

impl Plan {
    /// Parse a plan from raw JSON.
    ///
    /// Fails when the input is not an object of string values, or when two
    /// keys resolve to the same unit (e.g. `s1` and `S1`).
    pub fn parse(raw: &str) -> Result<Plan, PlanError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| PlanError::Malformed(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(PlanError::Malformed(
                "top-level value is not a JSON object".to_string(),
            ));
        };

        let mut units = BTreeMap::new();
        for (key, value) in map {
            let Value::String(content) = value else {
                return Err(PlanError::Malformed(format!(
                    "value for key '{}' is not a string",
                    key
                )));
            };
            match parse_unit_key(&key) {
                Some(unit) => {
                    if units.insert(unit, content).is_some() {
                        return Err(PlanError::DuplicateUnit { key });
                    }
                }
                None => {
                    warn!(key = %key, "ignoring plan key that is not a unit key");
                }
            }
        }
        Ok(Plan { units })
    }

    /// Unit keys of one family, sorted by numeric index ascending.
    pub fn ordered_keys(&self, family: UnitFamily) -> Vec<UnitKey> {
        self.units
            .keys()
            .filter(|k| k.family == family)
            .copied()
            .collect()
    }

    /// Narrative content for a unit.
    pub fn content(&self, key: &UnitKey) -> Option<&str> {
        self.units.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
