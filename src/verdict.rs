#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::check::value::Value as CheckValue;

/// The grading service's response: one result record per exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verdict(Map<String, Value>);

impl Verdict {
    /// Parses a response body. Anything other than a JSON object is an
    /// error.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Exercise ids present in the verdict.
    pub fn exercise_ids(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Result record for `exercise_id`.
    ///
    /// `None` when the exercise is absent; `Some(Err(_))` when the entry is
    /// not shaped like a result record.
    pub fn exercise(&self, exercise_id: &str) -> Option<Result<ExerciseResult, serde_json::Error>> {
        self.0
            .get(exercise_id)
            .map(|raw| ExerciseResult::deserialize(raw))
    }
}

impl From<Map<String, Value>> for Verdict {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// Per-exercise results and logs, keyed by autotest name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResult {
    /// Autotest name to result object (`{"passed": bool, ...}`).
    pub results: BTreeMap<String, Value>,
    /// Autotest name to log text.
    #[serde(default)]
    pub logs:    BTreeMap<String, Value>,
}

impl ExerciseResult {
    /// Whether the result object's `passed` field is truthy, by the same
    /// rules check code uses.
    pub fn passed(result: &Value) -> bool {
        result
            .get("passed")
            .is_some_and(|passed| CheckValue::from(passed.clone()).truthy())
    }

    /// Log text for an autotest; non-string logs are rendered as JSON.
    pub fn log_text(&self, autotest: &str) -> Option<String> {
        self.logs.get(autotest).map(|log| match log {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
