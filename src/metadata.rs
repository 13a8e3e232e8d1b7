#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Running exercise/assignment metadata collected from markdown cells.

use itertools::Itertools;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    constants::{ASSIGNMENT_METADATA, EXERCISE_METADATA},
    notebook::Cell,
};

/// Metadata mapping as stored on cells.
pub type Metadata = Map<String, Value>;

/// The two metadata mappings that persist across cells during one pass.
///
/// Each mapping is replaced wholesale when a markdown cell carries a
/// matching block, and is kept until the next such block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataAccumulator {
    /// Last `# ASSIGNMENT METADATA` block seen.
    assignment: Metadata,
    /// Last `# EXERCISE METADATA` block seen.
    exercise:   Metadata,
}

impl MetadataAccumulator {
    /// Empty accumulator, as at the start of a pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current assignment metadata.
    pub fn assignment(&self) -> &Metadata {
        &self.assignment
    }

    /// Current exercise metadata.
    pub fn exercise(&self) -> &Metadata {
        &self.exercise
    }

    /// Scans a markdown cell for metadata blocks.
    pub fn absorb_cell(&mut self, cell: &Cell) {
        let text = cell
            .source
            .iter()
            .map(|line| line.strip_suffix('\n').unwrap_or(line))
            .join("\n");
        self.absorb(&text);
    }

    /// Scans markdown text for metadata blocks, replacing whichever
    /// accumulator has a block in `text`.
    pub fn absorb(&mut self, text: &str) {
        if let Some(block) = parse_block(&EXERCISE_METADATA, text, "exercise") {
            self.exercise = block;
        }
        if let Some(block) = parse_block(&ASSIGNMENT_METADATA, text, "assignment") {
            self.assignment = block;
        }
    }

    /// Writes exercise then assignment keys into `target`; assignment keys
    /// win on collision.
    pub fn apply_to(&self, target: &mut Metadata) {
        for (k, v) in self.exercise.iter().chain(self.assignment.iter()) {
            target.insert(k.clone(), v.clone());
        }
    }
}

/// Finds the block matched by `pattern` and parses its body.
///
/// Returns `None` when there is no block, or when the body is not a YAML
/// mapping; the latter is logged and leaves the accumulator untouched.
fn parse_block(pattern: &Regex, text: &str, kind: &str) -> Option<Metadata> {
    let body = pattern.captures(text)?.get(1)?.as_str();
    if body.trim().is_empty() {
        return Some(Metadata::new());
    }

    let parsed = serde_yaml::from_str::<serde_yaml::Value>(body)
        .map_err(|e| e.to_string())
        .and_then(|yaml| serde_json::to_value(yaml).map_err(|e| e.to_string()));

    match parsed {
        Ok(Value::Object(map)) => Some(map),
        Ok(Value::Null) => Some(Metadata::new()),
        Ok(other) => {
            tracing::warn!("Ignoring {kind} metadata block that is not a mapping: {other}");
            None
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed {kind} metadata block: {e}\n{body}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_body_becomes_json_values() {
        let mut acc = MetadataAccumulator::new();
        acc.absorb("```\n# EXERCISE METADATA\nexercise_id: ex1\npoints: 3\n```\n");
        assert_eq!(acc.exercise()["exercise_id"], "ex1");
        assert_eq!(acc.exercise()["points"], 3);
        assert!(acc.assignment().is_empty());
    }

    #[test]
    fn malformed_block_keeps_previous_value() {
        let mut acc = MetadataAccumulator::new();
        acc.absorb("```\n# EXERCISE METADATA\nexercise_id: ex1\n```");
        acc.absorb("```\n# EXERCISE METADATA\nexercise_id: [unclosed\n```");
        assert_eq!(acc.exercise()["exercise_id"], "ex1");
        acc.absorb("```\n# EXERCISE METADATA\n- just\n- a list\n```");
        assert_eq!(acc.exercise()["exercise_id"], "ex1");
    }
}
