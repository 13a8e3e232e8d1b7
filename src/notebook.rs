#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Errors raised while reading or writing a notebook document.
#[derive(thiserror::Error, Debug)]
pub enum NotebookError {
    /// The notebook file could not be read.
    #[error("Could not read notebook `{path}`")]
    Read {
        /// Path that was being read.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The notebook file could not be written.
    #[error("Could not write notebook `{path}`")]
    Write {
        /// Path that was being written.
        path:   PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not a notebook we understand.
    #[error("Could not parse notebook JSON")]
    Parse(#[from] serde_json::Error),
}

/// Kind of a notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Prose, may carry metadata annotation blocks.
    Markdown,
    /// Executable code, may carry a magic marker.
    Code,
    /// Unrendered text.
    Raw,
}

/// A single notebook cell.
///
/// Cells are treated as values: producing a changed cell always means
/// building a new one, see [`Cell::with_source`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Markdown or code.
    pub cell_type: CellType,
    /// Source lines, each keeping its line terminator.
    #[serde(deserialize_with = "lines_or_text")]
    pub source:    Vec<String>,
    /// Per-cell metadata; `exercise_id` lives here in student notebooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata:  Option<Map<String, Value>>,
    /// Everything else (`outputs`, `execution_count`, `id`, ...).
    #[serde(flatten)]
    pub extra:     Map<String, Value>,
}

impl Cell {
    /// Creates a cell with the given lines and no metadata.
    pub fn new(cell_type: CellType, source: Vec<String>) -> Self {
        Self {
            cell_type,
            source,
            metadata: None,
            extra: Map::new(),
        }
    }

    /// Returns a copy of this cell with its metadata replaced.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns a copy of this cell carrying `source` instead of its own lines.
    pub fn with_source(&self, source: Vec<String>) -> Self {
        Self {
            source,
            ..self.clone()
        }
    }

    /// True for code cells.
    pub fn is_code(&self) -> bool {
        self.cell_type == CellType::Code
    }

    /// True for markdown cells.
    pub fn is_markdown(&self) -> bool {
        self.cell_type == CellType::Markdown
    }

    /// First source line, if any.
    pub fn first_line(&self) -> Option<&str> {
        self.source.first().map(String::as_str)
    }

    /// Source lines concatenated verbatim.
    pub fn text(&self) -> String {
        self.source.concat()
    }

    /// Looks up a metadata key.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

/// An in-memory notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Cells in document order.
    pub cells: Vec<Cell>,
    /// Top-level fields other than `cells` (`metadata`, `nbformat`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notebook {
    /// Builds a notebook out of cells alone.
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            extra: Map::new(),
        }
    }

    /// Reads and parses an `.ipynb` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NotebookError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| NotebookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Parses a notebook from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, NotebookError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the notebook to its JSON document form.
    pub fn to_json_string(&self) -> Result<String, NotebookError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Writes the notebook to `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NotebookError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?).map_err(|source| NotebookError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Accepts `source` either as a list of lines or as one string.
fn lines_or_text<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    /// The two shapes nbformat allows for multi-line strings.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MultiLine {
        /// Already split.
        Lines(Vec<String>),
        /// One blob of text.
        Text(String),
    }

    Ok(match MultiLine::deserialize(deserializer)? {
        MultiLine::Lines(lines) => lines,
        MultiLine::Text(text) => text.split_inclusive('\n').map(str::to_owned).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_source_is_split_keeping_terminators() {
        let nb = Notebook::from_json_str(
            r#"{"cells": [{"cell_type": "code", "source": "a = 1\nb = 2", "metadata": {}}]}"#,
        )
        .unwrap();
        assert_eq!(nb.cells[0].source, vec!["a = 1\n".to_string(), "b = 2".to_string()]);
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let text = r#"{"cells": [{"cell_type": "code", "source": [], "outputs": [], "execution_count": null}], "nbformat": 4}"#;
        let nb = Notebook::from_json_str(text).unwrap();
        let back: Value = serde_json::from_str(&nb.to_json_string().unwrap()).unwrap();
        assert_eq!(back["nbformat"], 4);
        assert!(back["cells"][0]["outputs"].is_array());
        assert!(back["cells"][0].get("metadata").is_none());
    }
}
