#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Single forward pass over a master notebook yielding solution and
//! submission snippets.

use std::{fmt, slice};

use serde_json::Value;

use crate::{
    constants::{ASSIGNMENT_ID_KEY, EXERCISE_ID_KEY, MAGIC},
    metadata::{Metadata, MetadataAccumulator},
    notebook::{Cell, Notebook},
};

/// Which magic marker started a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicType {
    /// `%%solution`: canonical answer, every autotest must pass.
    Solution,
    /// `%%submission`: student-style answer checked by the following cell.
    Submission,
}

impl MagicType {
    /// Parses the captured marker name.
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "solution" => Some(Self::Solution),
            "submission" => Some(Self::Submission),
            _ => None,
        }
    }
}

impl fmt::Display for MagicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MagicType::Solution => write!(f, "solution"),
            MagicType::Submission => write!(f, "submission"),
        }
    }
}

/// A solution or submission cell with merged metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet<'nb> {
    /// Copy of the snippet cell, metadata merged in.
    pub cell:       Cell,
    /// Marker that started it.
    pub magic_type: MagicType,
    /// The code cell right after a submission; borrowed from the notebook.
    pub next_cell:  Option<&'nb Cell>,
}

impl Snippet<'_> {
    /// Merged metadata of the snippet.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.cell.metadata.as_ref()
    }

    /// `exercise_id` from merged metadata, if present and not null.
    pub fn exercise_id(&self) -> Option<&Value> {
        self.cell
            .metadata_value(EXERCISE_ID_KEY)
            .filter(|v| !v.is_null())
    }

    /// `assignment_id` from merged metadata, if present and not null.
    pub fn assignment_id(&self) -> Option<&Value> {
        self.cell
            .metadata_value(ASSIGNMENT_ID_KEY)
            .filter(|v| !v.is_null())
    }

    /// Literal snippet source, marker line included.
    pub fn source_text(&self) -> String {
        self.cell.text()
    }
}

/// State carried between cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanState<'nb> {
    /// Nothing pending.
    #[default]
    Idle,
    /// A submission waiting for its check cell.
    AwaitingCheck(Snippet<'nb>),
}

/// Iterator over the snippets of one notebook.
///
/// Transitions, per cell:
///
/// | state           | cell                 | effect                              |
/// |-----------------|----------------------|-------------------------------------|
/// | any             | markdown             | absorb metadata, go `Idle`          |
/// | `AwaitingCheck` | code (any content)   | yield with `next_cell`, go `Idle`   |
/// | `Idle`          | code, `%%solution`   | yield, stay `Idle`                  |
/// | `Idle`          | code, `%%submission` | go `AwaitingCheck`                  |
/// | any             | anything else        | go `Idle`                           |
///
/// A markdown cell between a submission and its check drops the submission,
/// and a magic cell right after a submission is consumed as its check.
pub struct Extractor<'nb> {
    /// Remaining cells.
    cells:    slice::Iter<'nb, Cell>,
    /// Current state.
    state:    ScanState<'nb>,
    /// Metadata seen so far in this pass.
    metadata: MetadataAccumulator,
}

impl<'nb> Extractor<'nb> {
    /// Starts a fresh pass over `notebook` with empty metadata.
    pub fn new(notebook: &'nb Notebook) -> Self {
        Self {
            cells:    notebook.cells.iter(),
            state:    ScanState::Idle,
            metadata: MetadataAccumulator::new(),
        }
    }

    /// Current state, mostly useful in tests.
    pub fn state(&self) -> &ScanState<'nb> {
        &self.state
    }

    /// Metadata accumulated so far.
    pub fn metadata(&self) -> &MetadataAccumulator {
        &self.metadata
    }

    /// Feeds one cell and returns the snippet it completes, if any.
    pub fn step(&mut self, cell: &'nb Cell) -> Option<Snippet<'nb>> {
        if cell.is_markdown() {
            self.metadata.absorb_cell(cell);
        }

        let dropped = match std::mem::take(&mut self.state) {
            ScanState::AwaitingCheck(mut pending) if cell.is_code() => {
                pending.next_cell = Some(cell);
                return Some(pending);
            }
            ScanState::AwaitingCheck(pending) => Some(pending),
            ScanState::Idle => None,
        };

        let magic = cell
            .is_code()
            .then(|| cell.first_line())
            .flatten()
            .and_then(|line| MAGIC.captures(line))
            .and_then(|caps| caps.get(1))
            .and_then(|m| MagicType::from_marker(m.as_str()));

        match magic {
            Some(magic_type) => {
                let target = self.target(cell, magic_type);
                match magic_type {
                    MagicType::Solution => Some(target),
                    MagicType::Submission => {
                        self.state = ScanState::AwaitingCheck(target);
                        None
                    }
                }
            }
            None => {
                if let Some(dropped) = dropped {
                    tracing::debug!(
                        "Dropping submission snippet without an adjacent check cell: {:?}",
                        dropped.cell.first_line()
                    );
                }
                None
            }
        }
    }

    /// Copies `cell` and merges the running metadata into it.
    fn target(&self, cell: &Cell, magic_type: MagicType) -> Snippet<'nb> {
        let mut metadata = cell.metadata.clone().unwrap_or_default();
        self.metadata.apply_to(&mut metadata);
        Snippet {
            cell: cell.clone().with_metadata(metadata),
            magic_type,
            next_cell: None,
        }
    }
}

impl<'nb> Iterator for Extractor<'nb> {
    type Item = Snippet<'nb>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cell = self.cells.next()?;
            if let Some(snippet) = self.step(cell) {
                return Some(snippet);
            }
        }
    }
}

/// Convenience wrapper around [`Extractor::new`].
pub fn extract_snippets(notebook: &Notebook) -> Extractor<'_> {
    Extractor::new(notebook)
}
