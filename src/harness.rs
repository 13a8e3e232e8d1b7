#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Drives one validation pass over a master notebook.

use std::fmt::{self, Display};

use anyhow::{Context, Result};
use bon::Builder;
use colored::Colorize;
use serde_json::Value;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{
    check::{SubmissionOutcome, check_solution, check_submission},
    client::Grader,
    config::HarnessConfig,
    extract::{MagicType, Snippet, extract_snippets},
    notebook::Notebook,
    synthesize::synthesize_submission,
};

/// How one autotest (or one skipped snippet) turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The autotest passed, or the check code ran to completion.
    Passed,
    /// The grading service reported the autotest as failed.
    Failed,
    /// The snippet or check could not be evaluated.
    Skipped,
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Passed => write!(f, "{}", "PASS".green()),
            Status::Failed => write!(f, "{}", "FAIL".red().bold()),
            Status::Skipped => write!(f, "{}", "SKIP".yellow()),
        }
    }
}

#[derive(Tabled, Debug, Clone, PartialEq, Builder)]
#[builder(on(String, into))]
/// A row of the run summary
pub struct Outcome {
    #[tabled(rename = "Exercise")]
    /// * `exercise_id`: exercise the snippet belongs to, `-` when unknown
    pub exercise_id: String,
    #[tabled(rename = "Kind")]
    /// * `kind`: solution or submission
    pub kind:        MagicType,
    #[tabled(rename = "Autotest")]
    /// * `autotest`: autotest name, empty when the snippet was skipped
    #[builder(default)]
    pub autotest:    String,
    #[tabled(rename = "Status")]
    /// * `status`: outcome
    pub status:      Status,
    #[tabled(rename = "Detail")]
    /// * `detail`: skip reason or failure log
    #[builder(default)]
    pub detail:      String,
}

/// Every outcome of one run, in snippet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Recorded outcomes.
    outcomes: Vec<Outcome>,
}

impl RunSummary {
    /// Records an outcome.
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// All recorded outcomes.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Number of outcomes with `status`.
    pub fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Whether any autotest failed. Drives the process exit status.
    pub fn has_failures(&self) -> bool {
        self.count(Status::Failed) > 0
    }

    /// Renders the summary as a table.
    pub fn table(&self) -> String {
        Table::new(&self.outcomes)
            .with(Panel::header("Notebook Check Overview"))
            .with(Panel::footer(format!(
                "{} passed, {} failed, {} skipped",
                self.count(Status::Passed),
                self.count(Status::Failed),
                self.count(Status::Skipped)
            )))
            .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
            .with(
                Modify::new(Rows::first())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(
                Modify::new(Rows::last())
                    .with(Alignment::center())
                    .with(Alignment::center_vertical()),
            )
            .with(Style::modern())
            .to_string()
    }
}

/// Renders a metadata id the way it is sent to the grading service.
fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Runs every snippet of a master notebook through the grading service.
pub struct Harness<G: Grader> {
    /// Service the synthesized notebooks are uploaded to.
    grader: G,
    /// Run options.
    config: HarnessConfig,
}

impl<G: Grader> Harness<G> {
    /// Creates a harness.
    pub fn new(grader: G, config: HarnessConfig) -> Self {
        Self { grader, config }
    }

    /// Validates every snippet of `master`, using `student` as the template
    /// for uploads.
    ///
    /// Skips are recorded and the pass continues. Upload failures, responses
    /// that are not JSON, and errors raised by submission check code end the
    /// run.
    pub fn run(&self, master: &Notebook, student: &Notebook) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for snippet in extract_snippets(master) {
            self.process(&snippet, student, &mut summary)?;
        }
        Ok(summary)
    }

    /// Handles one snippet.
    fn process(
        &self,
        snippet: &Snippet<'_>,
        student: &Notebook,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let kind = snippet.magic_type;
        tracing::debug!("==== {kind} snippet ====\n{}", snippet.source_text());

        let Some(exercise_id) = snippet.exercise_id().map(id_text) else {
            tracing::warn!("Snippet does not have an exercise ID, skipping");
            summary.push(
                Outcome::builder()
                    .exercise_id("-")
                    .kind(kind)
                    .status(Status::Skipped)
                    .detail("missing exercise_id")
                    .build(),
            );
            return Ok(());
        };
        let skipped = |detail: String| {
            Outcome::builder()
                .exercise_id(exercise_id.clone())
                .kind(kind)
                .status(Status::Skipped)
                .detail(detail)
                .build()
        };

        if snippet.assignment_id().is_none() {
            tracing::error!("Snippet does not have an assignment ID");
            summary.push(skipped("missing assignment_id".to_string()));
            return Ok(());
        }
        if kind == MagicType::Submission && self.config.solution_only() {
            tracing::debug!("Skipping submission for exercise {exercise_id}");
            summary.push(skipped("solution-only run".to_string()));
            return Ok(());
        }

        let notebook = synthesize_submission(snippet, student)
            .with_context(|| format!("Could not build a submission for exercise {exercise_id}"))?;
        let verdict = self
            .grader
            .submit(&notebook, &exercise_id)
            .inspect_err(|_| tracing::error!("Exercise {exercise_id} failed"))?;

        let result = match verdict.exercise(&exercise_id) {
            None => {
                tracing::error!(
                    "Exercise {exercise_id} not found in the response; available: {}",
                    verdict.exercise_ids().join(", ")
                );
                summary.push(skipped("exercise missing from response".to_string()));
                return Ok(());
            }
            Some(Err(e)) => {
                tracing::error!("Result for exercise {exercise_id} is malformed: {e}");
                summary.push(skipped(format!("malformed result: {e}")));
                return Ok(());
            }
            Some(Ok(result)) => result,
        };

        match kind {
            MagicType::Solution => {
                let outcomes = check_solution(&exercise_id, &result);
                if outcomes.is_empty() {
                    tracing::warn!("Exercise {exercise_id} returned no autotest results");
                    summary.push(skipped("no autotest results".to_string()));
                }
                for outcome in outcomes {
                    summary.push(
                        Outcome::builder()
                            .exercise_id(exercise_id.clone())
                            .kind(kind)
                            .autotest(outcome.autotest)
                            .status(if outcome.passed {
                                Status::Passed
                            } else {
                                Status::Failed
                            })
                            .detail(if outcome.passed {
                                String::new()
                            } else {
                                outcome.log.unwrap_or_default()
                            })
                            .build(),
                    );
                }
            }
            MagicType::Submission => {
                let outcome = check_submission(snippet, &exercise_id, &result).with_context(
                    || format!("Check code for exercise {exercise_id} raised an error"),
                )?;
                match outcome {
                    SubmissionOutcome::Passed(autotest) => {
                        println!("Autotest {autotest} passed.");
                        summary.push(
                            Outcome::builder()
                                .exercise_id(exercise_id.clone())
                                .kind(kind)
                                .autotest(autotest)
                                .status(Status::Passed)
                                .build(),
                        );
                    }
                    SubmissionOutcome::Skipped(reason) => {
                        summary.push(skipped(reason.to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}
