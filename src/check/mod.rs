#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Evaluates a grading verdict against a snippet.
//!
//! Solutions must pass every autotest the service ran. Submissions are
//! checked by running the code of their check cell against a handful of
//! bindings built from the verdict.

/// Syntax tree of check code.
pub mod ast;
/// Interpreter for check code.
pub mod interp;
/// Parser for check code.
pub mod parser;
/// Runtime values and errors of check code.
pub mod value;

use std::collections::BTreeMap;

use itertools::Itertools;

use self::{
    interp::Interpreter,
    parser::parse_program,
    value::{Builtin, RuntimeError, Value},
};
use crate::{
    constants::{AUTOTEST_LINE, AUTOTEST_MARKER, REPORT_NAME, SUBMISSION_SOURCE_NAME},
    extract::Snippet,
    verdict::ExerciseResult,
};

/// Reasons a submission check is skipped without failing the run.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CheckSkip {
    /// The submission had no code cell after it.
    #[error("Submission snippet has no check cell")]
    MissingCheckCell,
    /// The check cell has fewer than two lines.
    #[error("Invalid check snippet: expected at least two lines")]
    CheckCellTooShort,
    /// Zero or several `%autotest` lines.
    #[error("Check snippet must contain exactly one %autotest line, found {0}")]
    AutotestLineCount(usize),
    /// The `%autotest` line is not `result, logs = %autotest name`.
    #[error("invalid %autotest line: {0}")]
    MalformedAutotestLine(String),
    /// The verdict has no result for the autotest.
    #[error("Autotest {0} not found in results")]
    MissingResult(String),
    /// The verdict has no log for the autotest.
    #[error("Autotest {0} not found in logs")]
    MissingLog(String),
}

/// Result of one autotest of a solution.
#[derive(Debug, Clone, PartialEq)]
pub struct AutotestOutcome {
    /// Autotest name.
    pub autotest: String,
    /// Whether the service reported it as passed.
    pub passed:   bool,
    /// Log text returned for the autotest.
    pub log:      Option<String>,
}

/// Result of checking one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The check code ran to completion for this autotest.
    Passed(String),
    /// The check could not be run.
    Skipped(CheckSkip),
}

/// Checks a solution: every autotest in `result` must have passed.
///
/// Failures are logged and returned, never raised.
pub fn check_solution(exercise_id: &str, result: &ExerciseResult) -> Vec<AutotestOutcome> {
    result
        .results
        .iter()
        .map(|(name, autotest)| {
            let passed = ExerciseResult::passed(autotest);
            let log = result.log_text(name);
            if passed {
                tracing::info!("Autotest {name} of exercise {exercise_id} passed");
            } else {
                tracing::error!(
                    "FAIL: Autotest {name} of exercise {exercise_id} failed\n{}",
                    log.as_deref().unwrap_or("<no log>")
                );
            }
            AutotestOutcome {
                autotest: name.clone(),
                passed,
                log,
            }
        })
        .collect()
}

/// Checks a submission by running its check cell.
///
/// Malformed check cells and unknown autotests are reported as a skip.
/// Any error raised by the check code is logged and returned.
pub fn check_submission(
    snippet: &Snippet<'_>,
    exercise_id: &str,
    result: &ExerciseResult,
) -> Result<SubmissionOutcome, RuntimeError> {
    let skip = |reason: CheckSkip| -> Result<SubmissionOutcome, RuntimeError> {
        tracing::error!("Exercise {exercise_id}: {reason}");
        Ok(SubmissionOutcome::Skipped(reason))
    };

    let Some(check_cell) = snippet.next_cell else {
        return skip(CheckSkip::MissingCheckCell);
    };
    let lines: Vec<&str> = check_cell
        .source
        .iter()
        .map(|line| line.trim_end_matches(['\n', '\r']))
        .collect();
    if lines.len() < 2 {
        return skip(CheckSkip::CheckCellTooShort);
    }

    let (autotest_lines, code_lines): (Vec<&str>, Vec<&str>) = lines
        .iter()
        .copied()
        .partition(|line| line.contains(AUTOTEST_MARKER));
    let [autotest_line] = autotest_lines.as_slice() else {
        return skip(CheckSkip::AutotestLineCount(autotest_lines.len()));
    };
    let Some(captures) = AUTOTEST_LINE.captures(autotest_line) else {
        return skip(CheckSkip::MalformedAutotestLine(autotest_line.trim().to_string()));
    };
    let result_var = &captures[1];
    let logs_var = &captures[2];
    let autotest = &captures[3];

    let Some(autotest_result) = result.results.get(autotest) else {
        return skip(CheckSkip::MissingResult(autotest.to_string()));
    };
    let Some(autotest_log) = result.logs.get(autotest) else {
        return skip(CheckSkip::MissingLog(autotest.to_string()));
    };

    // Later bindings win when the annotation reuses a name.
    let mut bindings = BTreeMap::new();
    bindings.insert(
        result_var.to_string(),
        Value::object([("results", Value::from(autotest_result.clone()))]),
    );
    bindings.insert(logs_var.to_string(), Value::from(autotest_log.clone()));
    if !autotest.is_empty() {
        bindings.insert(autotest.to_string(), Value::None);
    }
    bindings.insert(
        SUBMISSION_SOURCE_NAME.to_string(),
        Value::object([("source", Value::Str(snippet.source_text()))]),
    );
    bindings.insert(REPORT_NAME.to_string(), Value::Builtin(Builtin::Report));

    let code = code_lines.iter().join("\n");
    tracing::trace!("==== Check code for autotest {autotest} ====\n{code}\n");
    tracing::trace!(
        "Bindings: {}",
        bindings
            .iter()
            .map(|(name, value)| format!("{name}={}", value.repr()))
            .join(", ")
    );

    let outcome = parse_program(&code).and_then(|program| Interpreter::new(bindings).run(&program));
    match outcome {
        Ok(()) => {
            tracing::info!("Check for autotest {autotest} of exercise {exercise_id} passed");
            Ok(SubmissionOutcome::Passed(autotest.to_string()))
        }
        Err(e) => {
            tracing::error!(
                "Check for autotest {autotest} of exercise {exercise_id} raised {e}\nCheck code:\n{code}"
            );
            Err(e)
        }
    }
}
