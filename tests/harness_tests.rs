//! End-to-end tests for the validation pass with a scripted grader.

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use anyhow::{Result, bail};
use nbcheck::{
    client::Grader,
    config::HarnessConfig,
    extract::MagicType,
    harness::{Harness, Status},
    notebook::{Cell, CellType, Notebook},
    verdict::Verdict,
};
use serde_json::{Value, json};

/// Grader that answers from a closure and records what it was sent.
struct ScriptedGrader {
    respond: Box<dyn Fn(&Notebook, &str) -> Result<Value>>,
    calls:   Rc<RefCell<Vec<String>>>,
}

impl Grader for ScriptedGrader {
    fn submit(&self, notebook: &Notebook, exercise_id: &str) -> Result<Verdict> {
        self.calls.borrow_mut().push(exercise_id.to_string());
        let body = (self.respond)(notebook, exercise_id)?;
        Ok(Verdict::from_json_str(&body.to_string())?)
    }
}

fn scripted(
    respond: impl Fn(&Notebook, &str) -> Result<Value> + 'static,
) -> (ScriptedGrader, Rc<RefCell<Vec<String>>>) {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let grader = ScriptedGrader {
        respond: Box::new(respond),
        calls:   Rc::clone(&calls),
    };
    (grader, calls)
}

fn fixture(name: &str) -> Notebook {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("notebooks")
        .join(name);
    Notebook::load(path).expect("load fixture notebook")
}

fn lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_owned).collect()
}

fn code(text: &str) -> Cell {
    Cell::new(CellType::Code, lines(text))
}

fn markdown(text: &str) -> Cell {
    Cell::new(CellType::Markdown, lines(text))
}

fn ids_md(exercise: &str) -> Cell {
    markdown(&format!(
        "```\n# ASSIGNMENT METADATA\nassignment_id: a1\n```\n```\n# EXERCISE METADATA\nexercise_id: {exercise}\n```\n"
    ))
}

fn record(exercise: &str, autotest: &str, passed: bool, log: &str) -> Value {
    json!({ exercise: { "results": { autotest: { "passed": passed } }, "logs": { autotest: log } } })
}

/// Passes unless the uploaded notebook still contains the broken `add`.
fn fixture_grader(notebook: &Notebook, exercise_id: &str) -> Result<Value> {
    Ok(match exercise_id {
        "add" => {
            let broken = notebook.cells.iter().any(|c| c.text().contains("a - b"));
            if broken {
                record("add", "test_add", false, "add(1, 2) returned -1")
            } else {
                record("add", "test_add", true, "ok")
            }
        }
        other => record(other, "test_main", true, "ok"),
    })
}

#[test]
fn fixture_notebooks_validate_cleanly() {
    let (grader, calls) = scripted(fixture_grader);
    let harness = Harness::new(grader, HarnessConfig::default());

    let summary = harness
        .run(&fixture("master.ipynb"), &fixture("student.ipynb"))
        .expect("run completes");

    assert_eq!(*calls.borrow(), vec!["add", "add", "greet"]);
    let rows: Vec<(String, MagicType, String, Status)> = summary
        .outcomes()
        .iter()
        .map(|o| (o.exercise_id.clone(), o.kind, o.autotest.clone(), o.status))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("add".to_string(), MagicType::Solution, "test_add".to_string(), Status::Passed),
            ("add".to_string(), MagicType::Submission, "test_add".to_string(), Status::Passed),
            ("greet".to_string(), MagicType::Solution, "test_main".to_string(), Status::Passed),
        ]
    );
    assert!(!summary.has_failures());
}

#[test]
fn failed_solution_is_recorded_and_the_run_continues() {
    let master = Notebook::from_cells(vec![
        ids_md("ex1"),
        code("%%solution\nx = 1\n"),
        ids_md("ex2"),
        code("%%solution\nx = 2\n"),
    ]);
    let (grader, calls) = scripted(|_, id| {
        Ok(if id == "ex1" {
            record(id, "t", false, "expected 2")
        } else {
            record(id, "t", true, "ok")
        })
    });

    let summary = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect("solution failures are not fatal");

    assert_eq!(calls.borrow().len(), 2);
    assert!(summary.has_failures());
    assert_eq!(summary.count(Status::Failed), 1);
    assert_eq!(summary.outcomes()[0].detail, "expected 2");
    assert_eq!(summary.count(Status::Passed), 1);
}

#[test]
fn raising_submission_check_ends_the_run() {
    let master = Notebook::from_cells(vec![
        ids_md("ex1"),
        code("%%submission\nx = 2\n"),
        code("res, logs = %autotest check1\nassert res.results['passed'], logs\n"),
        code("%%solution\nx = 1\n"),
    ]);
    let (grader, calls) = scripted(|_, id| Ok(record(id, "check1", false, "nope")));

    let err = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect_err("assertion in check code is fatal");

    assert!(format!("{err:#}").contains("AssertionError: nope"));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn passing_submission_check_is_recorded() {
    let master = Notebook::from_cells(vec![
        ids_md("ex1"),
        code("%%submission\nx = 2\n"),
        code("res, logs = %autotest check1\nassert res.results['passed']\n"),
    ]);
    let (grader, _calls) = scripted(|_, id| Ok(record(id, "check1", true, "ok")));

    let summary = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect("run completes");

    assert_eq!(summary.outcomes().len(), 1);
    assert_eq!(summary.outcomes()[0].autotest, "check1");
    assert_eq!(summary.outcomes()[0].status, Status::Passed);
}

#[test]
fn solution_only_skips_submissions_before_upload() {
    let (grader, calls) = scripted(fixture_grader);
    let config = HarnessConfig::builder().solution_only(true).build();

    let summary = Harness::new(grader, config)
        .run(&fixture("master.ipynb"), &fixture("student.ipynb"))
        .expect("run completes");

    assert_eq!(*calls.borrow(), vec!["add", "greet"]);
    assert_eq!(summary.count(Status::Skipped), 1);
}

#[test]
fn snippets_missing_ids_are_skipped_without_upload() {
    let master = Notebook::from_cells(vec![
        code("%%solution\nx = 1\n"),
        markdown("```\n# EXERCISE METADATA\nexercise_id: ex1\n```\n"),
        code("%%solution\nx = 1\n"),
    ]);
    let (grader, calls) = scripted(|_, id| Ok(record(id, "t", true, "ok")));

    let summary = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect("run completes");

    assert!(calls.borrow().is_empty());
    let details: Vec<&str> = summary.outcomes().iter().map(|o| o.detail.as_str()).collect();
    assert_eq!(details, vec!["missing exercise_id", "missing assignment_id"]);
    assert_eq!(summary.outcomes()[0].exercise_id, "-");
}

#[test]
fn exercise_missing_from_response_is_skipped() {
    let master = Notebook::from_cells(vec![ids_md("ex1"), code("%%solution\nx = 1\n")]);
    let (grader, _calls) = scripted(|_, _| Ok(record("other", "t", true, "ok")));

    let summary = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect("run completes");

    assert_eq!(summary.count(Status::Skipped), 1);
    assert!(!summary.has_failures());
}

#[test]
fn solution_record_without_results_is_not_a_pass() {
    let master = Notebook::from_cells(vec![
        ids_md("ex1"),
        code("%%solution\nx = 1\n"),
        ids_md("ex2"),
        code("%%solution\nx = 2\n"),
    ]);
    let (grader, calls) = scripted(|_, id| {
        Ok(if id == "ex1" {
            json!({ "ex1": {} })
        } else {
            json!({ "ex2": { "results": {}, "logs": {} } })
        })
    });

    let summary = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect("run completes");

    assert_eq!(calls.borrow().len(), 2);
    assert_eq!(summary.count(Status::Skipped), 2);
    assert_eq!(summary.count(Status::Passed), 0);
    assert!(summary.outcomes()[0].detail.starts_with("malformed result"));
    assert_eq!(summary.outcomes()[1].detail, "no autotest results");
}

#[test]
fn grader_errors_are_fatal() {
    let master = Notebook::from_cells(vec![
        ids_md("ex1"),
        code("%%solution\nx = 1\n"),
        code("%%solution\nx = 2\n"),
    ]);
    let (grader, calls) = scripted(|_, _| bail!("response is not JSON"));

    let err = Harness::new(grader, HarnessConfig::default())
        .run(&master, &Notebook::from_cells(vec![]))
        .expect_err("grader failure ends the run");

    assert!(err.to_string().contains("response is not JSON"));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn summary_table_lists_outcomes() {
    let (grader, _calls) = scripted(fixture_grader);

    let summary = Harness::new(grader, HarnessConfig::default())
        .run(&fixture("master.ipynb"), &fixture("student.ipynb"))
        .expect("run completes");
    let table = summary.table();

    assert!(table.contains("Exercise"));
    assert!(table.contains("test_add"));
    assert!(table.contains("3 passed, 0 failed, 0 skipped"));
}
