use std::{fs, path::PathBuf};

use nbcheck::notebook::{CellType, Notebook, NotebookError};
use pretty_assertions::assert_eq;
use serde_json::Value;
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("nbcheck-notebooks-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("notebooks")
        .join(name)
}

#[test]
fn fixture_loads_with_both_source_shapes() {
    let nb = Notebook::load(fixture_path("student.ipynb")).expect("load student fixture");

    assert_eq!(nb.cells.len(), 4);
    assert_eq!(nb.cells[0].cell_type, CellType::Markdown);
    assert_eq!(
        nb.cells[0].source,
        vec!["# Week 3: Functions\n".to_string(), "\n".to_string(), "Fill in the cells below.".to_string()]
    );
    assert_eq!(nb.cells[1].source.len(), 3);
    assert_eq!(nb.cells[3].metadata_value("deletable"), Some(&Value::Bool(false)));
}

#[test]
fn saved_notebook_loads_back_identically() {
    let root = temp_root();
    let original = Notebook::load(fixture_path("master.ipynb")).expect("load master fixture");
    let path = root.join("copy.ipynb");

    original.save(&path).expect("write copy");
    let reloaded = Notebook::load(&path).expect("load copy");

    assert_eq!(reloaded, original);
    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).expect("read copy"))
        .expect("copy is JSON");
    assert_eq!(raw["nbformat"], 4);
    assert_eq!(raw["metadata"]["kernelspec"]["name"], "python3");

    let _ = fs::remove_dir_all(root);
}

#[test]
fn save_into_missing_directory_reports_the_path() {
    let root = temp_root();
    let path = root.join("missing").join("copy.ipynb");

    let err = Notebook::from_cells(vec![])
        .save(&path)
        .expect_err("parent directory does not exist");

    assert!(err.to_string().contains("copy.ipynb"));
    let _ = fs::remove_dir_all(root);
}

#[test]
fn missing_file_reports_its_path() {
    let path = temp_root().join("absent.ipynb");

    let err = Notebook::load(&path).expect_err("file does not exist");

    match err {
        NotebookError::Read { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = Notebook::from_json_str("{\"cells\": [").expect_err("truncated document");

    assert!(matches!(err, NotebookError::Parse(_)));
}
