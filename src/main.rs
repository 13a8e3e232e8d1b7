#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # nbcheck
//! ## Introduction
//!
//! Checks that the solutions and sample submissions in a master exercise
//! notebook grade the way their authors expect.
//!
//! ## Usage
//!
//! `nbcheck --master-notebook master.ipynb --student-notebook student.ipynb`
//!
//! The upload endpoint, bearer token and timeout can also come from the
//! `NBCHECK_UPLOAD_URL`, `NBCHECK_TOKEN` and `NBCHECK_TIMEOUT` environment
//! variables or a `.env` file.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use nbcheck::{
    client::HttpGrader,
    config::HarnessConfig,
    constants::{DEFAULT_UPLOAD_URL, TIMEOUT_ENV, TOKEN_ENV, UPLOAD_URL_ENV},
    harness::Harness,
    notebook::Notebook,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Command line options.
#[derive(Debug, Clone)]
struct Options {
    /// Template notebook with one placeholder cell per exercise.
    student_notebook: PathBuf,
    /// Notebook holding the snippets and their checks.
    master_notebook:  PathBuf,
    /// Grading service upload endpoint.
    upload_url:       String,
    /// Bearer token for the grading service.
    token:            Option<String>,
    /// Upload timeout in seconds.
    timeout:          Option<u64>,
    /// Only check `%%solution` snippets.
    solution_only:    bool,
    /// How many times `-v` was given.
    verbose:          usize,
}

/// Parse the command line arguments into `Options`
fn options() -> Options {
    let student_notebook = long("student-notebook")
        .help("Student notebook used as the upload template")
        .argument::<PathBuf>("PATH");

    let master_notebook = long("master-notebook")
        .help("Master notebook with %%solution and %%submission snippets")
        .argument::<PathBuf>("PATH");

    let upload_url = long("upload-url")
        .env(UPLOAD_URL_ENV)
        .help("Grading service upload endpoint")
        .argument::<String>("URL")
        .fallback(DEFAULT_UPLOAD_URL.to_string())
        .display_fallback();

    let token = long("token")
        .env(TOKEN_ENV)
        .help("Bearer token sent with every upload")
        .argument::<String>("TOKEN")
        .optional();

    let timeout = long("timeout")
        .env(TIMEOUT_ENV)
        .help("Upload timeout in seconds; waits indefinitely when unset")
        .argument::<u64>("SECS")
        .optional();

    let solution_only = long("solution-only")
        .help("Only check %%solution snippets")
        .switch();

    let verbose = short('v')
        .long("verbose")
        .help("Log more; repeat for trace output")
        .req_flag(())
        .many()
        .map(|flags| flags.len());

    construct!(Options {
        student_notebook,
        master_notebook,
        upload_url,
        token,
        timeout,
        solution_only,
        verbose,
    })
    .to_options()
    .descr("Checks a master exercise notebook against its autograder")
    .run()
}

fn main() -> Result<()> {
    dotenv().ok();

    let opts = options();

    let level = match opts.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let config = HarnessConfig::builder()
        .upload_url(opts.upload_url)
        .solution_only(opts.solution_only)
        .maybe_token(opts.token)
        .maybe_timeout(opts.timeout.map(Duration::from_secs))
        .build();

    let master = Notebook::load(&opts.master_notebook).with_context(|| {
        format!("Could not load master notebook {}", opts.master_notebook.display())
    })?;
    let student = Notebook::load(&opts.student_notebook).with_context(|| {
        format!("Could not load student notebook {}", opts.student_notebook.display())
    })?;

    let grader = HttpGrader::new(&config)?;
    tracing::info!("Grading against {}", grader.upload_url());

    let summary = Harness::new(grader, config).run(&master, &student)?;
    eprintln!("{}", summary.table());

    if summary.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
