#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::LazyLock;

use regex::Regex;

/// Upload endpoint used when none is configured.
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:8000/upload.txt";

/// Environment variable holding the upload endpoint.
pub const UPLOAD_URL_ENV: &str = "NBCHECK_UPLOAD_URL";

/// Environment variable holding a bearer token for the grading service.
pub const TOKEN_ENV: &str = "NBCHECK_TOKEN";

/// Environment variable holding the upload timeout in seconds.
pub const TIMEOUT_ENV: &str = "NBCHECK_TIMEOUT";

/// Multipart field carrying the notebook document.
pub const NOTEBOOK_FIELD: &str = "notebook";

/// Multipart field carrying the exercise identifier.
pub const EXERCISE_ID_FIELD: &str = "exercise_id";

/// Metadata key identifying an exercise.
pub const EXERCISE_ID_KEY: &str = "exercise_id";

/// Metadata key identifying an assignment.
pub const ASSIGNMENT_ID_KEY: &str = "assignment_id";

/// Marker that identifies the `%autotest` line of a check cell.
pub const AUTOTEST_MARKER: &str = "%autotest";

/// Name bound to the submitted snippet inside check code.
pub const SUBMISSION_SOURCE_NAME: &str = "submission_source";

/// Name bound to the no-op reporting callable inside check code.
pub const REPORT_NAME: &str = "report";

/// Matches a fenced `# ASSIGNMENT METADATA` block and captures its body.
/// * group 1: YAML body
pub static ASSIGNMENT_METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^```[ \t\n]*# ASSIGNMENT METADATA[^\n]*([^`]*)```")
        .expect("assignment metadata pattern is valid")
});

/// Matches a fenced `# EXERCISE METADATA` block and captures its body.
/// * group 1: YAML body
pub static EXERCISE_METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^```[ \t\n]*# EXERCISE METADATA[^\n]*([^`]*)```")
        .expect("exercise metadata pattern is valid")
});

/// Matches the magic marker at the start of a snippet cell.
/// * group 1: `submission` or `solution`
pub static MAGIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^%%(submission|solution)").expect("magic pattern is valid")
});

/// Matches `result, logs = %autotest name` somewhere in a line.
/// * group 1: result variable
/// * group 2: logs variable
/// * group 3: autotest name
pub static AUTOTEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([a-zA-Z_][a-zA-Z0-9_]*),[ \t]*([a-zA-Z_][a-zA-Z0-9_]*)[ \t]*=[ \t]*%autotest[ \t]*([a-zA-Z_0-9]*)",
    )
    .expect("autotest pattern is valid")
});
