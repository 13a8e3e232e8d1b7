use std::time::Duration;

use nbcheck::{config::HarnessConfig, constants::DEFAULT_UPLOAD_URL};

#[test]
fn defaults_match_the_local_autograder() {
    let config = HarnessConfig::default();

    assert_eq!(config.upload_url(), DEFAULT_UPLOAD_URL);
    assert!(!config.solution_only());
    assert!(config.token().is_none());
    assert!(config.timeout().is_none());
}

#[test]
fn builder_takes_optional_settings() {
    let config = HarnessConfig::builder()
        .upload_url("https://grader.example.edu/upload")
        .solution_only(true)
        .maybe_token(Some("abc"))
        .maybe_timeout(Some(Duration::from_secs(30)))
        .build();

    assert_eq!(config.upload_url(), "https://grader.example.edu/upload");
    assert!(config.solution_only());
    assert_eq!(config.token(), Some("abc"));
    assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
}
