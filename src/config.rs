#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use bon::Builder;

use crate::constants::DEFAULT_UPLOAD_URL;

/// Settings for one validation run.
#[derive(Debug, Clone, Builder)]
pub struct HarnessConfig {
    /// Grading service upload endpoint.
    #[builder(into, default = DEFAULT_UPLOAD_URL.to_string())]
    upload_url:    String,
    /// Only check `%%solution` snippets.
    #[builder(default)]
    solution_only: bool,
    /// Bearer token sent with every upload, if any.
    #[builder(into)]
    token:         Option<String>,
    /// Upload timeout; `None` waits indefinitely.
    timeout:       Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HarnessConfig {
    /// Returns the upload endpoint.
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Returns whether submission snippets are skipped.
    pub fn solution_only(&self) -> bool {
        self.solution_only
    }

    /// Returns the bearer token, if configured.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the upload timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
