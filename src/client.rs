#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};
use reqwest::blocking::{Client, multipart};

use crate::{
    config::HarnessConfig,
    constants::{EXERCISE_ID_FIELD, NOTEBOOK_FIELD},
    notebook::Notebook,
    verdict::Verdict,
};

/// Something that grades an uploaded notebook.
pub trait Grader {
    /// Uploads `notebook` for `exercise_id` and returns the parsed verdict.
    ///
    /// A response body that is not a JSON object is an error.
    fn submit(&self, notebook: &Notebook, exercise_id: &str) -> Result<Verdict>;
}

/// Grader backed by the autograder's HTTP upload endpoint.
#[derive(Debug, Clone)]
pub struct HttpGrader {
    /// Shared blocking client.
    client:     Client,
    /// `POST` target.
    upload_url: String,
    /// Optional bearer token.
    token:      Option<String>,
}

impl HttpGrader {
    /// Builds a grader from the run configuration.
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        let client = Client::builder()
            .no_proxy()
            .timeout(config.timeout())
            .build()
            .context("Could not build HTTP client")?;

        Ok(Self {
            client,
            upload_url: config.upload_url().to_string(),
            token: config.token().map(str::to_string),
        })
    }

    /// Returns the upload endpoint.
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl Grader for HttpGrader {
    fn submit(&self, notebook: &Notebook, exercise_id: &str) -> Result<Verdict> {
        let payload = notebook
            .to_json_string()
            .context("Could not serialize submission notebook")?;
        tracing::trace!("==== Submission notebook ====\n{payload}\n");

        let notebook_part = multipart::Part::text(payload)
            .file_name(NOTEBOOK_FIELD)
            .mime_str("application/json")
            .context("Invalid MIME type for notebook part")?;
        let form = multipart::Form::new()
            .part(NOTEBOOK_FIELD, notebook_part)
            .text(EXERCISE_ID_FIELD, exercise_id.to_string());

        let mut request = self.client.post(&self.upload_url).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let body = request
            .send()
            .with_context(|| format!("Could not upload exercise {exercise_id} to {}", self.upload_url))?
            .text()
            .with_context(|| format!("Could not read the response for exercise {exercise_id}"))?;
        tracing::trace!("==== Autograder response ====\n{body}\n");

        Verdict::from_json_str(&body).with_context(|| {
            format!("Autograder response for exercise {exercise_id} is not a JSON object:\n{body}")
        })
    }
}
