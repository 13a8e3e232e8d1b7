#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{constants::EXERCISE_ID_KEY, extract::Snippet, notebook::Notebook};

/// Errors raised while building a submission notebook.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SynthesisError {
    /// The snippet's merged metadata has no `exercise_id`.
    #[error("Snippet has no `{EXERCISE_ID_KEY}` in its metadata")]
    MissingExerciseId,
}

/// Builds the notebook to upload for `snippet`.
///
/// The result is `template` with every cell whose `metadata.exercise_id`
/// equals the snippet's replaced by a copy holding the snippet source minus
/// its magic line. Matching cells keep their own metadata; all other cells
/// are left as they are.
pub fn synthesize_submission(
    snippet: &Snippet<'_>,
    template: &Notebook,
) -> Result<Notebook, SynthesisError> {
    let exercise_id = snippet
        .exercise_id()
        .ok_or(SynthesisError::MissingExerciseId)?;
    let body: Vec<String> = snippet.cell.source.iter().skip(1).cloned().collect();

    let mut replaced = 0usize;
    let cells = template
        .cells
        .iter()
        .map(|cell| {
            if cell.metadata_value(EXERCISE_ID_KEY) == Some(exercise_id) {
                replaced += 1;
                cell.with_source(body.clone())
            } else {
                cell.clone()
            }
        })
        .collect();

    match replaced {
        0 => tracing::warn!("Student notebook has no cell for exercise {exercise_id}"),
        1 => {}
        n => tracing::warn!("Student notebook has {n} cells for exercise {exercise_id}"),
    }

    Ok(Notebook {
        cells,
        extra: template.extra.clone(),
    })
}
