use std::path::Path;

/// Current byte size of the transcript, or `None` if it can't be stat'ed.
///
/// The transcript is the host's append-only JSONL log. Its size is the only
/// signal these hooks consume; a missing path means "nothing to measure yet".
pub fn transcript_size(path: Option<&Path>) -> Option<u64> {
    let path = path?;
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta.len()),
        Err(e) => {
            tracing::debug!(
                error = %e,
                path = %path.display(),
                "transcript not readable"
            );
            None
        }
    }
}
