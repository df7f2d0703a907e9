use crate::payload::HookPayload;
use crate::state::{StateError, StateStore};
use crate::transcript::transcript_size;

/// Session-start hook: record the transcript's current size as the baseline.
///
/// An unreadable transcript counts as size 0. Re-running just overwrites the
/// baseline with the latest size. Returns the size written.
pub fn init_baseline(store: &impl StateStore, payload: &HookPayload) -> Result<u64, StateError> {
    let session_id = payload.session_id.as_str();
    store.ensure(session_id)?;

    let size = transcript_size(payload.transcript_path.as_deref()).unwrap_or(0);
    store.write_baseline(session_id, size)?;

    tracing::debug!(session_id, size, "baseline initialized");
    Ok(size)
}
