/// Session status report: a JSON snapshot of one session's stored state,
/// for debugging the hooks from a shell.
use crate::config::HookConfig;
use crate::monitor::growth_since;
use crate::state::{FsStateStore, StateStore};
use crate::transcript::transcript_size;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// The JSON payload printed by `faaaahhh status`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusReport {
    pub session_id: String,
    pub state_dir: String,
    pub baseline: Option<u64>,
    pub played: bool,
    pub played_at: Option<DateTime<Utc>>,
    /// Only known when a transcript path was supplied.
    pub transcript_bytes: Option<u64>,
    pub growth: Option<u64>,
    pub threshold: u64,
    pub sound_file: String,
    pub sound_file_present: bool,
}

/// Gather a report without modifying any state.
pub fn collect(
    store: &FsStateStore,
    config: &HookConfig,
    session_id: &str,
    transcript: Option<&Path>,
) -> StatusReport {
    let baseline = store.read_baseline(session_id).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to read baseline");
        None
    });
    let transcript_bytes = transcript_size(transcript);
    let growth = match (baseline, transcript_bytes) {
        (Some(b), Some(current)) => Some(growth_since(b, current).unwrap_or(0)),
        _ => None,
    };
    let sound = config.sound_path();

    StatusReport {
        session_id: session_id.to_string(),
        state_dir: store.session_dir(session_id).display().to_string(),
        baseline,
        played: store.has_played(session_id),
        played_at: store.played_at(session_id),
        transcript_bytes,
        growth,
        threshold: config.threshold,
        sound_file_present: sound.exists(),
        sound_file: sound.display().to_string(),
    }
}
