/// Compaction handler: the host is about to truncate its context.
///
/// Starts a fresh measurement cycle (new baseline, alert gate cleared) and
/// always plays the alert, whether or not one already fired this cycle.
use crate::config::HookConfig;
use crate::payload::HookPayload;
use crate::sound::AudioPlayer;
use crate::state::StateStore;
use crate::transcript::transcript_size;
use tracing::{debug, info};

/// Result of a compaction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactOutcome {
    /// Baseline for the new cycle.
    pub baseline: u64,
}

pub fn on_compact(
    store: &impl StateStore,
    player: &impl AudioPlayer,
    config: &HookConfig,
    payload: &HookPayload,
) -> CompactOutcome {
    let session_id = payload.session_id.as_str();

    // State failures are logged and skipped; they never suppress the sound.
    if let Err(e) = store.ensure(session_id) {
        debug!(error = %e, "could not create state dir");
    }

    let baseline = transcript_size(payload.transcript_path.as_deref()).unwrap_or(0);
    if let Err(e) = store.write_baseline(session_id, baseline) {
        debug!(error = %e, "could not reset baseline");
    }
    if let Err(e) = store.clear_played(session_id) {
        debug!(error = %e, "could not clear played flag");
    }

    info!(
        session_id,
        baseline,
        trigger = payload.trigger.as_deref().unwrap_or("unknown"),
        "context compacted, new cycle"
    );
    player.play(&config.sound_path());

    CompactOutcome { baseline }
}
