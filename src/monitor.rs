use crate::config::HookConfig;
use crate::payload::HookPayload;
use crate::sound::AudioPlayer;
use crate::state::StateStore;
use crate::transcript::transcript_size;
use tracing::{debug, info};

/// What a post-tool-use check decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// An alert already fired this cycle.
    AlreadyPlayed,
    /// Transcript missing or unreadable; nothing to measure.
    NoTranscript,
    /// Baseline could not be read; skip rather than guess.
    StateUnavailable,
    /// No baseline existed, so the current size became the baseline.
    BaselineSeeded { size: u64 },
    /// Transcript has not grown past the baseline.
    NoGrowth,
    /// Grew, but not beyond the threshold.
    BelowThreshold { growth: u64 },
    /// Grew beyond the threshold; the alert was played.
    Alerted { growth: u64 },
}

/// Bytes the transcript grew since `baseline`, or `None` if it didn't.
pub fn growth_since(baseline: u64, current: u64) -> Option<u64> {
    current.checked_sub(baseline).filter(|&g| g > 0)
}

/// Growth monitor, run after every tool use.
///
/// Fires at most one alert per cycle: once growth since the baseline exceeds
/// the threshold, `played` is set and later checks stay quiet until the next
/// compaction clears it.
pub fn check_growth(
    store: &impl StateStore,
    player: &impl AudioPlayer,
    config: &HookConfig,
    payload: &HookPayload,
) -> GrowthOutcome {
    let session_id = payload.session_id.as_str();

    if let Err(e) = store.ensure(session_id) {
        debug!(error = %e, "could not create state dir");
    }

    if store.has_played(session_id) {
        return GrowthOutcome::AlreadyPlayed;
    }

    let Some(current) = transcript_size(payload.transcript_path.as_deref()) else {
        return GrowthOutcome::NoTranscript;
    };

    let baseline = match store.read_baseline(session_id) {
        Ok(Some(b)) => b,
        Ok(None) => {
            // Session-start hook never ran; seed now, measure next time.
            if let Err(e) = store.write_baseline(session_id, current) {
                debug!(error = %e, "could not seed baseline");
            }
            debug!(session_id, size = current, "baseline seeded lazily");
            return GrowthOutcome::BaselineSeeded { size: current };
        }
        Err(e) => {
            debug!(error = %e, "could not read baseline");
            return GrowthOutcome::StateUnavailable;
        }
    };

    let Some(growth) = growth_since(baseline, current) else {
        return GrowthOutcome::NoGrowth;
    };

    if growth <= config.threshold {
        debug!(
            session_id,
            growth,
            threshold = config.threshold,
            "transcript growth below threshold"
        );
        return GrowthOutcome::BelowThreshold { growth };
    }

    // Gate first so a slow player can't let a racing check alert twice.
    if let Err(e) = store.mark_played(session_id) {
        debug!(error = %e, "could not mark played");
    }
    info!(
        session_id,
        growth,
        threshold = config.threshold,
        "context nearly exhausted"
    );
    player.play(&config.sound_path());
    GrowthOutcome::Alerted { growth }
}
